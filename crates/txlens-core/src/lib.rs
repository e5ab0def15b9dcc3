pub mod codec;
pub mod config;
pub mod decoder;
pub mod directory;
pub mod domain;
pub mod expander;
pub mod metadata;
pub mod params;
pub mod ports;
pub mod proxy;
pub mod router;
pub mod signature;

pub use codec::{CodecError, TupleMember, TypeDescriptor};
pub use config::DecoderConfig;
pub use decoder::TransactionDecoder;
pub use domain::{
    parse_chain_id, BigInteger, CallData, CallDataError, DecodedMethod, DecodedParam,
    DecodedResult, ParamValue, PoolHop, Scalar, Source, FAILED_TO_DECODE,
};
pub use metadata::{ContractMetadata, MetadataOutput};
pub use ports::{ChainProviderPort, MetadataPort, PortError, SignatureDirectoryPort};
pub use signature::FunctionSignature;
