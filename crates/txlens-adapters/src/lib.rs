pub mod config;
pub mod directory;
pub mod four_byte;
pub mod http;
pub mod rpc;
pub mod sourcify_metadata;
pub mod sourcify_signatures;

pub use config::{AdapterConfig, DirectoryKind};
pub use directory::SignatureDirectory;
pub use four_byte::FourByteDirectory;
pub use http::CachedHttpClient;
pub use rpc::JsonRpcProvider;
pub use sourcify_metadata::SourcifyMetadataClient;
pub use sourcify_signatures::{SignatureInfo, SourcifySignatureDirectory};
