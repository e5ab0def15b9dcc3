//! txlens: decode EVM call-data into named methods and parameters

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr};

use txlens_adapters::{
    AdapterConfig, CachedHttpClient, DirectoryKind, JsonRpcProvider, SignatureDirectory,
    SourcifyMetadataClient,
};
use txlens_core::{DecoderConfig, TransactionDecoder};

#[derive(Debug, Parser)]
#[command(
    name = "txlens",
    version,
    about = "Decode EVM transaction call-data"
)]
struct Args {
    /// Call-data as 0x-prefixed hex
    #[arg(long)]
    data: String,

    /// Contract the call-data is sent to. Omit for calls without contract context.
    #[arg(long, default_value = "")]
    to: String,

    /// Chain id, 0x-hex or decimal
    #[arg(long, default_value = "0x1")]
    chain_id: String,

    /// HTTP JSON-RPC endpoint used to resolve proxies
    #[arg(long)]
    rpc_url: Option<String>,

    /// Signature directory: sourcify, four-byte or both
    #[arg(long, default_value_t = DirectoryKind::Sourcify)]
    directory: DirectoryKind,

    /// Maximum nesting depth for embedded call-data
    #[arg(long, default_value_t = 3)]
    max_depth: usize,

    /// Decode the top-level call only
    #[arg(long)]
    no_expand: bool,

    #[arg(long, default_value_t = 10_000)]
    source_timeout_ms: u64,

    #[arg(long, default_value_t = 20_000)]
    decode_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let adapters = AdapterConfig {
        directory: args.directory,
        rpc_url: args.rpc_url.clone(),
        ..AdapterConfig::default()
    };

    let http = CachedHttpClient::new(&adapters).wrap_err("failed to build http client")?;
    let directory = SignatureDirectory::from_config(&adapters, &http);
    let metadata = SourcifyMetadataClient::new(http, adapters.sourcify_files_url.clone());
    let provider = adapters
        .rpc_url
        .as_deref()
        .map(|url| JsonRpcProvider::new(url, Duration::from_millis(adapters.http_timeout_ms)))
        .transpose()
        .wrap_err("failed to build rpc provider")?;
    if provider.is_none() {
        tracing::debug!("no rpc url, proxy resolution disabled");
    }

    let decoder = TransactionDecoder::new(directory, metadata, provider).with_config(
        DecoderConfig {
            max_depth: args.max_depth,
            source_timeout_ms: args.source_timeout_ms,
            decode_timeout_ms: args.decode_timeout_ms,
        },
    );

    let decoded = if args.no_expand {
        decoder.decode_hex(&args.data, &args.to, &args.chain_id).await
    } else {
        decoder
            .decode_hex_recursive(&args.data, &args.to, &args.chain_id)
            .await
    };

    let Some(result) = decoded else {
        eprintln!("unable to decode call-data");
        return Ok(ExitCode::FAILURE);
    };

    let json = serde_json::to_string_pretty(&result).wrap_err("failed to serialize result")?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}
