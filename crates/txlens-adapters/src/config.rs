use std::fmt;
use std::str::FromStr;

/// Which signature directory backs the directory strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryKind {
    #[default]
    Sourcify,
    FourByte,
    /// Sourcify first, then 4byte.directory.
    Both,
}

impl FromStr for DirectoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sourcify" => Ok(Self::Sourcify),
            "four-byte" | "fourbyte" | "4byte" => Ok(Self::FourByte),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown directory '{other}' (expected sourcify, four-byte or both)"
            )),
        }
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sourcify => "sourcify",
            Self::FourByte => "four-byte",
            Self::Both => "both",
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub sourcify_signatures_url: String,
    pub four_byte_url: String,
    pub sourcify_files_url: String,
    pub http_timeout_ms: u64,
    /// Cached responses younger than this are served without a request.
    pub cache_refresh_ms: u64,
    /// Serve an expired cached response when the upstream fails.
    pub allow_stale: bool,
    /// Consecutive connectivity failures before a service is marked spurious.
    pub max_failed_requests: usize,
    pub directory: DirectoryKind,
    pub rpc_url: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            sourcify_signatures_url:
                "https://api.4byte.sourcify.dev/signature-database/v1/lookup".to_owned(),
            four_byte_url: "https://www.4byte.directory/api/v1/signatures/".to_owned(),
            sourcify_files_url: "https://sourcify.dev/server/files/any".to_owned(),
            http_timeout_ms: 10_000,
            cache_refresh_ms: 360_000,
            allow_stale: true,
            max_failed_requests: 3,
            directory: DirectoryKind::Sourcify,
            rpc_url: None,
        }
    }
}
