use async_trait::async_trait;
use tracing::warn;

use txlens_core::{PortError, SignatureDirectoryPort};

use crate::config::{AdapterConfig, DirectoryKind};
use crate::four_byte::FourByteDirectory;
use crate::http::CachedHttpClient;
use crate::sourcify_signatures::SourcifySignatureDirectory;

/// Configured signature directory.
#[derive(Debug, Clone)]
pub enum SignatureDirectory {
    Sourcify(SourcifySignatureDirectory),
    FourByte(FourByteDirectory),
    /// De-duplicated concatenation, Sourcify candidates first.
    Both(SourcifySignatureDirectory, FourByteDirectory),
}

impl SignatureDirectory {
    pub fn from_config(config: &AdapterConfig, http: &CachedHttpClient) -> Self {
        let sourcify = || {
            SourcifySignatureDirectory::new(
                http.clone(),
                config.sourcify_signatures_url.clone(),
                config.max_failed_requests,
            )
        };
        let four_byte = || FourByteDirectory::new(http.clone(), config.four_byte_url.clone());

        match config.directory {
            DirectoryKind::Sourcify => Self::Sourcify(sourcify()),
            DirectoryKind::FourByte => Self::FourByte(four_byte()),
            DirectoryKind::Both => Self::Both(sourcify(), four_byte()),
        }
    }
}

#[async_trait]
impl SignatureDirectoryPort for SignatureDirectory {
    async fn lookup(&self, selector: [u8; 4]) -> Result<Vec<String>, PortError> {
        match self {
            Self::Sourcify(sourcify) => sourcify.lookup(selector).await,
            Self::FourByte(four_byte) => four_byte.lookup(selector).await,
            Self::Both(sourcify, four_byte) => {
                let (first, second) =
                    futures::future::join(sourcify.lookup(selector), four_byte.lookup(selector)).await;
                merge(first, second)
            }
        }
    }
}

/// One failing side is tolerated; both failing reports the first error.
fn merge(
    first: Result<Vec<String>, PortError>,
    second: Result<Vec<String>, PortError>,
) -> Result<Vec<String>, PortError> {
    let (first, second) = match (first, second) {
        (Err(e), Err(_)) => return Err(e),
        (Ok(first), Err(e)) => {
            warn!(error = %e, "4byte lookup failed, using sourcify candidates only");
            (first, Vec::new())
        }
        (Err(e), Ok(second)) => {
            warn!(error = %e, "sourcify lookup failed, using 4byte candidates only");
            (Vec::new(), second)
        }
        (Ok(first), Ok(second)) => (first, second),
    };

    let mut merged = first;
    for candidate in second {
        if !merged.contains(&candidate) {
            merged.push(candidate);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_keeps_order_and_drops_duplicates() {
        let merged = merge(Ok(sigs(&["a()", "b()"])), Ok(sigs(&["b()", "c()"]))).unwrap();
        assert_eq!(merged, sigs(&["a()", "b()", "c()"]));
    }

    #[test]
    fn merge_tolerates_one_failure() {
        let merged = merge(Err(PortError::Status(503)), Ok(sigs(&["c()"]))).unwrap();
        assert_eq!(merged, sigs(&["c()"]));
        assert!(merge(
            Err(PortError::Status(503)),
            Err(PortError::Transport("down".into()))
        )
        .is_err());
    }
}
