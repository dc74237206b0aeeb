use std::path::PathBuf;

/// Failures surfaced by the registry collaborators.
///
/// Per-agent install and uninstall problems are reported as outcomes, not as
/// errors; this type covers loading, security refusals and transport.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Security: {0}")]
    Security(String),
    #[error("refusing non-HTTPS URL: {0}")]
    InsecureUrl(String),
    #[error("refusing untrusted host: {0}")]
    UntrustedHost(String),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("response exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unknown preset \"{0}\"")]
    UnknownPreset(String),
    #[error("invalid override spec \"{spec}\": {reason}")]
    InvalidOverride { spec: String, reason: String },
    #[error("YOLO preset cannot be saved as default. Use --yolo for one-time use.")]
    YoloNotSaved,
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegistryError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_security(&self) -> bool {
        matches!(self, RegistryError::Security(_))
    }
}
