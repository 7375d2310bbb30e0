use thiserror::Error;

#[derive(Error, Debug)]
pub enum TellerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read ledger {path}: {source}")]
    ReadLedger {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No ledger file given. Pass one explicitly or run `teller config --ledger <PATH>`.")]
    NoLedger,

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, TellerError>;
