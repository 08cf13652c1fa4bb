use thiserror::Error;

#[derive(Error, Debug)]
pub enum BallotError {
    #[error("config error: {0}")]
    Config(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("voter roll schema error: missing required column(s): {0}")]
    Schema(String),

    #[error("empty candidate corpus")]
    EmptyCorpus,

    #[error("invalid OCR entry: {0}")]
    InvalidEntry(String),

    #[error("OCR provider error: {0}")]
    Provider(String),

    #[error("no page images found in: {0}")]
    NoPagesFound(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BallotError>;
