use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("Unknown section: {0}")]
    SectionNotFound(String),

    #[error("Unknown account code {code} in section {section}")]
    AccountNotFound { section: String, code: String },

    #[error("Invalid month key '{0}': expected YYYY-MM")]
    InvalidMonthKey(String),

    #[error("Invalid operations profile field '{field}': {details}")]
    InvalidProfile { field: String, details: String },

    #[error("Duplicate section id in chart of accounts: {0}")]
    DuplicateSection(String),

    #[error("Duplicate account code in chart of accounts: {0}")]
    DuplicateCode(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StatementError>;
