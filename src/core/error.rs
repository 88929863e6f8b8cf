use thiserror::Error;

#[derive(Error, Debug)]
pub enum AriseError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Rejections raised by the progression engine before any state changes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("difficulty must be between 1 and 10, got {0}")]
    DifficultyOutOfRange(i64),

    #[error("invalid quest date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("quest name must not be blank")]
    BlankQuestName,

    #[error("quest id already in use: {0}")]
    DuplicateQuestId(String),

    #[error("profile name must not be blank")]
    BlankProfileName,

    #[error("age must be a positive integer")]
    NonPositiveAge,

    #[error("unknown stat: {0}")]
    UnknownStat(String),
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("a mentor request is already in flight")]
    Busy,

    #[error("message is empty")]
    EmptyMessage,

    #[error("chat service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} not set")]
    MissingApiKey(&'static str),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, AriseError>;
