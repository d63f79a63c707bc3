use thiserror::Error;

/// Failure taxonomy of the vault engine.
///
/// Every public operation returns one of these; the same message is
/// journaled into the container's `_logs_` table. A failed mutation is
/// never partially committed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("wrong vault password")]
    WrongPassword,

    #[error("wrong password for file \"{0}\"")]
    WrongPerFilePassword(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("there is already a file called \"{0}\"")]
    Exists(String),

    #[error("invalid file name \"{0}\": must not be empty or contain \\ / : * ? \" < > |")]
    InvalidName(String),

    #[error("invalid list query: {0}")]
    InvalidQuery(String),

    #[error("file \"{0}\" is identical with the latest stored version")]
    Identical(String),

    #[error("file \"{0}\" already exists and versioning was disabled")]
    NotVersionable(String),

    #[error("bad argument: {0}")]
    BadArgument(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
