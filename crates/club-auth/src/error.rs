use thiserror::Error as ThisError;

use club_data::Status;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Unknown login or wrong secret
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is {0}")]
    Disabled(Status),

    #[error(transparent)]
    Data(#[from] club_data::Error),
}
