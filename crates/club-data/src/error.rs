use thiserror::Error as ThisError;

use crate::{Access, Operation};

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the access layer
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u32 },

    #[error("{entity} with {field} {value} already exists")]
    DuplicateKey {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{entity}.{field} references unknown id {id}")]
    Reference {
        entity: &'static str,
        field: &'static str,
        id: u32,
    },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{operation} requires {required} access")]
    Forbidden {
        operation: Operation,
        required: Access,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub fn not_found(entity: &'static str, id: u32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
