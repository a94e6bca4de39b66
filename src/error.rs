//! Centralized error type for the mixdown umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] mixdown_core::Error),
}

impl From<mixdown_core::RenderError> for Error {
    fn from(e: mixdown_core::RenderError) -> Self {
        Error::Core(e.into())
    }
}

impl Error {
    /// The underlying subsystem error.
    pub fn as_core(&self) -> &mixdown_core::Error {
        match self {
            Error::Core(e) => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
