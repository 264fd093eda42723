//! Tab error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Tab creation failed: {0}")]
    CreationFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
