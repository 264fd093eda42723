//! Preload error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreloadError {
    #[error("Tab error: {0}")]
    Tab(#[from] kestrel_tabs::TabError),

    #[error("Preload request has no id")]
    MissingId,

    #[error("Preload request has no URL")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Unknown preload policy: {0}")]
    UnknownPolicy(String),
}
