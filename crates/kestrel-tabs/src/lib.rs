//! Kestrel Tab Abstraction
//!
//! The web engine is external. This crate describes what the core needs from
//! it: a tab that can load URLs and be destroyed, an optional page-level
//! search box, and a factory for background tabs. `TabRecord` is the
//! serializable description of a tab used by crash recovery.

mod error;
mod factory;
mod record;
mod search_box;
mod tab;

pub use error::TabError;
pub use factory::TabFactory;
pub use record::TabRecord;
pub use search_box::SearchBox;
pub use tab::{BrowserTab, Headers};

pub type Result<T> = std::result::Result<T, TabError>;
