//! Background tab construction

use crate::tab::BrowserTab;
use crate::Result;

/// Creates tabs that are not attached to any window yet
pub trait TabFactory: Send + Sync + 'static {
    type Tab: BrowserTab;

    fn create_tab(&self) -> Result<Self::Tab>;
}
