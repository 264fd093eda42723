//! Tab handle exposed by the web engine

use std::collections::HashMap;
use std::sync::Arc;

use crate::search_box::SearchBox;

/// Extra request headers sent with a load
pub type Headers = HashMap<String, String>;

/// A live tab owned by the engine.
///
/// Handles are not `Clone`: whoever holds the value owns the tab and is
/// responsible for calling [`BrowserTab::destroy`].
pub trait BrowserTab: Send + 'static {
    fn load_url(&mut self, url: &str, headers: &Headers);

    /// URL currently committed in the tab, if any
    fn url(&self) -> Option<String>;

    /// The page's embedded search box, when the engine exposes one
    fn search_box(&self) -> Option<Arc<dyn SearchBox>>;

    /// Forget back/forward history
    fn clear_history(&mut self) {}

    /// Release engine resources. The tab must not be used afterwards.
    fn destroy(&mut self);
}
