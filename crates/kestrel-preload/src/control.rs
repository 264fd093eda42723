//! Control over a preloaded tab
//!
//! Wraps the engine tab while it sits in the registry and travels with it to
//! the caller on consumption. Besides plain loads it speaks the page's
//! search-box protocol, falling back to a normal navigation whenever the page
//! cannot take the query itself.

use url::Url;

use kestrel_tabs::{BrowserTab, Headers};

/// How a search-box submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The page accepted the query
    Submitted,
    /// The page could not take the query; the fallback URL was loaded
    FallbackLoaded,
    /// The page or control went away mid-negotiation; nothing was done
    Abandoned,
}

pub struct PreloadedTabControl<T: BrowserTab> {
    tab: T,
    last_query: Option<String>,
    destroyed: bool,
}

impl<T: BrowserTab> PreloadedTabControl<T> {
    pub fn new(tab: T) -> Self {
        Self {
            tab,
            last_query: None,
            destroyed: false,
        }
    }

    pub fn tab(&self) -> &T {
        &self.tab
    }

    pub fn tab_mut(&mut self) -> &mut T {
        &mut self.tab
    }

    /// Take ownership of the engine tab
    pub fn into_tab(self) -> T {
        self.tab
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn load_url(&mut self, url: &str, headers: &Headers) {
        self.last_query = None;
        self.tab.load_url(url, headers);
    }

    /// Load `url` unless the tab already shows it, ignoring the fragment
    pub fn load_url_if_changed(&mut self, url: &str, headers: &Headers) {
        let unchanged = self
            .tab
            .url()
            .is_some_and(|current| same_document(&current, url));

        if unchanged {
            tracing::trace!(url = %url, "Preloaded tab already showing URL");
        } else {
            self.load_url(url, headers);
        }
    }

    /// Push a query into the page's search box
    pub fn set_query(&mut self, query: &str) {
        match self.tab.search_box() {
            Some(search_box) => {
                search_box.set_query(query);
                self.last_query = Some(query.to_string());
            }
            None => tracing::debug!("Preloaded page has no search box; query dropped"),
        }
    }

    /// Tell the page the query was abandoned. Returns false without a search box.
    pub fn search_box_cancel(&mut self) -> bool {
        match self.tab.search_box() {
            Some(search_box) => {
                self.last_query = None;
                search_box.cancel();
                true
            }
            None => false,
        }
    }

    /// Submit `query` through the page's search box, or navigate to
    /// `fallback_url` if the page does not support it.
    ///
    /// The support check is answered by the page. If the page is torn down
    /// before it answers, the submission is abandoned.
    pub async fn search_box_submit(
        &mut self,
        query: &str,
        fallback_url: &str,
        fallback_headers: &Headers,
    ) -> SubmitOutcome {
        if self.destroyed {
            return SubmitOutcome::Abandoned;
        }

        let has_url = self.tab.url().is_some_and(|url| !url.is_empty());
        let search_box = match self.tab.search_box() {
            Some(search_box) if has_url => search_box,
            _ => {
                self.load_url(fallback_url, fallback_headers);
                return SubmitOutcome::FallbackLoaded;
            }
        };

        let supported = match search_box.is_supported().await {
            Ok(supported) => supported,
            Err(_) => {
                tracing::debug!("Page went away before answering search box support");
                return SubmitOutcome::Abandoned;
            }
        };

        if !supported {
            tracing::debug!(fallback = %fallback_url, "Search box unsupported, loading fallback");
            self.load_url(fallback_url, fallback_headers);
            return SubmitOutcome::FallbackLoaded;
        }

        search_box.set_verbatim(true);
        search_box.set_query(query);
        self.last_query = Some(query.to_string());

        match search_box.submit().await {
            Ok(true) => SubmitOutcome::Submitted,
            Ok(false) => {
                tracing::debug!(fallback = %fallback_url, "Search box ignored submit, loading fallback");
                self.load_url(fallback_url, fallback_headers);
                SubmitOutcome::FallbackLoaded
            }
            Err(_) => {
                tracing::debug!("Page went away before completing submit");
                SubmitOutcome::Abandoned
            }
        }
    }

    /// Destroy the engine tab. Further calls are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }

        self.destroyed = true;
        self.tab.clear_history();
        self.tab.destroy();
    }
}

/// Compare two URLs with their fragments removed
fn same_document(current: &str, target: &str) -> bool {
    match (Url::parse(current), Url::parse(target)) {
        (Ok(mut current), Ok(target)) => {
            current.set_fragment(None);
            current == target
        }
        _ => current == target,
    }
}
