//! Recovery snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kestrel_tabs::TabRecord;

use crate::Result;

/// The open tabs at the moment of capture.
///
/// The encoded form is an implementation detail; only this crate reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// When the state was captured
    pub captured_at: DateTime<Utc>,
    /// Tab that had focus
    pub current_tab_id: Option<String>,
    /// Tabs in strip order
    pub tabs: Vec<TabRecord>,
}

impl SessionSnapshot {
    /// Build a snapshot, leaving out private tabs
    pub fn new(tabs: Vec<TabRecord>, current_tab_id: Option<String>) -> Self {
        let tabs: Vec<TabRecord> = tabs.into_iter().filter(|tab| !tab.incognito).collect();

        // A private current tab is not restorable
        let current_tab_id =
            current_tab_id.filter(|id| tabs.iter().any(|tab| &tab.id == id));

        Self {
            captured_at: Utc::now(),
            current_tab_id,
            tabs,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Empty snapshots are never written; they clear the file instead
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn current_tab(&self) -> Option<&TabRecord> {
        let id = self.current_tab_id.as_ref()?;
        self.tabs.iter().find(|tab| &tab.id == id)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(url: &str) -> TabRecord {
        TabRecord::new(url.to_string()).unwrap()
    }

    #[test]
    fn test_private_tabs_excluded() {
        let public = tab("https://example.com");
        let private = tab("https://secret.example").incognito();
        let private_id = private.id.clone();

        let snapshot = SessionSnapshot::new(vec![public.clone(), private], Some(private_id));

        assert_eq!(snapshot.tab_count(), 1);
        assert_eq!(snapshot.tabs[0].id, public.id);
        assert!(snapshot.current_tab().is_none());
    }

    #[test]
    fn test_only_private_tabs_is_empty() {
        let snapshot = SessionSnapshot::new(vec![tab("https://secret.example").incognito()], None);
        assert!(snapshot.is_empty());
        assert!(SessionSnapshot::empty().is_empty());
    }

    #[test]
    fn test_current_tab() {
        let first = tab("https://example.com");
        let second = tab("https://example.org");
        let snapshot = SessionSnapshot::new(vec![first, second.clone()], Some(second.id.clone()));

        assert_eq!(snapshot.current_tab().map(|t| t.url.as_str()), Some("https://example.org"));
    }

    #[test]
    fn test_garbage_does_not_decode() {
        assert!(SessionSnapshot::from_bytes(b"\x00\x01not a snapshot").is_err());
        assert!(SessionSnapshot::from_bytes(b"").is_err());
    }
}
