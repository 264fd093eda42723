//! Serializable tab description
//!
//! A `TabRecord` is what survives a process restart: enough to rebuild the
//! tab strip and reload each page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TabError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabRecord {
    /// Unique identifier
    pub id: String,
    /// Current URL
    pub url: String,
    /// Page title
    pub title: String,
    /// Favicon URL if available
    pub favicon_url: Option<String>,
    /// Tab that opened this one
    pub parent_id: Option<String>,
    /// Scroll position for restoration
    pub scroll_position: i32,
    /// Private tabs are never written to disk
    #[serde(default)]
    pub incognito: bool,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

impl TabRecord {
    pub fn new(url: String) -> Result<Self> {
        if url.is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            url,
            title: String::new(),
            favicon_url: None,
            parent_id: None,
            scroll_position: 0,
            incognito: false,
            created_at: now,
            last_accessed_at: now,
        })
    }

    pub fn with_parent(mut self, parent_id: String) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn incognito(mut self) -> Self {
        self.incognito = true;
        self
    }

    /// Update URL (navigation)
    pub fn navigate(&mut self, url: String) -> Result<()> {
        if url.is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        self.url = url;
        self.title = String::new(); // Reset title until page loads
        self.scroll_position = 0;
        self.last_accessed_at = Utc::now();

        Ok(())
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    /// Get display title (with fallback to URL)
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let tab = TabRecord::new("https://example.com".to_string()).unwrap();
        assert_eq!(tab.url, "https://example.com");
        assert_eq!(tab.display_title(), "https://example.com");
        assert!(!tab.incognito);
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(TabRecord::new(String::new()).is_err());

        let mut tab = TabRecord::new("https://example.com".to_string()).unwrap();
        assert!(tab.navigate(String::new()).is_err());
    }

    #[test]
    fn test_navigate_resets_page_state() {
        let mut tab = TabRecord::new("https://example.com".to_string()).unwrap();
        tab.set_title("Example".to_string());
        tab.scroll_position = 420;

        tab.navigate("https://example.org".to_string()).unwrap();
        assert_eq!(tab.display_title(), "https://example.org");
        assert_eq!(tab.scroll_position, 0);
    }

    #[test]
    fn test_incognito_defaults_when_missing() {
        let tab = TabRecord::new("https://example.com".to_string()).unwrap();
        let mut value = serde_json::to_value(&tab).unwrap();
        value.as_object_mut().unwrap().remove("incognito");

        let restored: TabRecord = serde_json::from_value(value).unwrap();
        assert!(!restored.incognito);
    }
}
