//! Launch intent

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why the browser was started: what to open and any extras from the launcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchIntent {
    pub action: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub extras: HashMap<String, String>,
}

impl LaunchIntent {
    pub fn open_url(url: impl Into<String>) -> Self {
        Self {
            action: Some("view".to_string()),
            url: Some(url.into()),
            extras: HashMap::new(),
        }
    }
}
