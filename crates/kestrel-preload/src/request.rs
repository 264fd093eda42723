//! Preload request routing
//!
//! Turns an incoming preload message into a registry call, after checking the
//! user's preload policy against the current network.

use serde::{Deserialize, Serialize};
use url::Url;

use kestrel_tabs::{BrowserTab, Headers};

use crate::error::PreloadError;
use crate::preloader::PreloaderHandle;
use crate::Result;

/// Message sent by whatever wants a page preloaded or dropped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreloadRequest {
    pub id: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub headers: Headers,
    /// Drop the preload instead of creating one
    #[serde(default)]
    pub discard: bool,
    /// Query to push into the preloaded page's search box
    pub search_box_query: Option<String>,
    #[serde(default)]
    pub search_box_cancel: bool,
}

impl PreloadRequest {
    pub fn preload(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn discard(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            discard: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Wifi,
    Cellular,
    Disconnected,
}

/// When the user allows background preloading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreloadPolicy {
    Always,
    #[default]
    WifiOnly,
    Never,
}

impl PreloadPolicy {
    pub fn allows(&self, network: NetworkType) -> bool {
        match self {
            PreloadPolicy::Always => true,
            PreloadPolicy::WifiOnly => network == NetworkType::Wifi,
            PreloadPolicy::Never => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreloadPolicy::Always => "always",
            PreloadPolicy::WifiOnly => "wifi_only",
            PreloadPolicy::Never => "never",
        }
    }
}

impl std::fmt::Display for PreloadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PreloadPolicy {
    type Err = PreloadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(PreloadPolicy::Always),
            "wifi_only" => Ok(PreloadPolicy::WifiOnly),
            "never" => Ok(PreloadPolicy::Never),
            _ => Err(PreloadError::UnknownPolicy(s.to_string())),
        }
    }
}

/// What the receiver did with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Preloaded,
    Discarded,
    SearchBoxCancelled,
    /// Policy does not allow preloading on this network
    Refused,
    /// Malformed request
    Dropped,
}

pub struct PreloadRequestReceiver<T: BrowserTab> {
    preloader: PreloaderHandle<T>,
    policy: PreloadPolicy,
}

impl<T: BrowserTab> PreloadRequestReceiver<T> {
    pub fn new(preloader: PreloaderHandle<T>, policy: PreloadPolicy) -> Self {
        Self { preloader, policy }
    }

    pub fn policy(&self) -> PreloadPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: PreloadPolicy) {
        self.policy = policy;
    }

    pub fn on_receive(&self, request: PreloadRequest, network: NetworkType) -> RouteOutcome {
        match self.route(request, network) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping preload request");
                RouteOutcome::Dropped
            }
        }
    }

    fn route(&self, request: PreloadRequest, network: NetworkType) -> Result<RouteOutcome> {
        let id = request
            .id
            .filter(|id| !id.is_empty())
            .ok_or(PreloadError::MissingId)?;

        // Discards release resources, so they bypass the policy
        if request.discard {
            self.preloader.discard_preload(id);
            return Ok(RouteOutcome::Discarded);
        }

        if !self.policy.allows(network) {
            tracing::debug!(
                preload_id = %id,
                policy = %self.policy,
                network = ?network,
                "Preloading not allowed on this network"
            );
            return Ok(RouteOutcome::Refused);
        }

        if request.search_box_cancel {
            self.preloader.cancel_search_box_preload(id);
            return Ok(RouteOutcome::SearchBoxCancelled);
        }

        let url = smart_url_filter(request.url.as_deref().ok_or(PreloadError::MissingUrl)?)?;
        self.preloader
            .handle_preload_request(id, url, request.headers, request.search_box_query);

        Ok(RouteOutcome::Preloaded)
    }
}

/// Normalise user-ish input into an absolute URL; bare hosts get `http://`
pub fn smart_url_filter(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PreloadError::InvalidUrl("URL cannot be empty".to_string()));
    }

    match Url::parse(trimmed) {
        Ok(url) => Ok(url.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{trimmed}"))
            .map(Into::into)
            .map_err(|e| PreloadError::InvalidUrl(format!("{trimmed}: {e}"))),
        Err(e) => Err(PreloadError::InvalidUrl(format!("{trimmed}: {e}"))),
    }
}
