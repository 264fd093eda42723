//! Kestrel Preloading
//!
//! Background tabs created ahead of navigation, keyed by an opaque id the
//! caller supplies. At most one tab exists per id. A session that is not
//! touched for the idle timeout is torn down; consuming it hands the tab to
//! the caller.
//!
//! ```text
//! Active ──touch──▶ Active
//!   │ ├──get_preloaded_tab──▶ Consumed
//!   │ └──discard_preload────▶ Discarded
//!   └────idle timeout───────▶ Expired
//! ```

mod control;
mod error;
mod preloader;
mod request;
mod session;
mod state;

#[cfg(test)]
mod testing;

pub use control::{PreloadedTabControl, SubmitOutcome};
pub use error::PreloadError;
pub use preloader::{Preloader, PreloaderHandle, DEFAULT_IDLE_TIMEOUT};
pub use request::{
    smart_url_filter, NetworkType, PreloadPolicy, PreloadRequest, PreloadRequestReceiver,
    RouteOutcome,
};
pub use state::SessionState;

pub type Result<T> = std::result::Result<T, PreloadError>;
