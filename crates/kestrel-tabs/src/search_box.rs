//! Page-level query submission protocol

use tokio::sync::oneshot;

/// Query-submission interface a loaded page may implement.
///
/// Questions to the page are answered asynchronously over oneshot channels.
/// If the page goes away before answering, the engine drops the sender and
/// the receiver resolves to an error.
pub trait SearchBox: Send + Sync {
    /// Ask whether the page supports the protocol at all
    fn is_supported(&self) -> oneshot::Receiver<bool>;

    fn set_query(&self, query: &str);

    fn set_verbatim(&self, verbatim: bool);

    /// Submit the current query; resolves to whether the page handled it
    fn submit(&self) -> oneshot::Receiver<bool>;

    fn cancel(&self);
}
