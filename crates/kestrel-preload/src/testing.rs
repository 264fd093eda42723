//! In-memory tabs for tests

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

use kestrel_tabs::{BrowserTab, Headers, SearchBox, TabError, TabFactory};

#[derive(Debug, Default)]
pub struct TabLog {
    pub loads: Vec<String>,
    pub history_cleared: bool,
    pub destroyed: bool,
}

/// How the fake page answers search-box questions
#[derive(Debug, Clone, Copy)]
pub enum PageBehavior {
    /// The page never answers (it went away)
    Gone,
    Answers { supported: bool, handles_submit: bool },
}

#[derive(Debug, Default)]
pub struct SearchBoxLog {
    pub query: Option<String>,
    pub verbatim: bool,
    pub submitted: bool,
    pub cancelled: bool,
}

pub struct FakeSearchBox {
    behavior: PageBehavior,
    pub log: Mutex<SearchBoxLog>,
}

impl FakeSearchBox {
    pub fn new(behavior: PageBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            log: Mutex::new(SearchBoxLog::default()),
        })
    }

    fn answer(&self, value: impl FnOnce(bool, bool) -> bool) -> oneshot::Receiver<bool> {
        let (tx, rx) = oneshot::channel();
        match self.behavior {
            PageBehavior::Gone => drop(tx),
            PageBehavior::Answers {
                supported,
                handles_submit,
            } => {
                let _ = tx.send(value(supported, handles_submit));
            }
        }
        rx
    }
}

impl SearchBox for FakeSearchBox {
    fn is_supported(&self) -> oneshot::Receiver<bool> {
        self.answer(|supported, _| supported)
    }

    fn set_query(&self, query: &str) {
        self.log.lock().query = Some(query.to_string());
    }

    fn set_verbatim(&self, verbatim: bool) {
        self.log.lock().verbatim = verbatim;
    }

    fn submit(&self) -> oneshot::Receiver<bool> {
        self.log.lock().submitted = true;
        self.answer(|_, handles_submit| handles_submit)
    }

    fn cancel(&self) {
        self.log.lock().cancelled = true;
    }
}

pub struct FakeTab {
    pub log: Arc<Mutex<TabLog>>,
    search_box: Option<Arc<FakeSearchBox>>,
}

impl FakeTab {
    pub fn new(search_box: Option<Arc<FakeSearchBox>>) -> Self {
        Self {
            log: Arc::new(Mutex::new(TabLog::default())),
            search_box,
        }
    }
}

impl BrowserTab for FakeTab {
    fn load_url(&mut self, url: &str, _headers: &Headers) {
        self.log.lock().loads.push(url.to_string());
    }

    fn url(&self) -> Option<String> {
        self.log.lock().loads.last().cloned()
    }

    fn search_box(&self) -> Option<Arc<dyn SearchBox>> {
        self.search_box
            .clone()
            .map(|sb| sb as Arc<dyn SearchBox>)
    }

    fn clear_history(&mut self) {
        self.log.lock().history_cleared = true;
    }

    fn destroy(&mut self) {
        self.log.lock().destroyed = true;
    }
}

#[derive(Clone, Default)]
pub struct FakeFactory {
    pub created: Arc<AtomicUsize>,
    pub tabs: Arc<Mutex<Vec<Arc<Mutex<TabLog>>>>>,
    pub search_box: Option<Arc<FakeSearchBox>>,
    pub fail: bool,
}

impl FakeFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn tab_log(&self, index: usize) -> Arc<Mutex<TabLog>> {
        self.tabs.lock()[index].clone()
    }
}

impl TabFactory for FakeFactory {
    type Tab = FakeTab;

    fn create_tab(&self) -> kestrel_tabs::Result<FakeTab> {
        if self.fail {
            return Err(TabError::CreationFailed("engine unavailable".to_string()));
        }

        self.created.fetch_add(1, Ordering::SeqCst);
        let tab = FakeTab::new(self.search_box.clone());
        self.tabs.lock().push(tab.log.clone());
        Ok(tab)
    }
}
