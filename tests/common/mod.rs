use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use visitor_tracker::{Error, Locator, PageSession, Renderer, Result};

/// How a scripted page behaves once loaded.
#[derive(Debug, Clone)]
pub enum Page {
    /// Shows the sentinel until `after`, then `value`.
    Ready { after: Duration, value: &'static str },
    /// Sentinel forever.
    Stuck,
    /// The element is never in the DOM.
    Missing,
    /// Navigation fails.
    Unreachable,
}

#[derive(Default)]
pub struct Calls {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub loads: Mutex<Vec<String>>,
}

/// Renderer whose pages follow a fixed script keyed by URL.
pub struct ScriptedRenderer {
    pages: HashMap<String, Page>,
    fail_open: bool,
    pub calls: Arc<Calls>,
}

impl ScriptedRenderer {
    pub fn new(pages: &[(&str, Page)]) -> Self {
        Self {
            pages: pages.iter().map(|(u, p)| (u.to_string(), p.clone())).collect(),
            fail_open: false,
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Self::new(&[])
        }
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        self.calls.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(Error::Session("rendering engine not installed".into()));
        }
        Ok(Box::new(ScriptedSession {
            pages: self.pages.clone(),
            current: None,
            calls: self.calls.clone(),
        }))
    }
}

struct ScriptedSession {
    pages: HashMap<String, Page>,
    current: Option<(Page, Instant)>,
    calls: Arc<Calls>,
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn load(&mut self, url: &str) -> Result<()> {
        self.calls.loads.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(Page::Unreachable) | None => {
                self.current = None;
                Err(Error::Navigation {
                    url: url.to_string(),
                    reason: "net::ERR_NAME_NOT_RESOLVED".into(),
                })
            }
            Some(page) => {
                self.current = Some((page.clone(), Instant::now()));
                Ok(())
            }
        }
    }

    async fn locate_text(&mut self, locator: &Locator) -> Result<String> {
        match &self.current {
            Some((Page::Ready { after, value }, loaded)) if loaded.elapsed() >= *after => {
                Ok(value.to_string())
            }
            Some((Page::Ready { .. }, _)) | Some((Page::Stuck, _)) => Ok("LOADING...".into()),
            _ => Err(Error::ElementNotFound(locator.to_string())),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
