//! Headless Chromium sessions through chromiumoxide.

use super::{PageSession, Renderer};
use crate::error::{Error, Result};
use crate::selector::Locator;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Interval between element lookups while the DOM settles.
const SETTLE_POLL: Duration = Duration::from_millis(100);

/// Launches one headless Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    chrome_path: Option<PathBuf>,
    navigation_timeout: Duration,
    settle_timeout: Duration,
}

impl ChromiumRenderer {
    pub fn new(
        chrome_path: Option<PathBuf>,
        navigation_timeout: Duration,
        settle_timeout: Duration,
    ) -> Self {
        Self {
            chrome_path,
            navigation_timeout,
            settle_timeout,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .request_timeout(self.navigation_timeout);

        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| Error::Session(format!("invalid browser config: {}", e)))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let config = self.browser_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Session(format!("failed to launch Chromium: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::trace!("CDP handler: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let session = ChromiumSession::partial(browser, handler_task);
                if let Err(close_err) = Box::new(session).close().await {
                    log::debug!("cleaning up after failed page open: {}", close_err);
                }
                return Err(Error::Session(format!("failed to open page: {}", e)));
            }
        };

        log::debug!("Chromium session opened");
        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
            navigation_timeout: self.navigation_timeout,
            settle_timeout: self.settle_timeout,
        }))
    }
}

/// A browser process with a single page.
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    navigation_timeout: Duration,
    settle_timeout: Duration,
}

impl ChromiumSession {
    fn partial(browser: Browser, handler_task: JoinHandle<()>) -> Self {
        Self {
            browser: Some(browser),
            page: None,
            handler_task: Some(handler_task),
            navigation_timeout: Duration::ZERO,
            settle_timeout: Duration::ZERO,
        }
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::Internal("session has no open page".into()))
    }

    async fn find(page: &Page, locator: &Locator) -> chromiumoxide::error::Result<Element> {
        match locator {
            Locator::Css(q) => page.find_element(q.as_str()).await,
            Locator::XPath(q) => page.find_xpath(q.as_str()).await,
        }
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn load(&mut self, url: &str) -> Result<()> {
        let timeout = self.navigation_timeout;
        let page = self.page()?;

        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(Error::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {:?}", timeout),
            }),
        }
    }

    async fn locate_text(&mut self, locator: &Locator) -> Result<String> {
        let page = self.page()?;
        let started = Instant::now();

        // Implicit wait: give the DOM up to `settle_timeout` to produce the element.
        let element = loop {
            match Self::find(page, locator).await {
                Ok(element) => break element,
                Err(e) if started.elapsed() >= self.settle_timeout => {
                    log::debug!("{} not found: {}", locator, e);
                    return Err(Error::ElementNotFound(locator.to_string()));
                }
                Err(_) => tokio::time::sleep(SETTLE_POLL).await,
            }
        };

        let text = element
            .inner_text()
            .await
            .map_err(|_| Error::ElementNotFound(locator.to_string()))?
            .unwrap_or_default();

        Ok(text.trim().to_string())
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                log::debug!("closing page: {}", e);
            }
        }

        let mut result = Ok(());
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                result = Err(Error::Internal(format!("failed to close Chromium: {}", e)));
            }
            if let Err(e) = browser.wait().await {
                log::debug!("waiting for Chromium to exit: {}", e);
            }
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        log::debug!("Chromium session closed");
        result
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Dropping the Browser kills its child process; the handler would
        // otherwise spin until the runtime shuts down.
        if let Some(task) = self.handler_task.take() {
            log::warn!("Chromium session dropped without close");
            task.abort();
        }
    }
}
