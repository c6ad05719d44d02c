//! Page-rendering abstraction.
//!
//! A [`Renderer`] starts sessions; a [`PageSession`] is one headless page that
//! can be navigated and queried. The production engine is Chromium
//! (see [`chromium`]); tests drive scripted fakes through the same traits.

pub mod chromium;

use crate::error::Result;
use crate::selector::Locator;
use async_trait::async_trait;

pub use chromium::{ChromiumRenderer, ChromiumSession};

/// Starts rendering sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Acquire one session. Fails with [`Error::Session`](crate::Error::Session)
    /// when the engine cannot be started.
    async fn open(&self) -> Result<Box<dyn PageSession>>;
}

/// One live page in a rendering engine.
#[async_trait]
pub trait PageSession: Send {
    /// Navigate to `url`. Transport-level failures surface as
    /// [`Error::Navigation`](crate::Error::Navigation).
    async fn load(&mut self, url: &str) -> Result<()>;

    /// Text of the element at `locator` in the current DOM, or
    /// [`Error::ElementNotFound`](crate::Error::ElementNotFound).
    async fn locate_text(&mut self, locator: &Locator) -> Result<String>;

    /// Release the session and everything it holds.
    async fn close(self: Box<Self>) -> Result<()>;
}
