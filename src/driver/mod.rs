//! Abstract UI-driving capability.
//!
//! The navigator is written against this trait, not against any concrete
//! automation backend. The production implementation speaks the W3C WebDriver
//! wire protocol ([`webdriver::WebDriverClient`]); tests substitute a scripted
//! in-memory fake.

pub mod json;
pub mod webdriver;

pub use webdriver::WebDriverClient;

use async_trait::async_trait;
use std::fmt;

/// A selector string plus the strategy the backend should resolve it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: Strategy,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Css,
    XPath,
}

impl Locator {
    pub fn css(value: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::Css,
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self {
            strategy: Strategy::XPath,
            value: value.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match self.strategy {
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
        };
        write!(f, "{strategy}:{}", self.value)
    }
}

/// Opaque reference to a live element. Invalidated whenever the page
/// re-renders the node it points at; using a dead handle yields
/// [`DriverError::StaleElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle(pub String);

/// Errors surfaced by the UI-driving backend.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("no element matches '{0}'")]
    NoSuchElement(String),
    #[error("element reference is stale: {0}")]
    StaleElement(String),
    #[error("driver operation timed out: {0}")]
    Timeout(String),
    #[error("webdriver protocol error '{error}': {message}")]
    Protocol { error: String, message: String },
    #[error("webdriver transport failure")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode webdriver response")]
    Decode(#[source] anyhow::Error),
}

/// The minimal element-driving surface the portal navigation needs.
///
/// All operations act on the single logical session the implementation owns.
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Navigate the session to a URL.
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// Switch the browsing context into the frame matched by `locator`.
    async fn enter_frame(&self, locator: &Locator) -> Result<(), DriverError>;

    /// Resolve a single element, erroring if nothing matches right now.
    async fn find_one(&self, locator: &Locator) -> Result<ElementHandle, DriverError>;

    /// Resolve all matching elements in document order (possibly empty).
    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError>;

    /// Resolve a single element scoped under `parent`.
    async fn find_one_in(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<ElementHandle, DriverError>;

    /// Resolve all matching elements scoped under `parent`.
    async fn find_all_in(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> Result<Vec<ElementHandle>, DriverError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Rendered text of the element.
    async fn read_text(&self, element: &ElementHandle) -> Result<String, DriverError>;

    /// A DOM property value (e.g. `textContent`), empty string when unset.
    async fn read_property(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<String, DriverError>;

    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<(), DriverError>;
}
