use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where on the rendered page the metric text lives.
///
/// Parsed from a prefixed query string: `css:` or `xpath:`. A bare query
/// without a prefix is treated as CSS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locator {
    /// Matches with a CSS selector (e.g. ".nav-item-visitors > span")
    Css(String),

    /// Matches with an XPath expression (e.g. "//div[@class='x']/span")
    XPath(String),
}

impl Locator {
    pub fn css(query: impl Into<String>) -> Self {
        Locator::Css(query.into())
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Locator::XPath(query.into())
    }

    /// The raw query without its prefix.
    pub fn query(&self) -> &str {
        match self {
            Locator::Css(q) | Locator::XPath(q) => q,
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Locator::xpath(r#"//div[@class="nav-item-visitors"]/span"#)
    }
}

impl FromStr for Locator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (locator, query) = match s.split_once(':') {
            Some(("css", q)) => (Locator::Css(q.trim().to_string()), q),
            Some(("xpath", q)) => (Locator::XPath(q.trim().to_string()), q),
            _ => (Locator::Css(s.trim().to_string()), s),
        };

        if query.trim().is_empty() {
            return Err(format!("empty locator query: {:?}", s));
        }
        Ok(locator)
    }
}

impl TryFrom<String> for Locator {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.to_string()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(q) => write!(f, "css:{}", q),
            Locator::XPath(q) => write!(f, "xpath:{}", q),
        }
    }
}
