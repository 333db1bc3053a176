//! Attempt-scoped portal session state.

use std::collections::BTreeMap;
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Short-lived credential issued by the portal, masked in all output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionSecret {
    value: String,
}

impl SessionSecret {
    /// Wraps a credential, rejecting blank values.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return None;
        }
        Some(Self { value })
    }

    /// Returns the raw credential for use in a request header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Returns masked credential for display.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.value.chars().collect();
        if chars.len() <= 10 {
            return "*".repeat(chars.len());
        }

        let visible_prefix: String = chars[..4].iter().collect();
        let visible_suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{visible_prefix}...{visible_suffix}")
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSecret")
            .field("value", &self.masked())
            .finish()
    }
}

impl fmt::Display for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// Session established by the handshake and consumed by listing/download.
///
/// Owned by exactly one resolution attempt and dropped with it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    origin: String,
    referer_chain: Vec<String>,
    cookies: BTreeMap<String, SessionSecret>,
    csrf_token: Option<SessionSecret>,
    authorization: Option<SessionSecret>,
}

impl SessionContext {
    /// Starts a session rooted at the fetched page.
    #[must_use]
    pub fn new(origin: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            referer_chain: vec![page_url.into()],
            cookies: BTreeMap::new(),
            csrf_token: None,
            authorization: None,
        }
    }

    /// Origin (`scheme://host[:port]`) of the bootstrap page.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Most recent page visited, sent as `Referer`.
    #[must_use]
    pub fn referer(&self) -> &str {
        self.referer_chain
            .last()
            .map_or(self.origin.as_str(), String::as_str)
    }

    /// Every page visited, oldest first.
    #[must_use]
    pub fn referer_chain(&self) -> &[String] {
        &self.referer_chain
    }

    /// Records a page visit.
    pub fn push_referer(&mut self, url: impl Into<String>) {
        let url = url.into();
        if self.referer_chain.last() != Some(&url) {
            self.referer_chain.push(url);
        }
    }

    /// CSRF token scraped from the bootstrap page, if any.
    #[must_use]
    pub const fn csrf_token(&self) -> Option<&SessionSecret> {
        self.csrf_token.as_ref()
    }

    /// Sets the CSRF token.
    pub fn set_csrf_token(&mut self, token: SessionSecret) {
        self.csrf_token = Some(token);
    }

    /// Authorization credential from the citizen-session exchange, if any.
    #[must_use]
    pub const fn authorization(&self) -> Option<&SessionSecret> {
        self.authorization.as_ref()
    }

    /// Sets the authorization credential.
    pub fn set_authorization(&mut self, token: SessionSecret) {
        self.authorization = Some(token);
    }

    /// Stores cookies from `Set-Cookie` header values. Later values win.
    pub fn absorb_set_cookies<'a>(&mut self, values: impl IntoIterator<Item = &'a str>) {
        for raw in values {
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            match SessionSecret::new(value) {
                Some(secret) => {
                    self.cookies.insert(name.to_string(), secret);
                }
                None => {
                    self.cookies.remove(name);
                }
            }
        }
    }

    /// Number of cookies held.
    #[must_use]
    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }

    /// Value for a `Cookie` request header, or `None` with no cookies.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let header = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={}", value.expose()))
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }
}
