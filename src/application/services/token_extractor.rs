//! Scrapes session tokens out of the portal's bootstrap page.

use regex::Regex;

use crate::domain::entities::{FormRef, SessionSecret};
use crate::infrastructure::config::PortalConfig;

/// Finds the form reference and CSRF token embedded in bootstrap HTML.
///
/// Each token is looked up first as a hidden `<input>`/`<meta>` element,
/// then as a `key: value` / `key=value` assignment in inline script or JSON.
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    form_ref: Vec<Regex>,
    csrf: Vec<Regex>,
}

impl TokenExtractor {
    /// Compiles patterns for the configured token keys.
    ///
    /// # Errors
    /// Returns error if a pattern cannot be compiled.
    pub fn new(config: &PortalConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            form_ref: patterns_for(&config.form_ref_key)?,
            csrf: patterns_for(&config.csrf_key)?,
        })
    }

    /// Extracts the form reference.
    #[must_use]
    pub fn form_ref(&self, html: &str) -> Option<FormRef> {
        first_capture(&self.form_ref, html).and_then(FormRef::new)
    }

    /// Extracts the CSRF token.
    #[must_use]
    pub fn csrf_token(&self, html: &str) -> Option<SessionSecret> {
        first_capture(&self.csrf, html).and_then(SessionSecret::new)
    }
}

fn patterns_for(key: &str) -> Result<Vec<Regex>, regex::Error> {
    let key = regex::escape(key);
    let element = format!(
        r#"(?i)<(?:input|meta)\b[^>]*\bname\s*=\s*["']_?{key}["'][^>]*\b(?:value|content)\s*=\s*["']([^"']+)["']"#
    );
    let assignment = format!(r#"(?i)["']?\b_?{key}["']?\s*[:=]\s*["']?([^"'\s<>&,;}}]+)"#);
    Ok(vec![Regex::new(&element)?, Regex::new(&assignment)?])
}

fn first_capture(patterns: &[Regex], html: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TokenExtractor {
        TokenExtractor::new(&PortalConfig::default()).unwrap()
    }

    #[test]
    fn test_form_ref_from_query_style() {
        let html = r#"<script>var boot = "/form/load?formref=ABC123&x=1";</script>"#;
        assert_eq!(extractor().form_ref(html).unwrap().as_str(), "ABC123");
    }

    #[test]
    fn test_form_ref_from_json() {
        let html = r#"<script>window.FORM = {"caseid": "12345", "formref" : "F-77.b"};</script>"#;
        assert_eq!(extractor().form_ref(html).unwrap().as_str(), "F-77.b");
    }

    #[test]
    fn test_form_ref_from_hidden_input() {
        let html = r#"<form><input type="hidden" name="formref" value="XYZ789"/></form>"#;
        assert_eq!(extractor().form_ref(html).unwrap().as_str(), "XYZ789");
    }

    #[test]
    fn test_form_ref_absent() {
        let html = "<html><body>Session expired</body></html>";
        assert!(extractor().form_ref(html).is_none());
    }

    #[test]
    fn test_form_ref_ignores_longer_keys() {
        let html = r#"<script>var formref_label = "Reference";</script>"#;
        assert!(extractor().form_ref(html).is_none());
    }

    #[test]
    fn test_csrf_from_meta() {
        let html = r#"<head><meta name="_csrf_token" content="tok-123-abc"></head>"#;
        assert_eq!(extractor().csrf_token(html).unwrap().expose(), "tok-123-abc");
    }

    #[test]
    fn test_csrf_from_script() {
        let html = r#"<script>var cfg = { csrf_token: 'zzz999' };</script>"#;
        assert_eq!(extractor().csrf_token(html).unwrap().expose(), "zzz999");
    }

    #[test]
    fn test_csrf_absent_is_none() {
        let html = r#"<script>formref=ABC123</script>"#;
        assert!(extractor().csrf_token(html).is_none());
    }

    #[test]
    fn test_custom_keys() {
        let config = PortalConfig {
            form_ref_key: "form.ref".to_string(),
            ..PortalConfig::default()
        };
        let extractor = TokenExtractor::new(&config).unwrap();

        assert_eq!(
            extractor.form_ref("form.ref=Q1").unwrap().as_str(),
            "Q1"
        );
        assert!(extractor.form_ref("formXref=Q1").is_none());
    }
}
