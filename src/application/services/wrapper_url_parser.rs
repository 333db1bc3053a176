//! Classifies attachment URLs as protected wrapper URLs or plain links.

use reqwest::Url;

use crate::domain::entities::{CaseId, CaseReference};
use crate::infrastructure::config::PortalConfig;

/// Extracts case references from the portal's opaque wrapper URLs.
#[derive(Debug, Clone)]
pub struct WrapperUrlParser {
    host_marker: String,
    case_id_param: String,
}

impl WrapperUrlParser {
    /// Creates a parser for the configured vendor host and query parameter.
    #[must_use]
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            host_marker: config.wrapper_host_marker.to_lowercase(),
            case_id_param: config.case_id_param.clone(),
        }
    }

    /// Returns the case reference if `input` is a wrapper URL.
    ///
    /// Both conditions must hold: the host belongs to the vendor's cloud
    /// service and the case id parameter is present and non-blank.
    #[must_use]
    pub fn parse(&self, input: &str) -> Option<CaseReference> {
        let url = Url::parse(input.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let host = url.host_str()?.to_lowercase();
        if !self.is_vendor_host(&host) {
            return None;
        }

        let case_id = url
            .query_pairs()
            .find(|(key, _)| key.eq_ignore_ascii_case(&self.case_id_param))
            .and_then(|(_, value)| CaseId::new(value.into_owned()))?;

        Some(CaseReference::new(case_id, url.as_str()))
    }

    /// The marker itself or any of its subdomains.
    fn is_vendor_host(&self, host: &str) -> bool {
        host.strip_suffix(self.host_marker.as_str())
            .is_some_and(|prefix| prefix.is_empty() || prefix.ends_with('.'))
    }

    /// Returns true if `input` is a wrapper URL.
    #[must_use]
    pub fn is_wrapper(&self, input: &str) -> bool {
        self.parse(input).is_some()
    }
}

impl Default for WrapperUrlParser {
    fn default() -> Self {
        Self::new(&PortalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const WRAPPER: &str =
        "https://sanfrancisco.form.us.empro.verintcloudservices.com/form/auto/pw_photos?caseid=12345";

    #[test]
    fn test_parse_wrapper_url() {
        let parser = WrapperUrlParser::default();
        let case = parser.parse(WRAPPER).unwrap();

        assert_eq!(case.case_id.as_str(), "12345");
        assert!(case.form_ref.is_none());
        assert_eq!(case.wrapper_url, WRAPPER);
    }

    #[test_case("https://verintcloudservices.com/form?caseid=1" ; "bare_domain")]
    #[test_case("https://a.b.VERINTCLOUDSERVICES.com/form?caseid=1" ; "nested_subdomain")]
    fn test_vendor_hosts_accepted(input: &str) {
        assert!(WrapperUrlParser::default().is_wrapper(input));
    }

    #[test]
    fn test_parameter_name_is_case_insensitive() {
        let parser = WrapperUrlParser::default();
        let url = "https://x.verintcloudservices.com/form?CaseId=987&other=1";

        assert_eq!(parser.parse(url).unwrap().case_id.as_str(), "987");
    }

    #[test_case("https://cdn.example.com/photo.jpg" ; "plain_image")]
    #[test_case("https://example.com/form?caseid=12345" ; "wrong_host")]
    #[test_case("https://x.verintcloudservices.com/form?ref=1" ; "missing_case_id")]
    #[test_case("https://x.verintcloudservices.com/form?caseid=" ; "blank_case_id")]
    #[test_case("ftp://x.verintcloudservices.com/form?caseid=1" ; "wrong_scheme")]
    #[test_case("https://verintcloudservices.com.evil.example/x?caseid=1" ; "marker_as_subdomain")]
    #[test_case("https://notverintcloudservices.com/x?caseid=1" ; "marker_as_suffix_of_label")]
    #[test_case("not a url" ; "garbage")]
    #[test_case("" ; "empty")]
    fn test_not_a_wrapper(input: &str) {
        let parser = WrapperUrlParser::default();
        assert!(parser.parse(input).is_none());
        assert!(!parser.is_wrapper(input));
    }
}
