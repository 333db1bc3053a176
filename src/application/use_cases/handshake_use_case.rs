//! Session handshake: page fetch, token extraction, authorization exchange.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, warn};

use crate::application::services::TokenExtractor;
use crate::domain::entities::{CaseId, CaseReference, FormRef, SessionContext, SessionSecret};
use crate::domain::errors::ResolveError;
use crate::domain::ports::{PortalPort, PortalRequest, PortalResponse};
use crate::infrastructure::config::PortalConfig;

use super::portal_requests::{endpoint_url, with_session};

/// Session state required by the listing and download steps.
///
/// Only a successful handshake produces one, so the later steps cannot run
/// without a session.
#[derive(Debug, Clone)]
pub struct Handshake {
    /// Case being resolved.
    pub case_id: CaseId,
    /// Form reference scraped from the bootstrap page.
    pub form_ref: FormRef,
    /// Cookies, tokens and referers gathered so far. The first referer is
    /// the wrapper URL.
    pub session: SessionContext,
}

impl Handshake {
    /// The case as a reference with its form reference filled in.
    #[must_use]
    pub fn case(&self) -> CaseReference {
        let wrapper_url = self
            .session
            .referer_chain()
            .first()
            .map_or_else(|| self.session.referer().to_string(), Clone::clone);
        CaseReference::new(self.case_id.clone(), wrapper_url).with_form_ref(self.form_ref.clone())
    }
}

/// Performs the three observed bootstrap exchanges for one case.
pub struct HandshakeUseCase {
    portal: Arc<dyn PortalPort>,
    config: Arc<PortalConfig>,
    tokens: TokenExtractor,
}

impl HandshakeUseCase {
    /// Creates new use case.
    ///
    /// # Errors
    /// Returns error if the configured token keys produce invalid patterns.
    pub fn new(portal: Arc<dyn PortalPort>, config: Arc<PortalConfig>) -> Result<Self, regex::Error> {
        let tokens = TokenExtractor::new(&config)?;
        Ok(Self {
            portal,
            config,
            tokens,
        })
    }

    /// Establishes a session for `case`.
    ///
    /// # Errors
    /// Returns `PageFetch` if the wrapper page cannot be fetched and
    /// `NoFormRef` if it carries no form reference. A failed authorization
    /// exchange is logged and tolerated.
    pub async fn execute(&self, case: CaseReference) -> Result<Handshake, ResolveError> {
        let page = self.fetch_page(&case).await?;

        let page_url = if page.url.is_empty() {
            case.wrapper_url.clone()
        } else {
            page.url.clone()
        };
        let origin = origin_of(&page_url)
            .or_else(|| origin_of(&case.wrapper_url))
            .ok_or_else(|| ResolveError::page_fetch("wrapper page has no usable origin"))?;

        let mut session = SessionContext::new(origin, case.wrapper_url.as_str());
        session.push_referer(page_url);
        session.absorb_set_cookies(page.headers_all("set-cookie"));

        let html = page.text();
        let form_ref = self.tokens.form_ref(&html).ok_or_else(|| {
            warn!(case_id = %case.case_id, "Wrapper page carried no form reference");
            ResolveError::NoFormRef
        })?;
        match self.tokens.csrf_token(&html) {
            Some(token) => session.set_csrf_token(token),
            None => debug!(case_id = %case.case_id, "No CSRF token on wrapper page"),
        }

        self.authorize(&mut session).await;

        debug!(
            case_id = %case.case_id,
            form_ref = %form_ref,
            cookies = session.cookie_count(),
            csrf = session.csrf_token().is_some(),
            authorized = session.authorization().is_some(),
            "Handshake complete"
        );

        Ok(Handshake {
            case_id: case.case_id,
            form_ref,
            session,
        })
    }

    async fn fetch_page(&self, case: &CaseReference) -> Result<PortalResponse, ResolveError> {
        let request = PortalRequest::get(case.wrapper_url.as_str())
            .header("User-Agent", self.config.user_agent.as_str())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            );

        debug!(case_id = %case.case_id, "Fetching wrapper page");
        let response = self.portal.send(&request).await.map_err(|e| {
            warn!(case_id = %case.case_id, error = %e, "Wrapper page request failed");
            ResolveError::page_fetch(e.to_string())
        })?;

        if !response.is_success() {
            warn!(case_id = %case.case_id, status = response.status, "Wrapper page returned error status");
            return Err(ResolveError::page_fetch(format!("HTTP {}", response.status)));
        }
        Ok(response)
    }

    /// Best-effort citizen-session exchange. On success any credential in
    /// the response headers is attached to the session.
    async fn authorize(&self, session: &mut SessionContext) {
        let url = match endpoint_url(
            session.origin(),
            &self.config.session_path,
            &self.config.session_query,
        ) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Skipping authorization exchange");
                return;
            }
        };

        let request = with_session(PortalRequest::get(url), &self.config, session)
            .header("Accept", "application/json");

        let response = match self.portal.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Authorization exchange failed, continuing without it");
                return;
            }
        };

        session.absorb_set_cookies(response.headers_all("set-cookie"));

        if !response.is_success() {
            warn!(status = response.status, "Authorization exchange rejected, continuing without it");
            return;
        }

        match response
            .header(&self.config.authorization_header)
            .and_then(SessionSecret::new)
        {
            Some(token) => {
                debug!(token = %token, "Captured session authorization");
                session.set_authorization(token);
            }
            None => debug!("Authorization exchange returned no credential"),
        }
    }
}

fn origin_of(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::PortalError;
    use crate::domain::ports::MockPortalPort;
    use crate::domain::ports::mocks::{RecordingPortal, response};
    use mockall::Sequence;

    const WRAPPER: &str = "https://sf.form.verintcloudservices.com/form/auto/photos?caseid=12345";

    fn case() -> CaseReference {
        CaseReference::new(CaseId::new("12345").unwrap(), WRAPPER)
    }

    fn use_case(portal: Arc<dyn PortalPort>) -> HandshakeUseCase {
        HandshakeUseCase::new(portal, Arc::new(PortalConfig::default())).unwrap()
    }

    fn page(body: &str) -> PortalResponse {
        let mut page = response(200, WRAPPER, body.to_string());
        page.headers
            .push(("set-cookie".to_string(), "JSESSIONID=s1; Path=/".to_string()));
        page
    }

    #[tokio::test]
    async fn test_full_handshake() {
        let mut portal = MockPortalPort::new();
        let mut seq = Sequence::new();

        portal
            .expect_send()
            .withf(|req| req.url == WRAPPER && req.header_value("user-agent").is_some())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(page(
                    r#"<meta name="_csrf_token" content="csrf-xyz"><script>formref=ABC123</script>"#,
                ))
            });

        portal
            .expect_send()
            .withf(|req| {
                req.url.starts_with("https://sf.form.verintcloudservices.com/api/citizen")
                    && req.header_value("referer") == Some(WRAPPER)
                    && req.header_value("origin") == Some("https://sf.form.verintcloudservices.com")
                    && req.header_value("x-csrf-token") == Some("csrf-xyz")
                    && req.header_value("cookie") == Some("JSESSIONID=s1")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|req| {
                let mut resp = response(200, &req.url, "{}");
                resp.headers
                    .push(("authorization".to_string(), "Bearer session-token-1".to_string()));
                Ok(resp)
            });

        let handshake = use_case(Arc::new(portal)).execute(case()).await.unwrap();

        assert_eq!(handshake.form_ref.as_str(), "ABC123");
        let case = handshake.case();
        assert_eq!(case.case_id, handshake.case_id);
        assert_eq!(case.form_ref.as_ref(), Some(&handshake.form_ref));
        assert_eq!(case.wrapper_url, WRAPPER);
        assert_eq!(handshake.session.csrf_token().unwrap().expose(), "csrf-xyz");
        assert_eq!(
            handshake.session.authorization().unwrap().expose(),
            "Bearer session-token-1"
        );
    }

    #[tokio::test]
    async fn test_page_fetch_non_success() {
        let mut portal = MockPortalPort::new();
        portal
            .expect_send()
            .times(1)
            .returning(|req| Ok(response(503, &req.url, "down")));

        let err = use_case(Arc::new(portal)).execute(case()).await.unwrap_err();
        assert!(matches!(err, ResolveError::PageFetch { .. }));
    }

    #[tokio::test]
    async fn test_page_fetch_timeout() {
        let mut portal = MockPortalPort::new();
        portal
            .expect_send()
            .times(1)
            .returning(|_| Err(PortalError::Timeout));

        let err = use_case(Arc::new(portal)).execute(case()).await.unwrap_err();
        assert!(matches!(err, ResolveError::PageFetch { .. }));
    }

    #[tokio::test]
    async fn test_missing_form_ref_stops_before_authorization() {
        let portal = Arc::new(RecordingPortal::new(|_| {
            Ok(response(200, WRAPPER, "<html>Please sign in</html>"))
        }));

        let err = use_case(portal.clone()).execute(case()).await.unwrap_err();

        assert!(matches!(err, ResolveError::NoFormRef));
        assert_eq!(portal.calls(), 1);
    }

    #[tokio::test]
    async fn test_authorization_failure_is_tolerated() {
        let portal = Arc::new(RecordingPortal::new(|req| {
            if req.url == WRAPPER {
                Ok(page(r#"{"formref":"F1"}"#))
            } else {
                Err(PortalError::Connect("refused".to_string()))
            }
        }));

        let handshake = use_case(portal.clone()).execute(case()).await.unwrap();

        assert_eq!(portal.calls(), 2);
        assert!(handshake.session.authorization().is_none());
        assert!(handshake.session.csrf_token().is_none());
        assert_eq!(handshake.form_ref.as_str(), "F1");
    }

    #[tokio::test]
    async fn test_rejected_authorization_carries_no_credential() {
        let portal = Arc::new(RecordingPortal::new(|req| {
            if req.url == WRAPPER {
                Ok(page("formref=F2"))
            } else {
                let mut resp = response(401, &req.url, "");
                resp.headers
                    .push(("authorization".to_string(), "Bearer nope".to_string()));
                Ok(resp)
            }
        }));

        let handshake = use_case(portal).execute(case()).await.unwrap();
        assert!(handshake.session.authorization().is_none());
    }

    #[tokio::test]
    async fn test_redirected_page_sets_origin() {
        let portal = Arc::new(RecordingPortal::new(|req| {
            if req.url == WRAPPER {
                Ok(response(200, "https://other.verintcloudservices.com/form/x", "formref=R1"))
            } else {
                Ok(response(200, &req.url, "{}"))
            }
        }));

        let handshake = use_case(portal.clone()).execute(case()).await.unwrap();

        assert_eq!(
            handshake.session.origin(),
            "https://other.verintcloudservices.com"
        );
        assert_eq!(
            handshake.session.referer_chain(),
            [WRAPPER, "https://other.verintcloudservices.com/form/x"]
        );
        let requests = portal.requests();
        assert!(requests[1].url.starts_with("https://other.verintcloudservices.com/api/citizen"));
        assert_eq!(
            requests[1].header_value("referer"),
            Some("https://other.verintcloudservices.com/form/x")
        );
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("https://a.example:8443/x?y=1").as_deref(),
            Some("https://a.example:8443")
        );
        assert_eq!(origin_of("not a url"), None);
    }
}
