//! Request construction shared by the handshake, listing and download steps.

use reqwest::Url;

use crate::domain::entities::{SessionContext, SessionSecret};
use crate::domain::ports::PortalRequest;
use crate::infrastructure::config::PortalConfig;
use crate::infrastructure::portal::dto::{CustomActionBody, CustomActionData};

use super::handshake_use_case::Handshake;

/// Adds browser identity and every piece of session state to a request.
pub(super) fn with_session(
    request: PortalRequest,
    config: &PortalConfig,
    session: &SessionContext,
) -> PortalRequest {
    request
        .header("User-Agent", config.user_agent.as_str())
        .header("Referer", session.referer())
        .header("Origin", session.origin())
        .header_opt("Cookie", session.cookie_header())
        .header_opt(
            config.csrf_header.as_str(),
            session.csrf_token().map(SessionSecret::expose),
        )
        .header_opt(
            "Authorization",
            session.authorization().map(SessionSecret::expose),
        )
}

/// Builds `<origin><path>?<query>`.
pub(super) fn endpoint_url(
    origin: &str,
    path: &str,
    query: &[(String, String)],
) -> Result<String, String> {
    let mut url = Url::parse(origin)
        .and_then(|base| base.join(path))
        .map_err(|e| format!("invalid endpoint url: {e}"))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.into())
}

/// Builds the POST for a named custom action.
pub(super) fn custom_action(
    config: &PortalConfig,
    handshake: &Handshake,
    action: &str,
    filename: Option<&str>,
) -> Result<PortalRequest, String> {
    let mut query = Vec::with_capacity(config.action_query.len() + 1);
    query.push(("action".to_string(), action.to_string()));
    query.extend(config.action_query.iter().cloned());

    let url = endpoint_url(
        handshake.session.origin(),
        &config.custom_action_path,
        &query,
    )?;

    let body = CustomActionBody::new(
        &config.request_name,
        CustomActionData {
            caseid: handshake.case_id.as_str(),
            formref: handshake.form_ref.as_str(),
            filename,
        },
    );
    let body = serde_json::to_value(&body).map_err(|e| format!("invalid body: {e}"))?;

    let request = PortalRequest::post_json(url, body)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json");
    Ok(with_session(request, config, &handshake.session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let url = endpoint_url(
            "https://portal.example",
            "/api/custom",
            &[
                ("action".to_string(), "list".to_string()),
                ("actionedby".to_string(), String::new()),
            ],
        )
        .unwrap();

        assert_eq!(url, "https://portal.example/api/custom?action=list&actionedby=");
    }

    #[test]
    fn test_endpoint_url_without_query() {
        let url = endpoint_url("https://portal.example", "/api/citizen", &[]).unwrap();
        assert_eq!(url, "https://portal.example/api/citizen");
    }

    #[test]
    fn test_endpoint_url_rejects_opaque_origin() {
        assert!(endpoint_url("null", "/api/custom", &[]).is_err());
    }

    #[test]
    fn test_with_session_headers() {
        let config = PortalConfig::default();
        let mut session = SessionContext::new("https://p.example", "https://p.example/form?caseid=1");
        session.absorb_set_cookies(["sid=abc"]);
        session.set_csrf_token(SessionSecret::new("csrf-1").unwrap());

        let request = with_session(PortalRequest::get("https://p.example/api"), &config, &session);

        assert_eq!(request.header_value("referer"), Some("https://p.example/form?caseid=1"));
        assert_eq!(request.header_value("origin"), Some("https://p.example"));
        assert_eq!(request.header_value("cookie"), Some("sid=abc"));
        assert_eq!(request.header_value("x-csrf-token"), Some("csrf-1"));
        assert!(request.header_value("authorization").is_none());
        assert!(request.header_value("user-agent").unwrap().starts_with("Mozilla/5.0"));
    }
}
