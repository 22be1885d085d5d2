// Best-effort user/session info fetch (step 4 of the login pipeline).
//
// The legacy server has grown three generations of "who am I" endpoints
// and different deployments answer on different ones, so candidates are
// tried in order and the first OK, non-HTML response wins. Nothing in
// here can fail the login; every dead end degrades to NotFound.

use reqwest::header::COOKIE;
use reqwest::{Client, Method};

use super::extract;
use crate::config::LegacyConfig;
use crate::types::UserInfoPayload;

pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// One candidate session-info endpoint.
pub struct Candidate {
    pub method: Method,
    pub path: &'static str,
}

/// Ordered candidates, newest API first. Exactly three; no backoff.
pub fn candidates() -> [Candidate; 3] {
    [
        Candidate { method: Method::POST, path: "/api/G1E000000SVC/getInit" },
        Candidate { method: Method::POST, path: "/api/G1E000000SVC/getInitNewPortal" },
        Candidate { method: Method::GET, path: "/api/user/session" },
    ]
}

#[derive(Debug)]
pub enum Enrichment {
    Found(UserInfoPayload),
    NotFound,
}

pub async fn fetch_user_info(
    client: &Client,
    legacy: &LegacyConfig,
    session_id: &str,
    csrf_token: &str,
) -> Enrichment {
    let cookie = format!("JSESSIONID={}; {}={}", session_id, CSRF_HEADER, csrf_token);

    for candidate in candidates() {
        let url = legacy.endpoint(candidate.path);
        let response = match client
            .request(candidate.method.clone(), &url)
            .header(COOKIE, &cookie)
            .header(CSRF_HEADER, csrf_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%url, error = %err, "session info candidate unreachable, trying next");
                continue;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(%url, status = %response.status(), "session info candidate rejected, trying next");
            continue;
        }
        if extract::is_html_content_type(response.headers()) {
            // Silent redirect to a login/error page; not data.
            tracing::warn!(%url, "session info candidate returned an HTML page, trying next");
            continue;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%url, error = %err, "session info body unreadable, continuing without profile");
                return Enrichment::NotFound;
            }
        };
        return parse_user_info(&body);
    }

    Enrichment::NotFound
}

/// Parse the accepted candidate's body. A `<script>` marker means an HTML
/// error page slipped past the content-type check; parse failures are
/// swallowed because enrichment is advisory.
pub fn parse_user_info(body: &str) -> Enrichment {
    if body.trim().is_empty() || body.contains("<script>") {
        return Enrichment::NotFound;
    }
    match serde_json::from_str::<UserInfoPayload>(body) {
        Ok(info) => Enrichment::Found(info),
        Err(err) => {
            tracing::warn!(error = %err, "session info payload not parseable, continuing without profile");
            Enrichment::NotFound
        }
    }
}
