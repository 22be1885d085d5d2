// Legacy-session bridge: turns (username, password) into a normalized
// SessionDescriptor by driving the legacy HTNS server's form-based,
// CSRF-protected login over four strictly sequential steps:
//
//   1. GET the login page, scrape the pre-auth CSRF token   (hard failure)
//   2. POST credentials, expect a 302 carrying JSESSIONID   (hard failure)
//   3. Re-fetch the CSRF token under the new session        (best effort)
//   4. Fetch user/session info from candidate endpoints     (best effort)
//
// Redirect following is disabled throughout: the 302 itself is the
// success signal in step 2, and steps 1/3 need to inspect the login page
// response rather than whatever it would redirect to.

pub mod enrich;
pub mod extract;

use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{redirect, Client, StatusCode};

use crate::config::LegacyConfig;
use crate::error::LoginFailure;
use crate::types::{Credentials, SessionDescriptor};
use enrich::Enrichment;

/// Run the full login pipeline under the configured overall deadline.
///
/// Every invocation is fully independent: a fresh client, no shared
/// token or session cache. Concurrent logins never observe each other.
pub async fn login(
    legacy: &LegacyConfig,
    credentials: &Credentials,
) -> Result<SessionDescriptor, LoginFailure> {
    let deadline = Duration::from_secs(legacy.overall_deadline_secs);
    match tokio::time::timeout(deadline, authenticate(legacy, credentials)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(user = %credentials.username, "login pipeline exceeded overall deadline");
            Err(LoginFailure::Timeout)
        }
    }
}

async fn authenticate(
    legacy: &LegacyConfig,
    credentials: &Credentials,
) -> Result<SessionDescriptor, LoginFailure> {
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .timeout(Duration::from_secs(legacy.request_timeout_secs))
        .build()
        .map_err(|err| LoginFailure::Internal(err.to_string()))?;

    // Step 1: acquire the pre-auth CSRF token and initial cookies.
    let login_url = legacy.endpoint(&legacy.login_page_path);
    let response = client.get(&login_url).send().await?;
    let initial_cookies = extract::cookie_pairs(response.headers());
    let page = response.text().await?;
    let initial_csrf = extract::csrf_from_html(&page).ok_or(LoginFailure::CsrfTokenMissing)?;
    tracing::debug!(user = %credentials.username, "acquired pre-auth CSRF token");

    // Step 2: submit credentials. Success is exactly HTTP 302.
    let form = [
        ("_spring_security_remember_me", "on"),
        ("_csrf", initial_csrf.as_str()),
        ("USER_ID", credentials.username.as_str()),
        ("PW", credentials.password.as_str()),
    ];
    let mut request = client.post(legacy.endpoint(&legacy.auth_path)).form(&form);
    if !initial_cookies.is_empty() {
        request = request.header(COOKIE, initial_cookies.join("; "));
    }
    let response = request.send().await?;
    let status = response.status();
    if status != StatusCode::FOUND {
        tracing::info!(user = %credentials.username, %status, "legacy server did not redirect, treating as rejected credentials");
        return Err(LoginFailure::InvalidCredentials { status: status.as_u16() });
    }
    let session_id = extract::set_cookie_value(response.headers(), "JSESSIONID")
        .ok_or_else(|| LoginFailure::Internal("redirect carried no JSESSIONID cookie".to_string()))?;
    tracing::debug!(user = %credentials.username, "credentials accepted, session established");

    // Step 3: refresh the CSRF token under the new session. The legacy
    // server binds tokens to session state, but its delivery mechanism is
    // inconsistent across deployments, so fall back header -> HTML body ->
    // pre-auth token rather than failing the login here.
    let csrf_token = refresh_csrf_token(&client, &login_url, &session_id)
        .await
        .unwrap_or_else(|| {
            tracing::warn!(user = %credentials.username, "post-auth CSRF refresh yielded nothing, reusing pre-auth token");
            initial_csrf
        });

    // Step 4: best-effort profile enrichment.
    let info = match enrich::fetch_user_info(&client, legacy, &session_id, &csrf_token).await {
        Enrichment::Found(info) => Some(info),
        Enrichment::NotFound => {
            tracing::warn!(user = %credentials.username, "session info unavailable, descriptor uses fallback profile fields");
            None
        }
    };

    Ok(SessionDescriptor::assemble(
        &credentials.username,
        session_id,
        csrf_token,
        info,
        &legacy.email_domain,
    ))
}

/// Fetch the login page under the new session and try to read a fresh
/// CSRF token from its `Set-Cookie` headers, then from the HTML body.
/// Returns None when neither source yields a token.
async fn refresh_csrf_token(client: &Client, login_url: &str, session_id: &str) -> Option<String> {
    let response = match client
        .get(login_url)
        .header(COOKIE, format!("JSESSIONID={}", session_id))
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "post-auth login page fetch failed");
            return None;
        }
    };

    if let Some(token) = extract::set_cookie_value(response.headers(), enrich::CSRF_HEADER) {
        return Some(token);
    }

    match response.text().await {
        Ok(page) => extract::csrf_from_html(&page),
        Err(err) => {
            tracing::warn!(error = %err, "post-auth login page unreadable");
            None
        }
    }
}
