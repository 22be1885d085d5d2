use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Login credentials, supplied per request and never persisted here.
/// Empty strings are passed through to the legacy server unmodified;
/// validating them is its responsibility, not ours.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Normalized session record handed to the browser client after a
/// successful login. The browser persists it and mirrors `sessionId` /
/// `csrfToken` as cookies on subsequent proxied calls, so the camelCase
/// field names are a downstream contract and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub session_id: String,
    pub csrf_token: String,
    pub employee_id: String,
    pub menu_payload: Value,
    pub roles: Vec<String>,
}

/// Permissive view of the legacy "session info" response. The legacy
/// server's key casing differs between deployments, hence the aliases.
/// Every field is optional; the descriptor falls back per field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfoPayload {
    #[serde(alias = "USER_NM", alias = "userNm", alias = "userName", alias = "name")]
    pub user_name: Option<String>,
    #[serde(alias = "EMAIL", alias = "userEmail")]
    pub email: Option<String>,
    #[serde(alias = "EMP_NO", alias = "empNo", alias = "employeeId")]
    pub employee_id: Option<String>,
    #[serde(alias = "MENU_LIST", alias = "menuList", alias = "menu")]
    pub menu: Option<Value>,
    #[serde(alias = "AUTH_LIST", alias = "roleList")]
    pub roles: Option<Vec<String>>,
}

impl SessionDescriptor {
    /// Merge the mandatory authentication outputs with the best-effort
    /// profile fields. `user_id` is always the login username; everything
    /// the info payload lacks gets a deterministic fallback.
    pub fn assemble(
        username: &str,
        session_id: String,
        csrf_token: String,
        info: Option<UserInfoPayload>,
        email_domain: &str,
    ) -> Self {
        let info = info.unwrap_or_default();
        Self {
            user_id: username.to_string(),
            display_name: info.user_name.unwrap_or_else(|| username.to_string()),
            email: info
                .email
                .unwrap_or_else(|| format!("{}@{}", username, email_domain)),
            employee_id: info.employee_id.unwrap_or_else(|| username.to_string()),
            menu_payload: info.menu.unwrap_or_else(|| Value::Array(Vec::new())),
            roles: info.roles.unwrap_or_else(|| vec!["user".to_string()]),
            session_id,
            csrf_token,
        }
    }
}
