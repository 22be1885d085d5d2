use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub legacy: LegacyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// Connection parameters for the legacy HTNS application server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyConfig {
    pub base_url: String,
    pub login_page_path: String,
    pub auth_path: String,
    /// Domain used when the session-info call yields no email address.
    pub email_domain: String,
    /// Timeout applied to each outbound call to the legacy server.
    pub request_timeout_secs: u64,
    /// Deadline for the whole login pipeline (up to five sequential calls).
    pub overall_deadline_secs: u64,
}

impl LegacyConfig {
    /// Resolve a path against the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        match Url::parse(&self.base_url).and_then(|base| base.join(path)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base_url.trim_end_matches('/'), path),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("BRIDGE_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Legacy server overrides
        if let Ok(v) = env::var("LEGACY_BASE_URL") {
            self.legacy.base_url = v;
        }
        if let Ok(v) = env::var("LEGACY_LOGIN_PAGE_PATH") {
            self.legacy.login_page_path = v;
        }
        if let Ok(v) = env::var("LEGACY_AUTH_PATH") {
            self.legacy.auth_path = v;
        }
        if let Ok(v) = env::var("LEGACY_EMAIL_DOMAIN") {
            self.legacy.email_domain = v;
        }
        if let Ok(v) = env::var("LEGACY_REQUEST_TIMEOUT_SECS") {
            self.legacy.request_timeout_secs = v.parse().unwrap_or(self.legacy.request_timeout_secs);
        }
        if let Ok(v) = env::var("LEGACY_OVERALL_DEADLINE_SECS") {
            self.legacy.overall_deadline_secs = v.parse().unwrap_or(self.legacy.overall_deadline_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            legacy: LegacyConfig {
                base_url: "http://localhost:8080".to_string(),
                login_page_path: "/login.jsp".to_string(),
                auth_path: "/htns_sec".to_string(),
                email_domain: "htns.com".to_string(),
                request_timeout_secs: 10,
                overall_deadline_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            legacy: LegacyConfig {
                base_url: "http://localhost:8080".to_string(),
                login_page_path: "/login.jsp".to_string(),
                auth_path: "/htns_sec".to_string(),
                email_domain: "htns.com".to_string(),
                request_timeout_secs: 10,
                overall_deadline_secs: 30,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            legacy: LegacyConfig {
                base_url: "http://localhost:8080".to_string(),
                login_page_path: "/login.jsp".to_string(),
                auth_path: "/htns_sec".to_string(),
                email_domain: "htns.com".to_string(),
                request_timeout_secs: 10,
                overall_deadline_secs: 30,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
