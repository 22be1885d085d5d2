// handlers/mod.rs - Inbound HTTP surface for the bridge
//
// Two endpoints back the browser client: login (drives the bridge) and
// proxy (replays the stored session against the legacy server).

pub mod login; // POST /auth/api/login - authenticate against the legacy server
pub mod proxy; // ANY  /auth/api/proxy - replay session cookies on legacy API calls

pub use login::login_post;
pub use proxy::proxy;
