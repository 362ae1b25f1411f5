use std::env;

#[cfg(feature = "web")]
use anyhow::Context;
use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
pub struct Config {
    pub db_path: String,
    /// Secret for HMAC session token signing (VERBATIM_SESSION_SECRET env var)
    #[cfg(feature = "web")]
    pub session_secret: String,
    /// Address the web server binds to (VERBATIM_BIND, default 127.0.0.1)
    #[cfg(feature = "web")]
    pub bind: String,
    /// Port the web server listens on (VERBATIM_PORT, default 8080)
    #[cfg(feature = "web")]
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the session secret, which is only
    /// checked when the server starts.
    pub fn load() -> Result<Self> {
        #[cfg(feature = "web")]
        let port = match env::var("VERBATIM_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("VERBATIM_PORT is not a valid port: {raw}"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            db_path: env::var("VERBATIM_DB_PATH").unwrap_or_else(|_| "./verbatim.db".to_string()),
            #[cfg(feature = "web")]
            session_secret: env::var("VERBATIM_SESSION_SECRET").unwrap_or_default(),
            #[cfg(feature = "web")]
            bind: env::var("VERBATIM_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
            #[cfg(feature = "web")]
            port,
        })
    }

    /// Check that a session secret is configured.
    /// Call this before starting the web server.
    #[cfg(feature = "web")]
    pub fn require_session_secret(&self) -> Result<()> {
        if self.session_secret.is_empty() {
            anyhow::bail!(
                "VERBATIM_SESSION_SECRET not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}
