use crate::auth::jwt::JwtConfig;

/// Credentials for the first admin account, created at startup when the
/// `users` table is empty.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Mark the `access_token` cookie `Secure` (default: `false`).
    pub cookie_secure: bool,
    /// Optional first-admin credentials.
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `COOKIE_SECURE`              | `false`                    |
    /// | `BOOTSTRAP_ADMIN_USERNAME`   | unset                      |
    /// | `BOOTSTRAP_ADMIN_EMAIL`      | unset                      |
    /// | `BOOTSTRAP_ADMIN_PASSWORD`   | unset                      |
    ///
    /// The bootstrap admin is configured only when all three variables are set.
    /// See [`JwtConfig::from_env`] for the JWT variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cookie_secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("COOKIE_SECURE must be true or false");

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_USERNAME"),
            std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(BootstrapAdmin {
                username,
                email,
                password,
            }),
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            cookie_secure,
            bootstrap_admin,
            jwt,
        }
    }
}
