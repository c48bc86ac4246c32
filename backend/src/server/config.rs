//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use chatmap::outbound::persistence::DbPool;
use chatmap::settings::AppSettings;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) settings: AppSettings,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from validated session values and
    /// the loaded application settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, settings: AppSettings) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr: settings.bind_addr(),
            settings,
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the account, room and message ports use the Diesel
    /// adapters; otherwise the process-local stores back them.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
