//! Shared WebSocket adapter state.
//!
//! The socket entry point depends on the [`RealtimeChat`] port and the
//! connection registry rather than on concrete services, so tests can swap in
//! doubles.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::RealtimeChat;
use crate::inbound::ws::registry::ConnectionRegistry;

const LOCALHOST: &str = "localhost";

/// Origins permitted to open a chat socket.
///
/// Entries compare by serialised origin (`scheme://host[:port]`). Plain HTTP
/// from `localhost` on an explicit, non-zero port is always accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins(Vec<String>);

impl AllowedOrigins {
    /// Parse each entry as a URL; entries that do not parse are skipped with
    /// a warning.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = origins
            .into_iter()
            .filter_map(|raw| {
                let raw = raw.as_ref().trim();
                if raw.is_empty() {
                    return None;
                }
                match Url::parse(raw) {
                    Ok(url) => Some(url.origin().ascii_serialization()),
                    Err(error) => {
                        tracing::warn!(origin = raw, error = %error, "ignoring allowed origin");
                        None
                    }
                }
            })
            .collect();
        Self(parsed)
    }

    /// Split a comma separated list, as supplied through configuration.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Whether the parsed Origin may connect.
    pub fn allows(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };
        if origin.scheme() == "http" && host == LOCALHOST {
            return matches!(origin.port(), Some(port) if port != 0);
        }
        let serialised = origin.origin().ascii_serialization();
        self.0.iter().any(|allowed| *allowed == serialised)
    }
}

/// Dependency bundle for the socket entry point and sessions.
#[derive(Clone)]
pub struct WsState {
    pub chat: Arc<dyn RealtimeChat>,
    pub registry: Arc<ConnectionRegistry>,
    pub allowed_origins: AllowedOrigins,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(
        chat: Arc<dyn RealtimeChat>,
        registry: Arc<ConnectionRegistry>,
        allowed_origins: AllowedOrigins,
    ) -> Self {
        Self {
            chat,
            registry,
            allowed_origins,
        }
    }
}
