//! Application settings loaded via OrthoConfig.
//!
//! Values layer defaults, config files, `CHATMAP_*` environment variables and
//! command-line flags. Accessors apply defaults for optional values so the
//! rest of the crate never sees an unset field.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{ChatHubSettings, InviterSettings};
use crate::inbound::http::session_config::SessionToggles;
use crate::inbound::ws::state::AllowedOrigins;

const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_COUNTRY: &str = "JP";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_FROM_NAME: &str = "Chatmap";
const DEFAULT_SAME_SITE: &str = "lax";

/// Process configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHATMAP")]
pub struct AppSettings {
    /// Listen address. Defaults to `0.0.0.0`.
    pub host: Option<IpAddr>,
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// PostgreSQL URL. Unset selects the in-memory stores.
    pub database_url: Option<String>,
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Nominatim-compatible search endpoint.
    pub geocoder_endpoint: Option<String>,
    /// ISO country code scoping postal code lookups.
    pub geocoder_country: Option<String>,
    pub geocoder_user_agent: Option<String>,
    #[ortho_config(default = 5)]
    pub geocoder_timeout_secs: u64,
    /// Invitation relay. Unset logs invitations instead.
    pub notifier_webhook_url: Option<String>,
    #[ortho_config(default = 5)]
    pub notifier_timeout_secs: u64,
    /// Base for invitation links, `{base}/chat/{roomId}`.
    pub public_base_url: Option<String>,
    /// Invitation sender label for inviters with a blank display name.
    pub invitation_from_name: Option<String>,
    #[ortho_config(default = 10)]
    pub max_invitees: usize,
    #[ortho_config(default = 100_000.0)]
    pub default_radius_meters: f64,
    #[ortho_config(default = 500_000.0)]
    pub max_radius_meters: f64,
    #[ortho_config(default = 50)]
    pub history_limit: usize,
    /// Comma separated origins allowed to open the chat socket.
    pub allowed_origins: Option<String>,
    pub session_key_file: Option<PathBuf>,
    #[ortho_config(default = true)]
    pub session_cookie_secure: bool,
    /// `Strict`, `Lax` or `None`. Defaults to `lax`.
    pub session_same_site: Option<String>,
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
}

impl AppSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(host, self.port)
    }

    pub fn geocoder_endpoint(&self) -> &str {
        self.geocoder_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODER_ENDPOINT)
    }

    pub fn geocoder_country(&self) -> &str {
        self.geocoder_country.as_deref().unwrap_or(DEFAULT_COUNTRY)
    }

    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder_timeout_secs)
    }

    pub fn notifier_timeout(&self) -> Duration {
        Duration::from_secs(self.notifier_timeout_secs)
    }

    pub fn public_base_url(&self) -> &str {
        self.public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
    }

    pub fn invitation_from_name(&self) -> &str {
        self.invitation_from_name
            .as_deref()
            .unwrap_or(DEFAULT_FROM_NAME)
    }

    pub fn allowed_origins(&self) -> AllowedOrigins {
        self.allowed_origins
            .as_deref()
            .map(AllowedOrigins::from_csv)
            .unwrap_or_default()
    }

    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self.session_key_file.clone(),
            cookie_secure: self.session_cookie_secure,
            same_site: self
                .session_same_site
                .clone()
                .unwrap_or_else(|| DEFAULT_SAME_SITE.to_owned()),
            allow_ephemeral: self.session_allow_ephemeral,
        }
    }

    pub fn inviter_settings(&self) -> InviterSettings {
        InviterSettings {
            max_invitees: self.max_invitees,
            default_radius_meters: self.default_radius_meters,
            max_radius_meters: self.max_radius_meters,
            public_base_url: self.public_base_url().to_owned(),
            from_name: self.invitation_from_name().to_owned(),
        }
    }

    pub fn chat_hub_settings(&self) -> ChatHubSettings {
        ChatHubSettings {
            history_limit: self.history_limit,
            public_base_url: self.public_base_url().to_owned(),
            from_name: self.invitation_from_name().to_owned(),
        }
    }
}
