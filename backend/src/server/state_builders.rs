//! Builders wiring adapters and domain services into handler state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::{info, warn};

use chatmap::domain::ports::{
    AccountRepository, GeoResolver, InvitationNotifier, MessageRepository, NullGeoResolver,
    PasswordHasher, RoomNameCache, RoomRepository,
};
use chatmap::domain::{
    AccountService, ChatHub, ChatHubPorts, CountryCode, InviterPorts, ProximityInviter,
    RoomDirectory,
};
use chatmap::inbound::http::state::{HttpState, HttpStatePorts};
use chatmap::inbound::ws::registry::ConnectionRegistry;
use chatmap::inbound::ws::state::WsState;
use chatmap::outbound::cache::InMemoryRoomNameCache;
use chatmap::outbound::crypto::Argon2PasswordHasher;
use chatmap::outbound::geocoding::{NominatimGeoResolver, NominatimIdentity};
use chatmap::outbound::memory::{
    InMemoryAccountRepository, InMemoryMessageRepository, InMemoryRoomRepository,
};
use chatmap::outbound::notification::{LoggingInvitationNotifier, WebhookInvitationNotifier};
use chatmap::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselMessageRepository, DieselRoomRepository,
};
use chatmap::settings::AppSettings;

use super::ServerConfig;

/// Store ports shared by every service.
struct Stores {
    accounts: Arc<dyn AccountRepository>,
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
}

/// Handler state for both inbound adapters.
pub(super) struct AppStates {
    pub(super) http_state: web::Data<HttpState>,
    pub(super) ws_state: web::Data<WsState>,
}

/// Use the Diesel stores when a pool is available, otherwise the
/// process-local ones.
fn build_stores(pool: Option<&DbPool>) -> Stores {
    match pool {
        Some(pool) => Stores {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            rooms: Arc::new(DieselRoomRepository::new(pool.clone())),
            messages: Arc::new(DieselMessageRepository::new(pool.clone())),
        },
        None => {
            warn!("no database configured; data will not survive a restart");
            let messages = Arc::new(InMemoryMessageRepository::new());
            Stores {
                accounts: Arc::new(InMemoryAccountRepository::new()),
                rooms: Arc::new(InMemoryRoomRepository::new(Arc::clone(&messages))),
                messages,
            }
        }
    }
}

fn invalid_setting(name: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("invalid {name}: {err}"),
    )
}

/// An empty endpoint disables geocoding; every lookup then yields no point.
fn build_geo_resolver(settings: &AppSettings) -> std::io::Result<Arc<dyn GeoResolver>> {
    let endpoint = settings.geocoder_endpoint().trim();
    if endpoint.is_empty() {
        warn!("geocoding disabled; new accounts will have no location");
        return Ok(Arc::new(NullGeoResolver));
    }
    let url = Url::parse(endpoint).map_err(|err| invalid_setting("geocoder_endpoint", err))?;
    let identity = settings
        .geocoder_user_agent
        .clone()
        .map(|user_agent| NominatimIdentity { user_agent })
        .unwrap_or_default();
    let resolver = NominatimGeoResolver::with_identity(url, settings.geocoder_timeout(), identity)
        .map_err(|err| invalid_setting("geocoder client", err))?;
    info!(endpoint, "geocoder configured");
    Ok(Arc::new(resolver))
}

fn build_notifier(settings: &AppSettings) -> std::io::Result<Arc<dyn InvitationNotifier>> {
    match settings.notifier_webhook_url.as_deref() {
        Some(raw) => {
            let url = Url::parse(raw).map_err(|err| invalid_setting("notifier_webhook_url", err))?;
            let notifier = WebhookInvitationNotifier::new(url, settings.notifier_timeout())
                .map_err(|err| invalid_setting("notifier client", err))?;
            Ok(Arc::new(notifier))
        }
        None => {
            info!("no notifier webhook configured; invitations are logged only");
            Ok(Arc::new(LoggingInvitationNotifier))
        }
    }
}

/// Assemble every adapter and service behind the HTTP and WebSocket state.
///
/// # Errors
///
/// Returns [`std::io::Error`] when a configured URL or country code is
/// invalid or an HTTP client cannot be built.
pub(super) fn build_app_states(config: &ServerConfig) -> std::io::Result<AppStates> {
    let settings = &config.settings;
    let Stores {
        accounts,
        rooms,
        messages,
    } = build_stores(config.db_pool.as_ref());
    let country = CountryCode::new(settings.geocoder_country())
        .map_err(|err| invalid_setting("geocoder_country", err))?;
    let geo = build_geo_resolver(settings)?;
    let notifier = build_notifier(settings)?;
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let room_names: Arc<dyn RoomNameCache> = Arc::new(InMemoryRoomNameCache::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let account_service = Arc::new(AccountService::new(
        Arc::clone(&accounts),
        Arc::clone(&hasher),
        geo,
        Arc::clone(&clock),
        country,
    ));
    let inviter = Arc::new(ProximityInviter::new(
        InviterPorts {
            accounts: Arc::clone(&accounts),
            rooms: Arc::clone(&rooms),
            messages: Arc::clone(&messages),
            room_names: Arc::clone(&room_names),
            notifier: Arc::clone(&notifier),
            hasher: Arc::clone(&hasher),
            broadcaster: registry.clone(),
            clock: Arc::clone(&clock),
        },
        settings.inviter_settings(),
    ));
    let directory = Arc::new(RoomDirectory::new(Arc::clone(&rooms), hasher));
    let hub = Arc::new(ChatHub::new(
        ChatHubPorts {
            accounts,
            rooms,
            messages,
            room_names,
            notifier,
            broadcaster: registry.clone(),
            clock,
        },
        settings.chat_hub_settings(),
    ));

    let http_state = HttpState::new(HttpStatePorts {
        accounts: account_service.clone(),
        profile: account_service,
        room_creation: inviter,
        rooms: directory,
    });
    let ws_state = WsState::new(hub, registry, settings.allowed_origins());

    Ok(AppStates {
        http_state: web::Data::new(http_state),
        ws_state: web::Data::new(ws_state),
    })
}
