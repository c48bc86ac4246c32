//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, ProfileQuery, RoomCreationCommand, RoomQuery};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub profile: Arc<dyn ProfileQuery>,
    pub room_creation: Arc<dyn RoomCreationCommand>,
    pub rooms: Arc<dyn RoomQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub profile: Arc<dyn ProfileQuery>,
    pub room_creation: Arc<dyn RoomCreationCommand>,
    pub rooms: Arc<dyn RoomQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use chatmap::domain::ports::{AccountCommand, ProfileQuery, RoomCreationCommand, RoomQuery};
    /// use chatmap::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn wire(
    ///     accounts: Arc<dyn AccountCommand>,
    ///     profile: Arc<dyn ProfileQuery>,
    ///     room_creation: Arc<dyn RoomCreationCommand>,
    ///     rooms: Arc<dyn RoomQuery>,
    /// ) -> HttpState {
    ///     HttpState::new(HttpStatePorts {
    ///         accounts,
    ///         profile,
    ///         room_creation,
    ///         rooms,
    ///     })
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            profile,
            room_creation,
            rooms,
        } = ports;
        Self {
            accounts,
            profile,
            room_creation,
            rooms,
        }
    }
}
