//! Cookie session access for the REST and WebSocket handlers.
//!
//! The cookie carries nothing but the signed-in user's id. Handlers see
//! [`SessionContext`], which knows how to sign a user in or out and how to
//! insist that someone is signed in.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Extractor wrapping the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Start a session for `user_id`, replacing whoever was signed in.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to write session: {error}")))
    }

    /// End the session and expire the cookie. Safe to call when signed out.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// The signed-in user, or `401` with `login required`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.current_user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    fn current_user(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| {
            UserId::new(raw)
                .inspect_err(|error| warn!(%error, "discarding unparsable session user id"))
                .ok()
        }))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(SessionContext) })
    }
}
