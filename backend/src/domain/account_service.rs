//! Account registration, authentication, and profile service.
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AccountCommand, AccountRepository, GeoResolver, PasswordHasher, ProfileQuery, ProfileUpdate,
    RegistrationRequest,
};
use crate::domain::service_support::{
    hash_password, invalid_field, map_account_error, verify_password,
};
use crate::domain::{CountryCode, Error, LoginCredentials, NewUser, User, UserId, UserProfile};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Service implementing [`AccountCommand`] and [`ProfileQuery`].
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    geo: Arc<dyn GeoResolver>,
    clock: Arc<dyn Clock>,
    country: CountryCode,
}

impl AccountService {
    /// Create the service; `country` scopes every postal code lookup.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        geo: Arc<dyn GeoResolver>,
        clock: Arc<dyn Clock>,
        country: CountryCode,
    ) -> Self {
        Self {
            accounts,
            hasher,
            geo,
            clock,
            country,
        }
    }

    async fn load_session_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.accounts
            .find_by_id(user_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

#[async_trait]
impl AccountCommand for AccountService {
    async fn register(&self, request: RegistrationRequest) -> Result<UserProfile, Error> {
        let RegistrationRequest {
            email,
            password,
            display_name,
            postal_code,
        } = request;

        let password_hash = hash_password(&self.hasher, password).await?;
        let location = self.geo.resolve(&postal_code, &self.country).await;

        let user = User::new(NewUser {
            id: UserId::random(),
            email,
            password_hash,
            display_name,
            postal_code,
            location,
            created_at: self.clock.utc(),
        });
        self.accounts.insert(&user).await.map_err(map_account_error)?;

        info!(
            user_id = %user.id(),
            has_location = user.location().is_some(),
            "account registered"
        );
        Ok(user.profile())
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserProfile, Error> {
        let Some(user) = self
            .accounts
            .find_by_email(credentials.email())
            .await
            .map_err(map_account_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = verify_password(
            &self.hasher,
            credentials.password().clone(),
            user.password_hash().clone(),
        )
        .await?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(user.profile())
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, Error> {
        let mut user = self.load_session_user(user_id).await?;

        if update.email.as_ref().is_some_and(|email| email != user.email()) {
            return Err(invalid_field(
                "email",
                "email_immutable",
                "email address cannot be changed",
            ));
        }

        if let Some(display_name) = update.display_name {
            user = user.with_display_name(display_name);
        }
        if let Some(postal_code) = update
            .postal_code
            .filter(|postal_code| postal_code != user.postal_code())
        {
            let location = self.geo.resolve(&postal_code, &self.country).await;
            user = user.with_postal_code(postal_code, location);
        }

        self.accounts.update(&user).await.map_err(map_account_error)?;
        Ok(user.profile())
    }
}

#[async_trait]
impl ProfileQuery for AccountService {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        Ok(self.load_session_user(user_id).await?.profile())
    }
}
