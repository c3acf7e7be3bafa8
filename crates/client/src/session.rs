//! Session management: the authenticated identity and its lifecycle.
//!
//! The [`Session`] is the sole owner of the current identity. It is created
//! on successful login (or restored from the cached identity at startup)
//! and destroyed on logout or when the transport layer broadcasts
//! [`Unauthorized`] after a failed credential renewal. Every identity
//! change swaps the [`CartStore`] to the new user's persisted cart.

use std::sync::{Arc, Mutex, PoisonError};

use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, info, warn};

use jacaranda_core::UserId;

use crate::cart::CartStore;
use crate::error::Result;
use crate::http::{ApiClient, Unauthorized};
use crate::models::{Credentials, NewUser, RegisterReply, User};
use crate::storage::{Storage, keys};

/// The active authenticated identity, if any.
///
/// Cheap to clone; all clones observe the same identity.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    cart: CartStore,
    storage: Arc<dyn Storage>,
    current: Mutex<Option<User>>,
}

impl Session {
    /// Create a session owner with no active identity.
    #[must_use]
    pub fn new(api: ApiClient, cart: CartStore, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                cart,
                storage,
                current: Mutex::new(None),
            }),
        }
    }

    /// Restore the cached identity from storage at startup.
    ///
    /// No server round trip happens here; if the credential cookie has
    /// since expired, the first authenticated call will renew it or tear
    /// the session down. A corrupted cached identity is treated as absent.
    pub fn restore(&self) {
        let user = match self.inner.storage.read(keys::SESSION_USER) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    warn!(%error, "cached identity is not parseable, discarding");
                    let _ = self.inner.storage.remove(keys::SESSION_USER);
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "failed to read cached identity");
                None
            }
        };

        if let Some(user) = user {
            debug!(user = %user.id, "restored cached identity");
            self.set_identity(user);
        }
    }

    /// Log in with email and password.
    ///
    /// On success the backend sets the credential cookie, the identity is
    /// cached in storage, and the cart switches to this user's persisted
    /// copy.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the login call.
    pub async fn login(&self, credentials: Credentials) -> Result<User> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        let reply: LoginReply = self.inner.api.post("/auth/login", &body).await?;

        info!(user = %reply.user.id, "logged in");
        self.set_identity(reply.user.clone());
        Ok(reply.user)
    }

    /// Register a new account via `POST /users`.
    ///
    /// Registration does not log the user in; call [`Session::login`]
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::ApiError`] from the registration call.
    pub async fn register(&self, new_user: NewUser) -> Result<RegisterReply> {
        let body = json!({
            "email": new_user.email,
            "firstName": new_user.first_name,
            "lastName": new_user.last_name,
            "password": new_user.password.expose_secret(),
        });
        self.inner.api.post("/users", &body).await
    }

    /// Log out: invalidate the server-side session and tear down local state.
    ///
    /// The server call is best-effort - local teardown happens regardless,
    /// and the user's persisted cart stays on disk for their next session.
    pub async fn logout(&self) {
        if let Err(error) = self.inner.api.post::<(), _>("/auth/logout", &json!({})).await {
            debug!(%error, "logout call failed, clearing local state anyway");
        }
        self.expire();
    }

    /// Tear down the local identity without a server call.
    ///
    /// Invoked on logout and whenever the transport broadcasts
    /// [`Unauthorized`].
    pub fn expire(&self) {
        let previous = {
            let mut current = self.lock();
            current.take()
        };
        if let Some(user) = previous {
            info!(user = %user.id, "session ended");
        }
        if let Err(error) = self.inner.storage.remove(keys::SESSION_USER) {
            warn!(%error, "failed to clear cached identity");
        }
        self.inner.cart.activate(None);
    }

    /// Spawn a task that consumes the global unauthorized signal.
    ///
    /// On each signal the task clears the identity and resets the cart;
    /// it ends when the API client is dropped. [`crate::Shop`] spawns one
    /// automatically when constructed inside a runtime; expiry is
    /// idempotent, so an extra watcher is harmless.
    pub fn watch_unauthorized(&self) -> tokio::task::JoinHandle<()> {
        let mut signals = self.inner.api.subscribe_unauthorized();
        let session = self.clone();
        tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(Unauthorized) => {
                        warn!("received unauthorized signal, expiring session");
                        session.expire();
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// The currently authenticated user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.lock().clone()
    }

    /// The active user's ID, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.lock().as_ref().map(|u| u.id.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// Whether the active user may use the admin surface.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.lock().as_ref().is_some_and(|u| u.is_admin)
    }

    /// Install `user` as the active identity and swap the cart over.
    fn set_identity(&self, user: User) {
        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(error) = self.inner.storage.write(keys::SESSION_USER, &raw) {
                    warn!(%error, "failed to cache identity");
                }
            }
            Err(error) => warn!(%error, "failed to serialize identity"),
        }

        let user_id = user.id.clone();
        {
            let mut current = self.lock();
            *current = Some(user);
        }
        self.inner.cart.activate(Some(&user_id));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<User>> {
        self.inner.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, serde::Deserialize)]
struct LoginReply {
    user: User,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStorage;

    fn harness() -> (Session, Arc<dyn Storage>, CartStore) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let config = ClientConfig::new(
            "http://localhost:3000".parse().unwrap(),
            std::path::PathBuf::from("unused"),
        );
        let api = ApiClient::new(&config).unwrap();
        let cart = CartStore::new(Arc::clone(&storage));
        let session = Session::new(api, cart.clone(), Arc::clone(&storage));
        (session, storage, cart)
    }

    fn ana() -> User {
        serde_json::from_value(json!({
            "id": "u-ana",
            "email": "ana@example.com",
            "firstName": "Ana",
            "lastName": "Silva",
            "isAdmin": true
        }))
        .unwrap()
    }

    #[test]
    fn test_restore_with_empty_storage_stays_anonymous() {
        let (session, _, _) = harness();
        session.restore();
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_restore_loads_cached_identity() {
        let (session, storage, _) = harness();
        storage
            .write(keys::SESSION_USER, &serde_json::to_string(&ana()).unwrap())
            .unwrap();

        session.restore();
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.user_id(), Some("u-ana".into()));
    }

    #[test]
    fn test_restore_discards_corrupt_identity() {
        let (session, storage, _) = harness();
        storage.write(keys::SESSION_USER, "{broken").unwrap();

        session.restore();
        assert!(!session.is_authenticated());
        assert!(storage.read(keys::SESSION_USER).unwrap().is_none());
    }

    #[test]
    fn test_expire_clears_identity_and_cart_key() {
        let (session, storage, cart) = harness();
        storage
            .write(keys::SESSION_USER, &serde_json::to_string(&ana()).unwrap())
            .unwrap();
        session.restore();

        session.expire();
        assert!(!session.is_authenticated());
        assert!(storage.read(keys::SESSION_USER).unwrap().is_none());
        assert!(cart.is_empty());
    }
}
