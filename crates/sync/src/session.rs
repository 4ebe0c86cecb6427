//! Session context: the single bearer credential of a dashboard session.
//!
//! The credential is acquired once at session start and cleared at most once,
//! on the first authorization failure. Clearing publishes
//! [`SessionStatus::Expired`], which front ends treat as the login boundary.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::watch;

use crate::{
    error::{Error, Result},
    store::{CREDENTIAL_KEY, DurableStore},
};

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Expired,
}

pub struct Session {
    credential: Mutex<Option<Credential>>,
    store: Arc<dyn DurableStore>,
    status: watch::Sender<SessionStatus>,
}

impl Session {
    /// Resumes the session whose credential is kept in `store`.
    ///
    /// Fails with [`Error::MissingCredential`] when nothing is stored, before
    /// any request could be made.
    pub fn restore(store: Arc<dyn DurableStore>) -> Result<Arc<Self>> {
        let token = store
            .get(CREDENTIAL_KEY)
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingCredential)?;
        Ok(Self::with_credential(store, Credential::new(token)))
    }

    /// Starts a session with a freshly acquired credential and persists it.
    pub fn establish(store: Arc<dyn DurableStore>, credential: Credential) -> Result<Arc<Self>> {
        store.set(CREDENTIAL_KEY, credential.as_str())?;
        Ok(Self::with_credential(store, credential))
    }

    fn with_credential(store: Arc<dyn DurableStore>, credential: Credential) -> Arc<Self> {
        let (status, _) = watch::channel(SessionStatus::Active);
        Arc::new(Self {
            credential: Mutex::new(Some(credential)),
            store,
            status,
        })
    }

    pub fn credential(&self) -> Option<Credential> {
        self.credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Resolves once the session has ended, immediately if it already has.
    pub async fn expired(&self) {
        let mut status = self.status.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = status
            .wait_for(|status| *status == SessionStatus::Expired)
            .await;
    }

    /// Ends the session: drops the credential from memory and durable storage
    /// and announces [`SessionStatus::Expired`].
    ///
    /// Idempotent. Returns `true` only for the call that performed the
    /// transition.
    pub fn invalidate(&self) -> bool {
        let cleared = self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if cleared.is_none() {
            return false;
        }

        if let Err(err) = self.store.remove(CREDENTIAL_KEY) {
            tracing::warn!("failed to remove stored credential: {err}");
        }
        self.status.send_replace(SessionStatus::Expired);
        tracing::info!("session expired, login required");
        true
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn restore_without_token_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let err = Session::restore(store).unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }

    #[test]
    fn restore_ignores_empty_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(CREDENTIAL_KEY, "").unwrap();
        assert!(Session::restore(store).is_err());
    }

    #[test]
    fn establish_persists_credential() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::establish(store.clone(), Credential::new("abc")).unwrap();
        assert_eq!(store.get(CREDENTIAL_KEY).as_deref(), Some("abc"));
        assert_eq!(session.credential(), Some(Credential::new("abc")));
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn invalidate_transitions_once() {
        let store = Arc::new(MemoryStore::new());
        store.set(CREDENTIAL_KEY, "abc").unwrap();
        let session = Session::restore(store.clone()).unwrap();
        let mut status = session.subscribe();

        assert!(session.invalidate());
        assert!(!session.invalidate());

        assert_eq!(session.credential(), None);
        assert_eq!(store.get(CREDENTIAL_KEY), None);
        assert!(status.has_changed().unwrap());
        assert_eq!(*status.borrow_and_update(), SessionStatus::Expired);
    }

    #[test]
    fn credential_debug_is_redacted() {
        let rendered = format!("{:?}", Credential::new("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }

    #[tokio::test]
    async fn expiry_before_waiting_is_still_seen() {
        let session = Session::establish(Arc::new(MemoryStore::new()), Credential::new("abc")).unwrap();
        session.invalidate();

        let waited = tokio::time::timeout(Duration::from_millis(200), session.expired()).await;
        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn active_session_does_not_resolve() {
        let session = Session::establish(Arc::new(MemoryStore::new()), Credential::new("abc")).unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(50), session.expired()).await;
        assert!(waited.is_err());
    }
}
