//! Session lifecycle: authenticate, renew, read and clear.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::error::AuthError;
use crate::store::{
    CLIENT_ID, CLIENT_RENEW_BASE, CLIENT_RENEW_TOKEN, CLIENT_TOKEN, SecretStore, StoreChange,
};
use crate::types::HostUrl;

use super::acquirer::TokenAcquirer;
use super::credentials::{BasicCredential, Credentials};
use super::tokens::AccessToken;

/// Receives notice while a token exchange is in flight.
pub trait ProgressReporter: Send + Sync {
    fn start(&self, message: &str);
    fn finish(&self);
}

/// Reporter that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&self, _message: &str) {}
    fn finish(&self) {}
}

/// What [`SessionManager::clear`] removes besides the client id and token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    /// Keep the auto-renewal flag and stored credential.
    #[default]
    KeepRenewal,
    /// Remove the auto-renewal flag and stored credential as well.
    EraseRenewal,
}

/// Snapshot of the persisted session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub client_id: Option<String>,
    pub token: Option<AccessToken>,
    pub auto_renew_enabled: bool,
    pub auto_renew_basic: Option<BasicCredential>,
}

impl Session {
    /// A token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Renewal preconditions hold: the flag is set and a credential is stored.
    pub fn can_renew(&self) -> bool {
        self.auto_renew_enabled && self.auto_renew_basic.is_some()
    }
}

/// Orchestrates token acquisition and keeps the persisted session in step.
///
/// The manager owns its store. Construct one per process and pass it by
/// reference to whatever issues API requests.
///
/// # Example
///
/// ```no_run
/// use sfcc::{FileSecretStore, HostUrl, HttpConfig, SessionManager, TokenAcquirer};
///
/// # async fn example() -> Result<(), sfcc::Error> {
/// let store = FileSecretStore::default_location()?;
/// let acquirer = TokenAcquirer::new(&HttpConfig::default())?;
/// let authority = HostUrl::new("account.demandware.com")?;
/// let sessions = SessionManager::new(store, acquirer, authority);
///
/// sessions.authenticate(Some("my_client_id"), Some("my_client_secret"), true, None).await?;
/// assert!(sessions.token()?.is_some());
/// # Ok(())
/// # }
/// ```
pub struct SessionManager<S> {
    store: S,
    acquirer: TokenAcquirer,
    authority: HostUrl,
    progress: Box<dyn ProgressReporter>,
}

impl<S: SecretStore> SessionManager<S> {
    /// Create a manager. `authority` is used by [`renew`](Self::renew) and by
    /// [`authenticate`](Self::authenticate) when no override is given.
    pub fn new(store: S, acquirer: TokenAcquirer, authority: HostUrl) -> Self {
        Self {
            store,
            acquirer,
            authority,
            progress: Box::new(NoProgress),
        }
    }

    /// Report in-flight exchanges to `progress`.
    pub fn with_progress(mut self, progress: impl ProgressReporter + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the default authorization host.
    pub fn authority(&self) -> &HostUrl {
        &self.authority
    }

    /// Obtain a fresh token for a client and persist it.
    ///
    /// On success the client id, token and auto-renewal settings are written
    /// in one batch. The basic credential is kept only when `auto_renew` is
    /// set. On failure nothing is written and any previous session stays as
    /// it was.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingCredentials`] without a network call if either
    /// value is absent; otherwise whatever the exchange reports.
    #[instrument(skip(self, client_secret), fields(client_id = client_id.unwrap_or_default()))]
    pub async fn authenticate(
        &self,
        client_id: Option<&str>,
        client_secret: Option<&str>,
        auto_renew: bool,
        authority: Option<&HostUrl>,
    ) -> Result<AccessToken> {
        let client_id = client_id
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingCredentials { field: "id" })?;
        let client_secret = client_secret
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingCredentials { field: "secret" })?;

        let credentials = Credentials::new(client_id, client_secret);
        let basic = credentials.to_basic();
        let authority = authority.unwrap_or(&self.authority);

        info!(%authority, "Authenticating client");
        let token = self
            .exchange("Authenticating client", &basic, authority)
            .await?;

        let renew_base = if auto_renew {
            StoreChange::Set(CLIENT_RENEW_BASE, Value::from(basic.as_str()))
        } else {
            StoreChange::Delete(CLIENT_RENEW_BASE)
        };

        self.store.apply(vec![
            StoreChange::Set(CLIENT_ID, Value::from(credentials.client_id())),
            StoreChange::Set(CLIENT_TOKEN, Value::from(token.as_str())),
            StoreChange::Set(CLIENT_RENEW_TOKEN, Value::Bool(auto_renew)),
            renew_base,
        ])?;

        info!(auto_renew, "Authentication succeeded");
        Ok(token)
    }

    /// Obtain a new token from the stored basic credential.
    ///
    /// Only the token is replaced. On failure the old token is left in place.
    ///
    /// # Errors
    ///
    /// [`AuthError::RenewalNotPermitted`] without a network call unless the
    /// session was authenticated with auto-renewal.
    #[instrument(skip(self))]
    pub async fn renew(&self) -> Result<AccessToken> {
        let basic = match (self.auto_renew_enabled()?, self.auto_renew_basic()?) {
            (true, Some(basic)) => basic,
            _ => {
                debug!("Token renewal requested without auto-renewal enabled");
                return Err(AuthError::RenewalNotPermitted.into());
            }
        };

        info!(authority = %self.authority, "Renewing token");
        let token = self
            .exchange("Renewing token", &basic, &self.authority)
            .await?;

        self.store.set(CLIENT_TOKEN, Value::from(token.as_str()))?;

        info!("Token renewal succeeded");
        Ok(token)
    }

    /// The current bearer token, if any.
    pub fn token(&self) -> Result<Option<AccessToken>> {
        Ok(self.get_string(CLIENT_TOKEN)?.map(AccessToken::new))
    }

    /// The last authenticated client id, if any.
    pub fn client_id(&self) -> Result<Option<String>> {
        self.get_string(CLIENT_ID)
    }

    /// Whether auto-renewal was requested at the last authentication.
    pub fn auto_renew_enabled(&self) -> Result<bool> {
        Ok(matches!(
            self.store.get(CLIENT_RENEW_TOKEN)?,
            Some(Value::Bool(true))
        ))
    }

    /// The stored basic credential used for renewal, if any.
    pub fn auto_renew_basic(&self) -> Result<Option<BasicCredential>> {
        Ok(self
            .get_string(CLIENT_RENEW_BASE)?
            .map(BasicCredential::from_encoded))
    }

    /// Read the whole session.
    pub fn session(&self) -> Result<Session> {
        Ok(Session {
            client_id: self.client_id()?,
            token: self.token()?,
            auto_renew_enabled: self.auto_renew_enabled()?,
            auto_renew_basic: self.auto_renew_basic()?,
        })
    }

    /// Remove the client id and token, and renewal settings per `policy`.
    #[instrument(skip(self))]
    pub fn clear(&self, policy: ClearPolicy) -> Result<()> {
        let mut changes = vec![
            StoreChange::Delete(CLIENT_ID),
            StoreChange::Delete(CLIENT_TOKEN),
        ];
        if policy == ClearPolicy::EraseRenewal {
            changes.push(StoreChange::Delete(CLIENT_RENEW_TOKEN));
            changes.push(StoreChange::Delete(CLIENT_RENEW_BASE));
        }
        self.store.apply(changes)?;
        debug!("Session cleared");
        Ok(())
    }

    /// Remove only the token.
    pub fn reset_token(&self) -> Result<()> {
        self.store.delete(CLIENT_TOKEN)
    }

    async fn exchange(
        &self,
        message: &str,
        basic: &BasicCredential,
        authority: &HostUrl,
    ) -> Result<AccessToken> {
        self.progress.start(message);
        let result = self.acquirer.exchange_credentials(basic, authority).await;
        self.progress.finish();
        result
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.store.get(key)? {
            Some(Value::String(s)) if !s.is_empty() => Ok(Some(s)),
            None | Some(Value::Null) | Some(Value::String(_)) => Ok(None),
            Some(other) => {
                warn!(key, kind = value_kind(&other), "Ignoring non-string store value");
                Ok(None)
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<S> std::fmt::Debug for SessionManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authority", &self.authority)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpConfig;
    use crate::store::MemorySecretStore;
    use serde_json::json;

    fn manager(store: &MemorySecretStore) -> SessionManager<&MemorySecretStore> {
        let acquirer = TokenAcquirer::new(&HttpConfig::default()).unwrap();
        // Unroutable; these tests must never reach the network.
        let authority = HostUrl::new("http://127.0.0.1:9").unwrap();
        SessionManager::new(store, acquirer, authority)
    }

    #[tokio::test]
    async fn authenticate_requires_both_values() {
        let store = MemorySecretStore::new();
        let sessions = manager(&store);

        let err = sessions
            .authenticate(None, None, false, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Auth(AuthError::MissingCredentials { field: "id" })
        ));

        let err = sessions
            .authenticate(Some("cid"), None, false, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Auth(AuthError::MissingCredentials { field: "secret" })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn renew_without_flag_is_not_permitted() {
        let store = MemorySecretStore::new();
        store.set(CLIENT_TOKEN, json!("t1")).unwrap();
        store.set(CLIENT_RENEW_TOKEN, json!(false)).unwrap();
        let sessions = manager(&store);

        let err = sessions.renew().await.unwrap_err();
        assert!(matches!(err, crate::Error::Auth(AuthError::RenewalNotPermitted)));
        assert_eq!(sessions.token().unwrap(), Some(AccessToken::new("t1")));
    }

    #[tokio::test]
    async fn renew_with_flag_but_no_credential_is_not_permitted() {
        let store = MemorySecretStore::new();
        store.set(CLIENT_RENEW_TOKEN, json!(true)).unwrap();
        let sessions = manager(&store);

        let err = sessions.renew().await.unwrap_err();
        assert!(matches!(err, crate::Error::Auth(AuthError::RenewalNotPermitted)));
    }

    #[test]
    fn clear_keeps_renewal_by_default() {
        let store = MemorySecretStore::new();
        store.set(CLIENT_ID, json!("cid")).unwrap();
        store.set(CLIENT_TOKEN, json!("t1")).unwrap();
        store.set(CLIENT_RENEW_TOKEN, json!(true)).unwrap();
        store.set(CLIENT_RENEW_BASE, json!("Y2lkOmNzZWNyZXQ=")).unwrap();
        let sessions = manager(&store);

        sessions.clear(ClearPolicy::default()).unwrap();

        let session = sessions.session().unwrap();
        assert_eq!(session.client_id, None);
        assert!(!session.is_authenticated());
        assert!(session.can_renew());
    }

    #[test]
    fn clear_can_erase_renewal() {
        let store = MemorySecretStore::new();
        store.set(CLIENT_ID, json!("cid")).unwrap();
        store.set(CLIENT_TOKEN, json!("t1")).unwrap();
        store.set(CLIENT_RENEW_TOKEN, json!(true)).unwrap();
        store.set(CLIENT_RENEW_BASE, json!("Y2lkOmNzZWNyZXQ=")).unwrap();
        let sessions = manager(&store);

        sessions.clear(ClearPolicy::EraseRenewal).unwrap();

        assert_eq!(sessions.session().unwrap(), Session::default());
        assert!(store.is_empty());
    }

    #[test]
    fn reset_token_keeps_client() {
        let store = MemorySecretStore::new();
        store.set(CLIENT_ID, json!("cid")).unwrap();
        store.set(CLIENT_TOKEN, json!("t1")).unwrap();
        let sessions = manager(&store);

        sessions.reset_token().unwrap();
        assert_eq!(sessions.token().unwrap(), None);
        assert_eq!(sessions.client_id().unwrap().as_deref(), Some("cid"));
    }

    #[test]
    fn non_string_values_read_as_absent() {
        let store = MemorySecretStore::new();
        store.set(CLIENT_TOKEN, json!(42)).unwrap();
        store.set(CLIENT_RENEW_TOKEN, json!("true")).unwrap();
        let sessions = manager(&store);

        assert_eq!(sessions.token().unwrap(), None);
        assert!(!sessions.auto_renew_enabled().unwrap());
    }
}
