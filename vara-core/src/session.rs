//! Email one-time-passcode login over an injected auth provider.
//!
//! The provider is the external auth SDK client. It is constructed once by the
//! caller and passed in; nothing here keeps a global handle.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::address::AddressCodec;
use crate::ss58::{AddressCodecProvider, Ss58Codec};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("email address is required")]
    EmptyEmail,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("auth provider error: {0}")]
    Provider(String),
    #[error("not logged in")]
    NotLoggedIn,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Operations the external email-OTP client must offer.
pub trait AuthProvider {
    fn login_with_email_otp(&self, email: &str) -> Result<()>;
    fn is_logged_in(&self) -> Result<bool>;
    /// Email on record for the current user, if the provider exposes it.
    fn user_email(&self) -> Result<Option<String>>;
    /// Chain account of the current user, in whatever format the provider returns.
    fn account(&self) -> Result<String>;
    fn logout(&self) -> Result<()>;
}

/// Logged-in user with an address formatted for the configured network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub address: String,
}

/// Placeholder shown when neither the provider nor the caller supplied an email.
pub const UNKNOWN_USER: &str = "Vara Network User";

pub struct AccountSession<P, C = Ss58Codec> {
    provider: P,
    addresses: AddressCodec<C>,
}

impl<P: AuthProvider> AccountSession<P, Ss58Codec> {
    pub fn vara(provider: P) -> Self {
        Self::new(provider, AddressCodec::vara())
    }
}

impl<P: AuthProvider, C: AddressCodecProvider> AccountSession<P, C> {
    pub fn new(provider: P, addresses: AddressCodec<C>) -> Self {
        Self {
            provider,
            addresses,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn login_with_email(&self, email: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SessionError::EmptyEmail);
        }
        if !looks_like_email(email) {
            return Err(SessionError::InvalidEmail(email.to_string()));
        }

        self.provider.login_with_email_otp(email)?;
        let address = self.fetch_address()?;
        let email = self.user_email_or(email);

        info!(email = %email, address = %address, "login successful");
        Ok(Session { email, address })
    }

    /// Picks up an existing login. An account lookup failure still yields a
    /// session, with an empty address.
    pub fn restore(&self) -> Result<Option<Session>> {
        if !self.provider.is_logged_in()? {
            return Ok(None);
        }

        let address = match self.fetch_address() {
            Ok(address) => address,
            Err(err) => {
                warn!(error = %err, "could not load account for existing session");
                String::new()
            }
        };
        let email = self.user_email_or(UNKNOWN_USER);

        Ok(Some(Session { email, address }))
    }

    pub fn refresh_address(&self) -> Result<String> {
        if !self.provider.is_logged_in()? {
            return Err(SessionError::NotLoggedIn);
        }
        self.fetch_address()
    }

    pub fn logout(&self) -> Result<()> {
        self.provider.logout()?;
        info!("logged out");
        Ok(())
    }

    fn fetch_address(&self) -> Result<String> {
        let raw = self.provider.account()?;
        let info = self.addresses.inspect(&raw);
        debug!(?info, "account address info");
        Ok(self.addresses.format_for_display(&raw))
    }

    fn user_email_or(&self, fallback: &str) -> String {
        match self.provider.user_email() {
            Ok(Some(email)) if !email.trim().is_empty() => email,
            Ok(_) => fallback.to_string(),
            Err(err) => {
                warn!(error = %err, "could not load user metadata");
                fallback.to_string()
            }
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    const ALICE_GENERIC: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    #[derive(Default)]
    struct FakeProvider {
        logged_in: Cell<bool>,
        metadata_email: Option<String>,
        metadata_fails: bool,
        account: Option<String>,
        logins: RefCell<Vec<String>>,
    }

    impl FakeProvider {
        fn with_account(account: &str) -> Self {
            Self {
                account: Some(account.to_string()),
                ..Self::default()
            }
        }
    }

    impl AuthProvider for FakeProvider {
        fn login_with_email_otp(&self, email: &str) -> Result<()> {
            if email.ends_with("@blocked.example") {
                return Err(SessionError::Provider("otp rejected".to_string()));
            }
            self.logins.borrow_mut().push(email.to_string());
            self.logged_in.set(true);
            Ok(())
        }

        fn is_logged_in(&self) -> Result<bool> {
            Ok(self.logged_in.get())
        }

        fn user_email(&self) -> Result<Option<String>> {
            if self.metadata_fails {
                return Err(SessionError::Provider("metadata unavailable".to_string()));
            }
            Ok(self.metadata_email.clone())
        }

        fn account(&self) -> Result<String> {
            self.account
                .clone()
                .ok_or_else(|| SessionError::Provider("no account".to_string()))
        }

        fn logout(&self) -> Result<()> {
            self.logged_in.set(false);
            Ok(())
        }
    }

    fn vara_address() -> String {
        AddressCodec::vara().convert(ALICE_GENERIC)
    }

    #[test]
    fn login_returns_vara_formatted_address() {
        let session = AccountSession::vara(FakeProvider::with_account(ALICE_GENERIC));
        let user = session.login_with_email(" alice@example.com ").unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.address, vara_address());
        assert_eq!(
            session.provider().logins.borrow().as_slice(),
            ["alice@example.com"]
        );
    }

    #[test]
    fn login_prefers_provider_email() {
        let provider = FakeProvider {
            metadata_email: Some("Alice@Example.com".to_string()),
            ..FakeProvider::with_account(ALICE_GENERIC)
        };
        let user = AccountSession::vara(provider)
            .login_with_email("alice@example.com")
            .unwrap();
        assert_eq!(user.email, "Alice@Example.com");
    }

    #[test]
    fn login_falls_back_when_metadata_fails() {
        let provider = FakeProvider {
            metadata_fails: true,
            ..FakeProvider::with_account(ALICE_GENERIC)
        };
        let user = AccountSession::vara(provider)
            .login_with_email("alice@example.com")
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn login_rejects_bad_email_before_calling_provider() {
        let session = AccountSession::vara(FakeProvider::with_account(ALICE_GENERIC));
        assert_eq!(session.login_with_email("  "), Err(SessionError::EmptyEmail));
        assert!(matches!(
            session.login_with_email("alice.example.com"),
            Err(SessionError::InvalidEmail(_))
        ));
        assert!(matches!(
            session.login_with_email("a@b@c"),
            Err(SessionError::InvalidEmail(_))
        ));
        assert!(session.provider().logins.borrow().is_empty());
    }

    #[test]
    fn login_propagates_provider_failure() {
        let session = AccountSession::vara(FakeProvider::with_account(ALICE_GENERIC));
        assert!(matches!(
            session.login_with_email("bob@blocked.example"),
            Err(SessionError::Provider(_))
        ));
    }

    #[test]
    fn login_passes_through_unparseable_account() {
        let session = AccountSession::vara(FakeProvider::with_account("not-an-address"));
        let user = session.login_with_email("alice@example.com").unwrap();
        assert_eq!(user.address, "not-an-address");
    }

    #[test]
    fn restore_without_login_is_none() {
        let session = AccountSession::vara(FakeProvider::with_account(ALICE_GENERIC));
        assert_eq!(session.restore().unwrap(), None);
    }

    #[test]
    fn restore_existing_login() {
        let provider = FakeProvider::with_account(ALICE_GENERIC);
        provider.logged_in.set(true);
        let restored = AccountSession::vara(provider).restore().unwrap().unwrap();
        assert_eq!(restored.email, UNKNOWN_USER);
        assert_eq!(restored.address, vara_address());
    }

    #[test]
    fn restore_keeps_session_when_account_lookup_fails() {
        let provider = FakeProvider {
            metadata_email: Some("alice@example.com".to_string()),
            ..FakeProvider::default()
        };
        provider.logged_in.set(true);
        let restored = AccountSession::vara(provider).restore().unwrap().unwrap();
        assert_eq!(restored.email, "alice@example.com");
        assert!(restored.address.is_empty());
    }

    #[test]
    fn refresh_requires_login_and_logout_clears_it() {
        let session = AccountSession::vara(FakeProvider::with_account(ALICE_GENERIC));
        assert_eq!(session.refresh_address(), Err(SessionError::NotLoggedIn));

        session.login_with_email("alice@example.com").unwrap();
        assert_eq!(session.refresh_address().unwrap(), vara_address());

        session.logout().unwrap();
        assert_eq!(session.refresh_address(), Err(SessionError::NotLoggedIn));
    }
}
