//! Account registry and credential checks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, TinylinkerError};
use crate::storage::{SnapshotStore, User, UserId};
use crate::utils::generate_short_code;
use crate::utils::password::{CredentialHasher, is_argon2_hash};

use super::registry::CodeGenerator;

const MAX_ID_ATTEMPTS: usize = 32;

#[derive(Default)]
struct Accounts {
    by_id: HashMap<UserId, User>,
    /// email -> id
    by_email: HashMap<String, UserId>,
}

impl Accounts {
    fn from_users(by_id: HashMap<UserId, User>) -> Self {
        let mut by_email = HashMap::with_capacity(by_id.len());
        for user in by_id.values() {
            if let Some(previous) = by_email.insert(user.email.clone(), user.id.clone()) {
                warn!(
                    "Duplicate email in users snapshot, keeping '{}' over '{}'",
                    user.id, previous
                );
            }
        }
        Self { by_id, by_email }
    }
}

pub struct UserStore {
    accounts: RwLock<Accounts>,
    hasher: Arc<dyn CredentialHasher>,
    store: Arc<dyn SnapshotStore<User>>,
    /// Verified against when the email is unknown so both failure paths cost one hash check.
    dummy_digest: String,
    /// Ids that must never be handed out, such as link owners whose accounts were not persisted.
    reserved_ids: HashSet<UserId>,
    generate_id: CodeGenerator,
}

impl UserStore {
    pub fn load(
        hasher: Arc<dyn CredentialHasher>,
        store: Arc<dyn SnapshotStore<User>>,
    ) -> Result<Self> {
        let dummy_digest = hasher
            .hash("tinylinker-dummy-password")
            .map_err(|e| TinylinkerError::internal(e.to_string()))?;

        let users = store.load();
        for user in users.values().filter(|u| !is_argon2_hash(&u.password_digest)) {
            // verification will fail for these; the account cannot log in
            warn!("User '{}' has a password digest that is not Argon2", user.id);
        }
        info!("User store ready: {} users from {}", users.len(), store.describe());

        Ok(Self {
            accounts: RwLock::new(Accounts::from_users(users)),
            hasher,
            store,
            dummy_digest,
            reserved_ids: HashSet::new(),
            generate_id: Box::new(generate_short_code),
        })
    }

    /// Keeps `ids` out of future registrations.
    pub fn with_reserved_ids(mut self, ids: impl IntoIterator<Item = UserId>) -> Self {
        self.reserved_ids.extend(ids);
        self
    }

    /// Replaces the random id source.
    pub fn with_id_generator(mut self, generate_id: CodeGenerator) -> Self {
        self.generate_id = generate_id;
        self
    }

    fn flush(&self, accounts: &Accounts) {
        if let Err(e) = self.store.save(&accounts.by_id) {
            error!(
                "{} ({}): accounts are kept in memory until the next successful save",
                e,
                e.code()
            );
        }
    }

    /// Creates an account and returns its id.
    pub fn register(&self, email: &str, password: &str) -> Result<UserId> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(TinylinkerError::invalid_input(
                "Email and password are required",
            ));
        }

        if self.accounts.read().by_email.contains_key(email) {
            return Err(TinylinkerError::already_exists("Email is already registered"));
        }

        // hash outside the lock, the digest does not depend on store state
        let password_digest = self
            .hasher
            .hash(password)
            .map_err(|e| TinylinkerError::internal(e.to_string()))?;

        let mut accounts = self.accounts.write();
        // a concurrent registration may have taken the email meanwhile
        if accounts.by_email.contains_key(email) {
            return Err(TinylinkerError::already_exists("Email is already registered"));
        }

        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| (self.generate_id)())
            .find(|candidate| {
                !accounts.by_id.contains_key(candidate) && !self.is_reserved(candidate)
            })
            .ok_or_else(|| TinylinkerError::internal("No free user id"))?;

        accounts.by_email.insert(email.to_string(), id.clone());
        accounts.by_id.insert(
            id.clone(),
            User {
                id: id.clone(),
                email: email.to_string(),
                password_digest,
            },
        );
        self.flush(&accounts);

        info!("User store: registered user '{}'", id);
        Ok(id)
    }

    /// Returns the account id when `password` matches the digest stored for `email`.
    ///
    /// Unknown email and wrong password fail with the same error.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<UserId> {
        let email = email.trim();
        let candidate = {
            let accounts = self.accounts.read();
            accounts
                .by_email
                .get(email)
                .and_then(|id| accounts.by_id.get(id))
                .map(|user| (user.id.clone(), user.password_digest.clone()))
        };

        let (id, digest) = match candidate {
            Some((id, digest)) => (Some(id), digest),
            None => (None, self.dummy_digest.clone()),
        };

        let matched = match self.hasher.verify(password, &digest) {
            Ok(matched) => matched,
            Err(e) => {
                error!("User store: password verification error: {}", e);
                false
            }
        };

        match (id, matched) {
            (Some(id), true) => {
                debug!("User store: '{}' authenticated", id);
                Ok(id)
            }
            (Some(id), false) => {
                debug!("User store: wrong password for '{}'", id);
                Err(TinylinkerError::invalid_credentials("Invalid email or password"))
            }
            (None, _) => {
                debug!("User store: unknown email");
                Err(TinylinkerError::invalid_credentials("Invalid email or password"))
            }
        }
    }

    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved_ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<User> {
        self.accounts.read().by_id.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.read().by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NullSnapshotStore;
    use crate::utils::password::Argon2Hasher;

    fn store() -> UserStore {
        let hasher = Arc::new(Argon2Hasher::with_params(64, 1, 1).unwrap());
        UserStore::load(hasher, Arc::new(NullSnapshotStore)).unwrap()
    }

    fn scripted(ids: &'static [&'static str]) -> CodeGenerator {
        let next = std::sync::atomic::AtomicUsize::new(0);
        Box::new(move || {
            ids[next.fetch_add(1, std::sync::atomic::Ordering::SeqCst) % ids.len()].to_string()
        })
    }

    #[test]
    fn test_register_and_authenticate() {
        let users = store();
        let id = users.register("alice@example.com", "hunter2").unwrap();
        assert_eq!(id.len(), 6);
        assert!(users.contains(&id));

        assert_eq!(
            users.authenticate("alice@example.com", "hunter2").unwrap(),
            id
        );
        // email is trimmed on both paths
        assert_eq!(
            users.authenticate("  alice@example.com ", "hunter2").unwrap(),
            id
        );
    }

    #[test]
    fn test_password_is_stored_hashed() {
        let users = store();
        let id = users.register("alice@example.com", "hunter2").unwrap();
        let user = users.get(&id).unwrap();
        assert_ne!(user.password_digest, "hunter2");
        assert!(user.password_digest.starts_with("$argon2"));
    }

    #[test]
    fn test_register_rejects_empty_fields() {
        let users = store();
        assert!(matches!(
            users.register("", "pw"),
            Err(TinylinkerError::InvalidInput(_))
        ));
        assert!(matches!(
            users.register("   ", "pw"),
            Err(TinylinkerError::InvalidInput(_))
        ));
        assert!(matches!(
            users.register("a@example.com", ""),
            Err(TinylinkerError::InvalidInput(_))
        ));
        assert!(users.is_empty());
    }

    #[test]
    fn test_register_rejects_duplicate_email() {
        let users = store();
        users.register("alice@example.com", "one").unwrap();
        assert!(matches!(
            users.register("alice@example.com", "two"),
            Err(TinylinkerError::AlreadyExists(_))
        ));
        // exact match only
        assert!(users.register("Alice@example.com", "two").is_ok());
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn test_authenticate_failures_are_uniform() {
        let users = store();
        users.register("alice@example.com", "hunter2").unwrap();

        let wrong_password = users.authenticate("alice@example.com", "nope").unwrap_err();
        let unknown_email = users.authenticate("bob@example.com", "hunter2").unwrap_err();

        assert_eq!(wrong_password, unknown_email);
        assert!(matches!(wrong_password, TinylinkerError::InvalidCredentials(_)));
    }

    #[test]
    fn test_register_skips_taken_and_reserved_ids() {
        let users = store()
            .with_reserved_ids(["aJ48lW".to_string()])
            .with_id_generator(scripted(&["alice1", "alice1", "aJ48lW", "bob001"]));

        assert_eq!(users.register("alice@example.com", "pw").unwrap(), "alice1");
        // alice1 is taken, aJ48lW still owns links from an earlier run
        assert_eq!(users.register("bob@example.com", "pw").unwrap(), "bob001");
        assert!(!users.contains("aJ48lW"));
    }

    #[test]
    fn test_register_gives_up_when_no_id_is_free() {
        let users = store()
            .with_reserved_ids(["aJ48lW".to_string()])
            .with_id_generator(scripted(&["aJ48lW"]));

        assert!(matches!(
            users.register("alice@example.com", "pw"),
            Err(TinylinkerError::Internal(_))
        ));
        assert!(users.is_empty());
        assert!(users.authenticate("alice@example.com", "pw").is_err());
    }

    #[test]
    fn test_get_unknown_is_none() {
        let users = store();
        assert!(users.get("nobody").is_none());
        assert!(!users.contains("nobody"));
    }
}
