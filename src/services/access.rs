//! Authorization in front of the registry.
//!
//! Owner-scoped operations check login, then existence, then ownership, so a
//! caller without a session learns nothing about which codes exist. Tombstoned
//! records are treated as absent here; only the public redirect tells them apart.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, TinylinkerError};
use crate::storage::{ShortCode, UrlRecord};

use super::UrlRegistry;

pub struct AccessController {
    registry: Arc<UrlRegistry>,
}

impl AccessController {
    pub fn new(registry: Arc<UrlRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<UrlRegistry> {
        &self.registry
    }

    fn require_login(caller: Option<&str>) -> Result<&str> {
        caller.ok_or_else(|| TinylinkerError::not_authenticated("Login required"))
    }

    fn live_record(&self, code: &str) -> Result<UrlRecord> {
        let record = self.registry.get(code)?;
        if record.is_live() {
            Ok(record)
        } else {
            Err(TinylinkerError::not_found(format!(
                "Short code '{}' not found",
                code
            )))
        }
    }

    /// Fetches a live record the caller owns.
    fn owned_record(&self, caller: Option<&str>, code: &str) -> Result<UrlRecord> {
        let caller = Self::require_login(caller)?;
        let record = self.live_record(code)?;
        if record.is_owned_by(caller) {
            Ok(record)
        } else {
            debug!("Access: '{}' is not the owner of '{}'", caller, code);
            Err(TinylinkerError::not_owner("Caller does not own this record"))
        }
    }

    pub fn list(&self, caller: Option<&str>) -> Result<HashMap<ShortCode, UrlRecord>> {
        let caller = Self::require_login(caller)?;
        Ok(self.registry.list_by_owner(Some(caller)))
    }

    pub fn create(&self, caller: Option<&str>, long_url: &str) -> Result<ShortCode> {
        let caller = Self::require_login(caller)?;
        self.registry.create(long_url, Some(caller))
    }

    /// Records without an owner are readable by any logged-in caller.
    pub fn view(&self, caller: Option<&str>, code: &str) -> Result<UrlRecord> {
        let caller = Self::require_login(caller)?;
        let record = self.live_record(code)?;
        match record.owner_id.as_deref() {
            None => Ok(record),
            Some(owner) if owner == caller => Ok(record),
            Some(_) => {
                debug!("Access: '{}' may not view '{}'", caller, code);
                Err(TinylinkerError::not_owner("Caller does not own this record"))
            }
        }
    }

    pub fn update(&self, caller: Option<&str>, code: &str, new_long_url: &str) -> Result<()> {
        self.owned_record(caller, code)?;
        self.registry.update(code, new_long_url)
    }

    pub fn delete(&self, caller: Option<&str>, code: &str) -> Result<()> {
        self.owned_record(caller, code)?;
        self.registry.remove(code)
    }

    /// Public lookup for `/u/{code}`: the target of a live record, `Gone` for a
    /// tombstone, `NotFound` otherwise.
    pub fn resolve_redirect(&self, code: &str) -> Result<String> {
        let record = self.registry.get(code)?;
        if record.deleted {
            Err(TinylinkerError::gone(format!("Short code '{}' was deleted", code)))
        } else {
            Ok(record.long_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NullSnapshotStore;

    fn controller() -> AccessController {
        AccessController::new(Arc::new(UrlRegistry::load(Arc::new(NullSnapshotStore))))
    }

    #[test]
    fn test_anonymous_caller_is_rejected_before_lookup() {
        let access = controller();
        let code = access.create(Some("alice1"), "http://example.com").unwrap();

        for result in [
            access.view(None, &code).map(|_| ()),
            access.view(None, "nope00").map(|_| ()),
            access.update(None, &code, "http://x.example"),
            access.delete(None, "nope00"),
            access.list(None).map(|_| ()),
            access.create(None, "http://x.example").map(|_| ()),
        ] {
            assert!(matches!(result, Err(TinylinkerError::NotAuthenticated(_))));
        }
    }

    #[test]
    fn test_owner_checks() {
        let access = controller();
        let code = access.create(Some("alice1"), "http://example.com").unwrap();

        assert!(access.view(Some("alice1"), &code).is_ok());
        assert!(matches!(
            access.view(Some("bob001"), &code),
            Err(TinylinkerError::NotOwner(_))
        ));
        assert!(matches!(
            access.update(Some("bob001"), &code, "http://evil.example"),
            Err(TinylinkerError::NotOwner(_))
        ));
        assert!(matches!(
            access.delete(Some("bob001"), &code),
            Err(TinylinkerError::NotOwner(_))
        ));
        assert_eq!(
            access.registry().get(&code).unwrap().long_url,
            "http://example.com"
        );
    }

    #[test]
    fn test_unowned_record_is_publicly_readable_but_not_writable() {
        let access = controller();
        let code = access.registry().create("http://public.example", None).unwrap();

        assert!(access.view(Some("bob001"), &code).is_ok());
        assert!(matches!(
            access.update(Some("bob001"), &code, "http://x.example"),
            Err(TinylinkerError::NotOwner(_))
        ));
    }

    #[test]
    fn test_tombstone_is_not_found_for_owner_and_gone_for_redirect() {
        let access = controller();
        let code = access.create(Some("alice1"), "http://example.com").unwrap();
        assert_eq!(access.resolve_redirect(&code).unwrap(), "http://example.com");

        access.delete(Some("alice1"), &code).unwrap();

        assert!(matches!(
            access.view(Some("alice1"), &code),
            Err(TinylinkerError::NotFound(_))
        ));
        assert!(matches!(
            access.delete(Some("alice1"), &code),
            Err(TinylinkerError::NotFound(_))
        ));
        assert!(matches!(
            access.resolve_redirect(&code),
            Err(TinylinkerError::Gone(_))
        ));
        assert!(matches!(
            access.resolve_redirect("nope00"),
            Err(TinylinkerError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_is_scoped_to_caller() {
        let access = controller();
        let mine = access.create(Some("alice1"), "http://a.example").unwrap();
        access.create(Some("bob001"), "http://b.example").unwrap();

        let listed = access.list(Some("alice1")).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.contains_key(&mine));
    }

    #[test]
    fn test_update_by_owner() {
        let access = controller();
        let code = access.create(Some("alice1"), "http://a.example").unwrap();
        access
            .update(Some("alice1"), &code, "http://b.example")
            .unwrap();
        assert_eq!(
            access.view(Some("alice1"), &code).unwrap().long_url,
            "http://b.example"
        );
    }
}
