//! Short-code registry
//!
//! Owns the `ShortCode -> UrlRecord` map. Every mutation is flushed to the
//! snapshot store while the write lock is still held, so snapshots are written
//! in mutation order and no reader sees a half-applied change.
//!
//! The flush is blocking file I/O. HTTP handlers run mutations through
//! `web::block`, so only the blocking pool waits on it; redirects that need a
//! read lock wait for at most one in-flight flush.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use actix_web::http::header::HeaderValue;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, TinylinkerError};
use crate::storage::{ShortCode, SnapshotStore, UrlRecord, UserId};
use crate::utils::generate_short_code;
use crate::utils::url_validator::normalize_url;

/// Upper bound on collision retries. With 62^6 codes this is only reached
/// when the random source is broken.
const MAX_GENERATE_ATTEMPTS: usize = 32;

pub type CodeGenerator = Box<dyn Fn() -> ShortCode + Send + Sync>;

pub struct UrlRegistry {
    records: RwLock<HashMap<ShortCode, UrlRecord>>,
    store: Arc<dyn SnapshotStore<UrlRecord>>,
    strict_urls: bool,
    generate: CodeGenerator,
}

impl UrlRegistry {
    /// Builds the registry from whatever the store currently holds.
    pub fn load(store: Arc<dyn SnapshotStore<UrlRecord>>) -> Self {
        let records = store.load();
        info!(
            "URL registry ready: {} records ({} live) from {}",
            records.len(),
            records.values().filter(|r| r.is_live()).count(),
            store.describe()
        );
        Self {
            records: RwLock::new(records),
            store,
            strict_urls: true,
            generate: Box::new(generate_short_code),
        }
    }

    /// Replaces the random code source.
    pub fn with_code_generator(mut self, generate: CodeGenerator) -> Self {
        self.generate = generate;
        self
    }

    /// Toggles http(s) shape validation of long URLs. Emptiness and header safety
    /// are always checked.
    pub fn with_strict_urls(mut self, strict: bool) -> Self {
        self.strict_urls = strict;
        self
    }

    /// Returns the form of `long_url` that is stored and later sent as `Location`.
    fn check_long_url(&self, long_url: &str) -> Result<String> {
        let long_url = long_url.trim();
        if long_url.is_empty() {
            return Err(TinylinkerError::invalid_input("longURL is required"));
        }
        if self.strict_urls {
            return normalize_url(long_url)
                .map_err(|e| TinylinkerError::invalid_input(e.to_string()));
        }
        if HeaderValue::from_str(long_url).is_err() {
            return Err(TinylinkerError::invalid_input(
                "longURL contains characters that cannot be sent in a redirect",
            ));
        }
        Ok(long_url.to_string())
    }

    /// Writes the snapshot. Failures leave the in-memory map authoritative.
    fn flush(&self, records: &HashMap<ShortCode, UrlRecord>) {
        if let Err(e) = self.store.save(records) {
            let degraded = match e {
                TinylinkerError::PersistenceDegraded(_) => e,
                other => TinylinkerError::persistence_degraded(other.to_string()),
            };
            error!(
                "{} ({}): registry changes are kept in memory until the next successful save",
                degraded, degraded.code()
            );
        }
    }

    /// Stores a new record under a fresh code and returns the code.
    ///
    /// Tombstoned codes count as taken, so a code is never handed out twice.
    pub fn create(&self, long_url: &str, owner_id: Option<&str>) -> Result<ShortCode> {
        let long_url = self.check_long_url(long_url)?;

        let mut records = self.records.write();
        let code = (0..MAX_GENERATE_ATTEMPTS)
            .map(|_| (self.generate)())
            .find(|candidate| {
                let taken = records.contains_key(candidate);
                if taken {
                    debug!("Short code collision on {}, retrying", candidate);
                }
                !taken
            })
            .ok_or_else(|| {
                TinylinkerError::internal(format!(
                    "No free short code after {} attempts",
                    MAX_GENERATE_ATTEMPTS
                ))
            })?;

        records.insert(
            code.clone(),
            UrlRecord::new(long_url, owner_id.map(str::to_string)),
        );
        self.flush(&records);

        info!("Registry: created '{}' (owner: {:?})", code, owner_id);
        Ok(code)
    }

    /// Returns the record whether or not it is tombstoned.
    pub fn get(&self, code: &str) -> Result<UrlRecord> {
        self.records
            .read()
            .get(code)
            .cloned()
            .ok_or_else(|| TinylinkerError::not_found(format!("Short code '{}' not found", code)))
    }

    /// Live records created by `owner_id`. Absent owner yields an empty map.
    pub fn list_by_owner(&self, owner_id: Option<&str>) -> HashMap<ShortCode, UrlRecord> {
        let Some(owner_id) = owner_id else {
            return HashMap::new();
        };

        self.records
            .read()
            .iter()
            .filter(|(_, record)| record.is_live() && record.is_owned_by(owner_id))
            .map(|(code, record)| (code.clone(), record.clone()))
            .collect()
    }

    /// Rewrites the long URL of a live record.
    pub fn update(&self, code: &str, new_long_url: &str) -> Result<()> {
        let new_long_url = self.check_long_url(new_long_url)?;

        let mut records = self.records.write();
        match records.get_mut(code) {
            Some(record) if record.is_live() => {
                record.long_url = new_long_url;
            }
            _ => {
                return Err(TinylinkerError::not_found(format!(
                    "Short code '{}' not found",
                    code
                )));
            }
        }
        self.flush(&records);

        info!("Registry: updated '{}'", code);
        Ok(())
    }

    /// Tombstones a live record. `get` keeps returning it, marked deleted.
    pub fn remove(&self, code: &str) -> Result<()> {
        let mut records = self.records.write();
        match records.get_mut(code) {
            Some(record) if record.is_live() => record.deleted = true,
            Some(_) => {
                warn!("Registry: '{}' is already deleted", code);
                return Err(TinylinkerError::not_found(format!(
                    "Short code '{}' not found",
                    code
                )));
            }
            None => {
                return Err(TinylinkerError::not_found(format!(
                    "Short code '{}' not found",
                    code
                )));
            }
        }
        self.flush(&records);

        info!("Registry: deleted '{}'", code);
        Ok(())
    }

    /// Every record, tombstones included.
    pub fn snapshot(&self) -> HashMap<ShortCode, UrlRecord> {
        self.records.read().clone()
    }

    /// Every owner id referenced by a record, tombstones included.
    pub fn owner_ids(&self) -> HashSet<UserId> {
        self.records
            .read()
            .values()
            .filter_map(|record| record.owner_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.records.read().values().filter(|r| r.is_live()).count()
    }
}
