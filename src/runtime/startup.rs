use std::sync::Arc;

use actix_web::web;
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::{AccessController, SessionIdentity, UrlRegistry, UserStore};
use crate::storage::StorageFactory;
use crate::utils::password::{Argon2Hasher, CredentialHasher};

/// Shared domain state handed to every worker.
#[derive(Clone)]
pub struct StartupContext {
    pub registry: Arc<UrlRegistry>,
    pub users: Arc<UserStore>,
    pub sessions: Arc<SessionIdentity>,
    pub access: Arc<AccessController>,
}

impl StartupContext {
    /// Registers the pieces as app data in the shape the handlers extract them.
    pub fn register_app_data(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(self.access.clone()))
            .app_data(web::Data::from(self.sessions.clone()))
            .app_data(web::Data::from(self.users.clone()));
    }
}

/// 准备服务器启动的上下文
pub fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    prepare_server_startup_with(config, Arc::new(Argon2Hasher::default()))
}

/// Same as [`prepare_server_startup`] with an explicit password hasher.
pub fn prepare_server_startup_with(
    config: &StaticConfig,
    hasher: Arc<dyn CredentialHasher>,
) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let links_store = StorageFactory::links(&config.storage);
    info!("Using links snapshot: {}", links_store.describe());
    let registry = Arc::new(
        UrlRegistry::load(links_store).with_strict_urls(config.features.strict_urls),
    );

    let users_store = StorageFactory::users(&config.storage);
    info!("Using users snapshot: {}", users_store.describe());
    // owners of persisted links keep their ids even when accounts were not persisted
    let users = Arc::new(
        UserStore::load(hasher, users_store)
            .context("Failed to initialize user store")?
            .with_reserved_ids(registry.owner_ids()),
    );

    let sessions = Arc::new(SessionIdentity::from_config(
        &config.session,
        users.clone(),
    ));
    info!("Session mode: {}", sessions.mode());

    let access = Arc::new(AccessController::new(registry.clone()));

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        registry,
        users,
        sessions,
        access,
    })
}
