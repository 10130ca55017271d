use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::services::{AccessController, UserStore};

use super::types::HealthResponse;

/// GET /health
///
/// Reads only in-memory counters, so it answers even when the snapshot file
/// cannot be written.
pub async fn health_check(
    access: web::Data<AccessController>,
    users: web::Data<UserStore>,
) -> HttpResponse {
    trace!("Received health check request");

    let registry = access.registry();
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        records: registry.len(),
        live_records: registry.live_count(),
        users: users.len(),
    })
}
