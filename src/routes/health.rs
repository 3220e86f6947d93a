use std::time::Duration;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    // Short timeout so the healthcheck always responds quickly even if the
    // first DB connection hangs.
    let store_ok = match tokio::time::timeout(Duration::from_secs(3), state.store.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(error)) => {
            tracing::error!(error = %error, "health check store ping failed");
            false
        }
        Err(_) => {
            tracing::error!("health check store ping timed out (3s)");
            false
        }
    };

    let status = if store_ok { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "now": Utc::now().to_rfc3339(),
        "store": state.store_kind,
        "store_ok": store_ok,
    }))
}
