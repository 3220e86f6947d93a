use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use crate::auth::{require_principal, Role};
use crate::domain::Property;
use crate::error::{AppError, AppResult};
use crate::schemas::{validate_input, CreatePropertyInput};
use crate::state::AppState;

use super::parse_uuid;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/properties", axum::routing::post(create_property))
        .route("/properties/{property_id}", axum::routing::get(get_property))
}

#[derive(Debug, serde::Deserialize)]
struct PropertyPath {
    property_id: String,
}

/// Register a catalog entry for the booking core to price against. The
/// full listing (photos, description, search) lives in the catalog
/// service; this is only the slice the core reads.
async fn create_property(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePropertyInput>,
) -> AppResult<impl IntoResponse> {
    let principal = require_principal(&state.config, &headers)?;
    if !matches!(principal.role, Role::Owner | Role::Admin) {
        return Err(AppError::Forbidden(
            "Only owners can register properties.".to_string(),
        ));
    }
    validate_input(&payload)?;

    let property = Property::new(
        principal.id,
        payload.name.trim(),
        payload.price_per_night_minor,
        payload.capacity,
    );
    state.store.insert_property(&property).await?;

    Ok((axum::http::StatusCode::CREATED, Json(property)))
}

async fn get_property(
    State(state): State<AppState>,
    Path(path): Path<PropertyPath>,
    headers: HeaderMap,
) -> AppResult<Json<Property>> {
    require_principal(&state.config, &headers)?;
    let id = parse_uuid(&path.property_id, "property id")?;
    let property = state.store.get_property(id).await?;
    Ok(Json(property))
}
