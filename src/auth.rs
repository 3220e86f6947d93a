use axum::http::HeaderMap;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Tenant,
    Owner,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tenant" => Some(Self::Tenant),
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }
}

/// The authenticated caller. Session management lives in the upstream
/// gateway; by the time a request reaches this service the gateway has
/// already authenticated it and injected these headers. Every core
/// operation takes the principal explicitly — nothing reads ambient auth
/// state.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";
const DEV_USER_ID_HEADER: &str = "x-dev-user-id";
const DEV_USER_ROLE_HEADER: &str = "x-dev-user-role";

pub fn require_principal(config: &AppConfig, headers: &HeaderMap) -> AppResult<Principal> {
    if let Some(principal) = principal_from(headers, USER_ID_HEADER, USER_ROLE_HEADER)? {
        return Ok(principal);
    }

    // Local tooling can impersonate a principal without a gateway in front,
    // but only when explicitly enabled and never in production.
    if config.auth_dev_overrides_enabled() {
        if let Some(principal) = principal_from(headers, DEV_USER_ID_HEADER, DEV_USER_ROLE_HEADER)?
        {
            tracing::debug!(user_id = %principal.id, role = principal.role.as_str(), "dev auth override in effect");
            return Ok(principal);
        }
    }

    Err(AppError::Unauthorized(
        "Missing authenticated user.".to_string(),
    ))
}

fn principal_from(
    headers: &HeaderMap,
    id_header: &str,
    role_header: &str,
) -> AppResult<Option<Principal>> {
    let Some(raw_id) = headers
        .get(id_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };

    let id = Uuid::parse_str(raw_id)
        .map_err(|_| AppError::Unauthorized("Malformed user id.".to_string()))?;

    let role = headers
        .get(role_header)
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse)
        .ok_or_else(|| AppError::Unauthorized("Missing or unknown user role.".to_string()))?;

    Ok(Some(Principal { id, role }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(environment: &str, dev_overrides: bool) -> AppConfig {
        let mut config = AppConfig::from_env();
        config.environment = environment.to_string();
        config.dev_auth_overrides_enabled = dev_overrides;
        config
    }

    #[test]
    fn extracts_principal_from_gateway_headers() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_str(&id.to_string()).unwrap());
        headers.insert("x-user-role", HeaderValue::from_static("owner"));

        let principal = require_principal(&config("development", false), &headers).unwrap();
        assert_eq!(principal.id, id);
        assert_eq!(principal.role, Role::Owner);
    }

    #[test]
    fn missing_or_malformed_headers_are_unauthorized() {
        let config = config("development", false);

        let headers = HeaderMap::new();
        assert!(matches!(
            require_principal(&config, &headers),
            Err(AppError::Unauthorized(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-uuid"));
        headers.insert("x-user-role", HeaderValue::from_static("tenant"));
        assert!(matches!(
            require_principal(&config, &headers),
            Err(AppError::Unauthorized(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-user-id",
            HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
        );
        headers.insert("x-user-role", HeaderValue::from_static("superuser"));
        assert!(matches!(
            require_principal(&config, &headers),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn dev_override_headers_only_work_when_enabled() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-dev-user-id",
            HeaderValue::from_str(&id.to_string()).unwrap(),
        );
        headers.insert("x-dev-user-role", HeaderValue::from_static("admin"));

        let principal = require_principal(&config("development", true), &headers).unwrap();
        assert_eq!(principal.id, id);
        assert_eq!(principal.role, Role::Admin);

        assert!(matches!(
            require_principal(&config("development", false), &headers),
            Err(AppError::Unauthorized(_))
        ));
        // The flag is inert in production.
        assert!(matches!(
            require_principal(&config("production", true), &headers),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn gateway_headers_win_over_dev_overrides() {
        let gateway_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-user-id",
            HeaderValue::from_str(&gateway_id.to_string()).unwrap(),
        );
        headers.insert("x-user-role", HeaderValue::from_static("tenant"));
        headers.insert(
            "x-dev-user-id",
            HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
        );
        headers.insert("x-dev-user-role", HeaderValue::from_static("admin"));

        let principal = require_principal(&config("development", true), &headers).unwrap();
        assert_eq!(principal.id, gateway_id);
        assert_eq!(principal.role, Role::Tenant);
    }
}
