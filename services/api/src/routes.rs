//! API service routes and handlers

use std::collections::HashMap;

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{
        CollectionWithLinks, CreateCollectionRequest, CreateLinkRequest, Link, LoginRequest,
        LoginResponse, RegisterRequest, RegisterResponse, UserSummary,
    },
    repositories::user::is_unique_violation,
    state::AppState,
    validation,
};

/// Title stored when extraction yields nothing usable
const DEFAULT_LINK_TITLE: &str = "Link saved";

/// Description stored when the page offers none
const DEFAULT_LINK_DESCRIPTION: &str = "No description available.";

/// Parse a resource id received from a route segment or request body
///
/// An id that is not a valid UUID cannot match any row, so callers report it
/// with the same not-found response as an absent resource instead of a
/// malformed-request rejection.
fn parse_resource_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/collections", post(create_collection))
        .route("/collections", get(list_collections))
        .route("/collections/:id", delete(delete_collection))
        .route("/links", post(create_link))
        .route("/links/:id", delete(delete_link))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "kolekt-api"
    }))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::Validation(
            "Email and password are required.".to_string(),
        ));
    };

    let email = validation::normalize_email(&email);
    validation::validate_email(&email).map_err(ApiError::Validation)?;

    if password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required.".to_string(),
        ));
    }

    let existing = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?;

    if existing.is_some() {
        return Err(ApiError::Conflict("This email is already in use.".to_string()));
    }

    let user = state
        .user_repository
        .create(&email, &password)
        .await
        .map_err(|e| {
            // A concurrent registration can slip between the check and the
            // insert; the unique index reports it as a conflict, not a 500.
            if is_unique_violation(&e) {
                ApiError::Conflict("This email is already in use.".to_string())
            } else {
                error!("Failed to create user: {}", e);
                ApiError::InternalServerError
            }
        })?;

    info!("Registered new user: {}", user.email);

    let response = RegisterResponse {
        id: user.id,
        email: user.email,
        created_at: user.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in and receive a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::Validation(
            "Email and password are required.".to_string(),
        ));
    };

    let email = validation::normalize_email(&email);

    let user = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::InvalidCredentials)?;

    let password_ok = state
        .user_repository
        .verify_password(&user, &password)
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::InternalServerError
        })?;

    if !password_ok {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.jwt_service.generate_token(&user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        ApiError::InternalServerError
    })?;

    let response = LoginResponse {
        message: "Login successful.".to_string(),
        token,
        user: UserSummary {
            id: user.id,
            email: user.email,
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Create a new collection owned by the authenticated user
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateCollectionRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = payload
        .title
        .ok_or_else(|| ApiError::Validation("Title is required.".to_string()))?;
    validation::validate_title(&title).map_err(ApiError::Validation)?;

    let collection = state
        .collection_repository
        .create(auth_user.id, title.trim())
        .await
        .map_err(|e| {
            error!("Failed to create collection: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(collection)))
}

/// List the authenticated user's collections with their links nested
pub async fn list_collections(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let collections = state
        .collection_repository
        .list_for_user(auth_user.id)
        .await
        .map_err(|e| {
            error!("Failed to list collections: {}", e);
            ApiError::InternalServerError
        })?;

    let collection_ids: Vec<Uuid> = collections.iter().map(|c| c.id).collect();
    let links = state
        .link_repository
        .list_for_collections(&collection_ids)
        .await
        .map_err(|e| {
            error!("Failed to list links: {}", e);
            ApiError::InternalServerError
        })?;

    // Group links under their collections; both queries are ordered newest
    // first and grouping preserves that order.
    let mut links_by_collection: HashMap<Uuid, Vec<Link>> = HashMap::new();
    for link in links {
        links_by_collection
            .entry(link.collection_id)
            .or_default()
            .push(link);
    }

    let response: Vec<CollectionWithLinks> = collections
        .into_iter()
        .map(|collection| {
            let links = links_by_collection
                .remove(&collection.id)
                .unwrap_or_default();
            CollectionWithLinks::new(collection, links)
        })
        .collect();

    Ok(Json(response))
}

/// Delete a collection owned by the authenticated user
pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_resource_id(&id).ok_or_else(|| {
        ApiError::NotFound("Collection not found or you don't have permission.".to_string())
    })?;

    let deleted = state
        .collection_repository
        .delete_owned(auth_user.id, id)
        .await
        .map_err(|e| {
            error!("Failed to delete collection: {}", e);
            ApiError::InternalServerError
        })?;

    if !deleted {
        return Err(ApiError::NotFound(
            "Collection not found or you don't have permission.".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Save a link into one of the authenticated user's collections
///
/// Fetches the page and extracts display metadata; a failed fetch still
/// produces a saved link with defaulted fields, never an error.
pub async fn create_link(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateLinkRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(url), Some(collection_id)) = (payload.url, payload.collection_id) else {
        return Err(ApiError::Validation(
            "URL and collectionId are required.".to_string(),
        ));
    };

    if url.is_empty() {
        return Err(ApiError::Validation(
            "URL and collectionId are required.".to_string(),
        ));
    }

    let collection_id = parse_resource_id(&collection_id).ok_or_else(|| {
        ApiError::NotFound("Collection not found or it doesn't belong to you.".to_string())
    })?;

    state
        .collection_repository
        .find_owned(auth_user.id, collection_id)
        .await
        .map_err(|e| {
            error!("Failed to look up collection: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| {
            ApiError::NotFound("Collection not found or it doesn't belong to you.".to_string())
        })?;

    let metadata = state.metadata_extractor.extract(&url).await;

    let title = metadata.title.as_deref().unwrap_or(DEFAULT_LINK_TITLE);
    let description = metadata
        .description
        .as_deref()
        .unwrap_or(DEFAULT_LINK_DESCRIPTION);

    let link = state
        .link_repository
        .create(
            collection_id,
            &url,
            title,
            Some(description),
            metadata.image_url.as_deref(),
        )
        .await
        .map_err(|e| {
            error!("Failed to save link: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(link)))
}

/// Delete a link whose collection is owned by the authenticated user
pub async fn delete_link(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_resource_id(&id).ok_or_else(|| {
        ApiError::NotFound("Link not found or you don't have permission.".to_string())
    })?;

    let deleted = state
        .link_repository
        .delete_owned(auth_user.id, id)
        .await
        .map_err(|e| {
            error!("Failed to delete link: {}", e);
            ApiError::InternalServerError
        })?;

    if !deleted {
        return Err(ApiError::NotFound(
            "Link not found or you don't have permission.".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_resource_id(&id.to_string()), Some(id));
        assert_eq!(parse_resource_id(&format!("  {id}  ")), Some(id));
    }

    #[test]
    fn test_parse_resource_id_rejects_malformed() {
        assert_eq!(parse_resource_id("42"), None);
        assert_eq!(parse_resource_id("not-a-uuid"), None);
        assert_eq!(parse_resource_id(""), None);
    }
}
