use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::auth::{AuthUser, MaybeUser};
use super::{
    ApiError, AppState, Page, PageQuery, RecipeShortDto, RegisteredUserDto, SubscriptionDto,
    UserDto,
};
use crate::api::validation::{
    validate_email, validate_password, validate_person_name, validate_username,
};
use crate::db::User;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

#[derive(Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub recipes_limit: Option<usize>,
}

/// GET /api/users/
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserDto>>, ApiError> {
    let page_size = state.page_size().await;
    let (page, limit) = query.resolve(page_size);

    let (users, count) = state.store().list_users(page, limit).await?;

    let followed = match &viewer {
        Some(viewer) => {
            let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
            state.store().followed_ids_among(viewer.id, &ids).await?
        }
        None => std::collections::HashSet::new(),
    };

    let results = users
        .iter()
        .map(|u| UserDto::from_user(u, followed.contains(&u.id)))
        .collect();

    Ok(Json(Page::new("/api/users/", page, limit, count, results)))
}

/// POST /api/users/ (registration)
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUserDto>), ApiError> {
    validate_email(&payload.email)?;
    validate_username(&payload.username)?;
    validate_person_name("first_name", &payload.first_name)?;
    validate_person_name("last_name", &payload.last_name)?;
    validate_password(&payload.password)?;

    if state.store().email_exists(&payload.email).await? {
        return Err(ApiError::validation(
            "email",
            "A user with this email already exists",
        ));
    }
    if state.store().username_exists(&payload.username).await? {
        return Err(ApiError::validation(
            "username",
            "A user with this username already exists",
        ));
    }

    let security = state.security_config().await;
    let user = state
        .store()
        .create_user(
            crate::db::NewUser {
                email: payload.email,
                username: payload.username,
                first_name: payload.first_name,
                last_name: payload.last_name,
                password: payload.password,
                is_staff: false,
            },
            Some(&security),
        )
        .await?;

    tracing::info!("Registered user: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUserDto {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}

/// GET /api/users/me/
pub async fn me(
    State(_state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Json<UserDto> {
    Json(UserDto::from_user(&user, false))
}

/// GET /api/users/{id}/
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(id))?;

    let is_subscribed = match &viewer {
        Some(viewer) => state.store().is_following(viewer.id, user.id).await?,
        None => false,
    };

    Ok(Json(UserDto::from_user(&user, is_subscribed)))
}

/// POST /api/users/set_password/
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    validate_password(&payload.new_password)?;

    let current_ok = state
        .store()
        .verify_user_password(user.id, &payload.current_password)
        .await?;
    if !current_ok {
        return Err(ApiError::validation(
            "current_password",
            "Current password is incorrect",
        ));
    }

    let security = state.security_config().await;
    state
        .store()
        .set_user_password(user.id, &payload.new_password, Some(&security))
        .await?;

    tracing::info!("Password changed for user: {}", user.username);

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/{id}/subscribe/
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<SubscriptionDto>), ApiError> {
    let author = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(id))?;

    if user.id == author.id {
        return Err(ApiError::detail("You cannot subscribe to yourself"));
    }
    if state.store().is_following(user.id, author.id).await? {
        return Err(ApiError::detail(
            "You are already subscribed to this author",
        ));
    }

    state.store().follow(user.id, author.id).await?;

    let subscription = build_subscriptions(&state, std::slice::from_ref(&author), None)
        .await?
        .pop()
        .ok_or_else(|| ApiError::internal("Failed to build subscription response"))?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

/// DELETE /api/users/{id}/subscribe/
pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let author = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(id))?;

    let removed = state.store().unfollow(user.id, author.id).await?;
    if !removed {
        return Err(ApiError::detail("You are not subscribed to this author"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/subscriptions/?recipes_limit=
pub async fn subscriptions(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<Json<Page<SubscriptionDto>>, ApiError> {
    let page_size = state.page_size().await;
    let (page, limit) = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(page_size);

    let (authors, count) = state.store().followed_authors(user.id, page, limit).await?;
    let results = build_subscriptions(&state, &authors, query.recipes_limit).await?;

    Ok(Json(Page::new(
        "/api/users/subscriptions/",
        page,
        limit,
        count,
        results,
    )))
}

/// Assemble subscription entries: the author's profile plus their recipes
/// (short shape, newest first, optionally truncated) and the untruncated
/// count.
async fn build_subscriptions(
    state: &Arc<AppState>,
    authors: &[User],
    recipes_limit: Option<usize>,
) -> Result<Vec<SubscriptionDto>, ApiError> {
    let author_ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
    let recipes = state.store().list_recipes_by_authors(&author_ids).await?;

    let mut by_author: HashMap<i32, Vec<RecipeShortDto>> = HashMap::new();
    let mut counts: HashMap<i32, u64> = HashMap::new();
    for recipe in &recipes {
        *counts.entry(recipe.author_id).or_default() += 1;
        let entry = by_author.entry(recipe.author_id).or_default();
        if recipes_limit.is_none_or(|cap| entry.len() < cap) {
            entry.push(RecipeShortDto::from_model(recipe));
        }
    }

    Ok(authors
        .iter()
        .map(|author| SubscriptionDto {
            email: author.email.clone(),
            id: author.id,
            username: author.username.clone(),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            is_subscribed: true,
            recipes: by_author.remove(&author.id).unwrap_or_default(),
            recipes_count: counts.get(&author.id).copied().unwrap_or(0),
        })
        .collect())
}
