use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::auth::{AuthUser, MaybeUser};
use super::{
    ApiError, AppState, Page, RecipeDto, RecipeIngredientDto, RecipeShortDto, TagDto, UserDto,
};
use crate::api::validation::{
    validate_cooking_time, validate_ingredient_amounts, validate_recipe_name,
    validate_recipe_text, validate_tag_ids,
};
use crate::db::{NewRecipe, RecipeListFilter, RecipeUpdate, User};
use crate::entities::recipes;
use crate::services::media::media_url;
use crate::services::shopping_list;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i32>,
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

#[derive(Deserialize)]
pub struct UpdateRecipeRequest {
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<i32>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

#[derive(Debug, Default)]
struct RecipeListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    author: Option<i32>,
    tags: Vec<String>,
    is_favorited: bool,
    is_in_shopping_cart: bool,
}

/// `tags` repeats (`?tags=lunch&tags=vegan`), which `Query<T>` cannot
/// express, so the query string is parsed by hand.
fn parse_list_query(raw: Option<&str>) -> RecipeListQuery {
    let mut query = RecipeListQuery::default();

    let Some(raw) = raw else {
        return query;
    };

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "page" => query.page = value.parse().ok(),
            "limit" => query.limit = value.parse().ok(),
            "author" => query.author = value.parse().ok(),
            "tags" => query.tags.push(value.into_owned()),
            "is_favorited" => query.is_favorited = is_truthy(&value),
            "is_in_shopping_cart" => query.is_in_shopping_cart = is_truthy(&value),
            _ => {}
        }
    }

    query
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "True")
}

// ============================================================================
// Read handlers
// ============================================================================

/// GET /api/recipes/?tags=&author=&is_favorited=&is_in_shopping_cart=
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<RecipeDto>>, ApiError> {
    let query = parse_list_query(raw.as_deref());

    let page_size = state.page_size().await;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(page_size).max(1);

    // Favorite/cart filters only make sense for a known requester.
    let filter = RecipeListFilter {
        author_id: query.author,
        tag_slugs: query.tags,
        favorited_by: viewer
            .as_ref()
            .filter(|_| query.is_favorited)
            .map(|u| u.id),
        in_cart_of: viewer
            .as_ref()
            .filter(|_| query.is_in_shopping_cart)
            .map(|u| u.id),
    };

    let (rows, count) = state.store().list_recipes(&filter, page, limit).await?;
    let results = hydrate_recipes(&state, viewer.as_ref(), &rows).await?;

    Ok(Json(Page::new("/api/recipes/", page, limit, count, results)))
}

/// GET /api/recipes/{id}/
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i32>,
) -> Result<Json<RecipeDto>, ApiError> {
    let recipe = state
        .store()
        .get_recipe(id)
        .await?
        .ok_or_else(|| ApiError::recipe_not_found(id))?;

    let mut dtos = hydrate_recipes(&state, viewer.as_ref(), std::slice::from_ref(&recipe)).await?;
    dtos.pop()
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to build recipe response"))
}

// ============================================================================
// Write handlers
// ============================================================================

/// POST /api/recipes/
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeDto>), ApiError> {
    validate_recipe_name(&payload.name)?;
    validate_recipe_text(&payload.text)?;
    validate_cooking_time(payload.cooking_time)?;

    let tag_ids = dedup_preserving_order(&payload.tags);
    validate_tag_ids(&tag_ids)?;

    let pairs: Vec<(i32, i32)> = payload.ingredients.iter().map(|i| (i.id, i.amount)).collect();
    validate_ingredient_amounts(&pairs)?;

    ensure_tags_exist(&state, &tag_ids).await?;
    ensure_ingredients_exist(&state, &pairs).await?;

    if payload.image.trim().is_empty() {
        return Err(ApiError::validation("image", "Must not be empty"));
    }
    let image = state
        .media()
        .save_recipe_image(&payload.image)
        .await
        .map_err(|_| ApiError::validation("image", "Invalid base64 image payload"))?;

    let recipe = state
        .store()
        .create_recipe(NewRecipe {
            author_id: user.id,
            name: payload.name,
            text: payload.text,
            image,
            cooking_time: payload.cooking_time,
            tag_ids,
            ingredient_amounts: pairs,
        })
        .await?;

    tracing::info!("Recipe {} created by {}", recipe.id, user.username);

    let mut dtos = hydrate_recipes(&state, Some(&user), std::slice::from_ref(&recipe)).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| ApiError::internal("Failed to build recipe response"))?;

    Ok((StatusCode::CREATED, Json(dto)))
}

/// PATCH /api/recipes/{id}/
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeDto>, ApiError> {
    let recipe = state
        .store()
        .get_recipe(id)
        .await?
        .ok_or_else(|| ApiError::recipe_not_found(id))?;

    ensure_can_modify(&user, &recipe)?;

    if let Some(name) = &payload.name {
        validate_recipe_name(name)?;
    }
    if let Some(text) = &payload.text {
        validate_recipe_text(text)?;
    }
    if let Some(cooking_time) = payload.cooking_time {
        validate_cooking_time(cooking_time)?;
    }

    let tag_ids = match &payload.tags {
        Some(tags) => {
            let tag_ids = dedup_preserving_order(tags);
            validate_tag_ids(&tag_ids)?;
            ensure_tags_exist(&state, &tag_ids).await?;
            Some(tag_ids)
        }
        None => None,
    };

    let pairs = match &payload.ingredients {
        Some(ingredients) => {
            let pairs: Vec<(i32, i32)> = ingredients.iter().map(|i| (i.id, i.amount)).collect();
            validate_ingredient_amounts(&pairs)?;
            ensure_ingredients_exist(&state, &pairs).await?;
            Some(pairs)
        }
        None => None,
    };

    let image = match &payload.image {
        Some(image) if !image.trim().is_empty() => Some(
            state
                .media()
                .save_recipe_image(image)
                .await
                .map_err(|_| ApiError::validation("image", "Invalid base64 image payload"))?,
        ),
        _ => None,
    };

    if image.is_some()
        && let Err(e) = state.media().remove(&recipe.image).await
    {
        tracing::warn!("Failed to remove replaced image {}: {}", recipe.image, e);
    }

    let updated = state
        .store()
        .update_recipe(
            id,
            RecipeUpdate {
                name: payload.name,
                text: payload.text,
                image,
                cooking_time: payload.cooking_time,
                tag_ids,
                ingredient_amounts: pairs,
            },
        )
        .await?;

    let mut dtos = hydrate_recipes(&state, Some(&user), std::slice::from_ref(&updated)).await?;
    dtos.pop()
        .map(Json)
        .ok_or_else(|| ApiError::internal("Failed to build recipe response"))
}

/// DELETE /api/recipes/{id}/
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let recipe = state
        .store()
        .get_recipe(id)
        .await?
        .ok_or_else(|| ApiError::recipe_not_found(id))?;

    ensure_can_modify(&user, &recipe)?;

    state.store().delete_recipe(id).await?;

    if let Err(e) = state.media().remove(&recipe.image).await {
        tracing::warn!("Failed to remove image {}: {}", recipe.image, e);
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Favorite / shopping cart toggles
// ============================================================================

#[derive(Copy, Clone)]
enum SavedKind {
    Favorite,
    Cart,
}

impl SavedKind {
    const fn already_msg(self) -> &'static str {
        match self {
            Self::Favorite => "Recipe is already in favorites",
            Self::Cart => "Recipe is already in the shopping cart",
        }
    }

    const fn missing_msg(self) -> &'static str {
        match self {
            Self::Favorite => "Recipe is not in favorites",
            Self::Cart => "Recipe is not in the shopping cart",
        }
    }
}

/// Shared POST path: 404 unknown recipe, 400 duplicate, 201 + short shape.
async fn add_saved(
    state: &Arc<AppState>,
    user_id: i32,
    recipe_id: i32,
    kind: SavedKind,
) -> Result<(StatusCode, Json<RecipeShortDto>), ApiError> {
    let recipe = state
        .store()
        .get_recipe(recipe_id)
        .await?
        .ok_or_else(|| ApiError::recipe_not_found(recipe_id))?;

    let exists = match kind {
        SavedKind::Favorite => state.store().is_favorited(user_id, recipe_id).await?,
        SavedKind::Cart => state.store().is_in_cart(user_id, recipe_id).await?,
    };
    if exists {
        return Err(ApiError::detail(kind.already_msg()));
    }

    match kind {
        SavedKind::Favorite => state.store().add_favorite(user_id, recipe_id).await?,
        SavedKind::Cart => state.store().add_to_cart(user_id, recipe_id).await?,
    }

    Ok((StatusCode::CREATED, Json(RecipeShortDto::from_model(&recipe))))
}

/// Shared DELETE path: 404 unknown recipe, 400 absent row, 204 removed.
async fn remove_saved(
    state: &Arc<AppState>,
    user_id: i32,
    recipe_id: i32,
    kind: SavedKind,
) -> Result<StatusCode, ApiError> {
    if state.store().get_recipe(recipe_id).await?.is_none() {
        return Err(ApiError::recipe_not_found(recipe_id));
    }

    let removed = match kind {
        SavedKind::Favorite => state.store().remove_favorite(user_id, recipe_id).await?,
        SavedKind::Cart => state.store().remove_from_cart(user_id, recipe_id).await?,
    };
    if !removed {
        return Err(ApiError::detail(kind.missing_msg()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/favorite/
pub async fn favorite(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeShortDto>), ApiError> {
    add_saved(&state, user.id, id, SavedKind::Favorite).await
}

/// DELETE /api/recipes/{id}/favorite/
pub async fn unfavorite(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove_saved(&state, user.id, id, SavedKind::Favorite).await
}

/// POST /api/recipes/{id}/shopping_cart/
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeShortDto>), ApiError> {
    add_saved(&state, user.id, id, SavedKind::Cart).await
}

/// DELETE /api/recipes/{id}/shopping_cart/
pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove_saved(&state, user.id, id, SavedKind::Cart).await
}

/// GET /api/recipes/download_shopping_cart/
pub async fn download_shopping_cart(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store().shopping_list(user.id).await?;
    let body = shopping_list::render(&rows);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        body,
    ))
}

// ============================================================================
// Helpers
// ============================================================================

fn ensure_can_modify(user: &User, recipe: &recipes::Model) -> Result<(), ApiError> {
    if recipe.author_id == user.id || user.is_staff {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the author may modify this recipe".to_string(),
        ))
    }
}

fn dedup_preserving_order(ids: &[i32]) -> Vec<i32> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

async fn ensure_tags_exist(state: &Arc<AppState>, tag_ids: &[i32]) -> Result<(), ApiError> {
    let found = state.store().get_tags_by_ids(tag_ids).await?;
    if found.len() != tag_ids.len() {
        return Err(ApiError::validation("tags", "Unknown tag id"));
    }
    Ok(())
}

async fn ensure_ingredients_exist(
    state: &Arc<AppState>,
    pairs: &[(i32, i32)],
) -> Result<(), ApiError> {
    let ids: Vec<i32> = pairs.iter().map(|(id, _)| *id).collect();
    let found = state.store().get_ingredients_by_ids(&ids).await?;
    if found.len() != ids.len() {
        return Err(ApiError::validation("ingredients", "Unknown ingredient id"));
    }
    Ok(())
}

/// Build read-shape DTOs for a batch of recipes with a constant number of
/// queries: tags, ingredients, authors, follow/favorite/cart membership.
async fn hydrate_recipes(
    state: &Arc<AppState>,
    viewer: Option<&User>,
    rows: &[recipes::Model],
) -> Result<Vec<RecipeDto>, ApiError> {
    let recipe_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

    let mut tags_map = state.store().tags_for_recipes(&recipe_ids).await?;
    let mut ingredients_map = state.store().ingredients_for_recipes(&recipe_ids).await?;

    let author_ids = dedup_preserving_order(
        &rows.iter().map(|r| r.author_id).collect::<Vec<i32>>(),
    );
    let authors: HashMap<i32, User> = state
        .store()
        .get_users_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let (followed, favorited, in_cart) = match viewer {
        Some(viewer) => (
            state
                .store()
                .followed_ids_among(viewer.id, &author_ids)
                .await?,
            state
                .store()
                .favorited_ids_among(viewer.id, &recipe_ids)
                .await?,
            state.store().cart_ids_among(viewer.id, &recipe_ids).await?,
        ),
        None => Default::default(),
    };

    let mut results = Vec::with_capacity(rows.len());
    for recipe in rows {
        let author = authors
            .get(&recipe.author_id)
            .ok_or_else(|| ApiError::internal(format!("Missing author {}", recipe.author_id)))?;

        let tags = tags_map
            .remove(&recipe.id)
            .unwrap_or_default()
            .into_iter()
            .map(TagDto::from)
            .collect();

        let ingredients = ingredients_map
            .remove(&recipe.id)
            .unwrap_or_default()
            .into_iter()
            .map(|(ingredient, amount)| RecipeIngredientDto {
                id: ingredient.id,
                name: ingredient.name,
                measurement_unit: ingredient.measurement_unit,
                amount,
            })
            .collect();

        results.push(RecipeDto {
            id: recipe.id,
            tags,
            author: UserDto::from_user(author, followed.contains(&recipe.author_id)),
            ingredients,
            is_favorited: favorited.contains(&recipe.id),
            is_in_shopping_cart: in_cart.contains(&recipe.id),
            name: recipe.name.clone(),
            image: media_url(&recipe.image),
            text: recipe.text.clone(),
            cooking_time: recipe.cooking_time,
        });
    }

    Ok(results)
}
