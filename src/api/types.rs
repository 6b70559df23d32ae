use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::entities::{ingredients, tags};
use crate::services::media::media_url;

/// Paginated response envelope: `{count, next, previous, results}`.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(path: &str, page: u64, limit: u64, count: u64, results: Vec<T>) -> Self {
        let next = (page * limit < count)
            .then(|| format!("{path}?page={}&limit={limit}", page + 1));
        let previous = (page > 1).then(|| format!("{path}?page={}&limit={limit}", page - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Common `?page=&limit=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    #[must_use]
    pub fn resolve(&self, default_page_size: u64) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_page_size).max(1);
        (page, limit)
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserDto {
    #[must_use]
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// Registration response deliberately omits `is_subscribed`.
#[derive(Debug, Serialize)]
pub struct RegisteredUserDto {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct TagDto {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<tags::Model> for TagDto {
    fn from(model: tags::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            color: model.color,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientDto {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<ingredients::Model> for IngredientDto {
    fn from(model: ingredients::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            measurement_unit: model.measurement_unit,
        }
    }
}

/// An ingredient inside a recipe read shape, with its amount.
#[derive(Debug, Serialize)]
pub struct RecipeIngredientDto {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Serialize)]
pub struct RecipeDto {
    pub id: i32,
    pub tags: Vec<TagDto>,
    pub author: UserDto,
    pub ingredients: Vec<RecipeIngredientDto>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Short recipe shape used by favorite/cart responses and subscription
/// listings.
#[derive(Debug, Serialize)]
pub struct RecipeShortDto {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShortDto {
    #[must_use]
    pub fn from_model(model: &crate::entities::recipes::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            image: media_url(&model.image),
            cooking_time: model.cooking_time,
        }
    }
}

/// A followed author with their recipes.
#[derive(Debug, Serialize)]
pub struct SubscriptionDto {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShortDto>,
    pub recipes_count: u64,
}

#[derive(Debug, Serialize)]
pub struct TokenDto {
    pub auth_token: String,
}
