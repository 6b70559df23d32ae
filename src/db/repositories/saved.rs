use std::collections::HashSet;

use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{
    favorite_recipes, ingredients, prelude::*, recipe_ingredients, recipes, shopping_carts,
};

/// One aggregated shopping-list line: amounts summed over every cart
/// recipe sharing the same (name, unit).
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ShoppingListRow {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Repository for the per-user saved-recipe join tables (favorites and
/// shopping carts).
pub struct SavedRepository {
    conn: DatabaseConnection,
}

impl SavedRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ── favorites ──

    pub async fn is_favorited(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        let count = FavoriteRecipes::find()
            .filter(favorite_recipes::Column::UserId.eq(user_id))
            .filter(favorite_recipes::Column::RecipeId.eq(recipe_id))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn add_favorite(&self, user_id: i32, recipe_id: i32) -> Result<()> {
        FavoriteRecipes::insert(favorite_recipes::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        Ok(())
    }

    pub async fn remove_favorite(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        let result = FavoriteRecipes::delete_many()
            .filter(favorite_recipes::Column::UserId.eq(user_id))
            .filter(favorite_recipes::Column::RecipeId.eq(recipe_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Of the given recipe ids, the subset the user has favorited.
    pub async fn favorited_ids_among(
        &self,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows: Vec<i32> = FavoriteRecipes::find()
            .select_only()
            .column(favorite_recipes::Column::RecipeId)
            .filter(favorite_recipes::Column::UserId.eq(user_id))
            .filter(favorite_recipes::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().collect())
    }

    // ── shopping cart ──

    pub async fn is_in_cart(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        let count = ShoppingCarts::find()
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn add_to_cart(&self, user_id: i32, recipe_id: i32) -> Result<()> {
        ShoppingCarts::insert(shopping_carts::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            ..Default::default()
        })
        .exec(&self.conn)
        .await?;

        Ok(())
    }

    pub async fn remove_from_cart(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        let result = ShoppingCarts::delete_many()
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn cart_ids_among(&self, user_id: i32, recipe_ids: &[i32]) -> Result<HashSet<i32>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows: Vec<i32> = ShoppingCarts::find()
            .select_only()
            .column(shopping_carts::Column::RecipeId)
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .filter(shopping_carts::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// Aggregate every ingredient across the user's cart recipes, grouped
    /// by (name, unit) with amounts summed, ordered by name.
    pub async fn shopping_list(&self, user_id: i32) -> Result<Vec<ShoppingListRow>> {
        let rows = RecipeIngredients::find()
            .select_only()
            .column(ingredients::Column::Name)
            .column(ingredients::Column::MeasurementUnit)
            .column_as(recipe_ingredients::Column::Amount.sum(), "total")
            .join(
                JoinType::InnerJoin,
                recipe_ingredients::Relation::Ingredient.def(),
            )
            .join(
                JoinType::InnerJoin,
                recipe_ingredients::Relation::Recipe.def(),
            )
            .join(JoinType::InnerJoin, recipes::Relation::ShoppingCarts.def())
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .group_by(ingredients::Column::Name)
            .group_by(ingredients::Column::MeasurementUnit)
            .order_by_asc(ingredients::Column::Name)
            .into_model::<ShoppingListRow>()
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}
