use crate::entities::prelude::*;
use crate::entities::{favorite_recipes, shopping_carts};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Backstops the handler-level existence checks: a concurrent duplicate
/// favorite or cart insert fails on the index instead of creating a
/// second join row.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_favorite_recipes_user_recipe")
                    .table(FavoriteRecipes)
                    .col(favorite_recipes::Column::UserId)
                    .col(favorite_recipes::Column::RecipeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shopping_carts_user_recipe")
                    .table(ShoppingCarts)
                    .col(shopping_carts::Column::UserId)
                    .col(shopping_carts::Column::RecipeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_shopping_carts_user_recipe")
                    .table(ShoppingCarts)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_favorite_recipes_user_recipe")
                    .table(FavoriteRecipes)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
