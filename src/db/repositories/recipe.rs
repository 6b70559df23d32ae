use std::collections::HashMap;

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::entities::{
    ingredients, prelude::*, recipe_ingredients, recipe_tags, recipes, tags,
};

/// Input for a recipe create. Tag/ingredient ids are validated by the
/// handler before they reach the repository.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author_id: i32,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub tag_ids: Vec<i32>,
    /// (ingredient id, amount) pairs
    pub ingredient_amounts: Vec<(i32, i32)>,
}

/// Partial update; a present tag/ingredient list fully replaces the
/// stored association set.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub tag_ids: Option<Vec<i32>>,
    pub ingredient_amounts: Option<Vec<(i32, i32)>>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeListFilter {
    pub author_id: Option<i32>,
    pub tag_slugs: Vec<String>,
    pub favorited_by: Option<i32>,
    pub in_cart_of: Option<i32>,
}

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert the recipe row and its tag/ingredient join rows in one
    /// transaction; a failure on any row leaves nothing behind.
    pub async fn create(&self, new: NewRecipe) -> Result<recipes::Model> {
        let txn = self.conn.begin().await?;

        let now = chrono::Utc::now().to_rfc3339();
        let res = Recipes::insert(recipes::ActiveModel {
            name: Set(new.name),
            author_id: Set(new.author_id),
            text: Set(new.text),
            image: Set(new.image),
            cooking_time: Set(new.cooking_time),
            pub_date: Set(now),
            ..Default::default()
        })
        .exec(&txn)
        .await?;

        let recipe_id = res.last_insert_id;

        if !new.tag_ids.is_empty() {
            let rows: Vec<recipe_tags::ActiveModel> = new
                .tag_ids
                .into_iter()
                .map(|tag_id| recipe_tags::ActiveModel {
                    recipe_id: Set(recipe_id),
                    tag_id: Set(tag_id),
                    ..Default::default()
                })
                .collect();

            RecipeTags::insert_many(rows).exec(&txn).await?;
        }

        if !new.ingredient_amounts.is_empty() {
            let rows: Vec<recipe_ingredients::ActiveModel> = new
                .ingredient_amounts
                .into_iter()
                .map(|(ingredient_id, amount)| recipe_ingredients::ActiveModel {
                    recipe_id: Set(recipe_id),
                    ingredient_id: Set(ingredient_id),
                    amount: Set(amount),
                    ..Default::default()
                })
                .collect();

            RecipeIngredients::insert_many(rows).exec(&txn).await?;
        }

        let recipe = Recipes::find_by_id(recipe_id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created recipe"))?;

        txn.commit().await?;
        Ok(recipe)
    }

    /// Apply a partial update. Association sets are replaced wholesale
    /// (delete then insert) within the same transaction, never diffed.
    pub async fn update(&self, recipe_id: i32, update: RecipeUpdate) -> Result<recipes::Model> {
        let txn = self.conn.begin().await?;

        let recipe = Recipes::find_by_id(recipe_id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Recipe {recipe_id} not found"))?;

        let mut active: recipes::ActiveModel = recipe.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(text) = update.text {
            active.text = Set(text);
        }
        if let Some(image) = update.image {
            active.image = Set(image);
        }
        if let Some(cooking_time) = update.cooking_time {
            active.cooking_time = Set(cooking_time);
        }
        let recipe = active.update(&txn).await?;

        if let Some(tag_ids) = update.tag_ids {
            RecipeTags::delete_many()
                .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
                .exec(&txn)
                .await?;

            if !tag_ids.is_empty() {
                let rows: Vec<recipe_tags::ActiveModel> = tag_ids
                    .into_iter()
                    .map(|tag_id| recipe_tags::ActiveModel {
                        recipe_id: Set(recipe_id),
                        tag_id: Set(tag_id),
                        ..Default::default()
                    })
                    .collect();

                RecipeTags::insert_many(rows).exec(&txn).await?;
            }
        }

        if let Some(pairs) = update.ingredient_amounts {
            RecipeIngredients::delete_many()
                .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
                .exec(&txn)
                .await?;

            if !pairs.is_empty() {
                let rows: Vec<recipe_ingredients::ActiveModel> = pairs
                    .into_iter()
                    .map(|(ingredient_id, amount)| recipe_ingredients::ActiveModel {
                        recipe_id: Set(recipe_id),
                        ingredient_id: Set(ingredient_id),
                        amount: Set(amount),
                        ..Default::default()
                    })
                    .collect();

                RecipeIngredients::insert_many(rows).exec(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(recipe)
    }

    pub async fn delete(&self, recipe_id: i32) -> Result<bool> {
        let result = Recipes::delete_by_id(recipe_id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get(&self, recipe_id: i32) -> Result<Option<recipes::Model>> {
        Ok(Recipes::find_by_id(recipe_id).one(&self.conn).await?)
    }

    /// Filtered page of recipes, newest first, plus the total count.
    pub async fn list(
        &self,
        filter: &RecipeListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<recipes::Model>, u64)> {
        let mut query = Recipes::find().order_by_desc(recipes::Column::PubDate);

        if let Some(author_id) = filter.author_id {
            query = query.filter(recipes::Column::AuthorId.eq(author_id));
        }

        if !filter.tag_slugs.is_empty() {
            query = query
                .join(JoinType::InnerJoin, recipes::Relation::RecipeTags.def())
                .join(JoinType::InnerJoin, recipe_tags::Relation::Tag.def())
                .filter(tags::Column::Slug.is_in(filter.tag_slugs.iter().cloned()))
                .distinct();
        }

        if let Some(user_id) = filter.favorited_by {
            query = query
                .join(
                    JoinType::InnerJoin,
                    recipes::Relation::FavoriteRecipes.def(),
                )
                .filter(crate::entities::favorite_recipes::Column::UserId.eq(user_id));
        }

        if let Some(user_id) = filter.in_cart_of {
            query = query
                .join(JoinType::InnerJoin, recipes::Relation::ShoppingCarts.def())
                .filter(crate::entities::shopping_carts::Column::UserId.eq(user_id));
        }

        let paginator = query.paginate(&self.conn, per_page);
        let count = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((rows, count))
    }

    /// Recipes by the given authors, newest first. Per-author truncation
    /// is done by the caller.
    pub async fn list_by_authors(&self, author_ids: &[i32]) -> Result<Vec<recipes::Model>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Recipes::find()
            .filter(recipes::Column::AuthorId.is_in(author_ids.iter().copied()))
            .order_by_desc(recipes::Column::PubDate)
            .all(&self.conn)
            .await?)
    }

    pub async fn count_by_authors(&self, author_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        let rows = self.list_by_authors(author_ids).await?;

        let mut counts: HashMap<i32, u64> = HashMap::new();
        for recipe in rows {
            *counts.entry(recipe.author_id).or_default() += 1;
        }
        Ok(counts)
    }

    /// Tags of each given recipe, keyed by recipe id.
    pub async fn tags_for_recipes(
        &self,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<tags::Model>>> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = RecipeTags::find()
            .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .find_also_related(Tags)
            .all(&self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<tags::Model>> = HashMap::new();
        for (link, tag) in rows {
            if let Some(tag) = tag {
                map.entry(link.recipe_id).or_default().push(tag);
            }
        }
        Ok(map)
    }

    /// Ingredients of each given recipe with their amounts, keyed by
    /// recipe id.
    pub async fn ingredients_for_recipes(
        &self,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<(ingredients::Model, i32)>>> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = RecipeIngredients::find()
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .find_also_related(Ingredients)
            .all(&self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<(ingredients::Model, i32)>> = HashMap::new();
        for (link, ingredient) in rows {
            if let Some(ingredient) = ingredient {
                map.entry(link.recipe_id)
                    .or_default()
                    .push((ingredient, link.amount));
            }
        }
        Ok(map)
    }
}
