use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{ingredients, recipes, tags};

pub mod migrator;
pub mod repositories;

pub use repositories::recipe::{NewRecipe, RecipeListFilter, RecipeUpdate};
pub use repositories::saved::ShoppingListRow;
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn follower_repo(&self) -> repositories::follower::FollowerRepository {
        repositories::follower::FollowerRepository::new(self.conn.clone())
    }

    fn tag_repo(&self) -> repositories::tag::TagRepository {
        repositories::tag::TagRepository::new(self.conn.clone())
    }

    fn ingredient_repo(&self) -> repositories::ingredient::IngredientRepository {
        repositories::ingredient::IngredientRepository::new(self.conn.clone())
    }

    fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    fn saved_repo(&self) -> repositories::saved::SavedRepository {
        repositories::saved::SavedRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, new: NewUser, security: Option<&SecurityConfig>) -> Result<User> {
        self.user_repo().create(new, security).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn list_users(&self, page: u64, per_page: u64) -> Result<(Vec<User>, u64)> {
        self.user_repo().list(page, per_page).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().username_exists(username).await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn verify_user_password(&self, user_id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_password(user_id, password).await
    }

    pub async fn set_user_password(
        &self,
        user_id: i32,
        new_password: &str,
        security: Option<&SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .set_password(user_id, new_password, security)
            .await
    }

    pub async fn issue_auth_token(&self, user_id: i32) -> Result<String> {
        self.user_repo().issue_token(user_id).await
    }

    pub async fn revoke_auth_token(&self, user_id: i32) -> Result<()> {
        self.user_repo().revoke_token(user_id).await
    }

    pub async fn find_user_by_token(&self, token: &str) -> Result<Option<User>> {
        self.user_repo().find_by_token(token).await
    }

    // ========== Follows ==========

    pub async fn is_following(&self, user_id: i32, author_id: i32) -> Result<bool> {
        self.follower_repo().is_following(user_id, author_id).await
    }

    pub async fn follow(&self, user_id: i32, author_id: i32) -> Result<()> {
        self.follower_repo().follow(user_id, author_id).await
    }

    pub async fn unfollow(&self, user_id: i32, author_id: i32) -> Result<bool> {
        self.follower_repo().unfollow(user_id, author_id).await
    }

    pub async fn followed_authors(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<User>, u64)> {
        self.follower_repo()
            .followed_authors(user_id, page, per_page)
            .await
    }

    pub async fn followed_ids_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> Result<HashSet<i32>> {
        self.follower_repo()
            .followed_ids_among(user_id, author_ids)
            .await
    }

    // ========== Tags ==========

    pub async fn create_tag(&self, name: &str, color: &str, slug: &str) -> Result<tags::Model> {
        self.tag_repo().create(name, color, slug).await
    }

    pub async fn list_tags(&self) -> Result<Vec<tags::Model>> {
        self.tag_repo().list().await
    }

    pub async fn get_tag(&self, id: i32) -> Result<Option<tags::Model>> {
        self.tag_repo().get(id).await
    }

    pub async fn get_tags_by_ids(&self, ids: &[i32]) -> Result<Vec<tags::Model>> {
        self.tag_repo().get_by_ids(ids).await
    }

    // ========== Ingredients ==========

    pub async fn create_ingredient(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<ingredients::Model> {
        self.ingredient_repo().create(name, measurement_unit).await
    }

    pub async fn search_ingredients(&self, name: Option<&str>) -> Result<Vec<ingredients::Model>> {
        self.ingredient_repo().search(name).await
    }

    pub async fn get_ingredient(&self, id: i32) -> Result<Option<ingredients::Model>> {
        self.ingredient_repo().get(id).await
    }

    pub async fn get_ingredients_by_ids(&self, ids: &[i32]) -> Result<Vec<ingredients::Model>> {
        self.ingredient_repo().get_by_ids(ids).await
    }

    // ========== Recipes ==========

    pub async fn create_recipe(&self, new: NewRecipe) -> Result<recipes::Model> {
        self.recipe_repo().create(new).await
    }

    pub async fn update_recipe(
        &self,
        recipe_id: i32,
        update: RecipeUpdate,
    ) -> Result<recipes::Model> {
        self.recipe_repo().update(recipe_id, update).await
    }

    pub async fn delete_recipe(&self, recipe_id: i32) -> Result<bool> {
        self.recipe_repo().delete(recipe_id).await
    }

    pub async fn get_recipe(&self, recipe_id: i32) -> Result<Option<recipes::Model>> {
        self.recipe_repo().get(recipe_id).await
    }

    pub async fn list_recipes(
        &self,
        filter: &RecipeListFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<recipes::Model>, u64)> {
        self.recipe_repo().list(filter, page, per_page).await
    }

    pub async fn list_recipes_by_authors(&self, author_ids: &[i32]) -> Result<Vec<recipes::Model>> {
        self.recipe_repo().list_by_authors(author_ids).await
    }

    pub async fn count_recipes_by_authors(&self, author_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        self.recipe_repo().count_by_authors(author_ids).await
    }

    pub async fn tags_for_recipes(
        &self,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<tags::Model>>> {
        self.recipe_repo().tags_for_recipes(recipe_ids).await
    }

    pub async fn ingredients_for_recipes(
        &self,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<(ingredients::Model, i32)>>> {
        self.recipe_repo().ingredients_for_recipes(recipe_ids).await
    }

    // ========== Favorites & shopping cart ==========

    pub async fn is_favorited(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        self.saved_repo().is_favorited(user_id, recipe_id).await
    }

    pub async fn add_favorite(&self, user_id: i32, recipe_id: i32) -> Result<()> {
        self.saved_repo().add_favorite(user_id, recipe_id).await
    }

    pub async fn remove_favorite(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        self.saved_repo().remove_favorite(user_id, recipe_id).await
    }

    pub async fn favorited_ids_among(
        &self,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>> {
        self.saved_repo()
            .favorited_ids_among(user_id, recipe_ids)
            .await
    }

    pub async fn is_in_cart(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        self.saved_repo().is_in_cart(user_id, recipe_id).await
    }

    pub async fn add_to_cart(&self, user_id: i32, recipe_id: i32) -> Result<()> {
        self.saved_repo().add_to_cart(user_id, recipe_id).await
    }

    pub async fn remove_from_cart(&self, user_id: i32, recipe_id: i32) -> Result<bool> {
        self.saved_repo().remove_from_cart(user_id, recipe_id).await
    }

    pub async fn cart_ids_among(&self, user_id: i32, recipe_ids: &[i32]) -> Result<HashSet<i32>> {
        self.saved_repo().cart_ids_among(user_id, recipe_ids).await
    }

    pub async fn shopping_list(&self, user_id: i32) -> Result<Vec<ShoppingListRow>> {
        self.saved_repo().shopping_list(user_id).await
    }
}
