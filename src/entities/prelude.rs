pub use super::favorite_recipes::Entity as FavoriteRecipes;
pub use super::followers::Entity as Followers;
pub use super::ingredients::Entity as Ingredients;
pub use super::recipe_ingredients::Entity as RecipeIngredients;
pub use super::recipe_tags::Entity as RecipeTags;
pub use super::recipes::Entity as Recipes;
pub use super::shopping_carts::Entity as ShoppingCarts;
pub use super::tags::Entity as Tags;
pub use super::users::Entity as Users;
