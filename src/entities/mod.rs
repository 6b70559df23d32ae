pub mod prelude;

pub mod favorite_recipes;
pub mod followers;
pub mod ingredients;
pub mod recipe_ingredients;
pub mod recipe_tags;
pub mod recipes;
pub mod shopping_carts;
pub mod tags;
pub mod users;
