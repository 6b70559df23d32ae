use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::{ingredients, prelude::*};

pub struct IngredientRepository {
    conn: DatabaseConnection,
}

impl IngredientRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str, measurement_unit: &str) -> Result<ingredients::Model> {
        let active = ingredients::ActiveModel {
            name: Set(name.to_string()),
            measurement_unit: Set(measurement_unit.to_string()),
            ..Default::default()
        };

        let res = Ingredients::insert(active).exec(&self.conn).await?;
        let ingredient = Ingredients::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created ingredient"))?;

        Ok(ingredient)
    }

    /// Name search: prefix matches first, then names that merely contain
    /// the term, each group ordered by name. Without a term, everything
    /// ordered by name.
    pub async fn search(&self, name: Option<&str>) -> Result<Vec<ingredients::Model>> {
        let Some(term) = name.filter(|t| !t.is_empty()) else {
            return Ok(Ingredients::find()
                .order_by_asc(ingredients::Column::Name)
                .all(&self.conn)
                .await?);
        };

        let mut results = Ingredients::find()
            .filter(ingredients::Column::Name.starts_with(term))
            .order_by_asc(ingredients::Column::Name)
            .all(&self.conn)
            .await?;

        let prefix_ids: Vec<i32> = results.iter().map(|i| i.id).collect();

        let containing = Ingredients::find()
            .filter(ingredients::Column::Name.contains(term))
            .filter(ingredients::Column::Id.is_not_in(prefix_ids))
            .order_by_asc(ingredients::Column::Name)
            .all(&self.conn)
            .await?;

        results.extend(containing);
        Ok(results)
    }

    pub async fn get(&self, id: i32) -> Result<Option<ingredients::Model>> {
        Ok(Ingredients::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<ingredients::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Ingredients::find()
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?)
    }
}
