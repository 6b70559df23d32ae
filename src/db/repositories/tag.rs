use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::api::validation::{validate_color, validate_slug};
use crate::entities::{prelude::*, tags};

/// Read-mostly repository; tags are managed operationally, the API only
/// lists them.
pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str, color: &str, slug: &str) -> Result<tags::Model> {
        validate_slug(slug)?;
        validate_color(color)?;

        let active = tags::ActiveModel {
            name: Set(name.to_string()),
            color: Set(color.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        };

        let res = Tags::insert(active).exec(&self.conn).await?;
        let tag = Tags::find_by_id(res.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created tag"))?;

        Ok(tag)
    }

    pub async fn list(&self) -> Result<Vec<tags::Model>> {
        Ok(Tags::find()
            .order_by_asc(tags::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<tags::Model>> {
        Ok(Tags::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<tags::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Tags::find()
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?)
    }
}
