use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{followers, prelude::*, users};

use super::user::User;

/// Repository for the directed user → author follow relation
pub struct FollowerRepository {
    conn: DatabaseConnection,
}

impl FollowerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn is_following(&self, user_id: i32, author_id: i32) -> Result<bool> {
        let count = Followers::find()
            .filter(followers::Column::UserId.eq(user_id))
            .filter(followers::Column::AuthorId.eq(author_id))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn follow(&self, user_id: i32, author_id: i32) -> Result<()> {
        let active = followers::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        };

        Followers::insert(active).exec(&self.conn).await?;
        Ok(())
    }

    /// Returns whether a relation was actually removed.
    pub async fn unfollow(&self, user_id: i32, author_id: i32) -> Result<bool> {
        let result = Followers::delete_many()
            .filter(followers::Column::UserId.eq(user_id))
            .filter(followers::Column::AuthorId.eq(author_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Page of authors the user follows, ordered by author id, plus the
    /// total count.
    pub async fn followed_authors(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<User>, u64)> {
        let paginator = Users::find()
            .join_rev(JoinType::InnerJoin, followers::Relation::Author.def())
            .filter(followers::Column::UserId.eq(user_id))
            .order_by_asc(users::Column::Id)
            .paginate(&self.conn, per_page);

        let count = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((rows.into_iter().map(User::from).collect(), count))
    }

    /// Of the given author ids, the subset the user follows.
    pub async fn followed_ids_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> Result<std::collections::HashSet<i32>> {
        if author_ids.is_empty() {
            return Ok(std::collections::HashSet::new());
        }

        let rows: Vec<i32> = Followers::find()
            .select_only()
            .column(followers::Column::AuthorId)
            .filter(followers::Column::UserId.eq(user_id))
            .filter(followers::Column::AuthorId.is_in(author_ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().collect())
    }
}
