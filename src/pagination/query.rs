use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QuerySelect, Select};

use super::Sliceable;

/// A lazily evaluated sea-orm query used as a pagination source.
///
/// `total` runs a `COUNT` over the query and `fetch` runs it with
/// `OFFSET`/`LIMIT`, so only the requested page is ever loaded.
pub struct QuerySource<'db, E, C>
where
    E: EntityTrait,
{
    select: Select<E>,
    db: &'db C,
}

impl<'db, E, C> QuerySource<'db, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    pub fn new(select: Select<E>, db: &'db C) -> Self {
        Self { select, db }
    }
}

impl<'db, E, C> Sliceable for QuerySource<'db, E, C>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'db,
    C: ConnectionTrait,
{
    type Item = E::Model;
    type Error = DbErr;

    async fn total(&self) -> Result<u64, DbErr> {
        self.select.clone().count(self.db).await
    }

    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<E::Model>, DbErr> {
        self.select
            .clone()
            .offset(offset)
            .limit(limit)
            .all(self.db)
            .await
    }
}
