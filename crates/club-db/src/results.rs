use sqlx::{sqlite::SqliteConnection, FromRow, QueryBuilder, Sqlite};

use club_data::{Error, Result};

#[derive(Debug, Clone, FromRow)]
pub struct Id<T> {
    pub id: T,
}

/// Fail with a reference error unless `id` exists in `table`.
pub(crate) async fn check_reference(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: u32,
    entity: &'static str,
    field: &'static str,
) -> Result<()> {
    let found: Option<Id<u32>> =
        QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {} WHERE id = ", table))
            .push_bind(id)
            .build_query_as()
            .fetch_optional(&mut *conn)
            .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(Error::Reference { entity, field, id }),
    }
}

/// Map unique constraint violations reported by the store
pub(crate) trait OnUnique<T> {
    fn on_unique(self, err: impl FnOnce() -> Error) -> Result<T>;
}

impl<T> OnUnique<T> for std::result::Result<T, sqlx::Error> {
    fn on_unique(self, err: impl FnOnce() -> Error) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(err()),
            Err(e) => Err(e.into()),
        }
    }
}
