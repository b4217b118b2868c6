use sqlx::Executor;
use tracing::info;

use club_data::Result;

use crate::Connection;

/// Install the database schema. Existing tables are kept.
pub async fn install(conn: &Connection) -> Result<()> {
    let mut conn = conn.lock().await;
    let schema_data = include_str!("../db/schema.sql");
    info!("installing database schema");
    (*conn).execute(schema_data).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection;

    #[tokio::test]
    async fn test_install_twice() {
        let (_handle, conn) = connection::open_test().await;
        // open_test installed the schema already
        install(&conn).await.unwrap();
    }
}
