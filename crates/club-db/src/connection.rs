use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection,
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use club_data::Result;

use crate::schema;

/// A thread safe connection to the database.
/// Operations hold the lock for their whole duration,
/// so they never interleave.
#[derive(Debug, Clone)]
pub struct Connection {
    conn: Arc<Mutex<SqliteConnection>>,
}

impl Connection {
    /// Open a connection to an existing database
    pub async fn open(filename: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(filename)?.foreign_keys(true);
        Self::connect(options).await
    }

    /// Open a connection, creating the database file if it is missing
    pub async fn create(filename: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(filename)?
            .create_if_missing(true)
            .foreign_keys(true);
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        debug!(filename = ?options.get_filename(), "opening database");
        let conn = SqliteConnection::connect_with(&options).await?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.conn.lock().await
    }
}

pub struct TestHandle {
    filename: PathBuf,
}

impl TestHandle {
    /// Path of the test database, for opening further connections
    pub fn filename(&self) -> &str {
        self.filename.to_str().unwrap_or_default()
    }
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        let path = Path::new(&self.filename);
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }
}

/// Open a new test database connection.
/// The database will be created on each open and
/// removed when the handle is dropped.
pub async fn open_test() -> (TestHandle, Connection) {
    let filename =
        std::env::temp_dir().join(format!("club_test_{}.sqlite3", rand::random::<u64>()));
    let handle = TestHandle {
        filename: filename.clone(),
    };

    let options = SqliteConnectOptions::new()
        .filename(&filename)
        .create_if_missing(true)
        .foreign_keys(true);
    let conn = Connection::connect(options).await.unwrap();

    // Install the schema
    schema::install(&conn).await.unwrap();

    (handle, conn)
}
