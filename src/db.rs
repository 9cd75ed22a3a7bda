//! Global database connection pool.

use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connects the global pool. Called once from the binary entry point.
pub async fn init_db(database_url: String) {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    let pool = Database::connect(options)
        .await
        .expect("Unable to connect to the database.");

    DB_POOL
        .set(pool)
        .expect("init_db() may only be called once.");
}

pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL
        .get()
        .expect("Database pool requested before init_db().")
}
