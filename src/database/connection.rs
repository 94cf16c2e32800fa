use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub type DbPool = PgPool;

pub async fn init_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database pool ready, migrations applied");

    Ok(pool)
}
