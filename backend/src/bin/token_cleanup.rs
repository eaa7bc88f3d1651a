//! Maintenance binary: purges expired password reset tokens. Intended to run
//! from cron; redemption already ignores expired rows, this just keeps the
//! table small.

use gatehouse_backend::{
    config::Config, db::connection::create_pool, repositories::password_resets,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_cleanup=info".into()),
        )
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let deleted_count = password_resets::delete_expired_tokens(&pool).await?;
    if deleted_count > 0 {
        tracing::info!("Deleted {} expired password reset tokens", deleted_count);
    }

    sqlx::query("VACUUM (ANALYZE) password_reset_tokens")
        .execute(pool.as_ref())
        .await?;

    Ok(())
}
