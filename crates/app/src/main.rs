use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(telegram) = settings.telegram else {
        tracing::warn!("No telegram settings found, nothing to run");
        return Ok(());
    };
    tracing::info!("Found telegram settings...");

    let timezone: Tz = telegram
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {:?}: {err}", telegram.timezone))?;

    let db = match parse_database(&settings.database).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Err(err);
        }
    };

    let engine = match engine::Engine::builder()
        .database(db)
        .default_currency(&telegram.default_currency)
        .build()
        .await
    {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("failed to build engine from database: {err}");
            return Err(err.into());
        }
    };

    let session_ttl = (telegram.session_ttl_minutes > 0)
        .then(|| Duration::from_secs(telegram.session_ttl_minutes * 60));

    match telegram_bot::Bot::builder()
        .token(&telegram.token)
        .allowed_users(telegram.allowed_users)
        .store(Arc::new(engine))
        .timezone(timezone)
        .page_size(telegram.page_size)
        .session_ttl(session_ttl)
        .monthly_reminder(telegram.monthly_reminder)
        .build()
    {
        Ok(bot) => bot.run().await,
        Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
