use engine::Money;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "coopfund={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no [server] section in settings, nothing to run");
        return Ok(());
    };

    let db = connect_database(&server.database).await?;

    let mut builder = engine::Engine::builder().database(db.clone());
    if let Some(threshold) = server.transfer_review_threshold_minor {
        builder = builder.transfer_review_threshold(Money::new(threshold));
    }
    let engine = builder.build().await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind, server.port)).await?;
    server::run_with_listener(engine, db, listener).await?;

    Ok(())
}

async fn connect_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, AnyError> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
