use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

const DEFAULT_URL: &str = "sqlite:./coopfund.db?mode=rwc";

enum Command {
    Up,
    Down,
    Fresh,
    Status,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None | Some("up") => Some(Self::Up),
            Some("down") => Some(Self::Down),
            Some("fresh") => Some(Self::Fresh),
            Some("status") => Some(Self::Status),
            Some(_) => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(cmd) = Command::parse(args.first().map(String::as_str)) else {
        eprintln!("usage: migration [up|down|fresh|status]");
        std::process::exit(2);
    };

    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let db = Database::connect(&url).await?;

    match cmd {
        Command::Up => Migrator::up(&db, None).await?,
        Command::Down => Migrator::down(&db, None).await?,
        Command::Fresh => Migrator::fresh(&db).await?,
        Command::Status => Migrator::status(&db).await?,
    }

    Ok(())
}
