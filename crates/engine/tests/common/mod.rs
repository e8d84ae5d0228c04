#![allow(dead_code)]

use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn seed_user(db: &DatabaseConnection, username: &str, balance_minor: i64) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, balance_minor) VALUES (?, ?, ?)",
        vec![username.into(), "password".into(), balance_minor.into()],
    ))
    .await
    .unwrap();
}

pub async fn seed_admin(db: &DatabaseConnection, username: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, is_admin) VALUES (?, ?, TRUE)",
        vec![username.into(), "password".into()],
    ))
    .await
    .unwrap();
}

pub async fn user_balance(db: &DatabaseConnection, username: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT balance_minor FROM users WHERE username = ?",
            vec![username.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "balance_minor").unwrap()
}
