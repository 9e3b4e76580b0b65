#![cfg(test)]
use configs::DatabaseConfig;
use sea_orm::DatabaseConnection;

use crate::records::{Student, Teacher};

pub fn ana() -> Student {
    Student { name: "Ana".into(), age: 20, email: "a@x.com".into(), gpa: 3.9 }
}

pub fn student(email: &str) -> Student {
    Student { name: "Bruno".into(), age: 22, email: email.into(), gpa: 3.1 }
}

pub fn marta() -> Teacher {
    Teacher { name: "Marta".into(), age: 45, email: "marta@x.com".into(), subject: "Physics".into() }
}

/// Isolated in-memory SQLite database with the record tables created.
pub async fn memory_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
    let db = models::db::connect_with_config(&cfg).await?;
    models::db::ensure_schema(&db).await?;
    Ok(db)
}
