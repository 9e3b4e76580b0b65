//! Runtime wiring
//!
//! Builds the student/teacher stores selected by `[storage]` so binaries and
//! tests get ready-to-use services from one call.

use std::{path::Path, sync::Arc};

use configs::{AppConfig, StorageBackend};
use tracing::info;

use crate::errors::ServiceError;
use crate::records::{RecordService, RecordStore, Student, Teacher};
use crate::storage::{ListStore, MapStore, SeaOrmStore};

/// Backends that need no external resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryBackend {
    List,
    Map,
}

/// One service per record kind, each over its own keyspace.
#[derive(Clone)]
pub struct Services {
    pub students: RecordService<Student>,
    pub teachers: RecordService<Teacher>,
}

impl Services {
    pub fn new(students: Arc<dyn RecordStore<Student>>, teachers: Arc<dyn RecordStore<Teacher>>) -> Self {
        Self { students: RecordService::new(students), teachers: RecordService::new(teachers) }
    }

    /// Fresh, empty in-memory stores.
    pub fn in_memory(backend: MemoryBackend) -> Self {
        match backend {
            MemoryBackend::List => Self::new(
                Arc::new(ListStore::<Student>::new()),
                Arc::new(ListStore::<Teacher>::new()),
            ),
            MemoryBackend::Map => Self::new(
                Arc::new(MapStore::<Student>::in_memory()),
                Arc::new(MapStore::<Teacher>::in_memory()),
            ),
        }
    }
}

/// Open the stores configured in `cfg`. The database backend connects and
/// creates missing tables before returning.
pub async fn open_services(cfg: &AppConfig) -> Result<Services, ServiceError> {
    let backend = cfg.storage.backend;
    let services = match backend {
        StorageBackend::List => Services::in_memory(MemoryBackend::List),
        StorageBackend::Map => match cfg.storage.snapshot_dir.as_deref() {
            None => Services::in_memory(MemoryBackend::Map),
            Some(dir) => {
                common::env::ensure_data_dir(dir)
                    .await
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                let dir = Path::new(dir);
                Services::new(
                    Arc::new(MapStore::<Student>::with_snapshot(dir.join("students.json")).await?),
                    Arc::new(MapStore::<Teacher>::with_snapshot(dir.join("teachers.json")).await?),
                )
            }
        },
        StorageBackend::Database => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            models::db::ensure_schema(&db).await?;
            Services::new(
                Arc::new(SeaOrmStore::<Student>::new(db.clone())),
                Arc::new(SeaOrmStore::<Teacher>::new(db)),
            )
        }
    };
    info!(?backend, "record stores ready");
    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use configs::DatabaseConfig;
    use crate::test_support::{ana, marta};

    #[tokio::test]
    async fn database_backend_bootstraps_schema() -> Result<(), anyhow::Error> {
        let mut cfg = AppConfig::default();
        cfg.storage.backend = StorageBackend::Database;
        cfg.database = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };

        let services = open_services(&cfg).await?;
        let s = services.students.create(ana()).await?;
        let t = services.teachers.create(marta()).await?;
        assert_eq!(services.students.get(&s.id).await?.fields, ana());
        assert_eq!(services.teachers.list().await?, vec![t]);
        Ok(())
    }

    #[tokio::test]
    async fn kinds_do_not_share_a_keyspace() -> Result<(), anyhow::Error> {
        let services = Services::in_memory(MemoryBackend::List);
        let s = services.students.create(ana()).await?;
        assert!(matches!(services.teachers.get(&s.id).await, Err(ServiceError::NotFound(_))));
        // same email is fine across kinds
        services.teachers.create(crate::records::Teacher { email: ana().email, ..marta() }).await?;
        Ok(())
    }

    #[tokio::test]
    async fn memory_backends_pick_their_store() -> Result<(), anyhow::Error> {
        let list = Services::in_memory(MemoryBackend::List);
        let first = list.students.create(ana()).await?;
        let second = list.students.create(crate::test_support::student("b@x.com")).await?;
        assert_eq!(list.students.list().await?, vec![first, second]);

        let map = Services::in_memory(MemoryBackend::Map);
        map.teachers.create(marta()).await?;
        assert!(matches!(
            map.teachers.create(marta()).await,
            Err(ServiceError::DuplicateEmail { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn map_backend_with_snapshot_dir() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("roster_runtime_{}", uuid::Uuid::new_v4()));
        let mut cfg = AppConfig::default();
        cfg.storage.snapshot_dir = Some(dir.to_string_lossy().into_owned());

        let services = open_services(&cfg).await?;
        let s = services.students.create(ana()).await?;
        assert!(tokio::fs::metadata(dir.join("students.json")).await.is_ok());

        let reopened = open_services(&cfg).await?;
        assert_eq!(reopened.students.get(&s.id).await?.id, s.id);
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
