use std::{collections::HashMap, path::{Path, PathBuf}};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::records::domain::{Record, RecordFields};
use crate::records::repository::{ensure_email_free, RecordStore};

/// Hash-map store keyed by record id, optionally snapshotted to a JSON file.
///
/// With a snapshot path the map is loaded at startup and rewritten after every
/// successful mutation. A failed write rolls the in-memory change back, so
/// memory and file never disagree about what was acknowledged.
pub struct MapStore<F> {
    inner: RwLock<HashMap<String, Record<F>>>,
    snapshot: Option<PathBuf>,
}

impl<F: RecordFields> MapStore<F> {
    /// Purely in-memory map; contents are lost on restart.
    pub fn in_memory() -> Self {
        Self { inner: RwLock::new(HashMap::new()), snapshot: None }
    }

    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn with_snapshot<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        let map: HashMap<String, Record<F>> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("corrupt snapshot {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<String, Record<F>> = HashMap::new();
                write_snapshot(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(ServiceError::Storage(e.to_string())),
        };
        info!(kind = F::KIND.as_str(), path = %file_path.display(), records = map.len(), "map store loaded");

        Ok(Self { inner: RwLock::new(map), snapshot: Some(file_path) })
    }

    /// Persist the map if a snapshot path is configured. Called with the write lock held.
    async fn save(&self, map: &HashMap<String, Record<F>>) -> Result<(), ServiceError> {
        match &self.snapshot {
            Some(path) => write_snapshot(path, map).await,
            None => Ok(()),
        }
    }
}

/// Write to a sibling temp file and rename over the target.
async fn write_snapshot<F: RecordFields>(
    path: &Path,
    map: &HashMap<String, Record<F>>,
) -> Result<(), ServiceError> {
    let data = serde_json::to_vec(map).map_err(|e| ServiceError::Storage(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
    fs::rename(&tmp, path).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl<F: RecordFields> RecordStore<F> for MapStore<F> {
    async fn create(&self, fields: F) -> Result<Record<F>, ServiceError> {
        let mut map = self.inner.write().await;
        ensure_email_free(map.values(), fields.email(), None)?;
        let rec = Record::new(fields);
        map.insert(rec.id.clone(), rec.clone());
        if let Err(e) = self.save(&map).await {
            map.remove(&rec.id);
            warn!(kind = F::KIND.as_str(), error = %e, "snapshot write failed; create rolled back");
            return Err(e);
        }
        Ok(rec)
    }

    async fn get(&self, id: &str) -> Result<Record<F>, ServiceError> {
        let map = self.inner.read().await;
        map.get(id).cloned().ok_or_else(|| ServiceError::not_found(F::KIND))
    }

    async fn list(&self) -> Result<Vec<Record<F>>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.values().cloned().collect())
    }

    async fn update(&self, id: &str, fields: F) -> Result<Record<F>, ServiceError> {
        let mut map = self.inner.write().await;
        let current = map.get(id).cloned().ok_or_else(|| ServiceError::not_found(F::KIND))?;
        ensure_email_free(map.values(), fields.email(), Some(id))?;
        let updated = current.with_fields_replaced(fields);
        map.insert(updated.id.clone(), updated.clone());
        if let Err(e) = self.save(&map).await {
            map.insert(current.id.clone(), current);
            warn!(kind = F::KIND.as_str(), error = %e, "snapshot write failed; update rolled back");
            return Err(e);
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        let removed = map.remove(id).ok_or_else(|| ServiceError::not_found(F::KIND))?;
        if let Err(e) = self.save(&map).await {
            map.insert(removed.id.clone(), removed);
            warn!(kind = F::KIND.as_str(), error = %e, "snapshot write failed; delete rolled back");
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::domain::{Student, Teacher};
    use crate::test_support::{ana, marta, student};

    fn tmp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("roster_map_store_{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn map_store_crud_persists() -> Result<(), anyhow::Error> {
        let path = tmp_path("students.json");
        let store = MapStore::<Student>::with_snapshot(&path).await?;

        // initially empty, file created
        assert_eq!(store.list().await?.len(), 0);
        assert!(fs::metadata(&path).await.is_ok());

        let a = store.create(ana()).await?;
        let b = store.create(student("b@x.com")).await?;
        store.update(&a.id, Student { age: 21, ..ana() }).await?;
        store.delete(&b.id).await?;

        // reload from disk
        let reloaded = MapStore::<Student>::with_snapshot(&path).await?;
        let entries = reloaded.list().await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, a.id);
        assert_eq!(entries[0].fields.age, 21);

        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_reported() -> Result<(), anyhow::Error> {
        let path = tmp_path("teachers.json");
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, b"{not json").await?;
        let res = MapStore::<Teacher>::with_snapshot(&path).await;
        assert!(matches!(res, Err(ServiceError::Storage(_))));
        let _ = fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_snapshot_write_rolls_back() -> Result<(), anyhow::Error> {
        let path = tmp_path("teachers.json");
        let store = MapStore::<Teacher>::with_snapshot(&path).await?;
        let kept = store.create(marta()).await?;

        // pull the directory out from under the store so the next write fails
        fs::remove_dir_all(path.parent().unwrap()).await?;

        let other = Teacher { email: "other@x.com".into(), ..marta() };
        assert!(matches!(store.create(other).await, Err(ServiceError::Storage(_))));
        assert!(matches!(store.delete(&kept.id).await, Err(ServiceError::Storage(_))));
        let renamed = Teacher { subject: "Chemistry".into(), ..marta() };
        assert!(matches!(store.update(&kept.id, renamed).await, Err(ServiceError::Storage(_))));

        assert_eq!(store.get(&kept.id).await?, kept);
        let listed = store.list().await?;
        assert_eq!(listed, vec![kept]);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_admit_one_email_owner() -> Result<(), anyhow::Error> {
        let store = std::sync::Arc::new(MapStore::<Student>::in_memory());
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..64 {
            let store = store.clone();
            tasks.spawn(async move { store.create(ana()).await });
        }

        let mut created = 0;
        let mut duplicates = 0;
        while let Some(res) = tasks.join_next().await {
            match res? {
                Ok(_) => created += 1,
                Err(ServiceError::DuplicateEmail { .. }) => duplicates += 1,
                Err(e) => return Err(e.into()),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(duplicates, 63);
        assert_eq!(store.list().await?.len(), 1);
        Ok(())
    }
}
