use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::records::domain::{Record, RecordFields};
use crate::records::repository::{ensure_email_free, RecordStore};

/// Unindexed in-memory store: a vector scanned on every lookup.
///
/// `list` returns records in insertion order.
pub struct ListStore<F> {
    rows: RwLock<Vec<Record<F>>>,
}

impl<F: RecordFields> ListStore<F> {
    pub fn new() -> Self { Self { rows: RwLock::new(Vec::new()) } }
}

impl<F: RecordFields> Default for ListStore<F> {
    fn default() -> Self { Self::new() }
}

fn position<F>(rows: &[Record<F>], id: &str) -> Option<usize> {
    rows.iter().position(|r| r.id == id)
}

#[async_trait]
impl<F: RecordFields> RecordStore<F> for ListStore<F> {
    async fn create(&self, fields: F) -> Result<Record<F>, ServiceError> {
        let mut rows = self.rows.write().await;
        ensure_email_free(rows.iter(), fields.email(), None)?;
        let rec = Record::new(fields);
        rows.push(rec.clone());
        Ok(rec)
    }

    async fn get(&self, id: &str) -> Result<Record<F>, ServiceError> {
        let rows = self.rows.read().await;
        position(&rows, id)
            .map(|i| rows[i].clone())
            .ok_or_else(|| ServiceError::not_found(F::KIND))
    }

    async fn list(&self) -> Result<Vec<Record<F>>, ServiceError> {
        Ok(self.rows.read().await.clone())
    }

    async fn update(&self, id: &str, fields: F) -> Result<Record<F>, ServiceError> {
        let mut rows = self.rows.write().await;
        let i = position(&rows, id).ok_or_else(|| ServiceError::not_found(F::KIND))?;
        ensure_email_free(rows.iter(), fields.email(), Some(id))?;
        let updated = rows[i].with_fields_replaced(fields);
        rows[i] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let mut rows = self.rows.write().await;
        let i = position(&rows, id).ok_or_else(|| ServiceError::not_found(F::KIND))?;
        rows.remove(i);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::domain::Student;
    use crate::test_support::{ana, student};

    #[tokio::test]
    async fn list_preserves_insertion_order() -> Result<(), ServiceError> {
        let store = ListStore::<Student>::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.create(student(&format!("s{i}@x.com"))).await?.id);
        }
        store.delete(&ids[2]).await?;
        ids.remove(2);
        let listed: Vec<String> = store.list().await?.into_iter().map(|r| r.id).collect();
        assert_eq!(listed, ids);
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_position_and_id() -> Result<(), ServiceError> {
        let store = ListStore::<Student>::new();
        let first = store.create(ana()).await?;
        store.create(student("b@x.com")).await?;
        let updated = store.update(&first.id, Student { age: 30, ..ana() }).await?;
        let listed = store.list().await?;
        assert_eq!(listed[0], updated);
        assert_eq!(listed[0].id, first.id);
        Ok(())
    }
}
