use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use super::domain::{Record, RecordFields};
use super::repository::RecordStore;
use crate::errors::ServiceError;

/// Application service for one record kind.
/// Validates input, delegates to exactly one store call, logs and counts the outcome.
pub struct RecordService<F: RecordFields> {
    store: Arc<dyn RecordStore<F>>,
}

impl<F: RecordFields> Clone for RecordService<F> {
    fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<F: RecordFields> RecordService<F> {
    pub fn new(store: Arc<dyn RecordStore<F>>) -> Self { Self { store } }

    #[instrument(skip_all, fields(kind = F::KIND.as_str()))]
    pub async fn create(&self, fields: F) -> Result<Record<F>, ServiceError> {
        let res = match fields.validate() {
            Ok(()) => self.store.create(fields).await,
            Err(e) => Err(e),
        };
        if let Ok(rec) = &res {
            info!(id = %rec.id, "record created");
        }
        observe::<F, _>("create", &res);
        res
    }

    #[instrument(skip(self), fields(kind = F::KIND.as_str()))]
    pub async fn get(&self, id: &str) -> Result<Record<F>, ServiceError> {
        let res = self.store.get(id).await;
        observe::<F, _>("get", &res);
        res
    }

    #[instrument(skip(self), fields(kind = F::KIND.as_str()))]
    pub async fn list(&self) -> Result<Vec<Record<F>>, ServiceError> {
        let res = self.store.list().await;
        if let Ok(list) = &res {
            debug!(count = list.len(), "records listed");
        }
        observe::<F, _>("list", &res);
        res
    }

    #[instrument(skip(self, fields), fields(kind = F::KIND.as_str()))]
    pub async fn update(&self, id: &str, fields: F) -> Result<Record<F>, ServiceError> {
        let res = match fields.validate() {
            Ok(()) => self.store.update(id, fields).await,
            Err(e) => Err(e),
        };
        if res.is_ok() {
            info!("record updated");
        }
        observe::<F, _>("update", &res);
        res
    }

    #[instrument(skip(self), fields(kind = F::KIND.as_str()))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let res = self.store.delete(id).await;
        if res.is_ok() {
            info!("record deleted");
        }
        observe::<F, _>("delete", &res);
        res
    }
}

fn observe<F: RecordFields, T>(op: &'static str, res: &Result<T, ServiceError>) {
    let outcome = match res {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    match res {
        Err(e @ ServiceError::Storage(_)) => error!(op, error = %e, "record store failure"),
        Err(e) => debug!(op, outcome, error = %e, "record operation rejected"),
        Ok(_) => {}
    }
    common::metrics::observe_operation(F::KIND.as_str(), op, outcome);
}
