use async_trait::async_trait;

use super::domain::{Record, RecordFields};
use crate::errors::ServiceError;

/// Keyed collection of one record kind.
///
/// Every implementation hands out owned clones and treats each call as one
/// atomic step. Email addresses are unique per store.
#[async_trait]
pub trait RecordStore<F: RecordFields>: Send + Sync {
    /// Insert under a freshly generated id.
    async fn create(&self, fields: F) -> Result<Record<F>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Record<F>, ServiceError>;
    async fn list(&self) -> Result<Vec<Record<F>>, ServiceError>;
    /// Full replace of every mutable field; the id is preserved.
    async fn update(&self, id: &str, fields: F) -> Result<Record<F>, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}

/// Reject `email` if a record other than `except_id` already uses it.
pub(crate) fn ensure_email_free<'a, F, I>(
    records: I,
    email: &str,
    except_id: Option<&str>,
) -> Result<(), ServiceError>
where
    F: RecordFields,
    I: IntoIterator<Item = &'a Record<F>>,
{
    let taken = records
        .into_iter()
        .any(|r| r.email() == email && Some(r.id.as_str()) != except_id);
    if taken {
        return Err(ServiceError::duplicate_email(F::KIND, email));
    }
    Ok(())
}
