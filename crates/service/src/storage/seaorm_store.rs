use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, QueryFilter, Set, SqlErr, TransactionError, TransactionTrait,
};

use crate::errors::ServiceError;
use crate::records::domain::{Record, RecordFields, Student, Teacher};
use crate::records::repository::RecordStore;

/// Binds a record kind to its SeaORM entity.
pub trait TableMapping: RecordFields {
    type Entity: EntityTrait<Model = Self::Row>;
    type Row: IntoActiveModel<Self::ActiveModel> + FromQueryResult + Send + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send;

    fn id_column() -> <Self::Entity as EntityTrait>::Column;
    fn email_column() -> <Self::Entity as EntityTrait>::Column;
    /// Every column `Set`, id included.
    fn to_active(record: &Record<Self>) -> Self::ActiveModel;
    fn from_row(row: Self::Row) -> Result<Record<Self>, ServiceError>;
}

fn age_from_column(age: i64) -> Result<u32, ServiceError> {
    u32::try_from(age).map_err(|_| ServiceError::Storage(format!("age column out of range: {age}")))
}

impl TableMapping for Student {
    type Entity = models::student::Entity;
    type Row = models::student::Model;
    type ActiveModel = models::student::ActiveModel;

    fn id_column() -> models::student::Column { models::student::Column::Id }
    fn email_column() -> models::student::Column { models::student::Column::Email }

    fn to_active(record: &Record<Self>) -> Self::ActiveModel {
        models::student::ActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.fields.name.clone()),
            age: Set(i64::from(record.fields.age)),
            email: Set(record.fields.email.clone()),
            gpa: Set(record.fields.gpa),
        }
    }

    fn from_row(row: Self::Row) -> Result<Record<Self>, ServiceError> {
        Ok(Record {
            id: row.id,
            fields: Student { name: row.name, age: age_from_column(row.age)?, email: row.email, gpa: row.gpa },
        })
    }
}

impl TableMapping for Teacher {
    type Entity = models::teacher::Entity;
    type Row = models::teacher::Model;
    type ActiveModel = models::teacher::ActiveModel;

    fn id_column() -> models::teacher::Column { models::teacher::Column::Id }
    fn email_column() -> models::teacher::Column { models::teacher::Column::Email }

    fn to_active(record: &Record<Self>) -> Self::ActiveModel {
        models::teacher::ActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.fields.name.clone()),
            age: Set(i64::from(record.fields.age)),
            email: Set(record.fields.email.clone()),
            subject: Set(record.fields.subject.clone()),
        }
    }

    fn from_row(row: Self::Row) -> Result<Record<Self>, ServiceError> {
        Ok(Record {
            id: row.id,
            fields: Teacher { name: row.name, age: age_from_column(row.age)?, email: row.email, subject: row.subject },
        })
    }
}

/// Relational store over one table.
///
/// Mutations run inside `TransactionTrait::transaction`: commit on `Ok`,
/// rollback on `Err`, and the connection goes back to the pool either way.
pub struct SeaOrmStore<F> {
    db: DatabaseConnection,
    _kind: PhantomData<fn() -> F>,
}

impl<F: TableMapping> SeaOrmStore<F> {
    pub fn new(db: DatabaseConnection) -> Self { Self { db, _kind: PhantomData } }
}

fn storage_err(e: DbErr) -> ServiceError { ServiceError::Storage(e.to_string()) }

/// A unique violation that slipped past the pre-check (concurrent writer).
fn write_err<F: RecordFields>(email: &str, e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::duplicate_email(F::KIND, email),
        _ => storage_err(e),
    }
}

fn flatten(e: TransactionError<ServiceError>) -> ServiceError {
    match e {
        TransactionError::Connection(e) => storage_err(e),
        TransactionError::Transaction(e) => e,
    }
}

#[async_trait]
impl<F: TableMapping> RecordStore<F> for SeaOrmStore<F> {
    async fn create(&self, fields: F) -> Result<Record<F>, ServiceError> {
        let record = Record::new(fields);
        self.db
            .transaction::<_, Record<F>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let email = record.email().to_string();
                    let taken = F::Entity::find()
                        .filter(F::email_column().eq(email.as_str()))
                        .one(txn)
                        .await
                        .map_err(storage_err)?;
                    if taken.is_some() {
                        return Err(ServiceError::duplicate_email(F::KIND, email));
                    }
                    F::to_active(&record).insert(txn).await.map_err(|e| write_err::<F>(&email, e))?;
                    Ok(record)
                })
            })
            .await
            .map_err(flatten)
    }

    async fn get(&self, id: &str) -> Result<Record<F>, ServiceError> {
        let row = F::Entity::find()
            .filter(F::id_column().eq(id))
            .one(&self.db)
            .await
            .map_err(storage_err)?;
        match row {
            Some(row) => F::from_row(row),
            None => Err(ServiceError::not_found(F::KIND)),
        }
    }

    async fn list(&self) -> Result<Vec<Record<F>>, ServiceError> {
        let rows = F::Entity::find().all(&self.db).await.map_err(storage_err)?;
        rows.into_iter().map(F::from_row).collect()
    }

    async fn update(&self, id: &str, fields: F) -> Result<Record<F>, ServiceError> {
        let id = id.to_string();
        self.db
            .transaction::<_, Record<F>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let row = F::Entity::find()
                        .filter(F::id_column().eq(id.as_str()))
                        .one(txn)
                        .await
                        .map_err(storage_err)?
                        .ok_or_else(|| ServiceError::not_found(F::KIND))?;
                    let current = F::from_row(row)?;

                    let email = fields.email().to_string();
                    let taken = F::Entity::find()
                        .filter(F::email_column().eq(email.as_str()))
                        .filter(F::id_column().ne(id.as_str()))
                        .one(txn)
                        .await
                        .map_err(storage_err)?;
                    if taken.is_some() {
                        return Err(ServiceError::duplicate_email(F::KIND, email));
                    }

                    let updated = current.with_fields_replaced(fields);
                    F::to_active(&updated).update(txn).await.map_err(|e| write_err::<F>(&email, e))?;
                    Ok(updated)
                })
            })
            .await
            .map_err(flatten)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let res = F::Entity::delete_many()
            .filter(F::id_column().eq(id))
            .exec(&self.db)
            .await
            .map_err(storage_err)?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found(F::KIND));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::domain::Kind;
    use crate::test_support::{ana, marta, memory_db, student};

    #[tokio::test]
    async fn student_table_contract() -> Result<(), anyhow::Error> {
        let store = SeaOrmStore::<Student>::new(memory_db().await?);

        let created = store.create(ana()).await?;
        assert_eq!(store.get(&created.id).await?, created);

        let updated = store.update(&created.id, Student { age: 21, gpa: 3.95, ..ana() }).await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(store.get(&created.id).await?.fields.gpa, 3.95);

        store.delete(&created.id).await?;
        assert!(matches!(store.get(&created.id).await, Err(ServiceError::NotFound(Kind::Student))));
        assert!(store.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_rejected_and_rolled_back() -> Result<(), anyhow::Error> {
        let store = SeaOrmStore::<Student>::new(memory_db().await?);
        let a = store.create(ana()).await?;
        let b = store.create(student("b@x.com")).await?;

        assert!(matches!(store.create(ana()).await, Err(ServiceError::DuplicateEmail { .. })));
        assert!(matches!(
            store.update(&b.id, Student { email: a.fields.email.clone(), ..b.fields.clone() }).await,
            Err(ServiceError::DuplicateEmail { .. })
        ));
        assert_eq!(store.get(&b.id).await?, b);
        assert_eq!(store.list().await?.len(), 2);

        // keeping one's own email is fine
        store.update(&a.id, Student { name: "Ana Maria".into(), ..ana() }).await?;
        Ok(())
    }

    #[tokio::test]
    async fn missing_ids_leave_table_unchanged() -> Result<(), anyhow::Error> {
        let db = memory_db().await?;
        let store = SeaOrmStore::<Teacher>::new(db);
        store.create(marta()).await?;

        assert!(matches!(store.get("nope").await, Err(ServiceError::NotFound(Kind::Teacher))));
        assert!(matches!(store.update("nope", marta()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(store.delete("nope").await, Err(ServiceError::NotFound(_))));
        assert_eq!(store.list().await?.len(), 1);
        Ok(())
    }
}
