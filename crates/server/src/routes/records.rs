use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use common::types::Message;
use service::records::{Record, RecordFields, RecordService};

use crate::errors::JsonApiError;

/// Routes for one record kind, e.g. `/students/register/`, `/students/`, `/students/:id`.
pub fn routes<F: RecordFields>(svc: RecordService<F>) -> Router {
    let base = format!("/{}", F::KIND.plural());
    Router::new()
        .route(&format!("{base}/register/"), post(create::<F>))
        .route(&format!("{base}/"), get(list::<F>))
        .route(
            &format!("{base}/:id"),
            get(get_one::<F>).put(update::<F>).delete(delete_one::<F>),
        )
        .with_state(svc)
}

/// Create a record; any `id` in the body is ignored.
pub async fn create<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    payload: Result<Json<F>, JsonRejection>,
) -> Result<Json<Record<F>>, JsonApiError> {
    let Json(fields) = payload?;
    Ok(Json(svc.create(fields).await?))
}

pub async fn list<F: RecordFields>(
    State(svc): State<RecordService<F>>,
) -> Result<Json<Vec<Record<F>>>, JsonApiError> {
    Ok(Json(svc.list().await?))
}

pub async fn get_one<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    Path(id): Path<String>,
) -> Result<Json<Record<F>>, JsonApiError> {
    Ok(Json(svc.get(&id).await?))
}

/// Full replace of every field; the body must carry all of them.
pub async fn update<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    Path(id): Path<String>,
    payload: Result<Json<F>, JsonRejection>,
) -> Result<Json<Record<F>>, JsonApiError> {
    let Json(fields) = payload?;
    Ok(Json(svc.update(&id, fields).await?))
}

pub async fn delete_one<F: RecordFields>(
    State(svc): State<RecordService<F>>,
    Path(id): Path<String>,
) -> Result<Json<Message>, JsonApiError> {
    svc.delete(&id).await?;
    Ok(Json(Message::new(format!("{} deleted successfully", F::KIND))))
}
