//! Records module: domain types, store contract and the per-kind service.
//!
//! Store implementations live in `crate::storage`.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{Kind, Record, RecordFields, Student, Teacher};
pub use repository::RecordStore;
pub use service::RecordService;
