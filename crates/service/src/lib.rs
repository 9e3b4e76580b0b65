//! Service layer for student/teacher records.
//! - `records`: domain types, the `RecordStore` contract and `RecordService`.
//! - `storage`: list, map and SeaORM-backed stores.
//! - `runtime`: builds the configured stores.

pub mod errors;
pub mod records;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod storage;
