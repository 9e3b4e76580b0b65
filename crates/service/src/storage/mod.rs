//! Record store implementations
//!
//! Three interchangeable backends for `RecordStore`:
//! - `list_store`: vector scan, insertion-ordered listing
//! - `map_store`: hash map keyed by id, optional JSON snapshot file
//! - `seaorm_store`: relational tables through SeaORM

pub mod list_store;
pub mod map_store;
pub mod seaorm_store;

pub use list_store::ListStore;
pub use map_store::MapStore;
pub use seaorm_store::SeaOrmStore;
