//! SeaORM entities for the record tables plus connection helpers.

pub mod errors;
pub mod db;
pub mod student;
pub mod teacher;

#[cfg(test)]
mod tests;
