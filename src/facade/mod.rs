pub mod database;

pub use database::DocumentDb;
