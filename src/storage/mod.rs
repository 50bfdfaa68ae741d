pub mod catalog;
pub mod class;
pub mod persistence;

pub use catalog::Catalog;
pub use class::{DocumentClass, Record};
pub use persistence::ClassFileStore;
