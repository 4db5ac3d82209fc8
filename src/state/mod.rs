pub mod repository;

pub use repository::{FileStateRepository, StateRepository};
