//! SQLite storage for submitted applications.

mod factory;
mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteApplicationRepository;
