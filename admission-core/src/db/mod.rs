pub mod factory;
pub mod memory;
pub mod repository;
pub mod session;

pub use factory::{DbConfig, MemoryRepositoryFactory, RepositoryFactory, RepositoryRegistry};
pub use memory::InMemoryApplicationRepository;
pub use repository::{ApplicationRepository, RepositoryError};
pub use session::{SessionProvider, StaticSession};
