pub mod app_config;
pub mod client_repo;
pub mod database;
pub mod memory_repo;
pub mod reservation_repo;
pub mod template_repo;
pub mod vacation_repo;

pub use app_config::{Config, StorageBackend};
pub use client_repo::StoreClientRepository;
pub use database::DbClient;
pub use memory_repo::InMemoryStore;
pub use reservation_repo::StoreReservationRepository;
pub use template_repo::StoreTemplateRepository;
pub use vacation_repo::StoreVacationRepository;
