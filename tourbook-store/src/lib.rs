pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod memory_repo;
pub mod seed;
pub mod tour_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use memory_repo::MemoryStore;
pub use tour_repo::PgTourRepository;
