pub mod errors;
pub mod models;
pub mod role_repository;
pub mod schema;
pub mod traits;
pub mod user_repository;

pub use errors::UserRepositoryError;
pub use role_repository::RoleRepository;
pub use user_repository::UserRepository;
