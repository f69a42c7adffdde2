pub mod bootstrap;
pub mod directory_service;
pub mod entities;
pub mod errors_service;
pub mod password;
pub mod repository;
pub mod util;

pub use bootstrap::*;
pub use directory_service::*;
pub use entities::*;
pub use errors_service::*;
pub use password::*;
