pub mod config;
pub mod docs;
pub mod error;
pub mod model;
pub mod server;
pub mod service;
pub mod storage;
pub mod validation;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use model::{NewUser, User, UserId, UserPayload};
pub use server::UserRegistryServer;
pub use service::UserService;
