pub mod auth;
pub mod response;

pub use auth::{session_middleware, Session};
pub use response::{ApiResponse, ApiResult};
