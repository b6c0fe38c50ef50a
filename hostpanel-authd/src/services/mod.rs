//! gRPC service implementations.

mod rate_limit;
mod users;

pub use rate_limit::AuthRateLimiter;
pub use users::UserServiceImpl;
