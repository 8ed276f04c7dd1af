mod error;
mod handlers;
mod middleware;
mod routes;

pub use error::AppError;
pub use middleware::{extract_bearer_token, CurrentUser};
pub use routes::{auth_routes, private_routes, public_routes, AppState};
