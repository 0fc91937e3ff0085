pub mod auth;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod stashes;
pub mod users;
pub mod visibility;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
pub use routes::router;
