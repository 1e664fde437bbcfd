mod middleware;
mod secret;
mod token;

pub use middleware::{AuthError, RequireAdmin, RequireAuth};
pub use secret::{hash_secret, verify_secret};
pub use token::{generate_token, parse_token};
