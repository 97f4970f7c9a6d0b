mod error;
mod extract;
pub mod password;
mod session;

pub use error::AuthError;
pub use extract::{AdminUser, CurrentUser, MaybeUser};
pub use session::{token_from_headers, SessionManager, SESSION_COOKIE};
