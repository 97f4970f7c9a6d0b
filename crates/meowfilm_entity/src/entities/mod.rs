pub mod prelude;

pub mod auth_tokens;
pub mod favorites;
pub mod play_history;
pub mod search_history;
pub mod settings;
pub mod users;
