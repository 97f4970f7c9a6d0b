pub use super::auth_tokens::Entity as AuthToken;
pub use super::favorites::Entity as Favorite;
pub use super::play_history::Entity as PlayHistory;
pub use super::search_history::Entity as SearchHistory;
pub use super::settings::Entity as Setting;
pub use super::users::Entity as User;
