mod error;
mod favorite;
mod play;
mod search;
mod service;

pub use error::HistoryError;
pub use favorite::{Favorite, NewFavorite};
pub use play::{NewPlayRecord, PlayRecord};
pub use service::{HistoryService, FAVORITES_DEFAULT_LIMIT, PLAY_HISTORY_DEFAULT_LIMIT};
