//! 用户：个人设置与后台用户管理

mod error;
pub mod repository;
mod service;
mod settings;

pub use error::UserError;
pub use repository::DeletedRows;
pub use service::{AddUser, UpdateUser, UpdatedUser, UserService, UserSummary};
pub use settings::{SettingsUpdate, SitesSync, UserSettings};
