pub mod keys;
mod site;
mod store;

pub use site::{SiteSettings, SiteSettingsError, SiteSettingsUpdate};
pub use store::{SettingsBatch, SettingsStore};
