//! 视频源站点目录：站点列表与启用、首页、排序、可用性等自定义层的合并与持久化

mod error;
mod merge;
mod model;
mod overlay;
mod reconcile;
mod repository;
mod resolve;
mod search;
mod service;

pub use error::SiteError;
pub use merge::{HomeSiteRow, SiteRow};
pub use model::{sites_from_value, Availability, Site};
pub use overlay::SiteOrder;
pub use resolve::{available_search_keys, import_private_sites};
pub use search::resolve_cover_site;
pub use service::{CheckOutcome, ImportOutcome, SearchSettings, SiteService, UserSites};
