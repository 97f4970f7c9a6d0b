//! 全局设置表中使用的键名

pub const SITE_NAME: &str = "site_name";
pub const DOUBAN_DATA_PROXY: &str = "douban_data_proxy";
pub const DOUBAN_DATA_CUSTOM: &str = "douban_data_custom";
pub const DOUBAN_IMG_PROXY: &str = "douban_img_proxy";
pub const DOUBAN_IMG_CUSTOM: &str = "douban_img_custom";

/// 后台“站点设置”页涉及的键
pub const SITE_SETTING_KEYS: [&str; 5] = [
    SITE_NAME,
    DOUBAN_DATA_PROXY,
    DOUBAN_DATA_CUSTOM,
    DOUBAN_IMG_PROXY,
    DOUBAN_IMG_CUSTOM,
];

pub const VIDEO_SOURCE_SITES: &str = "video_source_sites";
pub const VIDEO_SOURCE_SITE_STATUS: &str = "video_source_site_status";
pub const VIDEO_SOURCE_SITE_HOME: &str = "video_source_site_home";
pub const VIDEO_SOURCE_SITE_SEARCH: &str = "video_source_site_search";
pub const VIDEO_SOURCE_SITE_ORDER: &str = "video_source_site_order";
pub const VIDEO_SOURCE_SITE_AVAILABILITY: &str = "video_source_site_availability";
pub const VIDEO_SOURCE_SITE_ERROR: &str = "video_source_site_error";
pub const VIDEO_SOURCE_SEARCH_ORDER: &str = "video_source_search_order";
pub const VIDEO_SOURCE_SEARCH_COVER_SITE: &str = "video_source_search_cover_site";

/// 全局站点目录涉及的全部键
pub const GLOBAL_SITE_KEYS: [&str; 9] = [
    VIDEO_SOURCE_SITES,
    VIDEO_SOURCE_SITE_STATUS,
    VIDEO_SOURCE_SITE_HOME,
    VIDEO_SOURCE_SITE_SEARCH,
    VIDEO_SOURCE_SITE_ORDER,
    VIDEO_SOURCE_SITE_AVAILABILITY,
    VIDEO_SOURCE_SITE_ERROR,
    VIDEO_SOURCE_SEARCH_ORDER,
    VIDEO_SOURCE_SEARCH_COVER_SITE,
];
