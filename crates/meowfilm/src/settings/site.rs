//! 站点名称与豆瓣数据/图片代理设置

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use utoipa::ToSchema;

use super::keys;
use super::store::SettingsStore;

const DEFAULT_DOUBAN_DATA_PROXY: &str = "direct";
const DEFAULT_DOUBAN_IMG_PROXY: &str = "direct-browser";

#[derive(Error, Debug)]
pub enum SiteSettingsError {
    #[error("参数无效")]
    ProxyRequired,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub site_name: String,
    pub douban_data_proxy: String,
    pub douban_data_custom: String,
    pub douban_img_proxy: String,
    pub douban_img_custom: String,
}

/// 一次站点设置提交；站点名称为空时保持原值
#[derive(Debug, Clone, Default)]
pub struct SiteSettingsUpdate {
    pub site_name: String,
    pub douban_data_proxy: String,
    pub douban_data_custom: String,
    pub douban_img_proxy: String,
    pub douban_img_custom: String,
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

impl SiteSettings {
    pub async fn load(store: &SettingsStore) -> Result<Self> {
        Ok(Self {
            site_name: store.get(keys::SITE_NAME).await?,
            douban_data_proxy: or_default(store.get(keys::DOUBAN_DATA_PROXY).await?, DEFAULT_DOUBAN_DATA_PROXY),
            douban_data_custom: store.get(keys::DOUBAN_DATA_CUSTOM).await?,
            douban_img_proxy: or_default(store.get(keys::DOUBAN_IMG_PROXY).await?, DEFAULT_DOUBAN_IMG_PROXY),
            douban_img_custom: store.get(keys::DOUBAN_IMG_CUSTOM).await?,
        })
    }

    pub async fn save(store: &SettingsStore, update: SiteSettingsUpdate) -> Result<Self> {
        let update = SiteSettingsUpdate {
            site_name: update.site_name.trim().to_string(),
            douban_data_proxy: update.douban_data_proxy.trim().to_string(),
            douban_data_custom: update.douban_data_custom.trim().to_string(),
            douban_img_proxy: update.douban_img_proxy.trim().to_string(),
            douban_img_custom: update.douban_img_custom.trim().to_string(),
        };
        if update.douban_data_proxy.is_empty() || update.douban_img_proxy.is_empty() {
            return Err(SiteSettingsError::ProxyRequired.into());
        }
        let before = store.version();
        store
            .update(&keys::SITE_SETTING_KEYS, |batch| {
                if !update.site_name.is_empty() {
                    batch.set(keys::SITE_NAME, update.site_name);
                }
                batch.set(keys::DOUBAN_DATA_PROXY, update.douban_data_proxy);
                batch.set(keys::DOUBAN_DATA_CUSTOM, update.douban_data_custom);
                batch.set(keys::DOUBAN_IMG_PROXY, update.douban_img_proxy);
                batch.set(keys::DOUBAN_IMG_CUSTOM, update.douban_img_custom);
                Ok(())
            })
            .await?;
        if store.version() != before {
            info!("站点设置已更新");
        }
        Self::load(store).await
    }
}
