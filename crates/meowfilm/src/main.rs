mod api;
mod auth;
mod config;
mod database;
mod history;
mod settings;
mod sites;
mod users;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::auth::SessionManager;
use crate::config::Args;
use crate::database::setup_database;
use crate::history::HistoryService;
use crate::settings::SettingsStore;
use crate::sites::SiteService;
use crate::users::UserService;
use crate::utils::init_logger;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);

    let db_path = args.database_path()?;
    info!("使用数据库文件 {}", db_path.display());
    let db = Arc::new(setup_database(&db_path).await?);

    let settings = Arc::new(SettingsStore::new(db.clone()));
    let site_service = SiteService::new(db.clone(), settings.clone());
    let user_service = UserService::new(db.clone(), site_service.clone());
    let history_service = HistoryService::new(db.clone());
    let sessions = Arc::new(SessionManager::new(db.clone(), args.cookie_secure));
    sessions.ensure_default_admin().await?;

    let app = api::router(
        settings,
        Arc::new(site_service),
        Arc::new(user_service),
        Arc::new(history_service),
        sessions,
    );
    let listener = tokio::net::TcpListener::bind(args.bind_address)
        .await
        .with_context(|| format!("监听 {} 失败", args.bind_address))?;
    info!("服务已启动，监听 http://{}", args.bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("收到退出信号，正在关闭");
        })
        .await
        .context("HTTP 服务异常退出")?;
    Ok(())
}
