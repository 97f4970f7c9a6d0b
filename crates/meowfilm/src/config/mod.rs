use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

const DB_FILE_NAME: &str = "data.db";

fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("meowfilm"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// 监听地址
    #[arg(long, env = "MEOWFILM_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_address: SocketAddr,

    /// 数据目录，数据库默认保存在此
    #[arg(long, env = "MEOWFILM_DATA_DIR", default_value_os_t = default_data_dir())]
    pub data_dir: PathBuf,

    /// 数据库文件，设置后忽略数据目录
    #[arg(long, env = "MEOWFILM_DB_FILE")]
    pub db_file: Option<PathBuf>,

    #[arg(long, env = "MEOWFILM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// 会话 Cookie 是否带 Secure 标记（HTTPS 部署时开启）
    #[arg(long, env = "MEOWFILM_COOKIE_SECURE", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    pub cookie_secure: bool,
}

impl Args {
    /// 数据库文件路径，同时确保所在目录存在
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = self
            .db_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DB_FILE_NAME));
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| format!("创建数据目录 {} 失败", parent.display()))?;
        }
        Ok(path)
    }
}
