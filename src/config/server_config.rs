// ==========================================
// 接送预订系统 - 服务配置
// ==========================================
// 职责: 从环境变量读取服务进程配置
// ==========================================

use std::path::PathBuf;

/// 开发用令牌，生产环境禁止使用
pub const DEV_ADMIN_TOKEN: &str = "dev-admin-token";

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 5000;

/// 服务配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 监听端口（PORT）
    pub port: u16,

    /// 数据库文件路径（TRANSFER_BOOKING_DB_PATH 可覆盖）
    pub db_path: String,

    /// 管理端静态令牌（ADMIN_TOKEN）
    pub admin_token: Option<String>,

    /// 运营提醒邮箱（ADMIN_EMAIL）
    pub admin_email: String,

    /// 是否投递通知（DISABLE_NOTIFICATIONS=1 时关闭，测试用）
    pub notifications_enabled: bool,
}

impl ServerConfig {
    /// 从环境变量读取配置
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let admin_token = std::env::var("ADMIN_TOKEN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let admin_email = std::env::var("ADMIN_EMAIL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "info@marmaristrip.com".to_string());

        let notifications_enabled = std::env::var("DISABLE_NOTIFICATIONS")
            .map(|s| s.trim() != "1")
            .unwrap_or(true);

        Self {
            port,
            db_path: get_default_db_path(),
            admin_token,
            admin_email,
            notifications_enabled,
        }
    }

    /// 生产环境令牌护栏
    ///
    /// release 构建下 ADMIN_TOKEN 必须设置且不能是开发令牌；
    /// debug 构建放行，方便本地起服务。
    pub fn ensure_production_token(&self) -> Result<(), String> {
        if cfg!(debug_assertions) {
            return Ok(());
        }
        match self.admin_token.as_deref() {
            None | Some("") => {
                Err("ADMIN_TOKEN must be set to a secure value in production.".to_string())
            }
            Some(DEV_ADMIN_TOKEN) => {
                Err("ADMIN_TOKEN must not be the dev token in production.".to_string())
            }
            Some(_) => Ok(()),
        }
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 TRANSFER_BOOKING_DB_PATH 优先（便于调试/测试/CI）
/// - 开发环境: 用户数据目录/marmaris-transfer-dev/transport.db
/// - 生产环境: 用户数据目录/marmaris-transfer/transport.db
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径
    if let Ok(path) = std::env::var("TRANSFER_BOOKING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 拿不到用户数据目录时退回工作目录
    let mut path = PathBuf::from("./transport.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("marmaris-transfer-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("marmaris-transfer");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("transport.db");
    }

    path.to_string_lossy().to_string()
}
