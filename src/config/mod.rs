// ==========================================
// 接送预订系统 - 配置层
// ==========================================
// 职责: 服务进程配置（端口、数据库路径、令牌、通知开关）
// ==========================================

pub mod server_config;

pub use server_config::{get_default_db_path, ServerConfig};
