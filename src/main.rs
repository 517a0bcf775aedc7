// ==========================================
// 接送预订系统 - HTTP 服务主入口
// ==========================================
// 技术栈: Axum + Rust + SQLite
// 系统定位: 预订站点后端 + 运营管理控制台
// ==========================================

use std::sync::Arc;

use transfer_booking::app::{build_router, AppState};
use transfer_booking::config::ServerConfig;
use transfer_booking::logging;

#[tokio::main]
async fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", transfer_booking::APP_NAME);
    tracing::info!("系统版本: {}", transfer_booking::VERSION);
    tracing::info!("==================================================");

    // 读取配置
    let config = ServerConfig::from_env();

    // 生产环境令牌护栏：宁可拒绝启动，不能带开发令牌上线
    if let Err(msg) = config.ensure_production_token() {
        tracing::error!("FATAL: {}", msg);
        std::process::exit(1);
    }

    tracing::info!("使用数据库: {}", config.db_path);
    let port = config.port;

    // 创建AppState
    tracing::info!("正在初始化AppState...");
    let app_state = AppState::new(config).expect("无法初始化AppState");

    tracing::info!("AppState初始化成功");

    // 启动 HTTP 服务
    let app = build_router(Arc::new(app_state));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("端口绑定失败");

    tracing::info!("服务已启动: http://0.0.0.0:{}", port);

    axum::serve(listener, app).await.expect("HTTP 服务异常退出");

    tracing::info!("HTTP 服务已退出");
}
