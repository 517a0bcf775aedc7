// ==========================================
// 接送预订系统 - 核心库
// ==========================================
// 技术栈: Axum + Rust + SQLite
// 系统定位: 预订站点后端 + 运营管理控制台
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 服务配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 通知层 - 邮件/WhatsApp 文案组装
pub mod notify;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AdminSettingView, Booking, BookingFilter, BookingUpdate, HistoryEntry, NewBooking,
    PaymentStatus, Photo, PricingRule, SettingRecord,
};

// API
pub use api::{BookingApi, MediaApi, PricingApi, RatesApi, SettingsApi, HISTORY_CAP};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "MarmarisTrip 接送预订系统";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
