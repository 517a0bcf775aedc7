// ==========================================
// 接送预订系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::rates_api::ExchangeRateApiProvider;
use crate::api::{BookingApi, MediaApi, PricingApi, RatesApi, SettingsApi};
use crate::config::ServerConfig;
use crate::db;
use crate::notify::{LogNotifier, Notifier};
use crate::repository::{
    booking_repo::BookingRepository, media_repo::MediaRepository,
    pricing_repo::PricingRepository, settings_repo::SettingsRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，在路由层作为全局状态注入
pub struct AppState {
    /// 服务配置
    pub config: ServerConfig,

    /// 设置管理API（草稿/发布/回滚）
    pub settings_api: Arc<SettingsApi>,

    /// 预订管理API
    pub booking_api: Arc<BookingApi>,

    /// 价格规则API
    pub pricing_api: Arc<PricingApi>,

    /// 媒体API
    pub media_api: Arc<MediaApi>,

    /// 汇率API
    pub rates_api: Arc<RatesApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - config: 服务配置
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接（统一 PRAGMA）
    /// 2. 初始化所有Repository（各自确保自己的表）
    /// 3. 创建所有API实例
    pub fn new(config: ServerConfig) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", config.db_path);

        // 创建数据库连接（共享连接）
        let conn = db::open_sqlite_connection(&config.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let settings_repo = Arc::new(SettingsRepository::new(conn.clone()));
        let booking_repo = Arc::new(BookingRepository::new(conn.clone()));
        let pricing_repo = Arc::new(PricingRepository::new(conn.clone()));
        let media_repo = Arc::new(MediaRepository::new(conn.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let settings_api = Arc::new(SettingsApi::new(settings_repo));

        let notifier: Arc<dyn Notifier> =
            Arc::new(LogNotifier::new(config.notifications_enabled));

        let booking_api = Arc::new(BookingApi::new(
            booking_repo,
            settings_api.clone(),
            notifier,
            config.admin_email.clone(),
        ));

        let pricing_api = Arc::new(PricingApi::new(pricing_repo));
        let media_api = Arc::new(MediaApi::new(media_repo));

        let rates_api = Arc::new(RatesApi::new(Arc::new(ExchangeRateApiProvider::new())));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            config,
            settings_api,
            booking_api,
            pricing_api,
            media_api,
            rates_api,
        })
    }
}
