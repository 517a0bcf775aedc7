// ==========================================
// 接送预订系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP 路由层调用
// ==========================================

pub mod error;
pub mod booking_api;
pub mod media_api;
pub mod pricing_api;
pub mod rates_api;
pub mod settings_api;
pub mod settings_defaults;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use booking_api::BookingApi;
pub use media_api::MediaApi;
pub use pricing_api::PricingApi;
pub use rates_api::{RateProvider, RateQuote, RatesApi, RatesResponse};
pub use settings_api::{SettingsApi, HISTORY_CAP};
