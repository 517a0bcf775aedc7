// ==========================================
// 接送预订系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含业务编排逻辑
// ==========================================

pub mod booking;
pub mod media;
pub mod pricing;
pub mod settings;

// 重导出核心类型
pub use booking::{Booking, BookingFilter, BookingUpdate, NewBooking, PaymentStatus};
pub use media::Photo;
pub use pricing::{PricingRule, PricingRuleUpdate};
pub use settings::{AdminSettingView, HistoryEntry, SettingRecord};
