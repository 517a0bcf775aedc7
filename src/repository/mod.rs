// ==========================================
// 接送预订系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod booking_repo;
pub mod error;
pub mod media_repo;
pub mod pricing_repo;
pub mod settings_repo;

// 重导出核心仓储
pub use booking_repo::BookingRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use media_repo::MediaRepository;
pub use pricing_repo::PricingRepository;
pub use settings_repo::SettingsRepository;
