// ==========================================
// 接送预订系统 - 应用层
// ==========================================
// 职责: 应用状态装配与 HTTP 集成
// ==========================================

pub mod auth;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
