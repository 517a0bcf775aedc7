// ==========================================
// 接送预订系统 - HTTP 路由层
// ==========================================
// 职责: axum 路由注册与瘦处理函数，业务全部委托 API 层
// 约定: 错误统一为 { "error": ... } 信封
// ==========================================

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::settings_defaults::{
    header_defaults, payment_defaults, site_identity_defaults, HEADER_KEY, PAYMENT_SETTINGS_KEY,
    SITE_IDENTITY_KEY,
};
use crate::app::auth;
use crate::app::state::AppState;
use crate::domain::booking::{BookingFilter, BookingUpdate, NewBooking};
use crate::domain::pricing::PricingRuleUpdate;

/// 组装完整路由表
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ==========================================
        // 预订
        // ==========================================
        .route("/api/bookings", post(create_booking).get(list_bookings))
        .route("/api/bookings/archive/empty", delete(empty_archive))
        .route(
            "/api/bookings/{id}",
            put(update_booking).delete(trash_booking),
        )
        .route("/api/bookings/{id}/restore", put(restore_booking))
        .route("/api/bookings/{id}/force", delete(force_delete_booking))
        // ==========================================
        // 汇率
        // ==========================================
        .route("/api/rates", get(get_rates))
        // ==========================================
        // 价格规则
        // ==========================================
        .route("/api/pricing-rules", get(list_pricing_rules))
        .route("/api/pricing-rules/{id}", put(update_pricing_rule))
        // ==========================================
        // 站点标识设置（专用端点）
        // ==========================================
        .route("/api/site-settings", get(public_site_settings))
        .route(
            "/api/admin/site-settings",
            get(admin_site_settings).put(save_site_settings_draft),
        )
        .route("/api/admin/site-settings/publish", post(publish_site_settings))
        // ==========================================
        // 通用设置（草稿/发布/回滚协议）
        // ==========================================
        .route("/api/settings", get(list_settings))
        .route(
            "/api/settings/{key}",
            get(public_setting_view).put(update_setting_raw),
        )
        // 静态段优先于 {key} 捕获，payments 固定键安全
        .route(
            "/api/admin/settings/payments",
            get(get_payment_settings).put(update_payment_settings),
        )
        .route("/api/admin/settings/{key}", get(admin_setting_view))
        .route("/api/admin/settings/{key}/draft", put(save_setting_draft))
        .route("/api/admin/settings/{key}/publish", post(publish_setting))
        .route("/api/admin/settings/{key}/revert", post(revert_setting_draft))
        .route("/api/admin/settings/{key}/rollback", post(rollback_setting))
        // ==========================================
        // 媒体 / 健康检查 / 认证
        // ==========================================
        .route("/api/media", get(list_media).post(register_media))
        .route("/api/health", get(health))
        .route("/api/auth/me", get(auth_me))
        .with_state(state)
}

/// ApiError -> HTTP 响应
fn error_response(err: ApiError) -> Response {
    let status = match &err {
        ApiError::NoDraftToPublish(_)
        | ApiError::InvalidHistoryIndex { .. }
        | ApiError::InvalidInput(_)
        | ApiError::BusinessRuleViolation(_) => StatusCode::BAD_REQUEST,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::MissingToken => StatusCode::UNAUTHORIZED,
        ApiError::Forbidden => StatusCode::FORBIDDEN,
        ApiError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ApiError::TokenNotConfigured
        | ApiError::DatabaseError(_)
        | ApiError::InternalError(_)
        | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

// ==========================================
// 预订处理函数
// ==========================================

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewBooking>,
) -> Response {
    match state.booking_api.create_booking(input) {
        Ok(booking) => Json(json!({
            "message": "Booking created successfully",
            "data": booking,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct BookingListParams {
    status: Option<String>,
}

async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingListParams>,
) -> Response {
    let filter = BookingFilter::parse(params.status.as_deref());
    match state.booking_api.list_bookings(filter) {
        Ok(bookings) => Json(json!({ "message": "success", "data": bookings })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn update_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<BookingUpdate>,
) -> Response {
    if update.is_empty() {
        return Json(json!({ "message": "No changes" })).into_response();
    }
    match state.booking_api.update_booking(id, &update) {
        Ok(changes) => {
            Json(json!({ "message": "Booking updated", "changes": changes })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn trash_booking(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.booking_api.trash_booking(id) {
        Ok(changes) => {
            Json(json!({ "message": "Moved to trash", "changes": changes })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn restore_booking(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match state.booking_api.restore_booking(id) {
        Ok(changes) => {
            Json(json!({ "message": "Restored from trash", "changes": changes })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn force_delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    match state.booking_api.force_delete_booking(id) {
        Ok(changes) => {
            Json(json!({ "message": "Permanently deleted", "changes": changes })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn empty_archive(State(state): State<Arc<AppState>>) -> Response {
    match state.booking_api.empty_archive() {
        Ok(changes) => {
            Json(json!({ "message": "Archive emptied", "changes": changes })).into_response()
        }
        Err(e) => error_response(e),
    }
}

// ==========================================
// 汇率处理函数
// ==========================================

async fn get_rates(State(state): State<Arc<AppState>>) -> Response {
    Json(state.rates_api.get_rates().await).into_response()
}

// ==========================================
// 价格规则处理函数
// ==========================================

async fn list_pricing_rules(State(state): State<Arc<AppState>>) -> Response {
    match state.pricing_api.list_rules() {
        Ok(rules) => Json(json!({ "message": "success", "data": rules })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn update_pricing_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<PricingRuleUpdate>,
) -> Response {
    match state.pricing_api.update_rule(id, &update) {
        Ok(changes) => {
            Json(json!({ "message": "Rule updated", "changes": changes })).into_response()
        }
        Err(e) => error_response(e),
    }
}

// ==========================================
// 站点标识设置处理函数
// ==========================================

async fn public_site_settings(State(state): State<Arc<AppState>>) -> Response {
    match state
        .settings_api
        .get_public_view(SITE_IDENTITY_KEY, &site_identity_defaults())
    {
        Ok(merged) => Json(merged).into_response(),
        Err(e) => error_response(e),
    }
}

async fn admin_site_settings(State(state): State<Arc<AppState>>) -> Response {
    match state.settings_api.get_admin_view(SITE_IDENTITY_KEY) {
        // 站点标识的管理端响应不带历史明细，只带版本号
        Ok(view) => Json(json!({
            "key": view.key,
            "value": view.value,
            "draft_value": view.draft_value,
            "version": view.version,
            "updated_at": view.updated_at,
            "published_at": view.published_at,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn save_site_settings_draft(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<Value>,
) -> Response {
    match state.settings_api.save_draft(SITE_IDENTITY_KEY, draft) {
        Ok(()) => Json(json!({ "message": "Draft saved", "changes": 1 })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn publish_site_settings(State(state): State<Arc<AppState>>) -> Response {
    match state.settings_api.publish(SITE_IDENTITY_KEY) {
        Ok(published_at) => Json(json!({
            "message": "Site settings published",
            "published_at": published_at,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

// ==========================================
// 通用设置处理函数
// ==========================================

async fn list_settings(State(state): State<Arc<AppState>>) -> Response {
    match state.settings_api.list_settings() {
        Ok(settings) => Json(json!({ "message": "success", "data": settings })).into_response(),
        Err(e) => error_response(e),
    }
}

/// 各设置键的公开端缺省值；未登记的键用空对象兜底
fn defaults_for_key(key: &str) -> Value {
    match key {
        SITE_IDENTITY_KEY => site_identity_defaults(),
        HEADER_KEY => header_defaults(),
        PAYMENT_SETTINGS_KEY => payment_defaults(),
        _ => json!({}),
    }
}

async fn public_setting_view(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Response {
    match state.settings_api.get_public_view(&key, &defaults_for_key(&key)) {
        Ok(merged) => Json(merged).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct RawSettingBody {
    value: Value,
}

async fn update_setting_raw(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<RawSettingBody>,
) -> Response {
    match state.settings_api.update_raw(&key, body.value) {
        Ok(()) => Json(json!({ "message": "Setting updated" })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn admin_setting_view(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Response {
    match state.settings_api.get_admin_view(&key) {
        Ok(view) => Json(json!({ "message": "success", "data": view })).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct DraftBody {
    draft_value: Value,
}

async fn save_setting_draft(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<DraftBody>,
) -> Response {
    match state.settings_api.save_draft(&key, body.draft_value) {
        Ok(()) => {
            Json(json!({ "message": "Draft saved successfully", "changes": 1 })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn publish_setting(State(state): State<Arc<AppState>>, Path(key): Path<String>) -> Response {
    match state.settings_api.publish(&key) {
        Ok(published_at) => Json(json!({
            "message": "Settings published successfully",
            "published_at": published_at,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn revert_setting_draft(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Response {
    match state.settings_api.revert_draft(&key) {
        Ok(()) => Json(json!({ "message": "Draft changes discarded." })).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct RollbackBody {
    #[serde(rename = "versionIndex")]
    version_index: i64,
}

async fn rollback_setting(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<RollbackBody>,
) -> Response {
    match state
        .settings_api
        .rollback_to_draft(&key, body.version_index)
    {
        Ok(()) => Json(json!({
            "message": "Version restored to draft. Review and publish to apply.",
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

// ==========================================
// 支付设置处理函数（固定键 + 直写路径）
// ==========================================

async fn get_payment_settings(State(state): State<Arc<AppState>>) -> Response {
    match state
        .settings_api
        .get_public_view(PAYMENT_SETTINGS_KEY, &payment_defaults())
    {
        Ok(merged) => Json(merged).into_response(),
        Err(e) => error_response(e),
    }
}

async fn update_payment_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Value>,
) -> Response {
    match state
        .settings_api
        .write_published(PAYMENT_SETTINGS_KEY, settings)
    {
        Ok(()) => {
            tracing::info!(event = "PAYMENT_SETTINGS_UPDATED", "支付设置已更新");
            Json(json!({ "message": "Payment settings updated", "changes": 1 })).into_response()
        }
        Err(e) => error_response(e),
    }
}

// ==========================================
// 媒体 / 健康检查 / 认证处理函数
// ==========================================

async fn list_media(State(state): State<Arc<AppState>>) -> Response {
    match state.media_api.list_photos() {
        Ok(photos) => Json(json!({ "message": "success", "data": photos })).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct RegisterMediaBody {
    filename: String,
    optimized_path: String,
}

/// 外部图片优化器处理完后回调登记
async fn register_media(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterMediaBody>,
) -> Response {
    match state
        .media_api
        .register_photo(&body.filename, &body.optimized_path)
    {
        Ok(id) => Json(json!({
            "message": "Image registered",
            "id": id,
            "url": format!("/uploads/{}", body.filename),
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn health() -> Response {
    Json(json!({
        "ok": true,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}

async fn auth_me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match auth::check_admin(&state.config, &headers) {
        Ok(()) => Json(json!({
            "user": { "id": "admin", "name": "Admin" },
            "role": "admin",
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}
