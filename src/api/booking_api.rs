// ==========================================
// 接送预订系统 - 预订管理 API
// ==========================================
// 职责: 预订创建/查询/更新、归档与回收站、下单通知
// ==========================================

use chrono::{DateTime, Duration};
use serde_json::Value;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::settings_api::SettingsApi;
use crate::api::settings_defaults::{payment_defaults, PAYMENT_SETTINGS_KEY};
use crate::domain::booking::{Booking, BookingFilter, BookingUpdate, NewBooking, PaymentStatus};
use crate::notify::{
    compose_admin_notification, compose_customer_confirmation, compose_reservation_approved,
    compose_whatsapp_confirmation, Notifier,
};
use crate::repository::booking_repo::BookingRepository;

/// 往返行程的标准提前量：按航班时间倒推 4 小时接机
pub const RETURN_PICKUP_LEAD_HOURS: i64 = 4;

// ==========================================
// BookingApi - 预订管理 API
// ==========================================

/// 预订管理API
///
/// 职责：
/// 1. 创建预订（在线支付开关检查、往返接机时间推导）
/// 2. 预订列表（active/archived/trash 过滤）
/// 3. 部分更新（状态、司机、支付状态等）
/// 4. 归档/回收站生命周期
/// 5. 下单与批准通知
pub struct BookingApi {
    booking_repo: Arc<BookingRepository>,
    settings_api: Arc<SettingsApi>,
    notifier: Arc<dyn Notifier>,
    admin_email: String,
}

impl BookingApi {
    /// 创建新的BookingApi实例
    pub fn new(
        booking_repo: Arc<BookingRepository>,
        settings_api: Arc<SettingsApi>,
        notifier: Arc<dyn Notifier>,
        admin_email: String,
    ) -> Self {
        Self {
            booking_repo,
            settings_api,
            notifier,
            admin_email,
        }
    }

    /// 创建预订
    ///
    /// # 参数
    /// - input: 客户提交的预订请求
    ///
    /// # 返回
    /// - Ok(Booking): 已入库的预订（含推导后的接机时间）
    /// - Err(ApiError): 参数缺失 / 在线支付未开放 / 存储失败
    pub fn create_booking(&self, input: NewBooking) -> ApiResult<Booking> {
        // 参数验证
        if input.customer_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("customer_name is required".to_string()));
        }
        if input.email.trim().is_empty() {
            return Err(ApiError::InvalidInput("email is required".to_string()));
        }
        if input.pickup_location.trim().is_empty() {
            return Err(ApiError::InvalidInput("pickup_location is required".to_string()));
        }
        if input.dropoff_location.trim().is_empty() {
            return Err(ApiError::InvalidInput("dropoff_location is required".to_string()));
        }

        // 在线支付开关：已发布的支付设置合并缺省值后决定
        if input.payment_method.as_deref() == Some("online") {
            let flags = self
                .settings_api
                .get_public_view(PAYMENT_SETTINGS_KEY, &payment_defaults())?;
            let enabled = flags
                .get("enabled")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !enabled {
                return Err(ApiError::BusinessRuleViolation(
                    "Online payments are currently disabled.".to_string(),
                ));
            }
        }

        let pickup_time = derive_pickup_time(&input)?;

        let booking = Booking {
            id: 0,
            customer_name: input.customer_name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.clone(),
            pickup_location: input.pickup_location.trim().to_string(),
            dropoff_location: input.dropoff_location.trim().to_string(),
            flight_time: input.flight_time.clone(),
            pickup_time,
            is_return: input.is_return,
            status: "pending".to_string(),
            hotel_name: input.hotel_name.clone(),
            flight_number: input.flight_number.clone(),
            note: input.note.clone(),
            passenger_count: input.passenger_count.unwrap_or(1),
            price: input.price.clone().unwrap_or_else(|| "0".to_string()),
            payment_status: PaymentStatus::Pending.as_str().to_string(),
            driver_name: None,
            driver_phone: None,
            is_archived: false,
            deleted_at: None,
            created_at: None,
        };

        let id = self.booking_repo.insert(&booking)?;
        // 回读拿到 created_at；读失败时退回内存副本
        let booking = match self.booking_repo.find_by_id(id)? {
            Some(stored) => stored,
            None => Booking { id, ..booking },
        };

        self.send_creation_notifications(&booking);

        tracing::info!(
            event = "BOOKING_CREATED",
            id = booking.id,
            customer = %booking.customer_name,
            pickup_time = %booking.pickup_time,
            "预订已创建"
        );

        Ok(booking)
    }

    /// 按过滤器查询预订列表
    pub fn list_bookings(&self, filter: BookingFilter) -> ApiResult<Vec<Booking>> {
        Ok(self.booking_repo.list(filter)?)
    }

    /// 部分更新预订
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示没有待更新字段或 id 不存在）
    ///
    /// # 说明
    /// 状态改为 approved 时发送预订批准邮件（尽力而为）。
    pub fn update_booking(&self, id: i64, update: &BookingUpdate) -> ApiResult<usize> {
        if update.is_empty() {
            return Ok(0);
        }

        // 支付状态只接受枚举值
        if let Some(ref payment_status) = update.payment_status {
            if PaymentStatus::try_parse(payment_status).is_none() {
                return Err(ApiError::InvalidInput(format!(
                    "Invalid payment_status: {}",
                    payment_status
                )));
            }
        }

        let changes = self.booking_repo.update_fields(id, update)?;

        if let Some(ref driver_name) = update.driver_name {
            tracing::info!(event = "DRIVER_ASSIGNED", id, driver = %driver_name, "已指派司机");
        }
        if let Some(is_archived) = update.is_archived {
            let event = if is_archived { "ARCHIVED" } else { "UNARCHIVED" };
            tracing::info!(event = event, id, "归档状态已变更");
        }
        if let Some(ref payment_status) = update.payment_status {
            tracing::info!(event = "MARK_PAID", id, status = %payment_status, "支付状态已变更");
        }
        tracing::info!(event = "BOOKING_UPDATED", id, changes, "预订已更新");

        // 批准后给客户发确认邮件
        if update.status.as_deref() == Some("approved") && changes > 0 {
            if let Some(booking) = self.booking_repo.find_by_id(id)? {
                let message = compose_reservation_approved(&booking);
                if let Err(e) = self.notifier.send_email(&message) {
                    tracing::warn!(event = "EMAIL_FAILED", id, "批准邮件发送失败: {}", e);
                }
            }
        }

        Ok(changes)
    }

    /// 软删除（移入回收站）
    pub fn trash_booking(&self, id: i64) -> ApiResult<usize> {
        let changes = self.booking_repo.trash(id)?;
        tracing::info!(event = "TRASHED", id, "预订已移入回收站");
        Ok(changes)
    }

    /// 从回收站恢复
    pub fn restore_booking(&self, id: i64) -> ApiResult<usize> {
        let changes = self.booking_repo.restore(id)?;
        tracing::info!(event = "RESTORED", id, "预订已恢复");
        Ok(changes)
    }

    /// 物理删除
    pub fn force_delete_booking(&self, id: i64) -> ApiResult<usize> {
        let changes = self.booking_repo.force_delete(id)?;
        tracing::info!(event = "DELETE_FOREVER", id, "预订已永久删除");
        Ok(changes)
    }

    /// 清空归档区
    pub fn empty_archive(&self) -> ApiResult<usize> {
        let changes = self.booking_repo.empty_archive()?;
        tracing::info!(event = "ARCHIVE_EMPTIED", changes, "归档区已清空");
        Ok(changes)
    }

    // 下单三连发：客户确认、后台提醒、WhatsApp。
    // 任何一路失败都不影响预订本身，只记日志。
    fn send_creation_notifications(&self, booking: &Booking) {
        let customer = compose_customer_confirmation(booking);
        if let Err(e) = self.notifier.send_email(&customer) {
            tracing::warn!(
                event = "EMAIL_FAILED",
                id = booking.id,
                to = %customer.to,
                "客户确认邮件发送失败: {}",
                e
            );
        }

        let admin = compose_admin_notification(booking, &self.admin_email);
        if let Err(e) = self.notifier.send_email(&admin) {
            tracing::warn!(
                event = "EMAIL_FAILED",
                id = booking.id,
                to = %admin.to,
                "后台提醒邮件发送失败: {}",
                e
            );
        }

        if let Some(ref phone) = booking.phone {
            let text = compose_whatsapp_confirmation(booking);
            if let Err(e) = self.notifier.send_whatsapp(phone, &text) {
                tracing::warn!(
                    event = "WHATSAPP_FAILED",
                    id = booking.id,
                    "WhatsApp 确认发送失败: {}",
                    e
                );
            }
        }
    }
}

/// 推导接机时间
///
/// 往返行程且有航班时间时，按航班时间倒推标准提前量；
/// 否则使用客户提交的接机时间。航班时间无法解析时退回
/// 客户提交值，不让一条脏输入卡死下单。
fn derive_pickup_time(input: &NewBooking) -> ApiResult<String> {
    if input.is_return {
        if let Some(ref flight_time) = input.flight_time {
            match DateTime::parse_from_rfc3339(flight_time) {
                Ok(t) => {
                    let pickup = t - Duration::hours(RETURN_PICKUP_LEAD_HOURS);
                    return Ok(pickup.to_rfc3339());
                }
                Err(e) => {
                    tracing::warn!("航班时间无法解析({}): {}", flight_time, e);
                }
            }
        }
    }

    input
        .pickup_time
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidInput("pickup_time is required".to_string()))
}
