// ==========================================
// 接送预订系统 - 领域模型: 预订
// ==========================================
// 职责: 预订实体、创建/更新输入、列表过滤器
// ==========================================

use serde::{Deserialize, Serialize};

/// 支付状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Failed",
        }
    }

    /// 校验用解析：只接受三个合法值
    pub fn try_parse(s: &str) -> Option<PaymentStatus> {
        match s.trim() {
            "Pending" => Some(PaymentStatus::Pending),
            "Paid" => Some(PaymentStatus::Paid),
            "Failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// 预订实体
///
/// 时间字段（flight_time/pickup_time/created_at/deleted_at）保持
/// 客户端提交的 ISO 8601 文本原样存储，服务端只在推导接机时间时解析。
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: i64,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub flight_time: Option<String>,
    pub pickup_time: String,
    pub is_return: bool,
    pub status: String,
    pub hotel_name: Option<String>,
    pub flight_number: Option<String>,
    pub note: Option<String>,
    pub passenger_count: i64,
    pub price: String,
    pub payment_status: String,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub is_archived: bool,
    pub deleted_at: Option<String>,
    pub created_at: Option<String>,
}

/// 创建预订的请求体
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub customer_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(default)]
    pub flight_time: Option<String>,
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub is_return: bool,
    #[serde(default)]
    pub hotel_name: Option<String>,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub passenger_count: Option<i64>,
    #[serde(default)]
    pub price: Option<String>,
    /// "online" 或 "arrival"（缺省按到付处理）
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// 预订的部分更新
///
/// 只更新出现的字段，与管理端表格的单元格编辑对应。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingUpdate {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_phone: Option<String>,
}

impl BookingUpdate {
    /// 是否没有任何待更新字段
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.note.is_none()
            && self.price.is_none()
            && self.payment_status.is_none()
            && self.is_archived.is_none()
            && self.driver_name.is_none()
            && self.driver_phone.is_none()
    }
}

/// 预订列表过滤器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    /// 未归档且未删除
    Active,
    /// 已归档且未删除
    Archived,
    /// 回收站（已软删除）
    Trash,
    /// 所有未删除的预订
    All,
}

impl BookingFilter {
    /// 解析查询参数；未知取值按 All 处理
    pub fn parse(s: Option<&str>) -> BookingFilter {
        match s {
            Some("active") => BookingFilter::Active,
            Some("archived") => BookingFilter::Archived,
            Some("trash") => BookingFilter::Trash,
            _ => BookingFilter::All,
        }
    }
}
