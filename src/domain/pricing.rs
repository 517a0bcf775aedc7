// ==========================================
// 接送预订系统 - 领域模型: 价格规则
// ==========================================
// 职责: 按乘客数分段的车型价格规则
// ==========================================

use serde::{Deserialize, Serialize};

/// 价格规则
///
/// 每条规则覆盖一个乘客数区间 [min_pax, max_pax]，
/// 站点按乘客数选择车型并展示单程/往返价格。
#[derive(Debug, Clone, Serialize)]
pub struct PricingRule {
    pub id: i64,
    pub min_pax: i64,
    pub max_pax: i64,
    pub vehicle_name: String,
    pub vehicle_image: Option<String>,
    pub one_way_price: f64,
    pub return_price: f64,
    pub vehicle_features: Option<String>,
    pub detail_link: Option<String>,
}

/// 价格规则更新输入
///
/// 管理端只录入单程价；往返价由前端推导后一并提交。
#[derive(Debug, Clone, Deserialize)]
pub struct PricingRuleUpdate {
    pub min_pax: i64,
    pub max_pax: i64,
    pub vehicle_name: String,
    pub one_way_price: f64,
    pub return_price: f64,
    #[serde(default)]
    pub vehicle_features: Option<String>,
}
