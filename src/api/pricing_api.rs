// ==========================================
// 接送预订系统 - 价格规则 API
// ==========================================
// 职责: 车型价格规则的查询与更新
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::pricing::{PricingRule, PricingRuleUpdate};
use crate::repository::pricing_repo::PricingRepository;

pub struct PricingApi {
    pricing_repo: Arc<PricingRepository>,
}

impl PricingApi {
    pub fn new(pricing_repo: Arc<PricingRepository>) -> Self {
        Self { pricing_repo }
    }

    /// 查询全部价格规则（乘客数下限升序）
    ///
    /// 查询失败时降级为空列表：价格表属于展示数据，
    /// 不能因为一次读失败把整个站点首页打挂。
    pub fn list_rules(&self) -> ApiResult<Vec<PricingRule>> {
        match self.pricing_repo.list_all() {
            Ok(rules) => Ok(rules),
            Err(e) => {
                tracing::warn!("价格规则查询失败，降级为空列表: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// 更新一条价格规则
    pub fn update_rule(&self, id: i64, update: &PricingRuleUpdate) -> ApiResult<usize> {
        // 参数验证
        if update.min_pax < 1 || update.max_pax < update.min_pax {
            return Err(ApiError::InvalidInput(format!(
                "Invalid passenger range: {}..{}",
                update.min_pax, update.max_pax
            )));
        }
        if update.vehicle_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("vehicle_name is required".to_string()));
        }
        if update.one_way_price < 0.0 || update.return_price < 0.0 {
            return Err(ApiError::InvalidInput("Prices must not be negative".to_string()));
        }

        let changes = self.pricing_repo.update(id, update)?;
        Ok(changes)
    }
}
