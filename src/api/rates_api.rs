// ==========================================
// 接送预订系统 - 汇率 API
// ==========================================
// 职责: GBP 基准汇率的抓取与进程内缓存
// 说明: 供应商挂掉时先用过期缓存顶着，最后才退到硬编码近似值
// ==========================================

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// 缓存有效期（分钟）
pub const RATES_TTL_MINUTES: i64 = 30;

/// 免费汇率接口
const PROVIDER_ENDPOINT: &str = "https://api.exchangerate-api.com/v4/latest/GBP";

/// 无缓存且供应商失败时的兜底近似值
const FALLBACK_EUR: f64 = 1.15;
const FALLBACK_USD: f64 = 1.25;
const FALLBACK_TRY: f64 = 40.0;

/// 一次抓取到的 GBP 基准汇率
#[derive(Debug, Clone, Copy)]
pub struct RateQuote {
    pub eur: f64,
    pub usd: f64,
    pub try_lira: f64,
}

/// 汇率抓取接口
///
/// 留出接缝便于测试替换；生产实现走 exchangerate-api.com。
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_gbp_rates(&self) -> anyhow::Result<RateQuote>;
}

/// exchangerate-api.com 抓取实现
pub struct ExchangeRateApiProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl ExchangeRateApiProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: PROVIDER_ENDPOINT.to_string(),
        }
    }
}

impl Default for ExchangeRateApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    async fn fetch_gbp_rates(&self) -> anyhow::Result<RateQuote> {
        let body: serde_json::Value = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let rate = |code: &str| -> anyhow::Result<f64> {
            body["rates"][code]
                .as_f64()
                .ok_or_else(|| anyhow::anyhow!("missing rate {}", code))
        };

        Ok(RateQuote {
            eur: rate("EUR")?,
            usd: rate("USD")?,
            try_lira: rate("TRY")?,
        })
    }
}

/// 汇率响应（字段名与前端约定一致）
#[derive(Debug, Clone, Serialize)]
pub struct RatesResponse {
    pub base: String,
    /// 毫秒时间戳
    pub timestamp: i64,
    #[serde(rename = "ttlMinutes")]
    pub ttl_minutes: i64,
    pub rates: RatesTable,
    #[serde(skip_serializing_if = "is_false")]
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatesTable {
    #[serde(rename = "EUR")]
    pub eur: f64,
    #[serde(rename = "USD")]
    pub usd: f64,
    #[serde(rename = "TRY")]
    pub try_lira: f64,
}

fn is_false(v: &bool) -> bool {
    !*v
}

struct CachedRates {
    fetched_at_ms: i64,
    response: RatesResponse,
}

// ==========================================
// RatesApi - 汇率 API
// ==========================================

pub struct RatesApi {
    provider: Arc<dyn RateProvider>,
    ttl_minutes: i64,
    cache: Mutex<Option<CachedRates>>,
}

impl RatesApi {
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self::with_ttl(provider, RATES_TTL_MINUTES)
    }

    /// 指定缓存有效期（分钟）；部署可调
    pub fn with_ttl(provider: Arc<dyn RateProvider>, ttl_minutes: i64) -> Self {
        Self {
            provider,
            ttl_minutes,
            cache: Mutex::new(None),
        }
    }

    /// 获取汇率
    ///
    /// 永远返回一个可用的响应：
    /// 1. 缓存未过期 -> 直接返回
    /// 2. 抓取成功 -> 刷新缓存
    /// 3. 抓取失败但有缓存 -> 返回过期缓存并标记 stale
    /// 4. 抓取失败且无缓存 -> 硬编码近似值兜底
    pub async fn get_rates(&self) -> RatesResponse {
        let now_ms = Utc::now().timestamp_millis();
        let ttl_ms = self.ttl_minutes * 60 * 1000;

        if let Ok(guard) = self.cache.lock() {
            if let Some(ref cached) = *guard {
                if now_ms - cached.fetched_at_ms < ttl_ms {
                    return cached.response.clone();
                }
            }
        }

        match self.provider.fetch_gbp_rates().await {
            Ok(quote) => {
                tracing::info!(event = "FX_REFRESHED", "汇率已刷新");
                let response = RatesResponse {
                    base: "GBP".to_string(),
                    timestamp: now_ms,
                    ttl_minutes: self.ttl_minutes,
                    rates: RatesTable {
                        eur: quote.eur,
                        usd: quote.usd,
                        try_lira: quote.try_lira,
                    },
                    stale: false,
                    error: None,
                };
                if let Ok(mut guard) = self.cache.lock() {
                    *guard = Some(CachedRates {
                        fetched_at_ms: now_ms,
                        response: response.clone(),
                    });
                }
                response
            }
            Err(e) => {
                tracing::warn!(event = "FX_FETCH_FAILED", "汇率抓取失败: {}", e);

                // 过期缓存也比硬编码近似值强
                if let Ok(guard) = self.cache.lock() {
                    if let Some(ref cached) = *guard {
                        let mut response = cached.response.clone();
                        response.stale = true;
                        return response;
                    }
                }

                RatesResponse {
                    base: "GBP".to_string(),
                    timestamp: now_ms,
                    ttl_minutes: 0,
                    rates: RatesTable {
                        eur: FALLBACK_EUR,
                        usd: FALLBACK_USD,
                        try_lira: FALLBACK_TRY,
                    },
                    stale: true,
                    error: Some("Provider failed".to_string()),
                }
            }
        }
    }
}
