// ==========================================
// 接送预订系统 - 设置管理 API
// ==========================================
// 职责: 站点设置的草稿/发布/回滚协议与历史维护
// 说明: 站点标识、页头配置、支付开关都是同一套协议的实例，
//       只是键和缺省值不同
// ==========================================

use chrono::{NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::settings::{AdminSettingView, HistoryEntry, SETTING_TS_FORMAT};
use crate::repository::settings_repo::SettingsRepository;

/// 历史快照保留上限
///
/// 发布时超出上限的最旧条目被丢弃，最新条目永远保留。
pub const HISTORY_CAP: usize = 10;

// ==========================================
// SettingsApi - 设置管理 API
// ==========================================

/// 设置管理API
///
/// 职责：
/// 1. 草稿保存与撤销（saveDraft / revertDraft）
/// 2. 发布与历史归档（publish）
/// 3. 历史版本回滚到草稿（rollbackToDraft）
/// 4. 管理端/公开端读投影（getAdminView / getPublicView）
pub struct SettingsApi {
    settings_repo: Arc<SettingsRepository>,

    // 四个写操作都是整行读-改-写序列，交错执行会破坏历史的
    // 截断与排序（两个并发 publish 会各自基于同一份旧历史截断）。
    // 读操作不走这把锁。
    write_lock: Mutex<()>,
}

impl SettingsApi {
    /// 创建新的SettingsApi实例
    pub fn new(settings_repo: Arc<SettingsRepository>) -> Self {
        Self {
            settings_repo,
            write_lock: Mutex::new(()),
        }
    }

    /// 保存草稿
    ///
    /// # 参数
    /// - key: 设置键
    /// - value: 草稿值（不透明 JSON，不检查结构）
    ///
    /// # 说明
    /// 记录不存在时隐式创建；已发布值与历史不受影响。
    /// 重复保存同一个值得到同一个状态（幂等）。
    pub fn save_draft(&self, key: &str, value: Value) -> ApiResult<()> {
        validate_key(key)?;

        let _guard = self.lock_writes()?;
        let mut record = self.settings_repo.get_or_default(key)?;
        record.draft_value = Some(value);
        record.updated_at = Some(now());
        self.settings_repo.put(&record)?;

        Ok(())
    }

    /// 发布草稿
    ///
    /// # 返回
    /// - Ok(String): 新的发布时刻
    /// - Err(ApiError::NoDraftToPublish): 没有待发布的草稿，状态不变
    ///
    /// # 说明
    /// 唯一会增长历史、唯一会改变已发布值的操作：
    /// 1. 旧的已发布值（若存在）带时间戳插到历史最前，历史截断到上限
    /// 2. 草稿晋升为已发布值，草稿清空
    /// 3. 刷新 updated_at / published_at
    /// 首次发布（旧值为空）不产生历史条目。
    pub fn publish(&self, key: &str) -> ApiResult<String> {
        validate_key(key)?;

        let _guard = self.lock_writes()?;
        let mut record = self.settings_repo.get_or_default(key)?;

        let draft = record
            .draft_value
            .take()
            .ok_or_else(|| ApiError::NoDraftToPublish(key.to_string()))?;

        if let Some(previous) = record.value.take() {
            record.history.insert(
                0,
                HistoryEntry {
                    timestamp: Utc::now().to_rfc3339(),
                    value: previous,
                },
            );
            record.history.truncate(HISTORY_CAP);
        }

        record.value = Some(draft);
        let stamp = now();
        record.updated_at = Some(stamp);
        record.published_at = Some(stamp);
        self.settings_repo.put(&record)?;

        tracing::info!(event = "SETTINGS_PUBLISHED", key = %key, "设置已发布");

        Ok(stamp.format(SETTING_TS_FORMAT).to_string())
    }

    /// 撤销草稿
    ///
    /// 丢弃未发布的修改；没有草稿时为平凡成功。
    /// 不创建新记录，也不触碰已发布值与历史。
    pub fn revert_draft(&self, key: &str) -> ApiResult<()> {
        validate_key(key)?;

        let _guard = self.lock_writes()?;
        let Some(mut record) = self.settings_repo.get(key)? else {
            return Ok(());
        };
        if record.draft_value.is_none() {
            return Ok(());
        }
        record.draft_value = None;
        self.settings_repo.put(&record)?;

        Ok(())
    }

    /// 回滚历史版本到草稿
    ///
    /// # 参数
    /// - version_index: 历史下标（0 为最近被覆盖的版本）
    ///
    /// # 说明
    /// 只把历史快照复制进草稿槽，线上值与历史都不动；
    /// 管理员审阅后需要再调用 publish 才会生效。
    /// 这个两步设计是有意的：回滚前可以先预览。
    pub fn rollback_to_draft(&self, key: &str, version_index: i64) -> ApiResult<()> {
        validate_key(key)?;

        let _guard = self.lock_writes()?;
        let mut record = self
            .settings_repo
            .get(key)?
            .ok_or_else(|| ApiError::NotFound(format!("Setting '{}'", key)))?;

        let history_len = record.history.len();
        if version_index < 0 || version_index as usize >= history_len {
            return Err(ApiError::InvalidHistoryIndex {
                index: version_index,
                history_len,
            });
        }

        record.draft_value = Some(record.history[version_index as usize].value.clone());
        self.settings_repo.put(&record)?;

        Ok(())
    }

    /// 管理端视图
    ///
    /// 从未写过的键返回空壳视图（version=1，全空字段），不算错误。
    pub fn get_admin_view(&self, key: &str) -> ApiResult<AdminSettingView> {
        validate_key(key)?;

        let record = self.settings_repo.get_or_default(key)?;
        Ok(AdminSettingView::from_record(record))
    }

    /// 公开端视图
    ///
    /// 已发布值对 defaults 做浅合并（同名键以已发布值为准），
    /// 草稿永远不参与。没有已发布值时原样返回 defaults。
    pub fn get_public_view(&self, key: &str, defaults: &Value) -> ApiResult<Value> {
        validate_key(key)?;

        let published = self.settings_repo.get(key)?.and_then(|r| r.value);
        match published {
            Some(published) => Ok(shallow_merge(defaults, &published)),
            None => Ok(defaults.clone()),
        }
    }

    /// 聚合读取：键 -> 已发布值
    pub fn list_settings(&self) -> ApiResult<Map<String, Value>> {
        let mut out = Map::new();
        for record in self.settings_repo.list_all()? {
            out.insert(record.key, record.value.unwrap_or(Value::Null));
        }
        Ok(out)
    }

    /// 直写已发布值（不走草稿，不产生历史）
    ///
    /// 旧版管理端的原始写入路径；只刷新 updated_at。
    pub fn update_raw(&self, key: &str, value: Value) -> ApiResult<()> {
        validate_key(key)?;

        let _guard = self.lock_writes()?;
        let mut record = self.settings_repo.get_or_default(key)?;
        record.value = Some(value);
        record.updated_at = Some(now());
        self.settings_repo.put(&record)?;

        Ok(())
    }

    /// 直写并标记为已发布（支付开关走的路径）
    ///
    /// 与 update_raw 的区别仅在于同时刷新 published_at。
    pub fn write_published(&self, key: &str, value: Value) -> ApiResult<()> {
        validate_key(key)?;

        let _guard = self.lock_writes()?;
        let mut record = self.settings_repo.get_or_default(key)?;
        record.value = Some(value);
        let stamp = now();
        record.updated_at = Some(stamp);
        record.published_at = Some(stamp);
        self.settings_repo.put(&record)?;

        Ok(())
    }

    fn lock_writes(&self) -> ApiResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| ApiError::StorageUnavailable(format!("write lock poisoned: {}", e)))
    }
}

fn validate_key(key: &str) -> ApiResult<()> {
    if key.trim().is_empty() {
        return Err(ApiError::InvalidInput("Setting key must not be empty".to_string()));
    }
    Ok(())
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// 浅合并：published 的顶层键覆盖 defaults 的同名键
///
/// 只做一层键级覆盖，不递归；非对象负载整体以已发布值为准。
fn shallow_merge(defaults: &Value, published: &Value) -> Value {
    match (defaults, published) {
        (Value::Object(d), Value::Object(p)) => {
            let mut out = d.clone();
            for (k, v) in p {
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        _ => published.clone(),
    }
}
