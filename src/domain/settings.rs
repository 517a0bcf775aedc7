// ==========================================
// 接送预订系统 - 领域模型: 站点设置
// ==========================================
// 职责: 带草稿/发布/历史的通用设置记录
// 红线: 设置负载为不透明 JSON，领域层不检查其结构
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 时间戳列的存储格式（UTC）
pub const SETTING_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 历史条目
///
/// 某次发布把旧的线上值覆盖之前，为旧值留下的快照。
/// timestamp 使用 RFC 3339 字符串，与历史 JSON 列中的
/// 存量数据保持同一种写法。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub value: Value,
}

/// 设置记录
///
/// 每个逻辑设置键（站点标识、页头配置、支付开关等）对应一条记录。
/// `value` 是公开读取路径可见的已发布值；`draft_value` 是
/// 管理端正在编辑、尚未生效的工作副本，公开路径永远读不到它。
#[derive(Debug, Clone)]
pub struct SettingRecord {
    pub key: String,

    /// 已发布值（可为空：尚未发布过）
    pub value: Option<Value>,

    /// 草稿值（可为空：当前没有待发布的修改）
    pub draft_value: Option<Value>,

    /// 历史快照，最新在前；长度由发布逻辑截断
    pub history: Vec<HistoryEntry>,

    /// 最近一次草稿或发布写入的时刻
    pub updated_at: Option<NaiveDateTime>,

    /// 最近一次发布成功的时刻（首次发布前为空）
    pub published_at: Option<NaiveDateTime>,
}

impl SettingRecord {
    /// 某键从未写入时的空壳记录
    pub fn empty(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            draft_value: None,
            history: Vec::new(),
            updated_at: None,
            published_at: None,
        }
    }
}

/// 管理端视图
///
/// 草稿 + 已发布 + 历史 + 展示版本号的只读投影。
/// version = 历史条数 + 1，仅用于管理界面展示。
#[derive(Debug, Clone, Serialize)]
pub struct AdminSettingView {
    pub key: String,
    pub value: Option<Value>,
    pub draft_value: Option<Value>,
    pub history: Vec<HistoryEntry>,
    pub version: usize,
    pub updated_at: Option<String>,
    pub published_at: Option<String>,
}

impl AdminSettingView {
    /// 从设置记录构建管理端视图
    pub fn from_record(record: SettingRecord) -> Self {
        let version = record.history.len() + 1;
        Self {
            key: record.key,
            value: record.value,
            draft_value: record.draft_value,
            history: record.history,
            version,
            updated_at: record.updated_at.map(|t| t.format(SETTING_TS_FORMAT).to_string()),
            published_at: record
                .published_at
                .map(|t| t.format(SETTING_TS_FORMAT).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record_空壳() {
        let record = SettingRecord::empty("header");
        assert_eq!(record.key, "header");
        assert!(record.value.is_none());
        assert!(record.draft_value.is_none());
        assert!(record.history.is_empty());
        assert!(record.updated_at.is_none());
        assert!(record.published_at.is_none());
    }

    #[test]
    fn test_admin_view_版本号() {
        let mut record = SettingRecord::empty("header");
        assert_eq!(AdminSettingView::from_record(record.clone()).version, 1);

        record.history.push(HistoryEntry {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            value: json!({"siteTitle": "A"}),
        });
        record.history.push(HistoryEntry {
            timestamp: "2026-01-02T00:00:00Z".to_string(),
            value: json!({"siteTitle": "B"}),
        });
        assert_eq!(AdminSettingView::from_record(record).version, 3);
    }

    #[test]
    fn test_history_entry_序列化布局() {
        let entry = HistoryEntry {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            value: json!({"enabled": true}),
        };
        let text = serde_json::to_string(&entry).expect("序列化失败");
        assert!(text.contains("\"timestamp\""));
        assert!(text.contains("\"value\""));

        let back: HistoryEntry = serde_json::from_str(&text).expect("反序列化失败");
        assert_eq!(back, entry);
    }
}
