// ==========================================
// 接送预订系统 - 领域模型: 媒体文件
// ==========================================
// 职责: 已上传图片的目录条目
// ==========================================

use serde::Serialize;

/// 图片条目
///
/// 实际的压缩/缩放由外部优化器完成，这里只登记结果路径。
#[derive(Debug, Clone, Serialize)]
pub struct Photo {
    pub id: i64,
    pub filename: String,
    pub original_path: Option<String>,
    pub optimized_path: Option<String>,
    pub upload_date: Option<String>,
}
