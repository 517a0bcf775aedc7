// ==========================================
// 接送预订系统 - 媒体 API
// ==========================================
// 职责: 已上传图片目录的查询与登记
// 说明: 图片压缩/缩放由外部优化器完成，这里只管登记结果
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::media::Photo;
use crate::repository::media_repo::MediaRepository;

pub struct MediaApi {
    media_repo: Arc<MediaRepository>,
}

impl MediaApi {
    pub fn new(media_repo: Arc<MediaRepository>) -> Self {
        Self { media_repo }
    }

    /// 按上传时间倒序列出全部图片
    pub fn list_photos(&self) -> ApiResult<Vec<Photo>> {
        Ok(self.media_repo.list_all()?)
    }

    /// 登记一张优化完成的图片
    pub fn register_photo(&self, filename: &str, optimized_path: &str) -> ApiResult<i64> {
        if filename.trim().is_empty() {
            return Err(ApiError::InvalidInput("filename is required".to_string()));
        }
        if optimized_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("optimized_path is required".to_string()));
        }

        let id = self.media_repo.insert(filename, optimized_path)?;
        tracing::info!(event = "MEDIA_REGISTERED", id, filename = %filename, "图片已登记");
        Ok(id)
    }
}
