// ==========================================
// 接送预订系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为调用方可处理的错误
// 说明: 错误文案面向站点前端，保持英文
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 设置发布协议错误
    // ==========================================
    /// publish 时没有可发布的草稿
    #[error("No draft to publish for '{0}'")]
    NoDraftToPublish(String),

    /// rollback 的历史下标越界
    #[error("Invalid version index {index} (history length {history_len})")]
    InvalidHistoryIndex { index: i64, history_len: usize },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 认证错误
    // ==========================================
    #[error("missing_token")]
    MissingToken,

    #[error("forbidden")]
    Forbidden,

    #[error("ADMIN_TOKEN_not_set")]
    TokenNotConfigured,

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为调用方可处理的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            // 连接/锁失败属于“存储不可用”，调用方可以重试
            RepositoryError::DatabaseConnectionError(msg) => ApiError::StorageUnavailable(msg),
            RepositoryError::LockError(msg) => ApiError::StorageUnavailable(msg),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("Unique constraint violated: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("Foreign key violated: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_转换() {
        let repo_err = RepositoryError::NotFound {
            entity: "Booking".to_string(),
            id: "42".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Booking"));
                assert!(msg.contains("42"));
            }
            _ => panic!("Expected NotFound"),
        }

        let repo_err = RepositoryError::LockError("poisoned".to_string());
        let api_err: ApiError = repo_err.into();
        assert!(matches!(api_err, ApiError::StorageUnavailable(_)));
    }

    #[test]
    fn test_错误文案() {
        let err = ApiError::NoDraftToPublish("header".to_string());
        assert_eq!(err.to_string(), "No draft to publish for 'header'");

        let err = ApiError::InvalidHistoryIndex {
            index: 12,
            history_len: 3,
        };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("3"));
    }
}
