// ==========================================
// 接送预订系统 - 管理端认证
// ==========================================
// 职责: 静态 Bearer 令牌校验
// 说明: 单一静态令牌方案；生产换用真实认证前的过渡实现
// ==========================================

use axum::http::{header, HeaderMap};

use crate::api::error::ApiError;
use crate::config::ServerConfig;

/// 从请求头提取 Bearer 令牌
pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// 校验管理端令牌
///
/// # 返回
/// - Err(MissingToken): 请求没带令牌
/// - Err(TokenNotConfigured): 服务端未配置 ADMIN_TOKEN
/// - Err(Forbidden): 令牌不匹配
pub fn check_admin(config: &ServerConfig, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = extract_bearer(headers).ok_or(ApiError::MissingToken)?;

    let admin_token = config
        .admin_token
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::TokenNotConfigured)?;

    if token != admin_token {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::server_config::DEFAULT_PORT;

    fn test_config(token: Option<&str>) -> ServerConfig {
        ServerConfig {
            port: DEFAULT_PORT,
            db_path: ":memory:".to_string(),
            admin_token: token.map(str::to_string),
            admin_email: "info@marmaristrip.com".to_string(),
            notifications_enabled: false,
        }
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().expect("非法头"));
        headers
    }

    #[test]
    fn test_令牌匹配() {
        let config = test_config(Some("secret"));
        let headers = headers_with("Bearer secret");
        assert!(check_admin(&config, &headers).is_ok());
    }

    #[test]
    fn test_缺少令牌() {
        let config = test_config(Some("secret"));
        let result = check_admin(&config, &HeaderMap::new());
        assert!(matches!(result, Err(ApiError::MissingToken)));
    }

    #[test]
    fn test_令牌不匹配() {
        let config = test_config(Some("secret"));
        let headers = headers_with("Bearer wrong");
        assert!(matches!(
            check_admin(&config, &headers),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn test_服务端未配置令牌() {
        let config = test_config(None);
        let headers = headers_with("Bearer whatever");
        assert!(matches!(
            check_admin(&config, &headers),
            Err(ApiError::TokenNotConfigured)
        ));
    }

    #[test]
    fn test_非Bearer头() {
        let config = test_config(Some("secret"));
        let headers = headers_with("Basic secret");
        assert!(matches!(
            check_admin(&config, &headers),
            Err(ApiError::MissingToken)
        ));
    }
}
