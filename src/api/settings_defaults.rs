// ==========================================
// 接送预订系统 - 设置缺省值
// ==========================================
// 职责: 各设置消费方（站点标识/页头/支付开关）的缺省对象
// 说明: 公开端读取永远在这些缺省值之上浅合并已发布值
// ==========================================

use serde_json::{json, Value};

/// 站点标识设置键
pub const SITE_IDENTITY_KEY: &str = "site_identity";

/// 页头配置设置键
pub const HEADER_KEY: &str = "header";

/// 支付开关设置键
pub const PAYMENT_SETTINGS_KEY: &str = "payment_settings";

/// 站点标识缺省值（品牌、主色、功能开关、联系方式）
pub fn site_identity_defaults() -> Value {
    json!({
        "brandName": "MarmarisTrip",
        "logoUrl": "/logo.png",
        "primaryColor": "#3b82f6",
        "secondaryColor": "#1e40af",
        "enableTransfers": true,
        "enableExcursions": false,
        "enableBlog": false,
        "enableWhatsApp": true,
        "contactPhone": "+90 555 555 55 55",
        "contactEmail": "info@example.com"
    })
}

/// 页头配置缺省值（导航、CTA、社交入口）
pub fn header_defaults() -> Value {
    json!({
        "siteTitle": "Marmaristrip",
        "logoUrl": "",
        "tagline": "",
        "contact": { "phone": "", "email": "" },
        "socials": { "facebook": "", "instagram": "", "tiktok": "", "youtube": "" },
        "navItems": [
            { "label": "Airport Transfers", "path": "/", "icon": "CarTaxiFront" },
            { "label": "Excursions", "path": "/excursions", "icon": "Ticket" }
        ],
        "cta": { "label": "Log in", "path": "/admin", "icon": "User", "color": "", "enabled": true },
        "sticky": true
    })
}

/// 支付开关缺省值（在线支付默认关闭，到付默认开启）
pub fn payment_defaults() -> Value {
    json!({
        "enabled": false,
        "provider": "none",
        "pay_on_arrival_enabled": true,
        "currency": "EUR"
    })
}
