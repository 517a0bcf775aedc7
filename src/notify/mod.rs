// ==========================================
// 接送预订系统 - 通知层
// ==========================================
// 职责: 邮件/WhatsApp 文案组装与投递接口
// 说明: 实际投递（SMTP、WhatsApp 网关）在部署侧接入；
//       默认实现只输出结构化日志
// ==========================================

pub mod templates;

pub use templates::{
    compose_admin_notification, compose_customer_confirmation, compose_reservation_approved,
    compose_whatsapp_confirmation,
};

/// 待投递的邮件
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// body 是否为 HTML（预订确认邮件用富文本模板）
    pub html: bool,
}

/// 通知投递接口
///
/// 文案组装与投递分离：API 层只组装消息，投递方式由实现决定。
pub trait Notifier: Send + Sync {
    fn send_email(&self, message: &EmailMessage) -> anyhow::Result<()>;

    fn send_whatsapp(&self, phone: &str, text: &str) -> anyhow::Result<()>;
}

/// 日志投递实现
///
/// 把组装好的消息作为结构化日志事件输出；
/// 测试环境下 enabled=false，完全静默。
pub struct LogNotifier {
    enabled: bool,
}

impl LogNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for LogNotifier {
    fn send_email(&self, message: &EmailMessage) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        tracing::info!(
            event = "EMAIL_SENT",
            to = %message.to,
            subject = %message.subject,
            html = message.html,
            "邮件已提交投递"
        );
        Ok(())
    }

    fn send_whatsapp(&self, phone: &str, text: &str) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        tracing::info!(
            event = "WHATSAPP_SENT",
            phone = %phone,
            chars = text.len(),
            "WhatsApp 确认已提交投递"
        );
        Ok(())
    }
}
