// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、API 装配、通知录制
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use transfer_booking::api::{BookingApi, MediaApi, PricingApi, SettingsApi};
use transfer_booking::db;
use transfer_booking::notify::{EmailMessage, Notifier};
use transfer_booking::repository::{
    BookingRepository, MediaRepository, PricingRepository, SettingsRepository,
};

// ==========================================
// 通知录制器
// ==========================================

/// 录制式通知实现：不投递，只记录组装结果供断言
#[derive(Default)]
pub struct RecordingNotifier {
    pub emails: Mutex<Vec<EmailMessage>>,
    pub whatsapp: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email_count(&self) -> usize {
        self.emails.lock().expect("emails 锁失败").len()
    }

    pub fn email_subjects(&self) -> Vec<String> {
        self.emails
            .lock()
            .expect("emails 锁失败")
            .iter()
            .map(|m| m.subject.clone())
            .collect()
    }

    pub fn whatsapp_count(&self) -> usize {
        self.whatsapp.lock().expect("whatsapp 锁失败").len()
    }
}

impl Notifier for RecordingNotifier {
    fn send_email(&self, message: &EmailMessage) -> anyhow::Result<()> {
        self.emails
            .lock()
            .expect("emails 锁失败")
            .push(message.clone());
        Ok(())
    }

    fn send_whatsapp(&self, phone: &str, text: &str) -> anyhow::Result<()> {
        self.whatsapp
            .lock()
            .expect("whatsapp 锁失败")
            .push((phone.to_string(), text.to_string()));
        Ok(())
    }
}

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 使用临时数据库文件；各 Repository 在构造时自建表。
pub struct ApiTestEnv {
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,

    pub settings_api: Arc<SettingsApi>,
    pub booking_api: Arc<BookingApi>,
    pub pricing_api: Arc<PricingApi>,
    pub media_api: Arc<MediaApi>,

    // Repository层（用于测试数据准备）
    pub settings_repo: Arc<SettingsRepository>,
    pub booking_repo: Arc<BookingRepository>,
    pub pricing_repo: Arc<PricingRepository>,

    pub notifier: Arc<RecordingNotifier>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    pub fn new() -> Result<Self, String> {
        let temp_file = NamedTempFile::new().map_err(|e| format!("创建临时文件失败: {}", e))?;
        let db_path = temp_file.path().to_string_lossy().to_string();

        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // Repository层
        let settings_repo = Arc::new(SettingsRepository::new(conn.clone()));
        let booking_repo = Arc::new(BookingRepository::new(conn.clone()));
        let pricing_repo = Arc::new(PricingRepository::new(conn.clone()));
        let media_repo = Arc::new(MediaRepository::new(conn.clone()));

        // API层
        let settings_api = Arc::new(SettingsApi::new(settings_repo.clone()));
        let notifier = Arc::new(RecordingNotifier::new());
        let notifier_dyn: Arc<dyn Notifier> = notifier.clone();

        let booking_api = Arc::new(BookingApi::new(
            booking_repo.clone(),
            settings_api.clone(),
            notifier_dyn,
            "ops@marmaristrip.com".to_string(),
        ));
        let pricing_api = Arc::new(PricingApi::new(pricing_repo.clone()));
        let media_api = Arc::new(MediaApi::new(media_repo));

        Ok(Self {
            db_path,
            conn,
            settings_api,
            booking_api,
            pricing_api,
            media_api,
            settings_repo,
            booking_repo,
            pricing_repo,
            notifier,
            _temp_file: temp_file,
        })
    }

    /// 直接执行 SQL（制造脏数据等场景用）
    pub fn execute_raw(&self, sql: &str) -> Result<usize, String> {
        let conn = self.conn.lock().map_err(|e| format!("锁失败: {}", e))?;
        conn.execute(sql, []).map_err(|e| format!("SQL失败: {}", e))
    }
}
