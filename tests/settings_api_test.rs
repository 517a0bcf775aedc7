// ==========================================
// SettingsApi 集成测试
// ==========================================
// 测试范围:
// 1. 草稿保存/撤销: save_draft, revert_draft
// 2. 发布与历史: publish（历史排序、截断、首发不归档）
// 3. 历史回滚: rollback_to_draft（两步生效）
// 4. 读投影: get_admin_view, get_public_view, list_settings
// 5. 直写路径: update_raw, write_published
// 6. 脏数据防御: 无法解析的列按缺失处理
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use serde_json::json;
use test_helpers::ApiTestEnv;
use transfer_booking::api::{ApiError, HISTORY_CAP};

// ==========================================
// 草稿测试
// ==========================================

#[test]
fn test_save_draft_往返一致() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let value = json!({"siteTitle": "A", "nested": {"n": 1.5, "s": "çğü 中文"}});
    env.settings_api
        .save_draft("header", value.clone())
        .expect("保存草稿失败");

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    // 不透明负载原样读回，不做任何变形
    assert_eq!(view.draft_value, Some(value));
    assert!(view.value.is_none());
    assert!(view.history.is_empty());
    assert!(view.updated_at.is_some());
    assert!(view.published_at.is_none());
}

#[test]
fn test_save_draft_隐式建档() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    // 没有单独的“创建”动作，首次保存草稿即建档
    assert!(env.settings_repo.get("brand_new").expect("读取失败").is_none());

    env.settings_api
        .save_draft("brand_new", json!({"x": 1}))
        .expect("保存草稿失败");

    assert!(env.settings_repo.get("brand_new").expect("读取失败").is_some());
}

#[test]
fn test_save_draft_幂等() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let value = json!({"siteTitle": "same"});
    env.settings_api
        .save_draft("header", value.clone())
        .expect("保存失败");
    env.settings_api
        .save_draft("header", value.clone())
        .expect("重复保存失败");

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.draft_value, Some(value));
    assert_eq!(view.version, 1);
}

#[test]
fn test_save_draft_不影响已发布值() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "live"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "editing"}))
        .expect("保存失败");

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.value, Some(json!({"siteTitle": "live"})));
    assert_eq!(view.draft_value, Some(json!({"siteTitle": "editing"})));
    assert!(view.history.is_empty());
}

#[test]
fn test_revert_draft_丢弃修改() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "live"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");
    env.settings_api
        .save_draft("header", json!({"siteTitle": "oops"}))
        .expect("保存失败");

    env.settings_api.revert_draft("header").expect("撤销失败");

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert!(view.draft_value.is_none());
    // 已发布值与历史不受影响
    assert_eq!(view.value, Some(json!({"siteTitle": "live"})));
    assert!(view.history.is_empty());
}

#[test]
fn test_revert_draft_无草稿时平凡成功() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    // 键根本不存在
    env.settings_api.revert_draft("ghost").expect("撤销失败");
    // 不应因撤销而建档
    assert!(env.settings_repo.get("ghost").expect("读取失败").is_none());
}

// ==========================================
// 发布测试
// ==========================================

#[test]
fn test_publish_清空草稿并上线() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "A"}))
        .expect("保存失败");
    let published_at = env.settings_api.publish("header").expect("发布失败");
    assert!(!published_at.is_empty());

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.value, Some(json!({"siteTitle": "A"})));
    assert!(view.draft_value.is_none());
    // 首次发布没有旧值可归档
    assert!(view.history.is_empty());
    assert!(view.published_at.is_some());
}

#[test]
fn test_publish_无草稿被拒绝且状态不变() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "A"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    let before = env.settings_api.get_admin_view("header").expect("查询失败");

    let result = env.settings_api.publish("header");
    assert!(matches!(result, Err(ApiError::NoDraftToPublish(_))));

    let after = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(after.value, before.value);
    assert_eq!(after.draft_value, before.draft_value);
    assert_eq!(after.history, before.history);
    assert_eq!(after.published_at, before.published_at);
}

#[test]
fn test_publish_未知键被拒绝() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let result = env.settings_api.publish("never_written");
    assert!(matches!(result, Err(ApiError::NoDraftToPublish(_))));
    // 失败的发布不应建档
    assert!(env
        .settings_repo
        .get("never_written")
        .expect("读取失败")
        .is_none());
}

#[test]
fn test_publish_旧值进历史且最新在前() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "A"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "B"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.value, Some(json!({"siteTitle": "B"})));
    assert_eq!(view.history.len(), 1);
    // 最近被覆盖的线上值在第 0 位
    assert_eq!(view.history[0].value, json!({"siteTitle": "A"}));
    assert!(!view.history[0].timestamp.is_empty());
    assert_eq!(view.version, 2);
}

#[test]
fn test_publish_历史截断到上限() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    // 连续发布 15 个版本：14 次归档，截断后只剩 10 条
    for i in 0..15 {
        env.settings_api
            .save_draft("header", json!({"v": i}))
            .expect("保存失败");
        env.settings_api.publish("header").expect("发布失败");
    }

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.value, Some(json!({"v": 14})));
    assert_eq!(view.history.len(), HISTORY_CAP);
    // 丢弃的是最旧的条目，最新的归档永远保留
    assert_eq!(view.history[0].value, json!({"v": 13}));
    assert_eq!(view.history[HISTORY_CAP - 1].value, json!({"v": 4}));
}

// ==========================================
// 回滚测试
// ==========================================

#[test]
fn test_rollback_只写草稿槽() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "A"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");
    env.settings_api
        .save_draft("header", json!({"siteTitle": "B"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    let before = env.settings_api.get_admin_view("header").expect("查询失败");

    env.settings_api
        .rollback_to_draft("header", 0)
        .expect("回滚失败");

    let after = env.settings_api.get_admin_view("header").expect("查询失败");
    // 草稿拿到历史快照，线上值与历史原封不动
    assert_eq!(after.draft_value, Some(json!({"siteTitle": "A"})));
    assert_eq!(after.value, before.value);
    assert_eq!(after.history, before.history);
    assert_eq!(after.published_at, before.published_at);
}

#[test]
fn test_rollback_两步生效() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "A"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");
    env.settings_api
        .save_draft("header", json!({"siteTitle": "B"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    // 回滚只进草稿，公开端仍是 B
    env.settings_api
        .rollback_to_draft("header", 0)
        .expect("回滚失败");
    let public = env
        .settings_api
        .get_public_view("header", &json!({}))
        .expect("查询失败");
    assert_eq!(public["siteTitle"], "B");

    // 第二步 publish 之后才上线
    env.settings_api.publish("header").expect("发布失败");
    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.value, Some(json!({"siteTitle": "A"})));
    assert_eq!(view.history.len(), 2);
    assert_eq!(view.history[0].value, json!({"siteTitle": "B"}));
    assert_eq!(view.history[1].value, json!({"siteTitle": "A"}));
}

#[test]
fn test_rollback_下标越界() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "A"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    let before = env.settings_api.get_admin_view("header").expect("查询失败");

    // 历史为空，任何下标都越界
    for index in [0i64, 1, -1, 99] {
        let result = env.settings_api.rollback_to_draft("header", index);
        assert!(
            matches!(result, Err(ApiError::InvalidHistoryIndex { .. })),
            "index={} 应该越界",
            index
        );
    }

    let after = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(after.draft_value, before.draft_value);
    assert_eq!(after.value, before.value);
    assert_eq!(after.history, before.history);
}

#[test]
fn test_rollback_键不存在() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let result = env.settings_api.rollback_to_draft("ghost", 0);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

// ==========================================
// 读投影测试
// ==========================================

#[test]
fn test_admin_view_未写入键返回空壳() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let view = env.settings_api.get_admin_view("ghost").expect("查询失败");
    assert_eq!(view.key, "ghost");
    assert!(view.value.is_none());
    assert!(view.draft_value.is_none());
    assert!(view.history.is_empty());
    assert_eq!(view.version, 1);
    assert!(view.updated_at.is_none());
    assert!(view.published_at.is_none());
}

#[test]
fn test_public_view_缺省值兜底() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let defaults = json!({"brandName": "MarmarisTrip", "enableBlog": false});
    let merged = env
        .settings_api
        .get_public_view("site_identity", &defaults)
        .expect("查询失败");
    // 没有已发布值时原样返回缺省对象
    assert_eq!(merged, defaults);
}

#[test]
fn test_public_view_已发布值覆盖缺省() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("site_identity", json!({"brandName": "Custom", "extra": 7}))
        .expect("保存失败");
    env.settings_api.publish("site_identity").expect("发布失败");

    let defaults = json!({"brandName": "MarmarisTrip", "enableBlog": false});
    let merged = env
        .settings_api
        .get_public_view("site_identity", &defaults)
        .expect("查询失败");

    assert_eq!(merged["brandName"], "Custom");
    assert_eq!(merged["extra"], 7);
    // 已发布值没有的键由缺省值补齐
    assert_eq!(merged["enableBlog"], false);
}

#[test]
fn test_public_view_草稿永不泄漏() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"secretDraft": true, "siteTitle": "WIP"}))
        .expect("保存失败");

    let defaults = json!({"siteTitle": "Marmaristrip"});
    let merged = env
        .settings_api
        .get_public_view("header", &defaults)
        .expect("查询失败");

    // 只有草稿没有发布：公开端只能看到缺省值
    assert_eq!(merged, defaults);
    assert!(merged.get("secretDraft").is_none());

    // 发布后上线的是发布那一刻的内容，之后的新草稿同样不可见
    env.settings_api.publish("header").expect("发布失败");
    env.settings_api
        .save_draft("header", json!({"siteTitle": "NextDraft"}))
        .expect("保存失败");
    let merged = env
        .settings_api
        .get_public_view("header", &defaults)
        .expect("查询失败");
    assert_eq!(merged["siteTitle"], "WIP");
}

#[test]
fn test_list_settings_聚合已发布值() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "H"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    env.settings_api
        .save_draft("site_identity", json!({"brandName": "B"}))
        .expect("保存失败");
    env.settings_api.publish("site_identity").expect("发布失败");

    // 只有草稿的键：聚合里值为 null
    env.settings_api
        .save_draft("draft_only", json!({"x": 1}))
        .expect("保存失败");

    let settings = env.settings_api.list_settings().expect("查询失败");
    assert_eq!(settings["header"], json!({"siteTitle": "H"}));
    assert_eq!(settings["site_identity"], json!({"brandName": "B"}));
    assert!(settings["draft_only"].is_null());
}

// ==========================================
// 直写路径测试
// ==========================================

#[test]
fn test_update_raw_不产生历史() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .update_raw("misc", json!({"a": 1}))
        .expect("写入失败");
    env.settings_api
        .update_raw("misc", json!({"a": 2}))
        .expect("写入失败");

    let view = env.settings_api.get_admin_view("misc").expect("查询失败");
    assert_eq!(view.value, Some(json!({"a": 2})));
    assert!(view.history.is_empty());
    // 直写不算发布
    assert!(view.published_at.is_none());
    assert!(view.updated_at.is_some());
}

#[test]
fn test_write_published_标记发布时刻() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .write_published("payment_settings", json!({"enabled": true}))
        .expect("写入失败");

    let view = env
        .settings_api
        .get_admin_view("payment_settings")
        .expect("查询失败");
    assert_eq!(view.value, Some(json!({"enabled": true})));
    assert!(view.published_at.is_some());
    assert!(view.history.is_empty());
}

// ==========================================
// 脏数据防御测试
// ==========================================

#[test]
fn test_脏value列按缺失处理() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "A"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    // 直接把 value 列写坏
    env.execute_raw("UPDATE settings SET value = '{broken' WHERE key = 'header'")
        .expect("SQL失败");

    // 读路径不崩溃，坏字段按缺失处理
    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert!(view.value.is_none());

    let defaults = json!({"siteTitle": "Marmaristrip"});
    let merged = env
        .settings_api
        .get_public_view("header", &defaults)
        .expect("查询失败");
    assert_eq!(merged, defaults);
}

#[test]
fn test_脏history列按空历史处理() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.settings_api
        .save_draft("header", json!({"siteTitle": "A"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    env.execute_raw("UPDATE settings SET history = 'not-json' WHERE key = 'header'")
        .expect("SQL失败");

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert!(view.history.is_empty());

    // 坏历史不阻塞后续发布，历史从头积累
    env.settings_api
        .save_draft("header", json!({"siteTitle": "B"}))
        .expect("保存失败");
    env.settings_api.publish("header").expect("发布失败");

    let view = env.settings_api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].value, json!({"siteTitle": "A"}));
}

// ==========================================
// 完整场景（站点页头的典型运营流程）
// ==========================================

#[test]
fn test_页头运营完整流程() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let api = &env.settings_api;

    // 1. 存草稿
    api.save_draft("header", json!({"siteTitle": "A"})).expect("保存失败");
    let view = api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.draft_value, Some(json!({"siteTitle": "A"})));
    assert!(view.value.is_none());
    assert!(view.history.is_empty());

    // 2. 首次发布：无旧值，历史保持为空
    api.publish("header").expect("发布失败");
    let view = api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.value, Some(json!({"siteTitle": "A"})));
    assert!(view.draft_value.is_none());
    assert!(view.history.is_empty());

    // 3. 第二个版本上线，A 进入历史
    api.save_draft("header", json!({"siteTitle": "B"})).expect("保存失败");
    api.publish("header").expect("发布失败");
    let view = api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.value, Some(json!({"siteTitle": "B"})));
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].value, json!({"siteTitle": "A"}));

    // 4. 回滚 A 到草稿：线上仍是 B
    api.rollback_to_draft("header", 0).expect("回滚失败");
    let view = api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.draft_value, Some(json!({"siteTitle": "A"})));
    assert_eq!(view.value, Some(json!({"siteTitle": "B"})));
    assert_eq!(view.history.len(), 1);

    // 5. 再发布：A 重新上线，B 进历史头部
    api.publish("header").expect("发布失败");
    let view = api.get_admin_view("header").expect("查询失败");
    assert_eq!(view.value, Some(json!({"siteTitle": "A"})));
    assert_eq!(view.history.len(), 2);
    assert_eq!(view.history[0].value, json!({"siteTitle": "B"}));
    assert_eq!(view.history[1].value, json!({"siteTitle": "A"}));

    // 6. 没有草稿再发布：被拒绝，状态保持第 5 步
    let result = api.publish("header");
    assert!(matches!(result, Err(ApiError::NoDraftToPublish(_))));
    let after = api.get_admin_view("header").expect("查询失败");
    assert_eq!(after.value, Some(json!({"siteTitle": "A"})));
    assert_eq!(after.history.len(), 2);
}
