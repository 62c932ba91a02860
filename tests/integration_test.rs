use chrono::{Duration, Utc};
use exam_catalog::cli::{AdminCommand, Command};
use exam_catalog::infrastructure::keys;
use exam_catalog::{App, Config, LocalStore, Purchase};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// 准备打包数据目录和本地缓存
fn setup() -> (TempDir, Config) {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();

    std::fs::write(
        data.join("categories.json"),
        r#"[
            {"id": 1, "name": "Banking", "description": "IBPS, SBI"},
            {"id": 2, "name": "SSC", "description": "CGL, CHSL"}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        data.join("exams.json"),
        r#"[
            {"id": 101, "name": "IBPS PO", "categoryId": 1},
            {"id": 102, "name": "SBI Clerk", "categoryId": 1},
            {"id": 201, "name": "SSC CGL", "categoryId": 2}
        ]"#,
    )
    .unwrap();

    // 浏览器导出的缓存：分类 1 被本地编辑过，另新增一个分类
    std::fs::write(
        dir.path().join("local_storage.json"),
        r#"{
            "customCategories": "[{\"id\":1,\"name\":\"Banking & Insurance\",\"description\":\"edited\"},{\"id\":3,\"name\":\"Railways\"}]",
            "customExams": [{"id": 301, "name": "RRB NTPC", "categoryId": 3}]
        }"#,
    )
    .unwrap();

    let config = Config {
        data_source: data.display().to_string(),
        local_store_path: dir.path().join("local_storage.json").display().to_string(),
        ..Config::default()
    };
    (dir, config)
}

async fn run_json(config: &Config, command: Command) -> Value {
    let mut app = App::initialize(config.clone(), true).await.expect("初始化失败");
    let output = app.run(command).await.expect("命令执行失败");
    serde_json::from_str(&output).expect("输出不是合法 JSON")
}

async fn stored_purchases(path: &Path) -> Vec<Purchase> {
    LocalStore::open(path).await.unwrap().get_list(keys::PURCHASES)
}

#[tokio::test]
async fn test_categories_merge_bundled_and_local() {
    let (_dir, config) = setup();

    let categories = run_json(&config, Command::Categories).await;
    let names: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["Banking & Insurance", "SSC", "Railways"]);
    assert_eq!(categories[0]["examCount"], 2);
    assert_eq!(categories[2]["examCount"], 1);
}

#[tokio::test]
async fn test_exams_for_local_category() {
    let (_dir, config) = setup();

    let exams = run_json(
        &config,
        Command::Exams {
            category_id: "3".to_string(),
        },
    )
    .await;
    assert_eq!(exams[0]["name"], "RRB NTPC");

    let mut app = App::initialize(config.clone(), false).await.unwrap();
    let result = app
        .run(Command::Exams {
            category_id: "404".to_string(),
        })
        .await;
    assert!(result.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_admin_flow_and_access_check() {
    let (_dir, config) = setup();

    let exam = run_json(
        &config,
        Command::Admin(AdminCommand::AddExam {
            id: None,
            name: "SSC CHSL".to_string(),
            description: String::new(),
            category: "2".to_string(),
        }),
    )
    .await;
    let exam_id = exam["id"].as_str().unwrap().to_string();

    let exams = run_json(
        &config,
        Command::Exams {
            category_id: "2".to_string(),
        },
    )
    .await;
    assert_eq!(exams.as_array().unwrap().len(), 2);

    // 单场考试购买，三个月前买的，有效期一年
    run_json(
        &config,
        Command::Admin(AdminCommand::AddPurchase {
            purchase_type: "test".to_string(),
            category: "2".to_string(),
            exam: Some(exam_id.clone()),
            validity: Some("1 year".to_string()),
            purchased_at: Some(Utc::now() - Duration::days(90)),
        }),
    )
    .await;

    let granted = run_json(
        &config,
        Command::Access {
            category_id: "2".to_string(),
            exam: Some(exam_id),
        },
    )
    .await;
    assert_eq!(granted["granted"], true);
    assert_eq!(granted["via"], "test");

    let other_exam = run_json(
        &config,
        Command::Access {
            category_id: "2".to_string(),
            exam: Some("201".to_string()),
        },
    )
    .await;
    assert_eq!(other_exam["granted"], false);
}

#[tokio::test]
async fn test_category_purchase_does_not_reach_other_category_exam() {
    let (_dir, config) = setup();

    run_json(
        &config,
        Command::Admin(AdminCommand::AddPurchase {
            purchase_type: "category".to_string(),
            category: "1".to_string(),
            exam: None,
            validity: Some("1 year".to_string()),
            purchased_at: None,
        }),
    )
    .await;

    let own_exam = run_json(
        &config,
        Command::Access {
            category_id: "1".to_string(),
            exam: Some("101".to_string()),
        },
    )
    .await;
    assert_eq!(own_exam["granted"], true);

    // 考试 201 属于分类 2
    let mut app = App::initialize(config.clone(), true).await.unwrap();
    let err = app
        .run(Command::Access {
            category_id: "1".to_string(),
            exam: Some("201".to_string()),
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_purge_expired_purchases() {
    let (dir, config) = setup();

    for (validity, days_ago) in [("1 month", 90), ("lifetime", 900)] {
        run_json(
            &config,
            Command::Admin(AdminCommand::AddPurchase {
                purchase_type: "category".to_string(),
                category: "1".to_string(),
                exam: None,
                validity: Some(validity.to_string()),
                purchased_at: Some(Utc::now() - Duration::days(days_ago)),
            }),
        )
        .await;
    }

    let rows = run_json(&config, Command::Purchases { purge: false }).await;
    let statuses: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["expired", "active"]);

    let rows = run_json(&config, Command::Purchases { purge: true }).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(
        stored_purchases(&dir.path().join("local_storage.json")).await.len(),
        1
    );
}

#[tokio::test]
async fn test_seed_admin_dry_run() {
    let (_dir, config) = setup();

    let result = run_json(
        &config,
        Command::SeedAdmin {
            username: "admin".to_string(),
            password: Some("a-long-password".to_string()),
            dry_run: true,
        },
    )
    .await;
    assert_eq!(result["status"], "created");

    let mut app = App::initialize(config, true).await.unwrap();
    let missing_password = app
        .run(Command::SeedAdmin {
            username: "admin".to_string(),
            password: None,
            dry_run: true,
        })
        .await;
    assert!(missing_password.is_err());
}
