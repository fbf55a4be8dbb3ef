use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use server::startup::{build_app, build_state};

struct TestApp {
    base_url: String,
    data_file: PathBuf,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn temp_data_file() -> PathBuf {
    std::env::temp_dir()
        .join("tutor-directory-tests")
        .join(Uuid::new_v4().to_string())
        .join("maitres_data.json")
}

async fn start_server_with(data_file: PathBuf) -> anyhow::Result<TestApp> {
    let state = build_state(&data_file.to_string_lossy()).await?;
    let app = build_app(state);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, data_file })
}

async fn start_server() -> anyhow::Result<TestApp> {
    start_server_with(temp_data_file()).await
}

fn tutor(email: &str, city: &str, skills: &[&str]) -> Value {
    json!({
        "name": format!("Maître {email}"),
        "email": email,
        "phone": "+225 01 23 45 67",
        "city": city,
        "rate": "3000/h",
        "skills": skills,
        "description": "Cours à domicile"
    })
}

fn emails(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|items| items.iter().filter_map(|p| p["email"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

async fn cleanup(app: &TestApp) {
    if let Some(dir) = app.data_file.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}

#[tokio::test]
async fn e2e_health_reports_fresh_store() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(app.url("/health")).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "absent");
    cleanup(&app).await;
    Ok(())
}

#[tokio::test]
async fn e2e_register_search_and_lookup() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let res = c.post(app.url("/tutors"))
        .json(&tutor("a@x.com", "Abidjan", &["Mathématiques", "Anglais"]))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    assert_eq!(created["skills"], json!(["Mathématiques", "Anglais"]));

    let res = c.post(app.url("/tutors"))
        .json(&tutor("b@x.com", "Cocody", &["Français"]))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let all = c.get(app.url("/tutors")).send().await?.json::<Value>().await?;
    assert_eq!(emails(&all), vec!["a@x.com", "b@x.com"]);

    let found = c.get(app.url("/tutors/search?skills=Anglais")).send().await?.json::<Value>().await?;
    assert_eq!(emails(&found), vec!["a@x.com"]);

    let found = c.get(app.url("/tutors/search?cities=Cocody")).send().await?.json::<Value>().await?;
    assert_eq!(emails(&found), vec!["b@x.com"]);

    let found = c.get(app.url("/tutors/search?skills=Fran%C3%A7ais&cities=Abidjan"))
        .send().await?.json::<Value>().await?;
    assert!(emails(&found).is_empty());

    let res = c.get(app.url("/tutors/a@x.com")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let profile = res.json::<Value>().await?;
    assert_eq!(profile["name"], "Maître a@x.com");
    assert_eq!(profile["city"], "Abidjan");
    assert_eq!(profile["rate"], "3000/h");
    assert_eq!(profile["description"], "Cours à domicile");

    let res = c.get(app.url("/tutors/nobody@x.com")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["error"], "Not Found");

    cleanup(&app).await;
    Ok(())
}

#[tokio::test]
async fn e2e_reregistration_updates_in_place() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    c.post(app.url("/tutors")).json(&tutor("a@x.com", "Abidjan", &["SVT"])).send().await?;
    let first = c.get(app.url("/tutors/a@x.com")).send().await?.json::<Value>().await?;

    let res = c.post(app.url("/tutors")).json(&tutor("a@x.com", "Bingerville", &["Chimie"])).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["city"], "Bingerville");
    assert_eq!(updated["registered_at"], first["registered_at"]);

    let all = c.get(app.url("/tutors")).send().await?.json::<Value>().await?;
    assert_eq!(emails(&all), vec!["a@x.com"]);

    cleanup(&app).await;
    Ok(())
}

#[tokio::test]
async fn e2e_invalid_registration_is_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let mut form = tutor("a@x.com", "Abidjan", &[]);
    let res = c.post(app.url("/tutors")).json(&form).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Validation Error");
    assert!(body["message"].as_str().unwrap_or_default().contains("skills"));

    form["skills"] = json!(["SVT"]);
    form["phone"] = json!("");
    let res = c.post(app.url("/tutors")).json(&form).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let all = c.get(app.url("/tutors")).send().await?.json::<Value>().await?;
    assert!(emails(&all).is_empty());

    cleanup(&app).await;
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_body_gets_json_error() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    for skills in [Value::Null, json!("SVT")] {
        let mut form = tutor("a@x.com", "Abidjan", &["SVT"]);
        form["skills"] = skills;
        let res = c.post(app.url("/tutors")).json(&form).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
        let body = res.json::<Value>().await?;
        assert_eq!(body["error"], "Validation Error");
        assert!(body["message"].is_string());
    }

    let res = c.post(app.url("/tutors"))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Validation Error");

    let res = c.post(app.url("/tutors"))
        .json(&json!({"email": "a@x.com"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let message = res.json::<Value>().await?["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("name") && message.contains("skills"), "{message}");

    let all = c.get(app.url("/tutors")).send().await?.json::<Value>().await?;
    assert!(emails(&all).is_empty());

    cleanup(&app).await;
    Ok(())
}

#[tokio::test]
async fn e2e_data_file_uses_document_layout() -> anyhow::Result<()> {
    let app = start_server().await?;
    reqwest::Client::new()
        .post(app.url("/tutors"))
        .json(&tutor("a@x.com", "Abidjan", &["Lecture"]))
        .send().await?;

    let raw = tokio::fs::read_to_string(&app.data_file).await?;
    let doc: Value = serde_json::from_str(&raw)?;
    let rec = &doc["a@x.com"];
    assert_eq!(rec["nom"], "Maître a@x.com");
    assert_eq!(rec["telephone"], "+225 01 23 45 67");
    assert_eq!(rec["ville"], "Abidjan");
    assert_eq!(rec["tarif"], "3000/h");
    assert_eq!(rec["competences"], json!(["Lecture"]));
    assert!(rec["date_inscription"].as_str().is_some_and(|s| s.len() == "2025-01-01 00:00".len()));

    cleanup(&app).await;
    Ok(())
}

#[tokio::test]
async fn e2e_corrupt_store_is_reported() -> anyhow::Result<()> {
    let data_file = temp_data_file();
    if let Some(dir) = data_file.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(&data_file, b"{\"a@x.com\": {\"nom\": ").await?;

    let app = start_server_with(data_file.clone()).await?;
    let body = reqwest::get(app.url("/health")).await?.json::<Value>().await?;
    assert_eq!(body["store"], "corrupt");

    let mut aside = data_file.into_os_string();
    aside.push(".corrupt");
    assert!(tokio::fs::try_exists(PathBuf::from(aside)).await?);

    cleanup(&app).await;
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_records_are_dropped_individually() -> anyhow::Result<()> {
    let data_file = temp_data_file();
    if let Some(dir) = data_file.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let doc = json!({
        "good@x.com": {
            "nom": "Awa", "email": "good@x.com", "telephone": "1", "ville": "Abidjan",
            "tarif": "", "competences": ["SVT"], "description": "",
            "date_inscription": "2025-01-15 14:32"
        },
        "bad@x.com": {
            "nom": "Jean", "email": "other@x.com", "telephone": "1", "ville": "Abidjan",
            "tarif": "", "competences": ["SVT"], "description": "",
            "date_inscription": "2025-01-15 14:32"
        }
    });
    tokio::fs::write(&data_file, serde_json::to_vec(&doc)?).await?;

    let app = start_server_with(data_file.clone()).await?;
    let body = reqwest::get(app.url("/health")).await?.json::<Value>().await?;
    assert_eq!(body["store"], "existing");

    let all = reqwest::get(app.url("/tutors")).await?.json::<Value>().await?;
    assert_eq!(emails(&all), vec!["good@x.com"]);

    let mut aside = data_file.into_os_string();
    aside.push(".corrupt");
    assert!(tokio::fs::try_exists(PathBuf::from(aside)).await?);

    cleanup(&app).await;
    Ok(())
}

#[tokio::test]
async fn e2e_stats_and_catalog() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    c.post(app.url("/tutors")).json(&tutor("a@x.com", "Abidjan", &["Mathématiques", "Anglais"])).send().await?;
    c.post(app.url("/tutors")).json(&tutor("b@x.com", "Cocody", &["Anglais"])).send().await?;

    let stats = c.get(app.url("/stats")).send().await?.json::<Value>().await?;
    assert_eq!(stats["tutors"], 2);
    assert_eq!(stats["skills"], json!(["Mathématiques", "Anglais"]));
    assert_eq!(stats["cities"], json!(["Abidjan", "Cocody"]));

    let catalog = c.get(app.url("/catalog")).send().await?.json::<Value>().await?;
    assert!(catalog["cities"].as_array().is_some_and(|c| c.contains(&json!("Yamoussoukro"))));

    let doc = c.get(app.url("/api-docs/openapi.json")).send().await?.json::<Value>().await?;
    assert!(doc["paths"]["/tutors/search"].is_object());

    cleanup(&app).await;
    Ok(())
}
