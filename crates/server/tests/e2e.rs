use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, BackendKind};
use reqwest::StatusCode as HttpStatusCode;
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    data_dir: std::path::PathBuf,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // isolated file-backed namespace per test run
    let data_dir = std::env::temp_dir().join(format!("shelf-e2e-{}", Uuid::new_v4()));
    let mut cfg = AppConfig::default();
    cfg.datastore.backend = BackendKind::File;
    cfg.datastore.project_id = "e2e".into();
    cfg.datastore.data_dir = data_dir.to_string_lossy().to_string();
    cfg.normalize_and_validate()?;

    let app: Router = server::startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, data_dir })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .expect("reqwest client")
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_user_and_book_persist_to_namespace_file() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.post(format!("{}/users", app.base_url))
        .form(&[("name", "Alice")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let body = res.text().await?;
    let start = body.find("UserId(\"").expect("user id") + "UserId(\"".len();
    let uid = &body[start..start + 36];

    let res = c.post(format!("{}/users/{}/books", app.base_url, uid))
        .form(&[("name", "Dune")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.get(format!("{}/users/{}/books", app.base_url, uid)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let listing = res.text().await?;
    assert!(listing.contains("#0 Book: "));
    assert!(listing.contains("Dune"));

    let file = tokio::fs::read_to_string(app.data_dir.join("e2e.json")).await?;
    assert!(file.contains("Dune"));
    assert!(file.contains(uid));

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}
