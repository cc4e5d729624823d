use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::blob::FsBlobStore;
use crate::codegen::CodeGenerator;
use crate::config::CodegenConfig;
use crate::model::{Profile, Project, Role};
use crate::store::RecordStore;
use crate::store::memory::MemoryStore;

const SECRET: &str = "0123456789abcdef0123456789abcdef";
const API_KEY: &str = "hook-key";

struct Harness {
    base: String,
    shutdown: CancellationToken,
    jwt: JwtAuthority,
    admin: Profile,
    agent: Profile,
    project: Project,
    blob_dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        let store = Arc::new(MemoryStore::new());
        let admin = Profile::new("Root", "root@example.com", Role::Admin);
        let agent = Profile::new("Asha", "asha@example.com", Role::Agent);
        store.insert_profile(&admin).await.unwrap();
        store.insert_profile(&agent).await.unwrap();
        let project = Project::new("Skyline");
        store.insert_project(&project).await.unwrap();

        let blob_dir = TempDir::new().unwrap();
        let blobs: Arc<dyn BlobStore> =
            Arc::new(FsBlobStore::new(blob_dir.path(), "http://cdn.test"));
        let codes = CodeGenerator::new(store.clone(), None, CodegenConfig::default());
        let jwt = JwtAuthority::new(SECRET, 3600).unwrap();
        let ctx = ApiContext {
            services: Arc::new(Services::new(store, codes, Some(blobs.clone()))),
            jwt: Some(jwt.clone()),
            api_key: Some(API_KEY.to_string()),
            blobs: Some(blobs),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(serve(listener, ctx, shutdown.clone()));

        Self {
            base: format!("http://{addr}"),
            shutdown,
            jwt,
            admin,
            agent,
            project,
            blob_dir,
        }
    }

    async fn post(&self, auth: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = reqwest::Client::new()
            .post(format!("{}{ADD_PROPERTY_PATH}", self.base))
            .json(&body);
        if let Some(auth) = auth {
            req = req.header("Authorization", auth);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[tokio::test]
async fn preflight_answers_ok_with_cors() {
    let h = Harness::start().await;
    let res = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            format!("{}{ADD_PROPERTY_PATH}", h.base),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["access-control-allow-origin"].to_str().unwrap(),
        "*"
    );
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn authorization_is_required() {
    let h = Harness::start().await;

    let (status, body) = h.post(None, json!({"title": "Flat"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");

    let (status, body) = h.post(Some("Bearer nope"), json!({"title": "Flat"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid authorization token");
}

#[tokio::test]
async fn api_key_callers_must_name_a_real_agent() {
    let h = Harness::start().await;
    let auth = format!("Bearer {API_KEY}");

    let (status, body) = h.post(Some(&auth), json!({"price": 10})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (status, body) = h.post(Some(&auth), json!({"title": "Flat"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "agent_id is required when using API key");

    let (status, body) = h
        .post(
            Some(&auth),
            json!({"title": "Flat", "agent_id": uuid::Uuid::new_v4()}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid agent_id");

    let (status, body) = h
        .post(
            Some(&auth),
            json!({
                "title": "Flat",
                "agent_id": h.agent.id,
                "project_id": uuid::Uuid::new_v4()
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid project_id");

    let (status, body) = h
        .post(
            Some(&auth),
            json!({
                "title": "Flat",
                "agent_id": h.agent.id,
                "project_id": h.project.id,
                "price": "4500000",
                "bedrooms": "2"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Property added successfully");
    assert_eq!(body["data"]["agent_id"], h.agent.id.to_string());
    assert_eq!(body["data"]["price"], 4500000.0);
    assert_eq!(body["data"]["bedrooms"], 2);
    assert_eq!(body["data"]["status"], "available");
    assert_eq!(body["data"]["source_type"], "Others");
}

#[tokio::test]
async fn session_user_becomes_agent_and_code_is_generated() {
    let h = Harness::start().await;
    let token = h.jwt.issue_session(&h.admin).unwrap();

    let (status, body) = h
        .post(
            Some(&format!("Bearer {token}")),
            json!({
                "title": "3BR Apt",
                "agent_id": h.agent.id,
                "property_code_type": "New Apartment"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["agent_id"], h.admin.id.to_string());
    let code = body["data"]["property_code"].as_str().unwrap();
    assert!(code.starts_with("NA"), "{code}");
    assert_eq!(code.len(), 8);
}

#[tokio::test]
async fn unknown_session_user_is_rejected() {
    let h = Harness::start().await;
    let ghost = Profile::new("Ghost", "ghost@example.com", Role::Agent);
    let token = h.jwt.issue_session(&ghost).unwrap();
    let (status, body) = h
        .post(Some(&format!("Bearer {token}")), json!({"title": "Flat"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid agent_id");
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let h = Harness::start().await;
    let res = reqwest::Client::new()
        .post(format!("{}{ADD_PROPERTY_PATH}", h.base))
        .header("Authorization", format!("Bearer {API_KEY}"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn public_objects_are_served() {
    let h = Harness::start().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}{PUBLIC_OBJECT_PREFIX}/property-images/x.png", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let path = h.blob_dir.path().join("property-images");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("x.png"), b"png-bytes").unwrap();
    let res = client
        .get(format!("{}{PUBLIC_OBJECT_PREFIX}/property-images/x.png", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"].to_str().unwrap(), "image/png");
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"png-bytes");
}
