use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use clubroster_api::app::services::AppServices;
use clubroster_auth::{grants, Permission};
use clubroster_core::AccountId;
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let services = Arc::new(AppServices::new(Duration::from_secs(1)));
        let app = clubroster_api::app::build_app(services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }

    /// Register an account holding `grant_names` and issue it a token.
    fn member(&self, username: &str, grant_names: &[&'static str]) -> (AccountId, String) {
        let account = self
            .services
            .register_account(username.to_string(), "Test".to_string(), username.to_string(), None)
            .unwrap();
        self.services
            .grants
            .set_grants(account.id, grant_names.iter().copied().map(Permission::new))
            .unwrap();
        let token = format!("token-{username}");
        self.services.tokens.insert(token.clone(), account.id);
        (account.id, token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn error_code(res: reqwest::Response) -> String {
    let body: serde_json::Value = res.json().await.unwrap();
    body["error"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn health_needs_no_token() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_unknown_token_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(res).await, "unauthorized");

    let res = client
        .get(srv.url("/accounts"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn members_read_themselves_and_readers_read_everyone() {
    let srv = TestServer::spawn().await;
    let (member, member_token) = srv.member("member", &[]);
    let (other, _) = srv.member("other", &[]);
    let (_, reader_token) = srv.member("reader", &[grants::READ_ACCOUNT]);
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url(&format!("/accounts/{member}")))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "member");

    let res = client
        .get(srv.url(&format!("/accounts/{other}")))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(res).await, "forbidden");

    let res = client
        .get(srv.url(&format!("/accounts/{other}")))
        .bearer_auth(&reader_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url("/accounts"))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url("/accounts"))
        .bearer_auth(&reader_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unresolvable_targets_are_forbidden_not_missing() {
    let srv = TestServer::spawn().await;
    let all: Vec<&'static str> = grants::known_names().collect();
    let (_, admin_token) = srv.member("admin", &all);
    let client = reqwest::Client::new();

    for path in [
        format!("/accounts/{}", AccountId::new()),
        "/accounts/not-a-uuid".to_string(),
    ] {
        let res = client
            .delete(srv.url(&path))
            .bearer_auth(&admin_token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{path}");
    }
}

#[tokio::test]
async fn grant_collections_are_checked_element_by_element() {
    let srv = TestServer::spawn().await;
    let (member, member_token) = srv.member("member", &[grants::READ_EVENT]);
    let (other, other_token) = srv.member("other", &[grants::READ_EVENT]);
    let (_, manager_token) = srv.member("manager", &[grants::MANAGE_PERMISSION]);
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url(&format!("/accounts/{member}/permissions")))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url(&format!("/accounts/{other}/permissions")))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Members cannot hand themselves grants.
    let res = client
        .put(srv.url(&format!("/accounts/{member}/permissions")))
        .bearer_auth(&member_token)
        .json(&json!({ "permissions": [grants::READ_ACCOUNT] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(srv.url(&format!("/accounts/{other}/permissions")))
        .bearer_auth(&manager_token)
        .json(&json!({ "permissions": [grants::READ_ACCOUNT, grants::READ_ACCOUNT] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // Grants are reloaded on every request.
    let res = client
        .get(srv.url("/me"))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    let me: serde_json::Value = res.json().await.unwrap();
    assert_eq!(me["grants"], json!([grants::READ_ACCOUNT]));

    let res = client
        .put(srv.url(&format!("/accounts/{other}/permissions")))
        .bearer_auth(&manager_token)
        .json(&json!({ "permissions": ["fly-to-the-moon"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn creators_delete_events_that_editors_may_only_update() {
    let srv = TestServer::spawn().await;
    let (_, creator_token) = srv.member("creator", &[]);
    let (editor, editor_token) = srv.member("editor", &[]);
    let (_, stranger_token) = srv.member("stranger", &[]);
    let client = reqwest::Client::new();

    let starts_at = Utc::now() + ChronoDuration::days(3);
    let res = client
        .post(srv.url("/events"))
        .bearer_auth(&creator_token)
        .json(&json!({
            "title": "Moonlight paddle",
            "starts_at": starts_at,
            "ends_at": starts_at + ChronoDuration::hours(2),
            "editor_ids": [editor],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["editor_ids"].as_array().unwrap().len(), 2);

    let res = client
        .patch(srv.url(&format!("/events/{id}")))
        .bearer_auth(&editor_token)
        .json(&json!({ "title": "Moonlight paddle (moved)" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .patch(srv.url(&format!("/events/{id}")))
        .bearer_auth(&stranger_token)
        .json(&json!({ "title": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(srv.url(&format!("/events/{id}")))
        .bearer_auth(&editor_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(srv.url(&format!("/events/{id}")))
        .bearer_auth(&creator_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn self_check_denies_unknown_names() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.member("member", &[grants::READ_ACCOUNT]);
    let client = reqwest::Client::new();

    for (action, resource, expected) in [
        ("list", "account", true),
        ("delete", "account", false),
        ("teleport", "account", false),
        ("read", "spaceship", false),
    ] {
        let res = client
            .get(srv.url("/me/can"))
            .query(&[("action", action), ("resource", resource)])
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["allowed"], expected, "{action} {resource}");
    }
}

#[tokio::test]
async fn grant_store_outage_is_service_unavailable() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.member("member", &[]);
    srv.services.grants.set_online(false);

    let res = reqwest::Client::new()
        .get(srv.url("/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

async fn post_event(
    srv: &TestServer,
    token: &str,
    title: &str,
    public: bool,
    editor_ids: Vec<AccountId>,
) -> serde_json::Value {
    let starts_at = Utc::now() + ChronoDuration::days(7);
    let res = reqwest::Client::new()
        .post(srv.url("/events"))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "description": format!("{title} agenda"),
            "starts_at": starts_at,
            "ends_at": starts_at + ChronoDuration::hours(1),
            "public": public,
            "editor_ids": editor_ids,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn listed_titles(srv: &TestServer, token: &str) -> Vec<String> {
    let res = reqwest::Client::new()
        .get(srv.url("/events"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let mut titles: Vec<String> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    titles.sort();
    titles
}

#[tokio::test]
async fn private_events_are_hidden_from_strangers() {
    let srv = TestServer::spawn().await;
    let (_, creator_token) = srv.member("creator", &[]);
    let (editor, editor_token) = srv.member("editor", &[]);
    let (_, stranger_token) = srv.member("stranger", &[]);
    let (_, reader_token) = srv.member("reader", &[grants::READ_EVENT]);
    let client = reqwest::Client::new();

    let board = post_event(&srv, &creator_token, "board meeting", false, vec![editor]).await;
    let regatta = post_event(&srv, &creator_token, "regatta", true, vec![]).await;

    assert_eq!(listed_titles(&srv, &stranger_token).await, vec!["regatta"]);
    assert_eq!(listed_titles(&srv, &creator_token).await, vec!["board meeting", "regatta"]);
    assert_eq!(listed_titles(&srv, &editor_token).await, vec!["board meeting", "regatta"]);
    assert_eq!(listed_titles(&srv, &reader_token).await, vec!["board meeting", "regatta"]);

    let read_as = |token: &str, event: &serde_json::Value| {
        client
            .get(srv.url(&format!("/events/{}", event["id"].as_str().unwrap())))
            .bearer_auth(token)
            .send()
    };
    assert_eq!(read_as(&stranger_token, &regatta).await.unwrap().status(), StatusCode::OK);
    assert_eq!(
        read_as(&stranger_token, &board).await.unwrap().status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(read_as(&reader_token, &board).await.unwrap().status(), StatusCode::OK);

    // Public events are readable, not editable.
    let res = client
        .patch(srv.url(&format!("/events/{}", regatta["id"].as_str().unwrap())))
        .bearer_auth(&stranger_token)
        .json(&json!({ "public": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn any_member_creates_events_without_a_grant() {
    let srv = TestServer::spawn().await;
    let (member, member_token) = srv.member("member", &[]);
    let (_, manager_token) = srv.member("manager", &[grants::MANAGE_PERMISSION]);

    let created = post_event(&srv, &member_token, "night paddle", false, vec![]).await;
    assert_eq!(created["creator_id"], member.to_string());

    let res = reqwest::Client::new()
        .get(srv.url("/permissions"))
        .bearer_auth(&manager_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let catalog: serde_json::Value = res.json().await.unwrap();
    let names: Vec<&str> = catalog["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"create-event"));
    assert!(names.contains(&grants::READ_EVENT));
}

#[tokio::test]
async fn editor_ids_keep_only_existing_accounts() {
    let srv = TestServer::spawn().await;
    let (creator, creator_token) = srv.member("creator", &[]);
    let (editor, _) = srv.member("editor", &[]);
    let ghost = AccountId::new();

    let created =
        post_event(&srv, &creator_token, "river cleanup", true, vec![ghost, editor, editor]).await;
    let mut editors: Vec<&str> = created["editor_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap())
        .collect();
    editors.sort();
    let mut expected = vec![creator.to_string(), editor.to_string()];
    expected.sort();
    assert_eq!(editors, expected);

    let res = reqwest::Client::new()
        .patch(srv.url(&format!("/events/{}", created["id"].as_str().unwrap())))
        .bearer_auth(&creator_token)
        .json(&json!({ "editor_ids": [ghost] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let patched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(patched["editor_ids"], json!([creator.to_string()]));
}
