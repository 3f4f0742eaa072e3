//! JIRA client tests against a mock server.

use std::collections::BTreeMap;

use sdlc_integrations::migration::issue_from_work_item;
use sdlc_integrations::pm::jira::{Issue, IssueFields, User};
use sdlc_integrations::{IntegrationError, JiraClient, JiraConnection, WorkItemModel};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> JiraClient {
    // Trailing slash is trimmed.
    let conn = JiraConnection::new(format!("{}/", server.uri()), "jira-token").unwrap();
    JiraClient::new(conn).unwrap()
}

fn created(key: &str) -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(json!({
        "id": "10001",
        "key": key,
        "self": format!("https://jira.example.com/rest/api/2/issue/{key}")
    }))
}

#[tokio::test]
async fn create_story_posts_fields_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(header("authorization", "Bearer jira-token"))
        .and(body_partial_json(json!({
            "fields": {
                "project": { "key": "PROJ" },
                "issuetype": { "name": "Story" },
                "summary": "Login works",
                "description": "As a user...",
                "customfield_10010": 5
            }
        })))
        .respond_with(created("PROJ-1"))
        .expect(1)
        .mount(&server)
        .await;

    let mut custom = BTreeMap::new();
    custom.insert("customfield_10010".to_string(), json!(5));
    let response = client(&server)
        .create_story("PROJ", "Login works", Some("As a user..."), custom)
        .await
        .unwrap();

    assert_eq!(response.key, "PROJ-1");
    assert_eq!(response.id, "10001");
}

#[tokio::test]
async fn create_test_uses_test_issue_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(body_partial_json(json!({ "fields": { "issuetype": { "name": "Test" } } })))
        .respond_with(created("PROJ-2"))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .create_test("PROJ", "Login smoke test", None, BTreeMap::new())
        .await
        .unwrap();
    assert_eq!(response.key, "PROJ-2");
}

#[tokio::test]
async fn invalid_issue_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(created("NEVER-1"))
        .expect(0)
        .mount(&server)
        .await;

    let issue = Issue::new(IssueFields::new("proj", "Story", "Fix"));
    let err = client(&server).create_issue(&issue).await.unwrap_err();

    match err {
        IntegrationError::Validation(errors) => {
            let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
            assert_eq!(fields, vec!["project", "summary"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_error_body_messages_are_joined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorMessages": ["Project does not exist", "Issue type is invalid"],
            "errors": {}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_issue_with("PROJ", "Story", "Login works", None, BTreeMap::new())
        .await
        .unwrap_err();

    match err {
        IntegrationError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Project does not exist; Issue type is invalid");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_error_with_unparsable_body_keeps_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_issue_with("PROJ", "Story", "Login works", None, BTreeMap::new())
        .await
        .unwrap_err();
    assert!(
        matches!(err, IntegrationError::Api { status: 502, ref message } if message.contains("Bad Gateway"))
    );
}

#[tokio::test]
async fn get_issue_by_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/PROJ-7"))
        .and(header("authorization", "Bearer jira-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "10007",
            "key": "PROJ-7",
            "self": "https://jira.example.com/rest/api/2/issue/10007",
            "fields": {
                "summary": "Login works",
                "issuetype": { "name": "Story" },
                "status": { "name": "Open" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let issue = client(&server).get_issue("PROJ-7").await.unwrap();
    assert_eq!(issue.key.as_deref(), Some("PROJ-7"));
    assert_eq!(issue.fields.summary.as_deref(), Some("Login works"));
}

#[tokio::test]
async fn get_issue_rejects_blank_key() {
    let server = MockServer::start().await;
    let err = client(&server).get_issue("  ").await.unwrap_err();
    assert!(matches!(err, IntegrationError::InvalidArgument(_)));
}

#[tokio::test]
async fn get_missing_issue_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/PROJ-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errorMessages": ["Issue Does Not Exist"]
        })))
        .mount(&server)
        .await;

    let err = client(&server).get_issue("PROJ-404").await.unwrap_err();
    assert!(matches!(err, IntegrationError::NotFound(_)));
}

#[tokio::test]
async fn migrated_issue_assigns_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "ada",
            "displayName": "Ada Lovelace",
            "emailAddress": "ada@example.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(body_partial_json(json!({
            "fields": {
                "summary": "Fix login bug",
                "reporter": { "name": "ada" },
                "assignee": { "name": "ada" }
            }
        })))
        .respond_with(created("PROJ-9"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let user: User = client.get_current_user().await.unwrap();
    assert_eq!(user.display_name.as_deref(), Some("Ada Lovelace"));

    let model = WorkItemModel {
        id: 100,
        title: Some("Fix login bug".to_string()),
        ..WorkItemModel::default()
    };
    let issue = issue_from_work_item(&model, "PROJ", "Story", &user);
    let response = client.create_issue(&issue).await.unwrap();
    assert_eq!(response.key, "PROJ-9");
}
