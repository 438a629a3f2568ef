use http::Method;
use megaplan::{
    Attachment, Client, Config, Entity, Payload, StaticCredentialProvider, UploadFile,
};
use megaplan_core::{ErrorKind, Result};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::config;
use crate::mock::{modern_ok, MockHttpSend};

fn valid_token_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("token.json");
    std::fs::write(
        &path,
        json!({"access_token": "t0k3n", "token_type": "Bearer", "expiry": "2999-01-01T00:00:00Z"})
            .to_string(),
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_upload_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mock = MockHttpSend::new(|_| {
        modern_ok(json!([
            {"contentType": "File", "id": "11"},
            {"contentType": "File", "id": "12"},
        ]))
    });
    let client = Client::from_config(mock.context(), &config(&valid_token_file(&dir)))?;

    let attachments = client
        .upload_files(&[
            UploadFile::new("report.txt", "quarterly numbers"),
            UploadFile::new("photo.jpg", vec![0xff, 0xd8, 0xff]),
        ])
        .await?;
    assert_eq!(
        vec![
            Attachment {
                content_type: "File".to_string(),
                id: "11".to_string()
            },
            Attachment {
                content_type: "File".to_string(),
                id: "12".to_string()
            },
        ],
        attachments
    );

    let req = mock.last();
    assert_eq!(Method::POST, req.method);
    assert_eq!("/api/file", req.path());
    assert_eq!("Bearer t0k3n", req.header("authorization"));

    let content_type = req.header("content-type");
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");
    let body = req.body_text();
    assert_eq!(3, body.matches(&format!("--{boundary}")).count());
    assert!(body.contains(r#"name="files[]"; filename="report.txt""#));
    assert!(body.contains(r#"name="files[]"; filename="photo.jpg""#));
    assert!(body.contains("quarterly numbers"));
    assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    Ok(())
}

#[tokio::test]
async fn test_upload_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mock = MockHttpSend::new(|_| modern_ok(json!([])));
    let client = Client::from_config(mock.context(), &config(&valid_token_file(&dir)))?;

    assert!(client.upload_files(&[]).await?.is_empty());
    assert!(mock.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_post_json_payload() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mock = MockHttpSend::new(|req| {
        let body: Value = serde_json::from_slice(&req.body).unwrap();
        modern_ok(json!({"contentType": "Task", "id": "1000124", "name": body["name"]}))
    });
    let client = Client::from_config(mock.context(), &config(&valid_token_file(&dir)))?;

    let payload = Payload::new()
        .raw("name", "Подготовить отчёт")
        .entity("responsible", Entity::reference("Employee", 1000005));
    let created: Value = client.post_json("/api/v3/task", &payload).await?.data()?;
    assert_eq!("Подготовить отчёт", created["name"]);

    let req = mock.last();
    assert_eq!("application/json", req.header("content-type"));
    let sent: Value = serde_json::from_slice(&req.body)?;
    assert_eq!(
        json!({"contentType": "Employee", "id": 1000005}),
        sent["responsible"]
    );
    Ok(())
}

#[tokio::test]
async fn test_search_sends_json_query() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mock = MockHttpSend::new(|_| modern_ok(json!([])));
    let client = Client::from_config(mock.context(), &config(&valid_token_file(&dir)))?;

    client.search("/api/v3/task", &json!({"limit": 10})).await?;

    let req = mock.last();
    assert_eq!(Method::GET, req.method);
    assert_eq!(Some("%7B%22limit%22%3A10%7D"), req.uri.query());
    assert_eq!("application/json", req.header("content-type"));
    Ok(())
}

#[tokio::test]
async fn test_json_calls_need_bearer_client() {
    let mock = MockHttpSend::new(|_| modern_ok(json!([])));
    let client = Client::legacy(
        mock.context(),
        &Config::new("example.megaplan.ru"),
        StaticCredentialProvider::new("access", "123456"),
    )
    .unwrap();

    let err = client
        .post_json("/api/v3/task", &json!({"name": "x"}))
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::RequestInvalid, err.kind());

    let err = client
        .upload_files(&[UploadFile::new("a.txt", "a")])
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::RequestInvalid, err.kind());
    assert!(mock.requests().is_empty());
}
