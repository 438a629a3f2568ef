use bytes::Bytes;
use http::{Response, StatusCode};
use megaplan::{ApiVersion, Client, Config, Params, StaticCredentialProvider};
use megaplan_core::{Decompressed, ErrorKind, Result};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::mock::{gzip, json_response, MockHttpSend};

const LIST: &str = "/BumsStaffApiV01/Employee/list.api";

fn legacy_body() -> String {
    json!({"status": {"code": "ok", "message": null}, "data": {"employees": [{"Id": 1000005}]}})
        .to_string()
}

fn client(mock: &MockHttpSend) -> Client {
    Client::legacy(
        mock.context(),
        &Config::new("example.megaplan.ru").with_gzip(true),
        StaticCredentialProvider::new("access", "123456"),
    )
    .unwrap()
}

fn encoded(encoding: &str, body: Bytes) -> Response<Bytes> {
    Response::builder()
        .status(StatusCode::OK)
        .header("content-encoding", encoding)
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn test_gzip_body_is_decoded() -> Result<()> {
    let mock = MockHttpSend::new(|_| encoded("gzip", gzip(legacy_body().as_bytes())));
    let client = client(&mock);

    let resp = client.send(http::Method::GET, LIST, &Params::new()).await?;
    assert!(resp.compression_error.is_none());
    assert!(resp.headers.get("content-encoding").is_none());
    assert_eq!(legacy_body(), resp.text());

    let envelope = resp.envelope(ApiVersion::V1)?;
    assert_eq!("ok", envelope.status_code);
    Ok(())
}

#[tokio::test]
async fn test_unknown_encoding_keeps_raw_body() -> Result<()> {
    let raw = Bytes::from_static(b"\x8b\x02\x80compressed");
    let body = raw.clone();
    let mock = MockHttpSend::new(move |_| encoded("br", body.clone()));
    let client = client(&mock);

    let resp = client.send(http::Method::GET, LIST, &Params::new()).await?;
    assert_eq!(raw, resp.body);
    assert_eq!("br", resp.headers["content-encoding"]);
    assert_eq!(
        Some(ErrorKind::UnknownCompression),
        resp.compression_error.as_ref().map(|e| e.kind())
    );

    let err = client.get(LIST, &Params::new()).await.unwrap_err();
    assert_eq!(ErrorKind::UnknownCompression, err.kind());
    Ok(())
}

#[tokio::test]
async fn test_transport_decompressed_body_is_left_alone() -> Result<()> {
    let mock = MockHttpSend::new(|_| {
        let mut resp = encoded("gzip", Bytes::from(legacy_body()));
        resp.extensions_mut().insert(Decompressed);
        resp
    });

    let envelope = client(&mock).get(LIST, &Params::new()).await?;
    assert_eq!(json!([{"Id": 1000005}]), envelope.data["employees"]);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_gzip_is_encoding_error() {
    let mock = MockHttpSend::new(|_| encoded("gzip", Bytes::from_static(b"not gzip at all")));

    let err = client(&mock).get(LIST, &Params::new()).await.unwrap_err();
    assert_eq!(ErrorKind::Encoding, err.kind());
}

#[tokio::test]
async fn test_legacy_error_status() {
    let mock = MockHttpSend::new(|_| {
        json_response(
            StatusCode::OK,
            json!({"status": {"code": "error", "message": "Доступ запрещён"}}),
        )
    });

    let err = client(&mock).get(LIST, &Params::new()).await.unwrap_err();
    assert_eq!(ErrorKind::RemoteApi, err.kind());
    assert_eq!("Доступ запрещён", err.message());
}

#[tokio::test]
async fn test_server_failure_without_envelope() {
    let mock = MockHttpSend::new(|_| {
        Response::builder()
            .status(StatusCode::BAD_GATEWAY)
            .body(Bytes::from_static(b"<html>502 Bad Gateway</html>"))
            .unwrap()
    });

    let err = client(&mock).get(LIST, &Params::new()).await.unwrap_err();
    assert_eq!(ErrorKind::Transport, err.kind());
}

#[tokio::test]
async fn test_modern_field_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("token.json");
    std::fs::write(
        &path,
        json!({"access_token": "t0k3n", "expiry": "2999-01-01T00:00:00Z"}).to_string(),
    )?;

    let mock = MockHttpSend::new(|_| {
        json_response(
            StatusCode::BAD_REQUEST,
            json!({
                "meta": {
                    "status": 400,
                    "errors": [
                        {"field": "name", "message": "Обязательное поле"},
                        {"field": "responsible", "message": "Unknown employee"}
                    ]
                },
                "data": null
            }),
        )
    });
    let config = Config::new("example.megaplan.ru")
        .with_api_version(ApiVersion::V3)
        .with_token_file(path.to_string_lossy());
    let client = Client::from_config(mock.context(), &config)?;

    let err = client
        .post_json("/api/v3/task", &json!({}))
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::RemoteApi, err.kind());
    assert_eq!(
        "FIELD: name MESSAGE: Обязательное поле\nFIELD: responsible MESSAGE: Unknown employee",
        err.message()
    );
    Ok(())
}

#[tokio::test]
async fn test_pagination() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("token.json");
    std::fs::write(&path, json!({"access_token": "t0k3n"}).to_string())?;

    let mock = MockHttpSend::new(|_| {
        json_response(
            StatusCode::OK,
            json!({
                "meta": {
                    "status": 200,
                    "errors": [],
                    "pagination": {"count": 42, "limit": 10, "hasMoreNext": true, "hasMorePrev": false}
                },
                "data": [{"contentType": "Task", "id": "1"}]
            }),
        )
    });
    let config = Config::new("example.megaplan.ru")
        .with_api_version(ApiVersion::V3)
        .with_token_file(path.to_string_lossy());

    let envelope = Client::from_config(mock.context(), &config)?
        .search("/api/v3/task", &json!({"limit": 10}))
        .await?;
    assert!(envelope.has_more_next());
    assert!(!envelope.has_more_prev());
    assert_eq!(42, envelope.pagination.count);
    Ok(())
}
