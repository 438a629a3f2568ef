use http::Method;
use megaplan::{Client, Config, Params, RequestSigner, StaticCredentialProvider, TaskCard};
use megaplan_core::hash::base64_hex_hmac_sha1;
use megaplan_core::time::parse_rfc2822;
use megaplan_core::{Context, ErrorKind, Result, SignRequest};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

use crate::mock::{legacy_ok, MockHttpSend};

fn client(mock: &MockHttpSend, config: &Config) -> Client {
    Client::legacy(
        mock.context(),
        config,
        StaticCredentialProvider::new("access", "123456"),
    )
    .unwrap()
}

#[test_case(
    "GET",
    "https://example.megaplan.ru/BumsTaskApiV01/Task/list.api?EmployeeId=1000005&Status=actual",
    "Yzg1YjRmMTQ3MmFlMTczZTNjMzk3NWViMmY4MDE5NTIyZjI5YmRiYw=="
    ; "get with query"
)]
#[test_case(
    "POST",
    "https://example.megaplan.ru/BumsTaskApiV01/Task/create.api",
    "ZTA0NDhlZTM3YzIxM2RiMjIyNjRkZDk1ZmE3ZmM2NDM1NTVlYTc5OQ=="
    ; "post without query"
)]
#[tokio::test]
async fn test_known_signatures(method: &str, url: &str, signature: &str) -> Result<()> {
    let signer = RequestSigner::new().with_time(parse_rfc2822("Mon, 15 Aug 2022 16:50:12 +0000")?);
    let cred = megaplan::Credential::new("access", "123456", "example.megaplan.ru");

    let (mut parts, _) = http::Request::builder()
        .method(method)
        .uri(url)
        .body(())?
        .into_parts();
    signer
        .sign_request(&Context::new(), &mut parts, Some(&cred))
        .await?;

    assert_eq!(
        format!("access:{signature}"),
        parts.headers["x-authorization"].to_str().unwrap()
    );
    assert_eq!("Mon, 15 Aug 2022 16:50:12 +0000", parts.headers["date"]);
    assert_eq!("application/json", parts.headers["accept"]);
    assert_eq!(
        "application/x-www-form-urlencoded",
        parts.headers["content-type"]
    );
    Ok(())
}

#[tokio::test]
async fn test_get_is_signed_over_query() -> Result<()> {
    let mock = MockHttpSend::new(|_| {
        legacy_ok(json!({"tasks": [{"Id": 1000123, "Name": "Отчёт", "Status": "assigned"}]}))
    });
    let client = client(&mock, &Config::new("example.megaplan.ru"));

    let tasks: Vec<TaskCard> = client
        .get(
            "/BumsTaskApiV01/Task/list.api",
            &Params::new()
                .with("Status", "actual")
                .with("EmployeeId", 1000005),
        )
        .await?
        .data_by_key("tasks")?;
    assert_eq!(1, tasks.len());
    assert_eq!("Отчёт", tasks[0].name);

    let req = mock.last();
    assert_eq!(Method::GET, req.method);
    assert_eq!(Some("EmployeeId=1000005&Status=actual"), req.uri.query());
    assert!(req.body.is_empty());

    let string_to_sign = format!(
        "GET\n\napplication/x-www-form-urlencoded\n{}\nexample.megaplan.ru/BumsTaskApiV01/Task/list.api?EmployeeId=1000005&Status=actual",
        req.header("date")
    );
    assert_eq!(
        format!(
            "access:{}",
            base64_hex_hmac_sha1(b"123456", string_to_sign.as_bytes())
        ),
        req.header("x-authorization")
    );
    Ok(())
}

#[tokio::test]
async fn test_post_sends_form_body() -> Result<()> {
    let mock = MockHttpSend::new(|_| legacy_ok(json!({"task": {"Id": 1000124}})));
    let client = client(&mock, &Config::new("example.megaplan.ru"));

    client
        .post(
            "/BumsTaskApiV01/Task/create.api",
            &Params::new()
                .with("Model[Name]", "Подготовить отчёт")
                .with("Model[Responsible]", 1000005)
                .with("Model[PlannedWork]", 1.5),
        )
        .await?;

    let req = mock.last();
    assert_eq!(Method::POST, req.method);
    assert_eq!(None, req.uri.query());
    assert_eq!(
        "application/x-www-form-urlencoded",
        req.header("content-type")
    );

    let mut pairs = megaplan::Params::decode(&req.body_text());
    pairs.sort();
    assert_eq!(
        vec![
            ("Model[Name]".to_string(), "Подготовить отчёт".to_string()),
            ("Model[PlannedWork]".to_string(), "1.50".to_string()),
            ("Model[Responsible]".to_string(), "1000005".to_string()),
        ],
        pairs
    );

    let string_to_sign = format!(
        "POST\n\napplication/x-www-form-urlencoded\n{}\nexample.megaplan.ru/BumsTaskApiV01/Task/create.api",
        req.header("date")
    );
    assert_eq!(
        format!(
            "access:{}",
            base64_hex_hmac_sha1(b"123456", string_to_sign.as_bytes())
        ),
        req.header("x-authorization")
    );
    Ok(())
}

#[tokio::test]
async fn test_other_methods_are_rejected() {
    let mock = MockHttpSend::new(|_| legacy_ok(json!({})));
    let client = client(&mock, &Config::new("example.megaplan.ru"));

    let err = client
        .send(Method::PUT, "/BumsTaskApiV01/Task/edit.api", &Params::new())
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::RequestInvalid, err.kind());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_default_headers() -> Result<()> {
    let mock = MockHttpSend::new(|_| legacy_ok(json!({})));
    let config = Config::new("example.megaplan.ru")
        .with_gzip(true)
        .with_user_id(1000005);
    client(&mock, &config)
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await?;

    let req = mock.last();
    assert_eq!("gzip", req.header("accept-encoding"));
    assert_eq!("1000005", req.header("x-user-id"));
    assert!(req.header("user-agent").starts_with("megaplan-rs/"));
    Ok(())
}

#[tokio::test]
async fn test_non_positive_user_id_is_not_sent() -> Result<()> {
    let mock = MockHttpSend::new(|_| legacy_ok(json!({})));
    let config = Config::new("example.megaplan.ru").with_user_id(0);
    client(&mock, &config)
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await?;

    let req = mock.last();
    assert!(req.headers.get("x-user-id").is_none());
    assert!(req.headers.get("accept-encoding").is_none());
    Ok(())
}

#[tokio::test]
async fn test_without_access_pair() {
    let mock = MockHttpSend::new(|_| legacy_ok(json!({})));
    let client = Client::from_config(mock.context(), &Config::new("example.megaplan.ru")).unwrap();

    let err = client
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::Authentication, err.kind());
    assert!(mock.requests().is_empty());
}

async fn signature(method: &str, url: &str, date: &str, secret: &str) -> String {
    let signer = RequestSigner::new().with_time(parse_rfc2822(date).unwrap());
    let cred = megaplan::Credential::new("access", secret, "example.megaplan.ru");

    let (mut parts, _) = http::Request::builder()
        .method(method)
        .uri(url)
        .body(())
        .unwrap()
        .into_parts();
    signer
        .sign_request(&Context::new(), &mut parts, Some(&cred))
        .await
        .unwrap();
    parts.headers["x-authorization"].to_str().unwrap().to_string()
}

const BASE_URL: &str = "https://example.megaplan.ru/BumsTaskApiV01/Task/list.api?Status=actual";
const BASE_DATE: &str = "Mon, 15 Aug 2022 16:50:12 +0000";

#[tokio::test]
async fn test_signature_is_deterministic() {
    assert_eq!(
        signature("GET", BASE_URL, BASE_DATE, "123456").await,
        signature("GET", BASE_URL, BASE_DATE, "123456").await
    );
}

#[test_case("POST", BASE_URL, BASE_DATE, "123456" ; "method")]
#[test_case("GET", "https://example.megaplan.ru/BumsTaskApiV01/Task/card.api?Status=actual", BASE_DATE, "123456" ; "path")]
#[test_case("GET", "https://example.megaplan.ru/BumsTaskApiV01/Task/list.api?Status=done", BASE_DATE, "123456" ; "query")]
#[test_case("GET", BASE_URL, "Mon, 15 Aug 2022 16:50:13 +0000", "123456" ; "timestamp")]
#[test_case("GET", BASE_URL, BASE_DATE, "654321" ; "secret key")]
#[tokio::test]
async fn test_signature_changes_with(method: &str, url: &str, date: &str, secret: &str) {
    assert_ne!(
        signature("GET", BASE_URL, BASE_DATE, "123456").await,
        signature(method, url, date, secret).await
    );
}
