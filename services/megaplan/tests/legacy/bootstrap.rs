use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use megaplan::{Bootstrapper, Client, Config, OneTimeCode, Params};
use megaplan_core::{ErrorKind, Result};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::mock::{legacy_error, legacy_ok, not_found, MockHttpSend, Recorded};

const ONE_TIME_KEY_PATH: &str = "/BumsCommonApiV01/User/createOneTimeKeyAuth.api";
const AUTHORIZE_PATH: &str = "/BumsCommonApiV01/User/authorize.api";
const PASSWORD_MD5: &str = "5ebe2294ecd0e0f08eab7690d2a6ee69";

fn form(req: &Recorded) -> Vec<(String, String)> {
    Params::decode(&req.body_text())
}

/// A server issuing single use codes for ivanov/secret.
fn server() -> MockHttpSend {
    let issued = Arc::new(Mutex::new(0u32));
    let used = Arc::new(Mutex::new(HashSet::new()));

    MockHttpSend::new(move |req| {
        let form = form(req);
        let field = |name: &str| {
            form.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        if field("Login") != "ivanov" || field("Password") != PASSWORD_MD5 {
            return legacy_error("Неверный логин или пароль");
        }

        match req.path() {
            ONE_TIME_KEY_PATH => {
                let mut issued = issued.lock().unwrap();
                *issued += 1;
                legacy_ok(json!({"OneTimeKey": format!("otc-{issued}")}))
            }
            AUTHORIZE_PATH => {
                let code = field("OneTimeKey");
                if !code.starts_with("otc-") || !used.lock().unwrap().insert(code) {
                    return legacy_error("One-time key is invalid or expired");
                }
                legacy_ok(json!({"AccessId": "id-1", "SecretKey": "key-1"}))
            }
            _ => not_found(),
        }
    })
}

#[tokio::test]
async fn test_bootstrap_two_steps() -> Result<()> {
    let mock = server();
    let ctx = mock.context();
    let bootstrapper = Bootstrapper::new("https://example.megaplan.ru", "ivanov", "secret");

    let code = bootstrapper.request_one_time_code(&ctx).await?;
    assert_eq!("otc-1", code.as_str());

    let cred = bootstrapper.exchange_code_for_token(&ctx, code).await?;
    assert_eq!("id-1", cred.access_id);
    assert_eq!("key-1", cred.secret_key);

    let requests = mock.requests();
    assert_eq!(2, requests.len());
    assert_eq!(
        vec![
            ("Login".to_string(), "ivanov".to_string()),
            ("Password".to_string(), PASSWORD_MD5.to_string()),
        ],
        form(&requests[0])
    );
    assert!(requests[1]
        .body_text()
        .contains("OneTimeKey=otc-1"));
    // Bootstrap calls are not signed.
    assert!(requests
        .iter()
        .all(|r| r.headers.get("x-authorization").is_none()));
    Ok(())
}

#[tokio::test]
async fn test_reused_code_is_rejected() -> Result<()> {
    let mock = server();
    let ctx = mock.context();
    let bootstrapper = Bootstrapper::new("https://example.megaplan.ru", "ivanov", "secret");

    let code = bootstrapper.request_one_time_code(&ctx).await?;
    let replay = OneTimeCode::new(code.as_str());
    bootstrapper.exchange_code_for_token(&ctx, code).await?;

    let err = bootstrapper
        .exchange_code_for_token(&ctx, replay)
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::Authentication, err.kind());
    assert_eq!("One-time key is invalid or expired", err.message());
    Ok(())
}

#[tokio::test]
async fn test_wrong_password() {
    let mock = server();
    let bootstrapper = Bootstrapper::new("https://example.megaplan.ru", "ivanov", "wrong");

    let err = bootstrapper
        .authenticate(&mock.context())
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::Authentication, err.kind());
    assert_eq!(1, mock.requests().len());
}

#[tokio::test]
async fn test_client_bootstraps_once_and_saves_pair() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("megaplan").join("credentials.json");
    let config = Config::new("example.megaplan.ru")
        .with_login("ivanov", "secret")
        .with_credential_file(path.to_string_lossy());

    let auth = server();
    let mock = MockHttpSend::new(move |req| {
        if req.path().starts_with("/BumsCommonApiV01/User/") {
            return auth.respond(req);
        }
        if !req.header("x-authorization").starts_with("id-1:") {
            return legacy_error("Unauthorized");
        }
        legacy_ok(json!({"employees": []}))
    });

    let client = Client::from_config(mock.context(), &config)?;
    client
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await?;
    client
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await?;
    assert_eq!(1, mock.hits(ONE_TIME_KEY_PATH));
    assert_eq!(1, mock.hits(AUTHORIZE_PATH));

    let saved: serde_json::Value = serde_json::from_slice(&std::fs::read(&path)?)?;
    assert_eq!("id-1", saved["AccessId"]);
    assert_eq!("key-1", saved["SecretKey"]);

    // A new process loads the saved pair instead of bootstrapping again.
    let client = Client::from_config(mock.context(), &config)?;
    client
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await?;
    assert_eq!(1, mock.hits(ONE_TIME_KEY_PATH));
    Ok(())
}

#[tokio::test]
async fn test_client_reports_outage_during_bootstrap() {
    let mock = MockHttpSend::new(|_| {
        http::Response::builder()
            .status(http::StatusCode::SERVICE_UNAVAILABLE)
            .body(bytes::Bytes::from_static(b"<html>maintenance</html>"))
            .unwrap()
    });
    let config = Config::new("example.megaplan.ru").with_login("ivanov", "secret");

    let client = Client::from_config(mock.context(), &config).unwrap();
    let err = client
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::Transport, err.kind());
    assert_eq!(1, mock.hits(ONE_TIME_KEY_PATH));
    assert_eq!(0, mock.hits("/BumsStaffApiV01/Employee/list.api"));
}

#[tokio::test]
async fn test_client_without_transport_reports_transport_error() {
    let config = Config::new("example.megaplan.ru").with_login("ivanov", "secret");

    let client = Client::from_config(megaplan_core::Context::new(), &config).unwrap();
    let err = client
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::Transport, err.kind());
}

#[tokio::test]
async fn test_corrupt_saved_pair_is_replaced() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "AccessId=stale")?;
    let config = Config::new("example.megaplan.ru")
        .with_login("ivanov", "secret")
        .with_credential_file(path.to_string_lossy());

    let auth = server();
    let mock = MockHttpSend::new(move |req| {
        if req.path().starts_with("/BumsCommonApiV01/User/") {
            return auth.respond(req);
        }
        legacy_ok(json!({"employees": []}))
    });

    Client::from_config(mock.context(), &config)?
        .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
        .await?;
    assert_eq!(1, mock.hits(AUTHORIZE_PATH));
    assert!(mock.last().header("x-authorization").starts_with("id-1:"));

    let saved: serde_json::Value = serde_json::from_slice(&std::fs::read(&path)?)?;
    assert_eq!("id-1", saved["AccessId"]);
    Ok(())
}
