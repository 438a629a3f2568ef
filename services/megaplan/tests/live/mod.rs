use std::env;

use log::{debug, warn};
use megaplan::{ApiVersion, Client, Config, Params};
use megaplan_core::{Context, OsEnv, Result};
use megaplan_file_tokio::{TokioFileRead, TokioFileWrite};
use megaplan_http_send_reqwest::ReqwestHttpSend;

fn init_live_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("MEGAPLAN_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_file_write(TokioFileWrite)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::from_env(&ctx);

    Some(Client::from_config(ctx, &config).expect("client config must be valid"))
}

#[tokio::test]
async fn test_live_smoke() -> Result<()> {
    let Some(client) = init_live_client() else {
        warn!("MEGAPLAN_TEST is not set, skipped");
        return Ok(());
    };

    let envelope = match client.api_version() {
        ApiVersion::V1 => {
            client
                .get("/BumsStaffApiV01/Employee/list.api", &Params::new())
                .await?
        }
        ApiVersion::V3 => client.get("/api/v3/currentUser", &Params::new()).await?,
    };

    debug!("got envelope: {envelope:?}");
    assert!(!envelope.is_error());
    Ok(())
}
