use std::sync::Arc;

use anyhow::{Context, Result, bail};
use kfs_client::{ClientConfig, MemorySession, UserService};

const ACCESS_TOKEN_ENV: &str = "KFS_ACCESS_TOKEN";
const CLIENT_ID_ENV: &str = "KFS_CLIENT_ID";

const USAGE: &str = "usage: kfs-account <get|delete> <username>";

#[tokio::main]
async fn main() -> Result<()> {
    kfs_observability::init();

    let mut args = std::env::args().skip(1);
    let (Some(command), Some(username)) = (args.next(), args.next()) else {
        bail!(USAGE);
    };

    let config = ClientConfig::from_env().context("failed to load user API configuration")?;

    let session = MemorySession::new();
    match std::env::var(ACCESS_TOKEN_ENV) {
        Ok(token) => session.set_access_token(Some(token)),
        Err(_) => tracing::warn!("{ACCESS_TOKEN_ENV} not set; sending unauthenticated requests"),
    }
    session.set_client_id(std::env::var(CLIENT_ID_ENV).ok());

    tracing::info!(endpoint = %config.endpoint(), %command, "calling user API");
    let service = UserService::new(config, Arc::new(session));

    match command.as_str() {
        "get" => {
            let user = service.get_account_info(&username).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        "delete" => {
            let deleted = service.delete_account(&username).await?;
            println!("{}", if deleted { "deleted" } else { "rejected" });
        }
        other => bail!("unknown command `{other}`; {USAGE}"),
    }

    Ok(())
}
