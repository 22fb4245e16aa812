//! `lightpoke poke`: send one trigger and exit.

use lightpoke_api::{Method, ServerEndpoint, StreamSession, protocol};
use tracing::debug;

use crate::cli::{GlobalOpts, PokeArgs};
use crate::config;
use crate::error::CliError;

pub async fn handle(args: PokeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load(global)?;
    config::require_api_key(&mut cfg, global, args.api_key)?;

    let client = cfg.client_config();
    let endpoint = ServerEndpoint::parse(&client.server_url);
    let path = protocol::poke_path(&client.api_key);
    debug!(endpoint = %endpoint, "sending poke");

    let mut session = StreamSession::new(cfg.transport());
    session.open(&endpoint)?;
    session.send_one_shot(Method::POST, &path).await?;
    session.close();

    println!("Poke sent via {endpoint}");
    Ok(())
}
