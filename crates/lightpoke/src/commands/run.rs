//! `lightpoke run`: the long-lived bridge loop.
//!
//! One task owns the controller and drives `tick` from a fixed interval.
//! Ctrl-C cancels the loop; dropping the controller closes the stream.

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::info;

use lightpoke_api::StreamSession;
use lightpoke_core::LightPoke;

use crate::cli::{GlobalOpts, RunArgs};
use crate::config;
use crate::error::CliError;
use crate::host::WledHost;

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load(global)?;
    config::require_api_key(&mut cfg, global, args.api_key)?;
    if let Some(device) = args.device {
        cfg.device.url = device;
    }
    let runtime = cfg.resolve()?;

    let host = WledHost::new(&runtime.device_url, &runtime.transport)?;
    let session = StreamSession::new(runtime.transport.clone());
    let mut lightpoke = LightPoke::new(runtime.client, runtime.tuning, session, host);

    info!(
        server = %lightpoke.config().server_url,
        device = %runtime.device_url,
        "starting lightpoke bridge"
    );

    lightpoke.setup();
    lightpoke.on_network_up().await;

    let cancel = CancellationToken::new();
    spawn_ctrl_c(cancel.clone());

    let mut ticker = interval(runtime.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            now = ticker.tick() => lightpoke.tick(now).await,
        }
    }

    info!("shutting down");
    Ok(())
}

fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}
