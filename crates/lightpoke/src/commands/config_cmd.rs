//! Config subcommand handlers.

use lightpoke_api::is_valid_server_url;
use lightpoke_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;

const MASK: &str = "********";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            api_key,
            server,
            device,
            force,
        } => {
            let path = config::config_file(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            if let Some(key) = api_key {
                cfg.client.api_key = key;
            }
            if let Some(server) = server {
                if !is_valid_server_url(&server) {
                    return Err(CliError::UntrustedServer { url: server });
                }
                cfg.client.server = server;
            }
            if let Some(device) = device {
                cfg.device.url = device;
            }
            cfg.device_url()?;

            lightpoke_config::save_config_to(&cfg, &path)?;
            eprintln!("Wrote {}", path.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = config::load(global)?;
            if !cfg.client.api_key.is_empty() {
                cfg.client.api_key = MASK.into();
            }
            print!("{}", toml::to_string_pretty(&cfg)?);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_file(global).display());
            Ok(())
        }
    }
}
