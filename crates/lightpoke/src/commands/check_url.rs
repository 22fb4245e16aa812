//! `lightpoke check-url`: run a candidate through the server allow-list.

use lightpoke_api::{ServerEndpoint, is_valid_server_url};

use crate::cli::CheckUrlArgs;
use crate::error::CliError;

pub fn handle(args: &CheckUrlArgs) -> Result<(), CliError> {
    if !is_valid_server_url(&args.url) {
        return Err(CliError::UntrustedServer {
            url: args.url.clone(),
        });
    }

    let endpoint = ServerEndpoint::parse(&args.url);
    println!("{} is accepted ({endpoint})", args.url);
    Ok(())
}
