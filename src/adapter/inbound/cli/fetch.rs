//! Handler for the `fetch` command.

use std::io::IsTerminal;

use dialoguer::{Input, Password};
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use crate::adapter::inbound::cli::command::FetchArgs;
use crate::adapter::inbound::cli::{output, render};
use crate::domain::Query;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::credentials::{APPEEARS_PASSWORD, APPEEARS_USERNAME};
use crate::infrastructure::config::{Config, Credentials};

/// Execute the fetch command.
///
/// Invalid queries and failed retrievals are reported as a no-data answer;
/// only configuration and startup problems are errors.
pub async fn execute(args: &FetchArgs) -> Result<()> {
    let config = Config::load_or_default(&args.config)?;
    super::init_logging(&config);

    let query = match Query::parse(
        &args.latitude,
        &args.longitude,
        &args.date_start,
        &args.date_end,
    ) {
        Ok(query) => query,
        Err(e) => {
            render::no_data(&format!("Invalid query: {e}"));
            return Ok(());
        }
    };

    let credentials = complete_credentials(Credentials::from_env())?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let retriever = bootstrap::build_retriever_with(&config, &credentials, shutdown_rx).await?;

    let interrupt = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling retrieval");
            let _ = shutdown_tx.send(true);
        }
    });

    let answer = retriever.answer(&query).await;
    interrupt.abort();

    render::answer(&answer);
    Ok(())
}

/// Prompt for missing Earthdata credentials on an interactive terminal.
fn complete_credentials(mut credentials: Credentials) -> Result<Credentials> {
    let interactive = std::io::stdin().is_terminal() && !output::is_json();
    if !interactive {
        return Ok(credentials);
    }

    if credentials.username.is_none() {
        output::hint(&format!("{APPEEARS_USERNAME} is not set"));
        let username: String = Input::new().with_prompt("Earthdata username").interact_text()?;
        credentials.username = Some(username.trim().to_string());
    }
    if credentials.password.is_none() {
        output::hint(&format!("{APPEEARS_PASSWORD} is not set"));
        credentials.password = Some(Password::new().with_prompt("Earthdata password").interact()?);
    }
    Ok(credentials)
}
