use std::path::Path;
use std::sync::Arc;

use cvmbot_commands::{EmojiCatalog, EmojiCommands};
use cvmbot_session::{SessionEnd, SessionOutcome, Supervisor};
use tokio_util::sync::CancellationToken;

use crate::cmd::RunArgs;
use crate::config::BotConfig;
use crate::exit::{config_error, io_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_outcomes, OutputFormat};

pub fn run(args: RunArgs, config_path: &Path, format: OutputFormat) -> CliResult<i32> {
    // Configuration problems are reported before any network activity.
    let mut config = BotConfig::load(config_path).map_err(config_error)?;
    if let Some(url) = args.emojilist_url {
        config.emojilist_url = url;
    }
    tracing::debug!(?config, "loaded config");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("runtime setup failed", err))?;

    let outcomes = runtime.block_on(run_bot(config));
    print_outcomes(&outcomes, format);
    Ok(exit_code(&outcomes))
}

async fn run_bot(config: BotConfig) -> Vec<SessionOutcome> {
    let shutdown = CancellationToken::new();
    let signal = tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let catalog = tokio::select! {
        biased;
        _ = shutdown.cancelled() => EmojiCatalog::default(),
        catalog = EmojiCatalog::fetch(&config.emojilist_url) => catalog,
    };
    let dispatcher = EmojiCommands::new(config.trigger(), Arc::new(catalog));
    let supervisor = Supervisor::new(config.session_config(), Arc::new(dispatcher));

    tracing::info!(endpoints = config.vms.len(), "starting sessions");
    let outcomes = supervisor.run(config.vms, shutdown).await;
    signal.abort();
    outcomes
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("shutdown requested");
            shutdown.cancel();
        }
        Err(err) => tracing::warn!(error = %err, "failed to listen for Ctrl-C"),
    }
}

/// Fails only when every session failed or was rejected by its server.
fn exit_code(outcomes: &[SessionOutcome]) -> i32 {
    let failed = |outcome: &SessionOutcome| {
        matches!(outcome.result, Err(_) | Ok(SessionEnd::Rejected(_)))
    };
    if !outcomes.is_empty() && outcomes.iter().all(failed) {
        FAILURE
    } else {
        SUCCESS
    }
}
