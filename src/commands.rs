use crate::cli::{FetchArgs, PathsArgs};
use feedrace::config::Config;
use feedrace::race::{CancelHandle, FetchStatus, PathSet, RaceFetcher};
use std::process::ExitCode;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Exit code for a fetch stopped by Ctrl+C / SIGTERM
const EXIT_CANCELLED: u8 = 130;

pub async fn fetch(mut config: Config, args: FetchArgs) -> Result<ExitCode, AnyError> {
    if let Some(deadline) = args.deadline {
        config.race.deadline = deadline;
        config.validate()?;
    }

    let fetcher = RaceFetcher::from_config(&config)?;
    let cancel = CancelHandle::new();

    let signal_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let report = |status: FetchStatus| info!(%status, "Fetch status");

    info!(url = %args.url, deadline = %config.race.deadline, "Fetching");
    let result = fetcher
        .fetch_detailed(&args.url, Some(&cancel), Some(&report))
        .await;
    signal_task.abort();

    match result {
        Ok(success) => {
            info!(
                path = %success.path_name,
                index = success.won_by_index,
                bytes = success.body.len(),
                "Fetched"
            );
            let mut stdout = tokio::io::stdout();
            stdout.write_all(success.body.as_bytes()).await?;
            stdout.flush().await?;
            Ok(ExitCode::SUCCESS)
        }
        // Superseded by the user: no error banner
        Err(e) if e.is_cancelled() => Ok(ExitCode::from(EXIT_CANCELLED)),
        Err(e) => {
            error!(error = %e, "Fetch failed");
            eprintln!("error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn paths(config: Config, args: PathsArgs) -> Result<ExitCode, AnyError> {
    let paths = PathSet::from_config(&config.paths)?;
    let resolved = paths.resolve(&args.url);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else {
        for entry in resolved {
            println!("{:>2}  {:<12} {}", entry.index, entry.name, entry.address);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, cancelling fetch");
}
