use std::sync::Arc;

use anyhow::Context;
use livecheck_binding::{Binding, Bindings};
use livecheck_core::{CompilationStatus, CompilerState, Executor, JobRegistry, Results};
use livecheck_executor::{EventStream, EventStreamClient, ExecutorApi, InMemoryJobRegistry};
use livecheck_watch::command::{parse_line, Command};
use livecheck_watch::config::WatchConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = WatchConfig::from_env().context("Invalid configuration")?;

    // --- Tracing ---
    // stdout carries results, so logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "livecheck_watch=debug,livecheck_binding=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!(
        api_url = %config.api_url,
        ws_url = %config.ws_url,
        analysis = %config.analysis,
        "Loaded watch configuration"
    );

    // --- Executor ---
    let api = Arc::new(ExecutorApi::new(&config.api_url));
    let initial_status = match api.compilation_status().await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!(error = %e, "Could not fetch compilation status, assuming compiling");
            CompilationStatus::new(CompilerState::Compiling)
        }
    };

    // --- Event stream ---
    let job_registry = Arc::new(InMemoryJobRegistry::new());
    let stream = EventStream::start(
        EventStreamClient::new(&config.ws_url),
        Arc::clone(&job_registry),
        initial_status,
        config.reconnect.clone(),
    );

    // --- Bindings ---
    let bindings = Bindings::new(
        Arc::clone(&api) as Arc<dyn Executor>,
        job_registry as Arc<dyn JobRegistry>,
        stream.compilation_status(),
        config.binding.clone(),
    );
    let binding = bindings.get_or_create(config.analysis).await;

    let printer = tokio::spawn(print_results(binding.subscribe()));

    tokio::select! {
        result = read_commands(&binding) => match result {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("stdin closed, watching until interrupted");
                shutdown_signal().await;
            }
            Err(e) => tracing::error!(error = %e, "Reading stdin failed"),
        },
        () = shutdown_signal() => {}
    }

    // --- Shutdown ---
    bindings.shutdown_all().await;
    stream.shutdown().await;
    printer.abort();
    tracing::info!("Watch stopped");
    Ok(())
}

/// Apply stdin lines to the binding until EOF or `:quit`.
///
/// Returns `true` when the user asked to quit.
async fn read_commands(binding: &Binding) -> std::io::Result<bool> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring line");
                continue;
            }
        };

        match command {
            Command::Input(json) => {
                if let Err(e) = binding.set_input_value(json) {
                    tracing::warn!(error = %e, "Input rejected");
                }
            }
            Command::Generate => match binding.generate().await {
                Ok(input) => println!("{}", serde_json::json!({ "generated": input })),
                Err(e) => tracing::warn!(error = %e, "Generation failed"),
            },
            Command::Show => print_json(&binding.results()),
            Command::Quit => return Ok(true),
        }
    }
    Ok(false)
}

async fn print_results(mut rx: tokio::sync::watch::Receiver<Results>) {
    while rx.changed().await.is_ok() {
        let results = rx.borrow_and_update().clone();
        print_json(&results);
    }
}

fn print_json(results: &Results) {
    match serde_json::to_string(results) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!(error = %e, "Failed to encode results"),
    }
}

/// Wait for Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
