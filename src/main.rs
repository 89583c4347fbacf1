//! Launch console - terminal entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launch_console::{
    CardOptions, CardProfile, ConsoleConfig, ConsoleContext, ConsoleEvent, ConsoleEvents,
    LaunchCard, LaunchGate, LaunchOutcome, ModelApi, ModelKind, Navigator, NoopNavigator,
    RestModelApi, SystemNavigator, navigate, view,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "launch-console")]
#[command(about = "Card-based launch console for model serving APIs", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the serving API endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the launchable model catalog as cards
    List {
        /// Model type to list
        #[arg(long, value_enum, default_value = "embedding")]
        model_type: ModelKind,
    },
    /// Launch a model and open the running-models page
    Launch {
        /// Model name from the catalog
        model_name: String,

        #[arg(long, value_enum, default_value = "embedding")]
        model_type: ModelKind,

        /// Model UID for the new instance (generated when omitted)
        #[arg(long)]
        model_uid: Option<String>,

        /// Skip opening the running-models page in a browser
        #[arg(long)]
        no_open: bool,
    },
    /// Remove a custom model registration
    Unregister {
        model_name: String,

        #[arg(long, value_enum, default_value = "embedding")]
        model_type: ModelKind,
    },
    /// List running model instances
    Running,
    /// Terminate a running model instance
    Terminate {
        /// Model UID of the instance
        model_uid: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    match cli.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .init();
        }
    }

    // Load configuration
    let mut config = ConsoleConfig::load(cli.config)?;

    // CLI overrides
    if let Some(endpoint) = cli.endpoint {
        config.server_url = endpoint.trim_end_matches('/').to_string();
    }

    config.validate()?;

    tracing::debug!(server_url = %config.server_url, "Configuration loaded");

    let api = Arc::new(RestModelApi::new(
        config.server_url.clone(),
        config.request_timeout(),
    )?);

    match cli.command {
        Command::List { model_type } => list_models(&config, api, model_type).await,
        Command::Launch {
            model_name,
            model_type,
            model_uid,
            no_open,
        } => launch_model(&config, api, model_type, &model_name, model_uid, no_open).await,
        Command::Unregister {
            model_name,
            model_type,
        } => unregister_model(api, model_type, &model_name).await,
        Command::Running => list_running(api).await,
        Command::Terminate { model_uid } => terminate_model(api, &model_uid).await,
    }
}

/// Collaborator bundle shared by every card the command mounts
fn console_context(config: &ConsoleConfig, api: Arc<RestModelApi>, no_open: bool) -> ConsoleContext {
    let navigator: Arc<dyn Navigator> = if no_open {
        Arc::new(NoopNavigator)
    } else {
        Arc::new(SystemNavigator)
    };

    ConsoleContext {
        base_url: config.server_url.clone(),
        gate: Arc::new(LaunchGate::new()),
        api,
        events: ConsoleEvents::new(),
        navigator,
    }
}

/// Log console events the way the web page surfaces them
fn drain_events(events: &ConsoleEvents) -> tokio::task::JoinHandle<()> {
    let mut events_rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events_rx.recv().await {
            match event {
                ConsoleEvent::Error { message } => {
                    tracing::warn!(message = %message, "Console error");
                }
                ConsoleEvent::LaunchCompleted {
                    model_uid,
                    model_name,
                } => {
                    tracing::info!(
                        model = %model_name,
                        model_uid = %model_uid,
                        "Launch completed"
                    );
                }
                ConsoleEvent::RegistrationDeleted { model_name } => {
                    tracing::info!(model = %model_name, "Registration deleted");
                }
            }
        }
    })
}

async fn list_models(
    config: &ConsoleConfig,
    api: Arc<RestModelApi>,
    kind: ModelKind,
) -> Result<()> {
    let context = console_context(config, api.clone(), true);

    // Cards refuse launches while the catalog loads
    context.gate.set_updating(true);
    let registrations = api.list_registrations(kind).await;
    context.gate.set_updating(false);
    let registrations = registrations?;

    if registrations.is_empty() {
        println!("No {} models registered", kind);
        return Ok(());
    }

    for registration in registrations {
        let is_custom = registration.is_custom();
        let card = LaunchCard::new(
            registration.descriptor,
            CardProfile::for_kind(kind),
            context.clone(),
            CardOptions {
                card_height: config.card_height,
                is_custom,
            },
        );

        for line in view::card_lines(&card).await {
            println!("  {}", line);
        }
        println!();
    }

    Ok(())
}

async fn launch_model(
    config: &ConsoleConfig,
    api: Arc<RestModelApi>,
    kind: ModelKind,
    model_name: &str,
    model_uid: Option<String>,
    no_open: bool,
) -> Result<()> {
    let context = console_context(config, api.clone(), no_open);
    let event_drain = drain_events(&context.events);

    context.gate.set_updating(true);
    let registrations = api.list_registrations(kind).await;
    context.gate.set_updating(false);

    let registration = registrations?
        .into_iter()
        .find(|r| r.descriptor.model_name == model_name)
        .with_context(|| format!("Model '{}' is not in the {} catalog", model_name, kind))?;

    let is_custom = registration.is_custom();
    let card = LaunchCard::new(
        registration.descriptor,
        CardProfile::for_kind(kind),
        context.clone(),
        CardOptions {
            card_height: config.card_height,
            is_custom,
        },
    );

    // Same sequence as the card UI: flip, fill in the UID, launch
    card.click().await;
    if let Some(uid) = model_uid {
        card.set_uid_input(uid).await;
    }

    let outcome = card.launch().await;
    event_drain.abort();

    match outcome {
        LaunchOutcome::Launched { model_uid } => {
            println!("Launched '{}' as {}", model_name, model_uid);
            if no_open {
                println!(
                    "Running models: {}",
                    navigate::running_models_page(&config.server_url)
                );
            }
            Ok(())
        }
        LaunchOutcome::Busy => anyhow::bail!("Another console call is in flight"),
        LaunchOutcome::Unavailable => {
            anyhow::bail!("Model '{}' is no longer available", model_name)
        }
        LaunchOutcome::Failed { message } => anyhow::bail!(message),
    }
}

async fn unregister_model(api: Arc<RestModelApi>, kind: ModelKind, model_name: &str) -> Result<()> {
    let registration = api
        .list_registrations(kind)
        .await?
        .into_iter()
        .find(|r| r.descriptor.model_name == model_name)
        .with_context(|| format!("Model '{}' is not in the {} catalog", model_name, kind))?;

    if registration.is_builtin {
        anyhow::bail!(
            "'{}' is a built-in model and cannot be unregistered",
            model_name
        );
    }

    api.unregister_model(kind, model_name).await?;
    println!("Unregistered '{}'", model_name);

    Ok(())
}

async fn list_running(api: Arc<RestModelApi>) -> Result<()> {
    let running = api.list_running().await?;

    if running.is_empty() {
        println!("No running models");
        return Ok(());
    }

    for (uid, model) in running {
        match model.replica {
            Some(replica) => println!(
                "{}  {} ({}, replica {})",
                uid, model.model_name, model.model_type, replica
            ),
            None => println!("{}  {} ({})", uid, model.model_name, model.model_type),
        }
    }

    Ok(())
}

async fn terminate_model(api: Arc<RestModelApi>, model_uid: &str) -> Result<()> {
    api.terminate_model(model_uid).await?;
    println!("Terminated {}", model_uid);

    Ok(())
}
