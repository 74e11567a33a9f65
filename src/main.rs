#![forbid(unsafe_code)]

//! `agent-steward` — command-line access to a session state document.
//!
//! Each invocation opens the state file, applies one mutation through the
//! [`Coordinator`], and exits. Status changes that a human should hear about
//! are forwarded to the configured notification channels.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use agent_steward::config::GlobalConfig;
use agent_steward::models::state::{WorkflowState, WorkflowStatus};
use agent_steward::notify::{describe_transition, NotificationDispatcher};
use agent_steward::{AppError, Coordinator, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "agent-steward", about = "Supervised agent session state", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the state document location.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a fresh state document.
    Init {
        /// Initial task description.
        #[arg(long)]
        task: Option<String>,
        /// Overwrite an existing document.
        #[arg(long)]
        force: bool,
    },

    /// Print the current state as JSON.
    Show,

    /// Replace the current task description.
    Task {
        /// New task text.
        text: String,
    },

    /// Append a progress entry.
    Progress {
        /// Agent recording the entry.
        #[arg(long)]
        agent: String,
        /// What was done.
        description: String,
    },

    /// Set the session status (working, agent-done, or complete).
    Status {
        /// New status.
        value: String,
    },

    /// Make an agent the current agent.
    BeginAgent {
        /// Agent name.
        agent: String,
        /// Model the agent runs on.
        #[arg(long, default_value = "")]
        model: String,
    },

    /// Leave a message for another agent.
    Message {
        /// Sending agent.
        #[arg(long)]
        from: String,
        /// Recipient agent.
        #[arg(long)]
        to: String,
        /// Message text.
        body: String,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
        .inspect_err(|err| error!(%err, "command failed"))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => {
            let state = args.state.clone().ok_or_else(|| {
                AppError::Config("either --config or --state is required".into())
            })?;
            GlobalConfig::for_state_path(state)
        }
    };
    if let Some(state) = args.state {
        config.state_path = state;
    }

    match args.command {
        Command::Init { task, force } => {
            if config.state_path.exists() && !force {
                return Err(AppError::Config(format!(
                    "state already exists at {}; pass --force to overwrite",
                    config.state_path.display()
                )));
            }
            let mut state = WorkflowState::new();
            state.task = task.unwrap_or_default();
            Coordinator::with_state(&config.state_path, state)?;
            info!(path = %config.state_path.display(), "state initialised");
        }
        Command::Show => {
            let coordinator = open_or_empty(&config)?;
            let json = serde_json::to_string_pretty(&coordinator.snapshot())
                .map_err(|err| AppError::Io(format!("failed to render state: {err}")))?;
            println!("{json}");
        }
        Command::Task { text } => {
            open_or_empty(&config)?.update(|state| state.task = text)?;
        }
        Command::Progress { agent, description } => {
            open_or_empty(&config)?.update(|state| state.append_progress(agent, description))?;
        }
        Command::Status { value } => {
            let status = WorkflowStatus::from(value);
            if !status.is_agent_settable() {
                return Err(AppError::Config(format!(
                    "status must be working, agent-done, or complete: {status}"
                )));
            }
            let coordinator = open_or_empty(&config)?;
            let before = coordinator.snapshot();
            coordinator.update(|state| state.status = status)?;
            let after = coordinator.snapshot();

            if let Some(notification) = describe_transition(&before, &after) {
                let dispatcher = NotificationDispatcher::from_config(&config.notifications);
                if dispatcher.is_enabled() {
                    dispatcher.dispatch(&notification).await;
                }
            }
        }
        Command::BeginAgent { agent, model } => {
            open_or_empty(&config)?.update(|state| state.begin_agent(agent, model))?;
        }
        Command::Message { from, to, body } => {
            let id = open_or_empty(&config)?.update(|state| state.post_message(from, to, body))?;
            println!("{id}");
        }
    }

    Ok(())
}

/// Open the configured state document, starting empty if none exists yet.
fn open_or_empty(config: &GlobalConfig) -> Result<Coordinator> {
    let coordinator = if config.state_path.exists() {
        Coordinator::open(&config.state_path)?
    } else {
        info!(path = %config.state_path.display(), "no state document yet; starting empty");
        Coordinator::new_empty(&config.state_path)
    };
    Ok(coordinator.with_soft_stop(config.soft_stop()))
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
