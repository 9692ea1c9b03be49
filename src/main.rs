//! CLI binary for taskdeck.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use inline_colorization::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use taskdeck::auth::LoginForm;
use taskdeck::config::{config_schema, load_config, ConfigV1};
use taskdeck::error::ClientError;
use taskdeck::models::TaskId;
use taskdeck::notify::ConsoleNotifier;
use taskdeck::startup::{build_authenticator, build_state, open_task_list};
use taskdeck::state::ClientState;
use taskdeck::tasks::{
    spawn_poller, AlwaysConfirm, ConfirmationPrompt, Confirmer, CreateTaskForm, DeleteOutcome,
    TaskListController, TaskListState,
};
use taskdeck::utils::logger::init_logging;

/// Used by `tasks list --watch` when no poll interval is configured.
const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(30);

/// taskdeck: sign in and manage your tasks on a remote task API.
#[derive(Parser)]
#[command(name = "taskdeck", version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, env = "TASKDECK_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
        /// Page to return to after signing in.
        #[arg(long)]
        from: Option<String>,
    },
    /// Sign in with an ID token from the federated identity provider.
    LoginFederated {
        #[arg(long, env = "TASKDECK_ID_TOKEN", hide_env_values = true)]
        id_token: String,
        #[arg(long)]
        from: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// Work with your tasks.
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },
    /// Print the JSON schema of the configuration file.
    Schema,
}

#[derive(Subcommand)]
enum TasksCommand {
    /// Show your tasks.
    List {
        /// Keep the list on screen and re-fetch it periodically.
        #[arg(long)]
        watch: bool,
    },
    /// Create a new task.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    /// Mark a task as done.
    Complete { id: TaskId },
    /// Delete a task after confirmation.
    Delete {
        id: TaskId,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Schema = cli.command {
        return match config_schema() {
            Ok(schema) => {
                println!("{}", schema);
                ExitCode::SUCCESS
            }
            Err(e) => fail(&format!("Could not render schema: {}", e)),
        };
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => return fail(&format!("Failed to load {}: {}", cli.config.display(), e)),
    };

    if let Err(e) = init_logging(&config.logging) {
        return fail(&e);
    }
    info!("Loaded configuration from {}", cli.config.display());

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure { error, .. }) if error.is_cancelled() => ExitCode::from(130),
        Err(Failure { error, shown }) => {
            error!(kind = ?error.kind(), "{}", error);
            if shown {
                ExitCode::FAILURE
            } else {
                fail(&error.to_string())
            }
        }
    }
}

/// A command that did not complete. `shown` is set when the user has
/// already seen the error as a notification.
struct Failure {
    error: ClientError,
    shown: bool,
}

impl Failure {
    fn from_controller(controller: &TaskListController, error: ClientError) -> Self {
        let shown = controller.was_reported(&error);
        Failure { error, shown }
    }
}

impl From<ClientError> for Failure {
    fn from(error: ClientError) -> Self {
        Failure {
            error,
            shown: false,
        }
    }
}

fn fail(message: &str) -> ExitCode {
    eprintln!("{style_bold}{color_red}error:{color_reset}{style_reset} {}", message);
    ExitCode::FAILURE
}

async fn run(command: Command, config: ConfigV1) -> Result<(), Failure> {
    let state = build_state(Arc::new(config), Arc::new(ConsoleNotifier))?;
    let cancel = cancel_on_ctrl_c();

    match command {
        Command::Login {
            email,
            password,
            from,
        } => {
            let authenticator = build_authenticator(&state, None);
            let mut form = LoginForm::new(email, password);
            let outcome = authenticator
                .submit_credentials(&mut form, from.as_deref(), &cancel)
                .await?;
            println!("Signed in as {}. Continue at {}", outcome.session.email, outcome.redirect_to);
            Ok(())
        }
        Command::LoginFederated { id_token, from } => {
            let authenticator = build_authenticator(&state, Some(id_token));
            let mut form = LoginForm::default();
            let outcome = authenticator
                .submit_federated(&mut form, from.as_deref(), &cancel)
                .await?;
            println!("Signed in as {}. Continue at {}", outcome.session.email, outcome.redirect_to);
            Ok(())
        }
        Command::Logout => {
            let authenticator = build_authenticator(&state, None);
            if authenticator.logout().await? {
                println!("Signed out.");
            } else {
                println!("No session was stored.");
            }
            Ok(())
        }
        Command::Whoami => {
            let authenticator = build_authenticator(&state, None);
            match authenticator.restore_session().await? {
                Some(session) => println!("{}", session.email),
                None => println!("Not signed in."),
            }
            Ok(())
        }
        Command::Tasks { command } => run_tasks(command, &state, cancel).await,
        Command::Schema => Ok(()),
    }
}

async fn run_tasks(
    command: TasksCommand,
    state: &ClientState,
    cancel: CancellationToken,
) -> Result<(), Failure> {
    let authenticator = build_authenticator(state, None);
    let mut controller = open_task_list(state, &authenticator).await?;
    let teardown = controller.teardown_handle();
    tokio::spawn(async move {
        cancel.cancelled().await;
        teardown.cancel();
    });

    match command {
        TasksCommand::List { watch } => {
            controller.activate().await?;
            print!("{}", controller.view());
            if watch {
                let period = state
                    .config
                    .tasks
                    .poll_interval()
                    .unwrap_or(DEFAULT_WATCH_INTERVAL);
                watch_tasks(controller, period).await;
            }
            Ok(())
        }
        TasksCommand::Create { title, description } => {
            let mut form = CreateTaskForm::new(title, description);
            controller
                .create_task(&mut form)
                .await
                .map_err(|e| Failure::from_controller(&controller, e))?;
            print!("{}", controller.view());
            Ok(())
        }
        TasksCommand::Complete { id } => {
            controller.activate().await?;
            let task = find_task(&controller, &id)?;
            controller
                .update_task(&task)
                .await
                .map_err(|e| Failure::from_controller(&controller, e))?;
            print!("{}", controller.view());
            Ok(())
        }
        TasksCommand::Delete { id, yes } => {
            let confirmer: Box<dyn Confirmer> = if yes {
                Box::new(AlwaysConfirm)
            } else {
                Box::new(StdinConfirmer)
            };
            let outcome = controller
                .delete_task(id, confirmer.as_ref())
                .await
                .map_err(|e| Failure::from_controller(&controller, e))?;
            match outcome {
                DeleteOutcome::Deleted(_) => print!("{}", controller.view()),
                DeleteOutcome::Cancelled => println!("Nothing was deleted."),
            }
            Ok(())
        }
    }
}

fn find_task(
    controller: &TaskListController,
    id: &TaskId,
) -> Result<taskdeck::models::Task, ClientError> {
    match controller.state() {
        // "7" on the command line matches both 7 and "7" from the API
        TaskListState::Populated(tasks) => tasks
            .iter()
            .find(|t| t.id.to_string() == id.to_string())
            .cloned(),
        _ => None,
    }
    .ok_or_else(|| ClientError::Validation(format!("No task with id {}", id)))
}

/// Re-prints the list every time the poller publishes, until Ctrl+C.
async fn watch_tasks(controller: TaskListController, period: Duration) {
    let (tx, mut rx) = watch::channel(controller.view());
    let cancel = controller.teardown_handle();
    let controller = Arc::new(Mutex::new(controller));
    let handle = spawn_poller(controller, period, cancel, tx);

    println!("Watching for changes every {}s. Press Ctrl+C to stop.", period.as_secs());
    while rx.changed().await.is_ok() {
        println!("{style_bold}----{style_reset}");
        print!("{}", *rx.borrow_and_update());
    }
    if let Err(e) = handle.await {
        error!("Task poller ended abnormally: {}", e);
    }
}

/// A token cancelled on Ctrl+C, aborting whatever request is in flight.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, cancelling");
            handle.cancel();
        }
    });
    cancel
}

/// Asks on the terminal; only an explicit yes confirms.
struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        let mut stdout = tokio::io::stdout();
        let question = format!(
            "{style_bold}{}{style_reset} {}\n{} [y/N] ",
            prompt.title, prompt.text, prompt.confirm_label
        );
        if stdout.write_all(question.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return false;
        }

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}
