mod config_commands;
mod console;
mod script;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    parley_channels::{MessageBus, MessageFilter, ReplyTarget},
    parley_config::ParleyConfig,
    parley_dialog::{Dialog, SessionConfig},
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::console::{CONSOLE_USER, ConsoleContext};

#[derive(Parser)]
#[command(name = "parley", about = "Parley: multi-turn dialogs for chat bots", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of searching ./ and ~/.config/parley/.
    #[arg(long, global = true, env = "PARLEY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured dialog script in the terminal (default).
    Run,
    /// Validate the configuration file and report errors/warnings.
    Check,
    /// Print the effective configuration as TOML.
    ShowConfig,
}

/// Initialise tracing. Logs go to stderr so they never interleave with the
/// dialog on stdout.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Run the script on the console. Returns the process exit code.
async fn run(config: ParleyConfig) -> anyhow::Result<i32> {
    let result = parley_config::validate(&config);
    if result.has_errors() {
        config_commands::print_diagnostics(&result);
        anyhow::bail!("configuration has errors; see `parley check`");
    }
    if config.script.steps.is_empty() {
        eprintln!("No dialog script configured. Add [[script.steps]] to parley.toml.");
        return Ok(0);
    }

    let bus = Arc::new(MessageBus::new());
    let session = SessionConfig::from_defaults(
        Arc::clone(&bus) as _,
        MessageFilter::from_author(CONSOLE_USER),
        ReplyTarget::Context(Arc::new(ConsoleContext)),
        &config.dialog,
        &config.embeds,
    );
    let dialog = Dialog::new(Arc::new(session));
    let reader = console::spawn_stdin_reader(Arc::clone(&bus));

    if let Some(title) = &config.script.title {
        println!("{title}\n");
    }
    let outcome = script::run_script(&dialog, &config.script).await;
    reader.abort();

    match outcome {
        Ok(answers) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::Value::Object(answers))?
            );
            Ok(0)
        },
        Err(e) if e.is_terminal() => {
            let at = e.interrupt().map(|interrupt| interrupt.at.to_rfc3339());
            info!(reason = %e, at, "script stopped");
            Ok(1)
        },
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "parley starting");

    let explicit = cli.config.as_deref();
    match cli.command {
        None | Some(Commands::Run) => {
            let config = config_commands::load(explicit)?;
            let code = run(config).await.unwrap_or_else(|e| {
                warn!(error = %e, "run failed");
                eprintln!("error: {e:#}");
                2
            });
            // The stdin reader may still be parked in a blocking read that
            // would hold up runtime shutdown.
            std::process::exit(code);
        },
        Some(Commands::Check) => config_commands::check(explicit),
        Some(Commands::ShowConfig) => config_commands::show(explicit),
    }
}
