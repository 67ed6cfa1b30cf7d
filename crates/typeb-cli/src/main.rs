mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, family::FamilySubcommand, prefs::PrefsSubcommand,
    remind::RemindSubcommand, schedule::ScheduleSubcommand, task::TaskSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "typeb",
    about = "Family tasks with escalating reminders: manage families, tasks, and the reminder ledger",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .typeb/ or .git/)
    #[arg(long, global = true, env = "TYPEB_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize TypeB state in the current project
    Init,

    /// Manage families and membership
    Family {
        #[command(subcommand)]
        subcommand: FamilySubcommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Manage per-user notification preferences
    Prefs {
        #[command(subcommand)]
        subcommand: PrefsSubcommand,
    },

    /// Plan and inspect reminder schedules
    Schedule {
        #[command(subcommand)]
        subcommand: ScheduleSubcommand,
    },

    /// Fire due reminders, once or on a loop
    Remind {
        #[command(subcommand)]
        subcommand: RemindSubcommand,
    },

    /// Validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "3180")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Remind { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    // Logs go to stderr; stdout carries command output (tables or JSON).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        _ if !root.join(typeb_core::paths::TYPEB_DIR).is_dir() => {
            Err(typeb_core::TypebError::NotInitialized.into())
        }
        Commands::Family { subcommand } => cmd::family::run(&root, subcommand, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Prefs { subcommand } => cmd::prefs::run(&root, subcommand, cli.json),
        Commands::Schedule { subcommand } => cmd::schedule::run(&root, subcommand, cli.json),
        Commands::Remind { subcommand } => cmd::remind::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
