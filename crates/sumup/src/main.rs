use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod app;
mod context;
mod memberships;
mod message;

use app::AppContext;

#[derive(Parser)]
#[command(name = "sumup")]
#[command(about = "Command-line client for the SumUp API", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// API key used to authenticate requests
    #[arg(long, env = "SUMUP_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the SumUp API
    #[arg(long, env = "SUMUP_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage merchant context for commands
    Context(context::ContextArgs),

    /// Commands related to memberships
    Memberships(memberships::MembershipsArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug, RUST_LOG still wins
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    let app = AppContext {
        api_key: cli.api_key,
        base_url: cli.base_url,
        json: cli.json,
    };

    match cli.command {
        Commands::Context(args) => context::execute(args, &app),
        Commands::Memberships(args) => memberships::execute(args, &app),
    }
}
