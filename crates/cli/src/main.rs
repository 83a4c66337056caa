use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use lib::anki::{AnkiApi, AnkiClient};

#[derive(Parser)]
#[command(name = "anki-tools")]
#[command(about = "MCP server that runs Anki learning sessions for an LLM client", long_about = None)]
struct Cli {
    /// Config file path (default: ANKI_TOOLS_CONFIG_PATH or ~/.anki-tools/config.json)
    #[arg(long, short, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init,

    /// Serve the learning tools over MCP on stdin/stdout (default when no command is given).
    Serve,

    /// Print the card currently shown in Anki's reviewer (reveals its answer in Anki).
    Current,

    /// Answer the current card and print the next one.
    Answer {
        /// 1=Again, 2=Hard, 3=Good, 4=Easy
        #[arg(long, short, allow_negative_numbers = true)]
        ease: i64,
    },

    /// Print detailed AnkiConnect info for the given card ids.
    Info {
        #[arg(required = true, value_name = "CARD_ID")]
        cards: Vec<u64>,
    },
}

#[tokio::main]
async fn main() {
    // env_logger writes to stderr; stdout belongs to the MCP transport.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Version => {
            println!("anki-tools {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Init => run_init(cli.config),
        Commands::Serve => run_serve(cli.config).await,
        Commands::Current => run_current(cli.config).await,
        Commands::Answer { ease } => run_answer(cli.config, ease).await,
        Commands::Info { cards } => run_info(cli.config, cards).await,
    };
    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::config::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, path) = lib::config::load_config(config_path)?;
    log::info!("starting mcp server (config {})", path.display());
    lib::server::run_stdio(config).await
}

async fn run_current(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let view = lib::server::build_session(&config).start_session().await?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn run_answer(config_path: Option<PathBuf>, ease: i64) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let view = lib::server::build_session(&config)
        .answer_and_advance(ease)
        .await?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn run_info(config_path: Option<PathBuf>, cards: Vec<u64>) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let client: Arc<dyn AnkiApi> = Arc::new(AnkiClient::new(Some(
        lib::config::resolve_endpoint(&config),
    )));
    let info = client.cards_info(&cards).await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
