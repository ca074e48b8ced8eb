//! Binary entrypoint for the faqbot CLI.
//!
//! Commands:
//! - `start [--identity primary|secondary]` - connect to Slack and serve FAQ menus
//! - `init` - create a starter `config.toml` plus the data and audit directories
//! - `status` - load the FAQ sources and print a per-course summary
//!
//! See the library crate docs for module‑level details: `faqbot::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::sync::Arc;

use faqbot::audit::{AuditLog, MemoryAudit};
use faqbot::bot::BotServer;
use faqbot::config::{BotIdentity, Config, Credentials};
use faqbot::faq::repository;
use faqbot::logutil::token_status;

#[derive(Parser)]
#[command(name = "faqbot")]
#[command(about = "A button-driven FAQ navigator for Slack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Slack and start answering
    Start {
        /// Which Slack app to run as (overrides `bot.identity`)
        #[arg(short, long)]
        identity: Option<BotIdentity>,
    },
    /// Write a default configuration file
    Init,
    /// Load FAQ sources and show what the bot would serve
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    match cli.command {
        Commands::Start { identity } => {
            let mut config = Config::load(&cli.config).await?;
            if let Some(identity) = identity {
                config.bot.identity = identity;
            }
            init_logging(&Some(config.clone()), cli.verbose);
            info!(
                "Starting faqbot v{} as {} identity",
                env!("CARGO_PKG_VERSION"),
                config.bot.identity.as_str()
            );

            let creds = Credentials::from_env(config.bot.identity)?;
            let audit = Arc::new(AuditLog::open(&config.audit.dir)?);
            info!(
                "Audit trail: {} / {}",
                audit.json_path().display(),
                audit.csv_path().display()
            );
            let mut server = BotServer::new(config, audit)?;
            server.run(&creds).await?;
        }
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new faqbot configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);

            let cfg = Config::default();
            for source in &cfg.faq.sources {
                if let Some(parent) = source.path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::create_dir_all(&cfg.audit.dir).await?;
            info!("Created data and audit directories; add FAQ JSON files under data/");
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            show_status(&config);
        }
    }

    Ok(())
}

fn show_status(config: &Config) {
    let audit = MemoryAudit::new();
    let corpus = repository::load(&config.faq.sources, &audit);

    println!("faqbot v{} - {}", env!("CARGO_PKG_VERSION"), config.bot.name);
    println!(
        "identity: {}  flow: {}  reload: {:?}",
        config.bot.identity.as_str(),
        config.flow().as_str(),
        config.faq.reload
    );
    println!(
        "entries: {}  (sources: {} ok, {} failed)",
        corpus.len(),
        config.faq.sources.len() - corpus.failed_sources(),
        corpus.failed_sources()
    );
    for (message, cause) in audit.errors() {
        println!("  ! {} {}", message, cause.unwrap_or_default());
    }
    for (course, categories) in corpus.summary() {
        let total: usize = categories.values().sum();
        println!("{course}: {total}");
        for (category, count) in categories {
            println!("  {category}: {count}");
        }
    }
    let mut vars = Vec::new();
    for identity in [BotIdentity::Primary, BotIdentity::Secondary] {
        let (bot, app) = identity.env_vars();
        vars.push(bot);
        vars.push(app);
    }
    println!("tokens: {}", token_status(&vars));
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins; otherwise the configured level, defaulting to info
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok());
    let base_level = match verbosity {
        0 => configured.unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    // reqwest/hyper/rustls chatter stays out of debug output
    if verbosity < 2 {
        for noisy in ["hyper", "reqwest", "rustls", "tungstenite", "tokio_tungstenite"] {
            builder.filter_module(noisy, log::LevelFilter::Warn);
        }
    }
    let log_file = config.as_ref().and_then(|c| c.logging.file.clone()).and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    });
    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Only echo to the console when someone is watching
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
