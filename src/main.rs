//! shockmap console
//!
//! Runs the configured startup scripts, then any scripts given on the
//! command line, then reads commands from stdin.

use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use shockmap::{AppConfig, Flow, Session};
use shockmap_engine::Console;

#[derive(Parser)]
#[command(name = "shockmap")]
#[command(about = "Live-reconfigurable controller remapper console")]
struct Cli {
    /// Config file path (default: ~/.config/shockmap/shockmap.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Exit after running scripts instead of reading stdin
    #[arg(long)]
    no_interactive: bool,

    /// Write the effective config to the config path and exit
    #[arg(long)]
    init_config: bool,

    /// Command scripts to run after the startup scripts
    #[arg(value_name = "SCRIPT")]
    scripts: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, console output to stdout
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);
    info!("Loading config from {:?}", config_path);
    let config = AppConfig::load(&config_path)?;

    if cli.init_config {
        config.save(&config_path)?;
        info!("Wrote config to {:?}", config_path);
        println!("Config written to {}", config_path.display());
        return Ok(());
    }

    let mut session = Session::new(Console::stdout()).with_echo(config.echo_commands);

    for script in config.startup_script_paths(&config_path) {
        // Startup scripts are best effort
        match session.run_script(&script) {
            Ok(Flow::Quit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(e) => warn!("{:#}", e),
        }
    }
    for script in &cli.scripts {
        if session.run_script(script)? == Flow::Quit {
            return Ok(());
        }
    }

    if !cli.no_interactive {
        run_interactive(&mut session, &config.prompt)?;
    }
    Ok(())
}

/// Read commands from stdin until EOF or QUIT
fn run_interactive(session: &mut Session, prompt: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{prompt}");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        if session.run_line(&line?) == Flow::Quit {
            break;
        }
    }
    info!("Console closed");
    Ok(())
}
