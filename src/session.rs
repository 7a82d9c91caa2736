//! Console session
//!
//! Wires the settings catalogue to a command registry and feeds it lines,
//! interactively or from script files.

use crate::settings::Settings;
use anyhow::Context;
use shockmap_engine::{CommandRegistry, Console};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Whether the caller should keep feeding lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Settings, their commands and the console they print to
pub struct Session {
    settings: Settings,
    registry: CommandRegistry,
    console: Console,
    echo: bool,
}

impl Session {
    pub fn new(console: Console) -> Self {
        let settings = Settings::new();
        let mut registry = CommandRegistry::new(console.clone());
        settings.register(&mut registry, &console);
        Self {
            settings,
            registry,
            console,
            echo: false,
        }
    }

    /// Print script lines before running them
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run one line: a control word or a command
    pub fn run_line(&mut self, line: &str) -> Flow {
        match line.split('#').next().unwrap_or_default().trim() {
            "QUIT" => return Flow::Quit,
            "RESET_MAPPINGS" => self.reset(),
            "HELP" => {
                let names = self.registry.names().join(", ");
                self.console.println(format_args!("Commands: {names}"));
                self.console
                    .println("Type <COMMAND> HELP for details, RESET_MAPPINGS or QUIT");
            }
            _ => {
                let outcome = self.registry.process_line(line);
                debug!("{:?}: {}", outcome, line.trim());
            }
        }
        Flow::Continue
    }

    /// Restore every default and drop all derived commands
    pub fn reset(&mut self) {
        // Derived commands first so their cleanup sees the live entries
        self.registry.clear_derived();
        self.settings.reset();
        self.console.println("All settings and mappings have been reset.");
    }

    /// Run every line of `reader` until it ends or asks to quit
    pub fn run_reader<R: BufRead>(&mut self, reader: R) -> anyhow::Result<Flow> {
        for line in reader.lines() {
            let line = line?;
            if self.echo && !line.trim().is_empty() {
                self.console.println(&line);
            }
            if self.run_line(&line) == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Run a command script
    pub fn run_script(&mut self, path: &Path) -> anyhow::Result<Flow> {
        info!("Running script {:?}", path);
        let file =
            File::open(path).with_context(|| format!("Cannot open script {}", path.display()))?;
        self.run_reader(BufReader::new(file))
            .with_context(|| format!("Failed reading script {}", path.display()))
    }
}
