//! Command registry
//!
//! Splits a console line into an optional `<chord><op>` modifier, a command
//! name and its arguments, then forwards the arguments to every command
//! registered under that name. Modifier-derived commands are created on
//! first use, cached under `<chord><op><NAME>`, and evicted (running their
//! cleanup) once a parse leaves them disposable. Several keys may reach the
//! same scoped variable (`ZL,GYRO_SENS` and `ZL,MIN_GYRO_SENS`), so every
//! line ends with a sweep over the whole cache.

use crate::command::Command;
use crate::console::Console;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Outcome of [`CommandRegistry::process_line`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank line or comment
    Empty,
    /// At least one command accepted the arguments
    Handled,
    /// The command exists but no instance accepted the arguments
    Unhandled,
    /// No command by that name
    UnknownCommand,
    /// The command does not support the given modifier
    UnsupportedModifier,
}

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?-u)^(?:(\w+)\s*([,+])\s*)?(\w+)((?u:.*))$").expect("line pattern is valid")
    })
}

/// Name → command table with a cache of modifier-derived commands
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    derived: BTreeMap<String, Vec<Box<dyn Command>>>,
    console: Console,
}

impl CommandRegistry {
    pub fn new(console: Console) -> Self {
        Self {
            commands: Vec::new(),
            derived: BTreeMap::new(),
            console,
        }
    }

    /// Register a root command. Several commands may share a name.
    pub fn add<C: Command + 'static>(&mut self, command: C) -> &mut Self {
        self.commands.push(Box::new(command));
        self
    }

    /// True if a root command is registered as `name`
    pub fn has(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c.name() == name)
    }

    /// Registered names, sorted and deduplicated
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Help text of the first command registered as `name`
    pub fn help(&self, name: &str) -> Option<&str> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.help())
    }

    /// Keys of the cached derived commands
    pub fn derived_keys(&self) -> Vec<&str> {
        self.derived.keys().map(String::as_str).collect()
    }

    /// Evict the derived commands cached under `key`
    pub fn evict(&mut self, key: &str) -> bool {
        let evicted = self.derived.remove(key).is_some();
        if evicted {
            debug!("Evicted derived command {}", key);
        }
        evicted
    }

    /// Evict every derived command
    pub fn clear_derived(&mut self) {
        let count = self.derived.len();
        self.derived.clear();
        info!("Evicted {} derived commands", count);
    }

    /// Run one console line
    pub fn process_line(&mut self, line: &str) -> Dispatch {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            return Dispatch::Empty;
        }

        let Some(caps) = line_pattern().captures(line) else {
            self.console
                .println(format_args!("Unrecognized command: \"{line}\""));
            return Dispatch::UnknownCommand;
        };
        let name = caps.get(3).map_or("", |m| m.as_str());
        let arguments = caps.get(4).map_or("", |m| m.as_str()).trim();

        if !self.has(name) {
            self.console
                .println(format_args!("Unrecognized command: \"{line}\""));
            return Dispatch::UnknownCommand;
        }

        let outcome = match (caps.get(1), caps.get(2).and_then(|m| m.as_str().chars().next())) {
            (Some(chord), Some(op)) => self.run_modified(chord.as_str(), op, name, arguments),
            _ => self.run_root(name, arguments),
        };
        // Cleanup runs here, after the parse has returned
        self.evict_disposable();

        if outcome == Dispatch::Unhandled && arguments != "HELP" {
            self.console.println(format_args!(
                "Unrecognized arguments for {name}: \"{arguments}\""
            ));
        }
        outcome
    }

    /// Evict disposable derived commands until none is left. Dropping one
    /// can orphan commands cached under other keys.
    fn evict_disposable(&mut self) {
        loop {
            let mut evicted = 0;
            for (key, commands) in self.derived.iter_mut() {
                let before = commands.len();
                commands.retain(|c| !c.is_disposable());
                if commands.len() != before {
                    debug!("Evicted {} disposable command(s) under {}", before - commands.len(), key);
                    evicted += before - commands.len();
                }
            }
            self.derived.retain(|_, commands| !commands.is_empty());
            if evicted == 0 {
                break;
            }
        }
    }

    fn run_root(&self, name: &str, arguments: &str) -> Dispatch {
        // Every command of that name sees the arguments
        let handled = self
            .commands
            .iter()
            .filter(|c| c.name() == name)
            .fold(false, |handled, c| c.parse_data(arguments) || handled);
        if handled {
            Dispatch::Handled
        } else {
            Dispatch::Unhandled
        }
    }

    fn run_modified(&mut self, chord: &str, op: char, name: &str, arguments: &str) -> Dispatch {
        let key = format!("{chord}{op}{name}");

        if !self.derived.contains_key(&key) {
            let derived: Vec<Box<dyn Command>> = self
                .commands
                .iter()
                .filter(|c| c.name() == name)
                .filter_map(|c| c.modified(op, chord))
                .collect();
            if derived.is_empty() {
                self.console
                    .println(format_args!("Unsupported modifier \"{chord}{op}\" for {name}"));
                return Dispatch::UnsupportedModifier;
            }
            debug!("Cached {} derived command(s) under {}", derived.len(), key);
            self.derived.insert(key.clone(), derived);
        }

        let Some(commands) = self.derived.get(&key) else {
            return Dispatch::UnknownCommand;
        };
        let handled = commands
            .iter()
            .fold(false, |handled, c| c.parse_data(arguments) || handled);

        if handled {
            Dispatch::Handled
        } else {
            Dispatch::Unhandled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::OutputBuffer;
    use crate::{AssignmentCommand, Variable};

    fn registry() -> (CommandRegistry, Variable<f32>, OutputBuffer) {
        let (console, out) = Console::buffer();
        let var = Variable::new(1.0f32);
        let mut reg = CommandRegistry::new(console.clone());
        reg.add(AssignmentCommand::new("STICK_SENS", var.clone(), console).help_text("sens help"));
        (reg, var, out)
    }

    #[test]
    fn blank_and_comment_lines() {
        let (mut reg, _, out) = registry();
        assert_eq!(reg.process_line(""), Dispatch::Empty);
        assert_eq!(reg.process_line("   # just a comment"), Dispatch::Empty);
        assert!(out.lines().is_empty());
    }

    #[test]
    fn assignment_with_trailing_comment() {
        let (mut reg, var, out) = registry();
        assert_eq!(reg.process_line("STICK_SENS = 3 # faster"), Dispatch::Handled);
        assert_eq!(var.get(), 3.0);
        assert_eq!(out.lines(), vec!["STICK_SENS has been set to 3"]);
    }

    #[test]
    fn unknown_command() {
        let (mut reg, _, out) = registry();
        assert_eq!(reg.process_line("FOO = 1"), Dispatch::UnknownCommand);
        assert_eq!(out.lines(), vec!["Unrecognized command: \"FOO = 1\""]);
    }

    #[test]
    fn help_is_unhandled_without_extra_message() {
        let (mut reg, _, out) = registry();
        assert_eq!(reg.process_line("STICK_SENS HELP"), Dispatch::Unhandled);
        assert_eq!(out.lines(), vec!["sens help"]);
    }

    #[test]
    fn bad_argument_shape_is_reported() {
        let (mut reg, _, out) = registry();
        assert_eq!(reg.process_line("STICK_SENS = (2)"), Dispatch::Unhandled);
        assert_eq!(
            out.lines(),
            vec!["Unrecognized arguments for STICK_SENS: \"= (2)\""]
        );
    }

    #[test]
    fn modifier_on_plain_variable_is_unsupported() {
        let (mut reg, _, out) = registry();
        assert_eq!(
            reg.process_line("ZL,STICK_SENS = 2"),
            Dispatch::UnsupportedModifier
        );
        assert_eq!(
            out.lines(),
            vec!["Unsupported modifier \"ZL,\" for STICK_SENS"]
        );
        assert!(reg.derived_keys().is_empty());
    }

    #[test]
    fn shared_name_reaches_every_command() {
        let (console, out) = Console::buffer();
        let (min, max) = (Variable::new(1.0f32), Variable::new(1.0f32));
        let mut reg = CommandRegistry::new(console.clone());
        reg.add(AssignmentCommand::with_display_name(
            "GYRO_SENS",
            "MIN_GYRO_SENS",
            min.clone(),
            console.clone(),
        ))
        .add(AssignmentCommand::with_display_name(
            "GYRO_SENS",
            "MAX_GYRO_SENS",
            max.clone(),
            console,
        ));

        assert_eq!(reg.process_line("GYRO_SENS = 2"), Dispatch::Handled);
        assert_eq!((min.get(), max.get()), (2.0, 2.0));
        assert_eq!(
            out.lines(),
            vec!["MIN_GYRO_SENS has been set to 2", "MAX_GYRO_SENS has been set to 2"]
        );
        assert_eq!(reg.names(), vec!["GYRO_SENS"]);
    }
}
