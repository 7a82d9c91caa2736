//! Assignment commands
//!
//! An [`AssignmentCommand`] binds a command name to a live [`Variable`]. It
//! parses `[=] value` arguments, prints the current value on an empty
//! argument, announces changes through a change listener, and derives
//! narrower commands for chord (`,`) and sim-press (`+`) modifiers.
//!
//! ```text
//! STICK_SENS = 2.5      → assign
//! STICK_SENS            → "STICK_SENS = 2.5"
//! STICK_SENS HELP       → print help
//! ZL,STICK_SENS = 4     → modeshift while ZL is held
//! ZL,STICK_SENS = NONE  → remove that modeshift
//! L,S = C               → S produces C while L is held
//! E+S = ENTER           → S pressed together with E produces ENTER
//! ```

use crate::button_variable::ButtonVariable;
use crate::buttons::ButtonId;
use crate::codec::{decode, ConfigValue};
use crate::console::Console;
use crate::setting::SettingVariable;
use crate::variable::{ListenerGuard, ListenerId, Variable};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Parse strategy: applies a value token to a command, false on failure
pub type Parser<T> = Arc<dyn Fn(&AssignmentCommand<T>, &str) -> bool + Send + Sync>;

/// Work run when a command is dropped, before its listener is removed
pub type Task = Box<dyn FnOnce() + Send>;

type Retirement = Box<dyn Fn() -> bool + Send + Sync>;

/// A command reachable by name from a [`CommandRegistry`](crate::CommandRegistry)
pub trait Command: Send {
    /// Name the command is registered under
    fn name(&self) -> &str;

    /// Help text printed on `HELP` or bad input
    fn help(&self) -> &str;

    /// Handle the text following the command name.
    ///
    /// Returns false when the arguments were not recognized at all.
    fn parse_data(&self, arguments: &str) -> bool;

    /// Derive a command scoped by `<chord><op>`.
    ///
    /// `None` leaves the fallback to the caller.
    fn modified(&self, _op: char, _chord: &str) -> Option<Box<dyn Command>> {
        None
    }

    /// True once a derived command has nothing left to manage and can be
    /// evicted
    fn is_disposable(&self) -> bool {
        false
    }
}

/// What kind of variable a command is bound to
pub enum Binding<T> {
    /// Plain variable, no scoping
    Plain(Variable<T>),
    /// Setting that accepts per-chord modeshifts
    Setting(SettingVariable<T>),
    /// Button binding with chorded and sim-press children
    Button(ButtonVariable<T>),
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Binding::Plain(v) => Binding::Plain(v.clone()),
            Binding::Setting(s) => Binding::Setting(s.clone()),
            Binding::Button(b) => Binding::Button(b.clone()),
        }
    }
}

impl<T: ConfigValue> Binding<T> {
    /// The variable reads and writes go to
    pub fn variable(&self) -> &Variable<T> {
        match self {
            Binding::Plain(v) => v,
            Binding::Setting(s) => s.variable(),
            Binding::Button(b) => b.variable(),
        }
    }
}

impl<T: ConfigValue> From<Variable<T>> for Binding<T> {
    fn from(v: Variable<T>) -> Self {
        Binding::Plain(v)
    }
}

impl<T: ConfigValue> From<SettingVariable<T>> for Binding<T> {
    fn from(s: SettingVariable<T>) -> Self {
        Binding::Setting(s)
    }
}

impl<T: ConfigValue> From<ButtonVariable<T>> for Binding<T> {
    fn from(b: ButtonVariable<T>) -> Self {
        Binding::Button(b)
    }
}

/// `[=] value` with the value made of ASCII word characters, whitespace,
/// `^`, `+`, `.` and `-`
fn value_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?-u)^\s*=?\s*([\^+\w\s.\-]*)$").expect("value pattern is valid")
    })
}

/// Extract the value token from command arguments, trimmed
pub fn extract_value_token(arguments: &str) -> Option<&str> {
    value_pattern()
        .captures(arguments)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// A named, parseable binding onto one variable
pub struct AssignmentCommand<T: ConfigValue> {
    name: String,
    display_name: String,
    binding: Binding<T>,
    parser: Parser<T>,
    help: String,
    task_on_drop: Option<Task>,
    retire_when: Option<Retirement>,
    listener: ListenerGuard<T>,
    console: Console,
}

impl<T: ConfigValue> AssignmentCommand<T> {
    /// Command whose display name is its name
    pub fn new(name: impl Into<String>, binding: impl Into<Binding<T>>, console: Console) -> Self {
        let name = name.into();
        Self::with_display_name(name.clone(), name, binding, console)
    }

    /// Command registered as `name` but announced as `display_name`
    pub fn with_display_name(
        name: impl Into<String>,
        display_name: impl Into<String>,
        binding: impl Into<Binding<T>>,
        console: Console,
    ) -> Self {
        let name = name.into();
        let display_name = display_name.into();
        let binding = binding.into();

        let listener = {
            let (name, display_name, console) =
                (name.clone(), display_name.clone(), console.clone());
            binding
                .variable()
                .subscribe(move |value: &T| console.println(value.change_message(&name, &display_name)))
        };

        Self {
            name,
            display_name,
            binding,
            parser: Arc::new(default_parser::<T>),
            help: String::new(),
            task_on_drop: None,
            retire_when: None,
            listener,
            console,
        }
    }

    /// Set the help text
    pub fn help_text(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Replace the parse strategy
    pub fn parse_with(mut self, parser: Parser<T>) -> Self {
        self.parser = parser;
        self
    }

    /// Run `task` when the command is dropped
    pub fn on_drop<F: FnOnce() + Send + 'static>(mut self, task: F) -> Self {
        self.task_on_drop = Some(Box::new(task));
        self
    }

    /// Stop announcing changes made elsewhere. For commands sharing a
    /// variable with another command that already announces them.
    pub fn without_announcements(mut self) -> Self {
        self.listener.release();
        self
    }

    /// Report the command disposable once `condition` holds
    pub fn retire_when<F: Fn() -> bool + Send + Sync + 'static>(mut self, condition: F) -> Self {
        self.retire_when = Some(Box::new(condition));
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn binding(&self) -> &Binding<T> {
        &self.binding
    }

    /// The bound variable
    pub fn variable(&self) -> &Variable<T> {
        self.binding.variable()
    }

    pub fn parser(&self) -> &Parser<T> {
        &self.parser
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Change listener id, `None` once released
    pub fn listener_id(&self) -> Option<ListenerId> {
        self.listener.id()
    }

    /// Store `value` in the bound variable and return what was stored
    pub fn assign(&self, value: T) -> T {
        self.binding.variable().set(value)
    }

    /// Print the change announcement for `value`
    pub fn display_new_value(&self, value: &T) {
        self.console
            .println(value.change_message(&self.name, &self.display_name));
    }

    fn show_help(&self) {
        self.console.println(&self.help);
    }
}

/// Show the value on an empty token, otherwise decode and assign it.
///
/// Fails when the token does not decode, or when a different value was
/// requested and the variable's filter kept the old one.
pub fn default_parser<T: ConfigValue>(cmd: &AssignmentCommand<T>, token: &str) -> bool {
    if token.is_empty() {
        cmd.console
            .println(format_args!("{} = {}", cmd.display_name, cmd.variable().get()));
        return true;
    }

    let Some(value) = decode::<T>(token) else {
        debug!("{}: cannot decode {:?}", cmd.name, token);
        return false;
    };

    let old = cmd.variable().get();
    let stored = cmd.assign(value.clone());
    if stored == old {
        // The listener only fires on a change; confirm explicitly
        cmd.display_new_value(&stored);
    }
    value == old || stored != old
}

/// Parser of a modeshift command: `NONE` flags the modeshift on `chord`
/// for removal, anything else goes to [`default_parser`]. An applied value
/// keeps the modeshift; a bare query leaves it provisional.
pub fn modeshift_parser<T: ConfigValue>(chord: ButtonId, setting: SettingVariable<T>) -> Parser<T> {
    Arc::new(move |cmd: &AssignmentCommand<T>, token: &str| {
        if token == "NONE" {
            setting.mark_modeshift_for_removal(chord);
            cmd.console.println(format_args!(
                "Modeshift {},{} has been removed.",
                chord,
                setting.id()
            ));
            return true;
        }
        let applied = default_parser(cmd, token);
        if applied && !token.is_empty() {
            setting.keep_modeshift(chord);
        }
        applied
    })
}

impl<T: ConfigValue> Command for AssignmentCommand<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn help(&self) -> &str {
        &self.help
    }

    fn parse_data(&self, arguments: &str) -> bool {
        if arguments == "HELP" {
            self.show_help();
            return false;
        }
        let Some(token) = extract_value_token(arguments) else {
            return false;
        };
        if !(self.parser)(self, token) {
            self.show_help();
        }
        true
    }

    fn modified(&self, op: char, chord: &str) -> Option<Box<dyn Command>> {
        let button = match chord.parse::<ButtonId>() {
            Ok(button) if button.is_physical() => button,
            _ => {
                debug!("{}: no modifier for {:?}", self.name, chord);
                return None;
            }
        };
        let name = format!("{chord}{op}{}", self.display_name);

        let derived = match (op, &self.binding) {
            (',', Binding::Setting(setting)) => {
                let shift = setting.at_chord(button);
                let bound = {
                    let (setting, shift) = (setting.clone(), shift.clone());
                    move || setting.modeshift(button).is_some_and(|v| v.ptr_eq(&shift))
                };
                let retired = {
                    let (setting, bound) = (setting.clone(), bound.clone());
                    move || {
                        !bound()
                            || setting.is_marked_for_removal(button)
                            || setting.is_provisional(button)
                    }
                };
                let cleanup = setting.clone();
                AssignmentCommand::<T>::new(name, shift, self.console.clone())
                    .help_text(self.help.clone())
                    .parse_with(modeshift_parser(button, setting.clone()))
                    .on_drop(move || {
                        // Another command may have replaced or removed the entry
                        if bound() {
                            cleanup.process_modeshift_removal(button);
                        }
                    })
                    .retire_when(retired)
            }
            (',', Binding::Button(button_var)) => {
                let chorded = button_var.at_chord(button);
                let bound = {
                    let (button_var, chorded) = (button_var.clone(), chorded.clone());
                    move || button_var.chord(button).is_some_and(|v| v.ptr_eq(&chorded))
                };
                let retired = {
                    let (bound, chorded) = (bound.clone(), chorded.clone());
                    move || !bound() || chorded.get().is_cleared()
                };
                let cleanup = button_var.clone();
                // Shares the parser, including anything it captured
                AssignmentCommand::<T>::new(name, chorded, self.console.clone())
                    .help_text(self.help.clone())
                    .parse_with(Arc::clone(&self.parser))
                    .on_drop(move || {
                        if bound() {
                            cleanup.process_chord_removal(button);
                        }
                    })
                    .retire_when(retired)
            }
            ('+', Binding::Button(button_var)) => {
                let sim_press = button_var.at_sim_press(button);
                let bound = {
                    let (button_var, sim_press) = (button_var.clone(), sim_press.clone());
                    move || button_var.sim_press(button).is_some_and(|v| v.ptr_eq(&sim_press))
                };
                let retired = {
                    let (bound, sim_press) = (bound.clone(), sim_press.clone());
                    move || !bound() || sim_press.get().is_cleared()
                };
                let cleanup = button_var.clone();
                AssignmentCommand::<T>::new(name, sim_press, self.console.clone())
                    .help_text(self.help.clone())
                    .parse_with(Arc::clone(&self.parser))
                    .on_drop(move || {
                        if bound() {
                            cleanup.process_sim_press_removal(button);
                        }
                    })
                    .retire_when(retired)
            }
            _ => {
                debug!("{}: modifier {:?} not supported", self.name, op);
                return None;
            }
        };

        debug!("Derived command {}", derived.name);
        Some(Box::new(derived))
    }

    fn is_disposable(&self) -> bool {
        self.retire_when.as_ref().is_some_and(|condition| condition())
    }
}

impl<T: ConfigValue> Drop for AssignmentCommand<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task_on_drop.take() {
            task();
        }
        self.listener.release();
    }
}
