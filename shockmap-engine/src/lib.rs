// shockmap engine - assignment commands over live configuration variables
// Variables, chord/sim-press scoping, value codecs and the command registry

pub mod button_variable;
pub mod buttons;
pub mod codec;
pub mod command;
pub mod console;
pub mod error;
pub mod keys;
pub mod mapping;
pub mod registry;
pub mod setting;
pub mod variable;

pub use button_variable::ButtonVariable;
pub use buttons::ButtonId;
pub use codec::{decode, ConfigValue};
pub use command::{
    default_parser, extract_value_token, modeshift_parser, AssignmentCommand, Binding, Command,
    Parser, Task,
};
pub use console::{Console, OutputBuffer};
pub use error::{ParseButtonError, ParseMappingError};
pub use keys::{key_code_from_name, key_name, KeyCode};
pub use mapping::{Action, EventMapping};
pub use registry::{CommandRegistry, Dispatch};
pub use setting::SettingVariable;
pub use variable::{Filter, ListenerGuard, ListenerId, Variable};
