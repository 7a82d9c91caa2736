//! Settings and button catalogue
//!
//! Owns every root variable the console can reach and registers the
//! commands that drive them. Scalar settings never go negative; deadzones
//! stay within the stick's travel.

use crate::error::ParseNameError;
use shockmap_engine::{
    AssignmentCommand, ButtonId, ButtonVariable, CommandRegistry, ConfigValue, Console,
    EventMapping, SettingVariable, Variable,
};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Enum whose values are written as upper-case tokens in commands
macro_rules! named_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident {
        $($variant:ident => $token:literal,)+
    }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = ParseNameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name() == s)
                    .ok_or_else(|| ParseNameError {
                        kind: stringify!($name),
                        name: s.to_string(),
                    })
            }
        }

        impl ConfigValue for $name {}
    };
}

named_enum! {
    /// What a stick drives
    pub enum StickMode {
        NoMouse => "NO_MOUSE",
        Aim => "AIM",
        Flick => "FLICK",
        FlickOnly => "FLICK_ONLY",
        RotateOnly => "ROTATE_ONLY",
        MouseRing => "MOUSE_RING",
        MouseArea => "MOUSE_AREA",
        OuterRing => "OUTER_RING",
        InnerRing => "INNER_RING",
    }
}

named_enum! {
    /// Part of the stick's travel that presses the ring binding
    pub enum RingMode {
        Outer => "OUTER",
        Inner => "INNER",
    }
}

fn non_negative(_current: &f32, requested: f32) -> f32 {
    // NaN maps to 0
    requested.max(0.0)
}

fn unit_interval(_current: &f32, requested: f32) -> f32 {
    requested.max(0.0).min(1.0)
}

fn scalar(id: &str, default: f32) -> SettingVariable<f32> {
    SettingVariable::new(id, Variable::with_filter(default, non_negative))
}

fn deadzone(id: &str, default: f32) -> SettingVariable<f32> {
    SettingVariable::new(id, Variable::with_filter(default, unit_interval))
}

const GYRO_SENS_HELP: &str =
    "GYRO_SENS: sets MIN_GYRO_SENS and MAX_GYRO_SENS to the same value";

/// The root variables of a session
pub struct Settings {
    pub min_gyro_sens: SettingVariable<f32>,
    pub max_gyro_sens: SettingVariable<f32>,
    pub min_gyro_threshold: SettingVariable<f32>,
    pub max_gyro_threshold: SettingVariable<f32>,
    pub stick_sens: SettingVariable<f32>,
    pub stick_power: SettingVariable<f32>,
    pub stick_deadzone_inner: SettingVariable<f32>,
    pub stick_deadzone_outer: SettingVariable<f32>,
    pub gyro_smooth_threshold: SettingVariable<f32>,
    pub left_stick_mode: SettingVariable<StickMode>,
    pub right_stick_mode: SettingVariable<StickMode>,
    pub left_ring_mode: SettingVariable<RingMode>,
    pub right_ring_mode: SettingVariable<RingMode>,
    buttons: BTreeMap<ButtonId, ButtonVariable>,
}

impl Settings {
    pub fn new() -> Self {
        let buttons = ButtonId::physical()
            .map(|id| (id, ButtonVariable::new(id, Variable::new(EventMapping::none()))))
            .collect();

        Self {
            min_gyro_sens: scalar("MIN_GYRO_SENS", 0.0),
            max_gyro_sens: scalar("MAX_GYRO_SENS", 0.0),
            min_gyro_threshold: scalar("MIN_GYRO_THRESHOLD", 0.0),
            max_gyro_threshold: scalar("MAX_GYRO_THRESHOLD", 0.0),
            stick_sens: scalar("STICK_SENS", 360.0),
            stick_power: scalar("STICK_POWER", 1.0),
            stick_deadzone_inner: deadzone("STICK_DEADZONE_INNER", 0.15),
            stick_deadzone_outer: deadzone("STICK_DEADZONE_OUTER", 0.1),
            gyro_smooth_threshold: scalar("GYRO_SMOOTH_THRESHOLD", 0.0),
            left_stick_mode: SettingVariable::new(
                "LEFT_STICK_MODE",
                Variable::new(StickMode::NoMouse),
            ),
            right_stick_mode: SettingVariable::new(
                "RIGHT_STICK_MODE",
                Variable::new(StickMode::Aim),
            ),
            left_ring_mode: SettingVariable::new("LEFT_RING_MODE", Variable::new(RingMode::Outer)),
            right_ring_mode: SettingVariable::new(
                "RIGHT_RING_MODE",
                Variable::new(RingMode::Outer),
            ),
            buttons,
        }
    }

    /// Binding variable of a physical button
    pub fn button(&self, id: ButtonId) -> Option<&ButtonVariable> {
        self.buttons.get(&id)
    }

    pub fn buttons(&self) -> impl Iterator<Item = &ButtonVariable> {
        self.buttons.values()
    }

    fn scalars(&self) -> [(&SettingVariable<f32>, &'static str); 9] {
        [
            (&self.min_gyro_sens, "gyro sensitivity below MIN_GYRO_THRESHOLD"),
            (&self.max_gyro_sens, "gyro sensitivity above MAX_GYRO_THRESHOLD"),
            (&self.min_gyro_threshold, "gyro speed (degrees/s) where MIN_GYRO_SENS applies"),
            (&self.max_gyro_threshold, "gyro speed (degrees/s) where MAX_GYRO_SENS applies"),
            (&self.stick_sens, "stick aim speed in degrees per second at full tilt"),
            (&self.stick_power, "stick response curve exponent, 1 is linear"),
            (&self.stick_deadzone_inner, "stick deflection (0 to 1) ignored around the center"),
            (&self.stick_deadzone_outer, "stick deflection (0 to 1) treated as full tilt at the edge"),
            (&self.gyro_smooth_threshold, "gyro speed (degrees/s) below which input is smoothed"),
        ]
    }

    /// Add a command for every setting and physical button
    pub fn register(&self, registry: &mut CommandRegistry, console: &Console) {
        for (setting, help) in self.scalars() {
            registry.add(setting_command(setting, help, console));
        }
        for setting in [&self.left_stick_mode, &self.right_stick_mode] {
            registry.add(setting_command(setting, &modes_help(StickMode::ALL), console));
        }
        for setting in [&self.left_ring_mode, &self.right_ring_mode] {
            registry.add(setting_command(setting, &modes_help(RingMode::ALL), console));
        }

        // One name, two variables; the per-setting commands announce changes
        for setting in [&self.min_gyro_sens, &self.max_gyro_sens] {
            registry.add(
                AssignmentCommand::with_display_name(
                    "GYRO_SENS",
                    setting.id(),
                    setting.clone(),
                    console.clone(),
                )
                .help_text(GYRO_SENS_HELP)
                .without_announcements(),
            );
        }

        for button in self.buttons.values() {
            let name = button.id().name();
            registry.add(
                AssignmentCommand::new(name, button.clone(), console.clone()).help_text(format!(
                    "{name} = <tap> [<hold>]: keys produced by the {name} button, NONE to unbind"
                )),
            );
        }
        debug!("Registered {} commands", registry.names().len());
    }

    /// Restore every setting and binding to its default
    pub fn reset(&self) {
        for (setting, _) in self.scalars() {
            setting.reset();
        }
        self.left_stick_mode.reset();
        self.right_stick_mode.reset();
        self.left_ring_mode.reset();
        self.right_ring_mode.reset();
        for button in self.buttons.values() {
            button.reset();
        }
        info!("Settings reset to defaults");
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn setting_command<T: ConfigValue>(
    setting: &SettingVariable<T>,
    help: &str,
    console: &Console,
) -> AssignmentCommand<T> {
    AssignmentCommand::new(setting.id(), setting.clone(), console.clone())
        .help_text(format!("{}: {help}", setting.id()))
}

fn modes_help<T: fmt::Display>(modes: &[T]) -> String {
    let names: Vec<String> = modes.iter().map(ToString::to_string).collect();
    format!("one of {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shockmap_engine::{Dispatch, OutputBuffer};

    fn registered() -> (Settings, CommandRegistry, OutputBuffer) {
        let (console, out) = Console::buffer();
        let settings = Settings::new();
        let mut registry = CommandRegistry::new(console.clone());
        settings.register(&mut registry, &console);
        (settings, registry, out)
    }

    #[test]
    fn named_enum_tokens() {
        assert_eq!("FLICK_ONLY".parse::<StickMode>(), Ok(StickMode::FlickOnly));
        assert_eq!(StickMode::MouseRing.to_string(), "MOUSE_RING");
        assert_eq!(
            "flick".parse::<StickMode>(),
            Err(ParseNameError {
                kind: "StickMode",
                name: "flick".into()
            })
        );
        assert_eq!("INNER".parse::<RingMode>(), Ok(RingMode::Inner));
    }

    #[test]
    fn every_setting_and_button_is_registered() {
        let (_, registry, _) = registered();
        for name in [
            "MIN_GYRO_SENS",
            "GYRO_SENS",
            "STICK_DEADZONE_OUTER",
            "RIGHT_RING_MODE",
            "ZL",
            "LEAN_LEFT",
        ] {
            assert!(registry.has(name), "{name} missing");
        }
        assert!(!registry.has("NONE"));
    }

    #[test]
    fn scalars_never_go_negative() {
        let (settings, mut registry, out) = registered();
        registry.process_line("STICK_SENS = -3");
        assert_eq!(settings.stick_sens.variable().get(), 0.0);
        assert_eq!(out.lines(), vec!["STICK_SENS has been set to 0"]);
    }

    #[test]
    fn deadzones_are_clamped_to_travel() {
        let (settings, mut registry, _) = registered();
        registry.process_line("STICK_DEADZONE_OUTER = 5");
        assert_eq!(settings.stick_deadzone_outer.variable().get(), 1.0);
    }

    #[test]
    fn gyro_sens_sets_both_once() {
        let (settings, mut registry, out) = registered();
        assert_eq!(registry.process_line("GYRO_SENS = 2"), Dispatch::Handled);
        assert_eq!(settings.min_gyro_sens.variable().get(), 2.0);
        assert_eq!(settings.max_gyro_sens.variable().get(), 2.0);
        assert_eq!(
            out.lines(),
            vec!["MIN_GYRO_SENS has been set to 2", "MAX_GYRO_SENS has been set to 2"]
        );
    }

    #[test]
    fn gyro_sens_modeshift_covers_both() {
        let (settings, mut registry, out) = registered();
        registry.process_line("ZR,GYRO_SENS = 3");
        assert_eq!(settings.min_gyro_sens.value_for(&[ButtonId::Zr]), 3.0);
        assert_eq!(settings.max_gyro_sens.value_for(&[ButtonId::Zr]), 3.0);

        registry.process_line("ZR,GYRO_SENS = NONE");
        assert!(settings.min_gyro_sens.modeshift(ButtonId::Zr).is_none());
        assert!(settings.max_gyro_sens.modeshift(ButtonId::Zr).is_none());
        assert_eq!(
            out.lines()[2..],
            [
                "Modeshift ZR,MIN_GYRO_SENS has been removed.",
                "Modeshift ZR,MAX_GYRO_SENS has been removed.",
            ]
        );
    }

    #[test]
    fn modeshift_reassigned_after_removal_through_gyro_sens() {
        let (settings, mut registry, _) = registered();
        registry.process_line("ZL,MIN_GYRO_SENS = 3");
        registry.process_line("ZL,GYRO_SENS = NONE");
        assert!(settings.min_gyro_sens.modeshift_chords().is_empty());
        assert!(registry.derived_keys().is_empty());

        registry.process_line("ZL,MIN_GYRO_SENS = 5");
        assert_eq!(settings.min_gyro_sens.modeshift_chords(), vec![ButtonId::Zl]);
        assert_eq!(settings.min_gyro_sens.value_for(&[ButtonId::Zl]), 5.0);
        assert_eq!(registry.derived_keys(), vec!["ZL,MIN_GYRO_SENS"]);
    }

    #[test]
    fn gyro_sens_sees_per_setting_modeshift() {
        let (settings, mut registry, out) = registered();
        registry.process_line("ZL,MIN_GYRO_SENS = 3");
        registry.process_line("ZL,GYRO_SENS = 4");
        assert_eq!(settings.min_gyro_sens.value_for(&[ButtonId::Zl]), 4.0);
        assert_eq!(settings.max_gyro_sens.value_for(&[ButtonId::Zl]), 4.0);

        // Both keys stay cached on the same live entry
        registry.process_line("ZL,MIN_GYRO_SENS");
        assert_eq!(out.lines().last().unwrap(), "ZL,MIN_GYRO_SENS = 4");
        assert_eq!(registry.derived_keys(), vec!["ZL,GYRO_SENS", "ZL,MIN_GYRO_SENS"]);
    }

    #[test]
    fn modeshift_query_leaves_no_entry() {
        let (settings, mut registry, out) = registered();
        registry.process_line("STICK_SENS = 100");
        registry.process_line("ZL,STICK_SENS");

        assert_eq!(out.lines().last().unwrap(), "ZL,STICK_SENS = 100");
        assert!(settings.stick_sens.modeshift_chords().is_empty());
        assert_eq!(settings.stick_sens.value_for(&[ButtonId::Zl]), 100.0);
        assert!(registry.derived_keys().is_empty());
    }

    #[test]
    fn stick_mode_assignment() {
        let (settings, mut registry, out) = registered();
        registry.process_line("LEFT_STICK_MODE = FLICK");
        registry.process_line("LEFT_STICK_MODE = flick");
        assert_eq!(settings.left_stick_mode.variable().get(), StickMode::Flick);
        let lines = out.lines();
        assert_eq!(lines[0], "LEFT_STICK_MODE has been set to FLICK");
        assert!(lines[1].starts_with("LEFT_STICK_MODE: one of NO_MOUSE, AIM"));
    }

    #[test]
    fn reset_restores_defaults() {
        let (settings, mut registry, _) = registered();
        registry.process_line("STICK_SENS = 100");
        registry.process_line("S = SPACE");
        registry.process_line("ZL,STICK_POWER = 2");
        registry.clear_derived();

        settings.reset();
        assert_eq!(settings.stick_sens.variable().get(), 360.0);
        assert!(settings.stick_power.modeshift_chords().is_empty());
        let south = settings.button(ButtonId::S).unwrap();
        assert!(south.variable().get().is_empty());
    }
}
