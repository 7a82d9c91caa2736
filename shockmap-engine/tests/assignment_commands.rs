//! Integration tests for console lines driving assignment commands.
//!
//! These go through the public registry API: line tokenizing, modifier
//! derivation, the derived-command cache and cleanup on eviction.

use shockmap_engine::{
    AssignmentCommand, ButtonId, ButtonVariable, CommandRegistry, Console, Dispatch, EventMapping,
    OutputBuffer, SettingVariable, Variable,
};

fn mapping(s: &str) -> EventMapping {
    s.parse().unwrap()
}

struct Fixture {
    registry: CommandRegistry,
    console: Console,
    out: OutputBuffer,
    sens: Variable<f32>,
    min_gyro: SettingVariable<f32>,
    south: ButtonVariable,
}

fn fixture() -> Fixture {
    let (console, out) = Console::buffer();
    let sens = Variable::new(1.0f32);
    let min_gyro = SettingVariable::new("MIN_GYRO_SENS", Variable::new(1.0f32));
    let south = ButtonVariable::new(ButtonId::S, Variable::new(EventMapping::none()));

    let mut registry = CommandRegistry::new(console.clone());
    registry
        .add(
            AssignmentCommand::new("STICK_SENS", sens.clone(), console.clone())
                .help_text("STICK_SENS: stick sensitivity"),
        )
        .add(
            AssignmentCommand::new("MIN_GYRO_SENS", min_gyro.clone(), console.clone())
                .help_text("MIN_GYRO_SENS: gyro sensitivity at slow speed"),
        )
        .add(
            AssignmentCommand::new("S", south.clone(), console.clone())
                .help_text("S: south face button"),
        );

    Fixture {
        registry,
        console,
        out,
        sens,
        min_gyro,
        south,
    }
}

// ── Plain assignment ──

#[test]
fn assign_then_bad_value_then_query() {
    let mut f = fixture();

    assert_eq!(f.registry.process_line("STICK_SENS = 2.0"), Dispatch::Handled);
    assert_eq!(f.sens.get(), 2.0);

    // Malformed value: help, variable untouched
    assert_eq!(f.registry.process_line("STICK_SENS abc"), Dispatch::Handled);
    assert_eq!(f.sens.get(), 2.0);

    assert_eq!(f.registry.process_line("STICK_SENS"), Dispatch::Handled);

    assert_eq!(
        f.out.lines(),
        vec![
            "STICK_SENS has been set to 2",
            "STICK_SENS: stick sensitivity",
            "STICK_SENS = 2",
        ]
    );
}

#[test]
fn setting_without_modifier_assigns_base() {
    let mut f = fixture();
    f.registry.process_line("MIN_GYRO_SENS = 0.5");
    assert_eq!(f.min_gyro.variable().get(), 0.5);
    assert!(f.min_gyro.modeshift_chords().is_empty());
}

// ── Modeshifts ──

#[test]
fn modeshift_assign_and_remove() {
    let mut f = fixture();

    assert_eq!(
        f.registry.process_line("ZL,MIN_GYRO_SENS = 4"),
        Dispatch::Handled
    );
    assert_eq!(f.min_gyro.value_for(&[ButtonId::Zl]), 4.0);
    assert_eq!(f.min_gyro.value_for(&[]), 1.0);
    assert_eq!(f.registry.derived_keys(), vec!["ZL,MIN_GYRO_SENS"]);

    let shift = f.min_gyro.modeshift(ButtonId::Zl).unwrap();
    assert_eq!(shift.listener_count(), 1);

    assert_eq!(
        f.registry.process_line("ZL,MIN_GYRO_SENS = NONE"),
        Dispatch::Handled
    );
    assert!(f.min_gyro.modeshift(ButtonId::Zl).is_none());
    assert!(f.registry.derived_keys().is_empty());
    assert_eq!(shift.listener_count(), 0);

    assert_eq!(
        f.out.lines(),
        vec![
            "ZL,MIN_GYRO_SENS has been set to 4",
            "Modeshift ZL,MIN_GYRO_SENS has been removed.",
        ]
    );
}

#[test]
fn cached_modeshift_command_is_reused() {
    let mut f = fixture();
    f.registry.process_line("ZR,MIN_GYRO_SENS = 2");
    let first = f.min_gyro.modeshift(ButtonId::Zr).unwrap();

    f.registry.process_line("ZR,MIN_GYRO_SENS = 3");
    f.registry.process_line("ZR,MIN_GYRO_SENS");

    assert!(first.ptr_eq(&f.min_gyro.modeshift(ButtonId::Zr).unwrap()));
    assert_eq!(first.listener_count(), 1);
    assert_eq!(
        f.out.lines(),
        vec![
            "ZR,MIN_GYRO_SENS has been set to 2",
            "ZR,MIN_GYRO_SENS has been set to 3",
            "ZR,MIN_GYRO_SENS = 3",
        ]
    );
}

#[test]
fn modeshift_query_leaves_nothing_behind() {
    let mut f = fixture();
    f.registry.process_line("MIN_GYRO_SENS = 3");

    assert_eq!(f.registry.process_line("ZL,MIN_GYRO_SENS"), Dispatch::Handled);
    assert_eq!(f.out.lines().last().unwrap(), "ZL,MIN_GYRO_SENS = 3");
    assert!(f.min_gyro.modeshift_chords().is_empty());
    assert!(f.registry.derived_keys().is_empty());

    // A later base change is still seen under the chord
    f.registry.process_line("MIN_GYRO_SENS = 7");
    assert_eq!(f.min_gyro.value_for(&[ButtonId::Zl]), 7.0);
}

#[test]
fn second_name_removing_modeshift_retires_first() {
    let mut f = fixture();
    f.registry.add(
        AssignmentCommand::with_display_name(
            "GYRO_SENS",
            "MIN_GYRO_SENS",
            f.min_gyro.clone(),
            f.console.clone(),
        )
        .without_announcements(),
    );

    f.registry.process_line("ZL,MIN_GYRO_SENS = 3");
    f.registry.process_line("ZL,GYRO_SENS = NONE");
    assert!(f.min_gyro.modeshift(ButtonId::Zl).is_none());
    assert!(f.registry.derived_keys().is_empty());

    f.registry.process_line("ZL,MIN_GYRO_SENS = 5");
    assert_eq!(f.min_gyro.value_for(&[ButtonId::Zl]), 5.0);
    assert_eq!(f.min_gyro.modeshift(ButtonId::Zl).unwrap().listener_count(), 1);
    assert_eq!(f.registry.derived_keys(), vec!["ZL,MIN_GYRO_SENS"]);
}

#[test]
fn sim_press_on_setting_is_unsupported() {
    let mut f = fixture();
    assert_eq!(
        f.registry.process_line("ZL+MIN_GYRO_SENS = 3"),
        Dispatch::UnsupportedModifier
    );
    assert!(f.min_gyro.modeshift_chords().is_empty());
}

// ── Button chords and sim-presses ──

#[test]
fn chorded_binding_lifecycle() {
    let mut f = fixture();

    f.registry.process_line("S = SPACE");
    f.registry.process_line("L,S = C");
    assert_eq!(f.south.mapping_for(&[ButtonId::L]), mapping("C"));
    assert_eq!(f.south.mapping_for(&[]), mapping("SPACE"));
    assert_eq!(f.registry.derived_keys(), vec!["L,S"]);

    f.registry.process_line("L,S = NONE");
    assert!(f.south.chord(ButtonId::L).is_none());
    assert!(f.registry.derived_keys().is_empty());
    assert_eq!(f.south.mapping_for(&[ButtonId::L]), mapping("SPACE"));

    assert_eq!(
        f.out.lines(),
        vec![
            "S mapped to SPACE on press",
            "L,S mapped to C on press",
            "L,S mapped to no input",
        ]
    );
}

#[test]
fn sim_press_none_falls_back() {
    let mut f = fixture();

    f.registry.process_line("E+S = ENTER");
    assert_eq!(
        f.south.sim_press(ButtonId::E).map(|v| v.get()),
        Some(mapping("ENTER"))
    );

    f.registry.process_line("E+S = NONE");
    assert!(f.south.sim_press(ButtonId::E).is_none());
    assert!(f.registry.derived_keys().is_empty());
    assert_eq!(
        f.out.lines(),
        vec!["E+S mapped to ENTER on press", "E+S mapped to no input"]
    );
}

#[test]
fn sentinel_and_unknown_chords_are_rejected() {
    let mut f = fixture();
    assert_eq!(
        f.registry.process_line("NONE,S = A"),
        Dispatch::UnsupportedModifier
    );
    assert_eq!(
        f.registry.process_line("FOO+S = A"),
        Dispatch::UnsupportedModifier
    );
    assert!(f.south.chord_buttons().is_empty());
    assert!(f.south.sim_press_partners().is_empty());
}

#[test]
fn clearing_cache_keeps_live_bindings() {
    let mut f = fixture();
    f.registry.process_line("L,S = C");
    f.registry.process_line("ZL,MIN_GYRO_SENS = 4");
    let chorded = f.south.chord(ButtonId::L).unwrap();

    f.registry.clear_derived();
    assert!(f.registry.derived_keys().is_empty());
    assert_eq!(chorded.listener_count(), 0);
    assert_eq!(f.south.mapping_for(&[ButtonId::L]), mapping("C"));
    assert_eq!(f.min_gyro.value_for(&[ButtonId::Zl]), 4.0);

    // A fresh derived command picks the binding back up
    f.registry.process_line("L,S");
    assert_eq!(f.out.lines().last().unwrap(), "L,S = C");
}

#[test]
fn invalid_mapping_keeps_chord_and_prints_help() {
    let mut f = fixture();
    f.registry.process_line("L,S = C");
    f.registry.process_line("L,S = NOT_A_KEY");
    assert_eq!(f.south.mapping_for(&[ButtonId::L]), mapping("C"));
    assert_eq!(f.out.lines().last().unwrap(), "S: south face button");
    assert_eq!(f.registry.derived_keys(), vec!["L,S"]);
}
