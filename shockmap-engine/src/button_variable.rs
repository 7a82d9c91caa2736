//! Button bindings with chorded and simultaneous-press children
//!
//! Each button owns its plain binding plus two keyed child maps: bindings
//! that apply while another button is held (chords), and bindings fired when
//! it is pressed together with a partner (sim-presses). A child is dropped by
//! the `process_*_removal` calls once its binding has been cleared.

use crate::buttons::ButtonId;
use crate::codec::ConfigValue;
use crate::mapping::EventMapping;
use crate::variable::Variable;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

struct ButtonShared<T> {
    id: ButtonId,
    base: Variable<T>,
    chords: Mutex<BTreeMap<ButtonId, Variable<T>>>,
    sim_presses: Mutex<BTreeMap<ButtonId, Variable<T>>>,
}

/// The binding variable of one controller button
pub struct ButtonVariable<T = EventMapping> {
    shared: Arc<ButtonShared<T>>,
}

impl<T> Clone for ButtonVariable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Remove `key` from `map` if its binding is cleared
fn remove_if_cleared<T: ConfigValue>(
    map: &Mutex<BTreeMap<ButtonId, Variable<T>>>,
    key: ButtonId,
) -> bool {
    let mut map = map.lock();
    match map.get(&key) {
        Some(child) if child.get().is_cleared() => {
            map.remove(&key);
            true
        }
        _ => false,
    }
}

impl<T: ConfigValue> ButtonVariable<T> {
    /// Binding variable for button `id`
    pub fn new(id: ButtonId, base: Variable<T>) -> Self {
        Self {
            shared: Arc::new(ButtonShared {
                id,
                base,
                chords: Mutex::new(BTreeMap::new()),
                sim_presses: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    pub fn id(&self) -> ButtonId {
        self.shared.id
    }

    /// The unchorded binding
    pub fn variable(&self) -> &Variable<T> {
        &self.shared.base
    }

    /// Binding while `chord` is held, created on first access
    pub fn at_chord(&self, chord: ButtonId) -> Variable<T> {
        self.shared
            .chords
            .lock()
            .entry(chord)
            .or_insert_with(|| {
                debug!("Created chord binding {},{}", chord, self.shared.id);
                self.shared.base.child()
            })
            .clone()
    }

    /// Existing binding for `chord`
    pub fn chord(&self, chord: ButtonId) -> Option<Variable<T>> {
        self.shared.chords.lock().get(&chord).cloned()
    }

    /// Chord buttons that currently have a binding entry
    pub fn chord_buttons(&self) -> Vec<ButtonId> {
        self.shared.chords.lock().keys().copied().collect()
    }

    /// Drop the chord entry if its binding was cleared; true if removed
    pub fn process_chord_removal(&self, chord: ButtonId) -> bool {
        let removed = remove_if_cleared(&self.shared.chords, chord);
        if removed {
            debug!("Removed chord binding {},{}", chord, self.shared.id);
        }
        removed
    }

    /// Binding when pressed together with `partner`, created on first access
    pub fn at_sim_press(&self, partner: ButtonId) -> Variable<T> {
        self.shared
            .sim_presses
            .lock()
            .entry(partner)
            .or_insert_with(|| {
                debug!("Created sim-press binding {}+{}", partner, self.shared.id);
                self.shared.base.child()
            })
            .clone()
    }

    /// Existing sim-press binding with `partner`
    pub fn sim_press(&self, partner: ButtonId) -> Option<Variable<T>> {
        self.shared.sim_presses.lock().get(&partner).cloned()
    }

    pub fn sim_press_partners(&self) -> Vec<ButtonId> {
        self.shared.sim_presses.lock().keys().copied().collect()
    }

    /// Drop the sim-press entry if its binding was cleared; true if removed
    pub fn process_sim_press_removal(&self, partner: ButtonId) -> bool {
        let removed = remove_if_cleared(&self.shared.sim_presses, partner);
        if removed {
            debug!("Removed sim-press binding {}+{}", partner, self.shared.id);
        }
        removed
    }

    /// Effective binding while `active_chords` are held, oldest first.
    ///
    /// The most recently pressed chord with a binding wins.
    pub fn mapping_for(&self, active_chords: &[ButtonId]) -> T {
        let chords = self.shared.chords.lock();
        active_chords
            .iter()
            .rev()
            .filter(|&&chord| chord != self.shared.id)
            .find_map(|chord| chords.get(chord))
            .map(Variable::get)
            .unwrap_or_else(|| self.shared.base.get())
    }

    /// Drop every chord and sim-press binding and restore the default
    pub fn reset(&self) {
        self.shared.chords.lock().clear();
        self.shared.sim_presses.lock().clear();
        self.shared.base.reset();
    }
}

impl<T: fmt::Debug> fmt::Debug for ButtonVariable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonVariable")
            .field("id", &self.shared.id)
            .field("base", &self.shared.base)
            .field("chords", &self.shared.chords.lock().len())
            .field("sim_presses", &self.shared.sim_presses.lock().len())
            .finish()
    }
}
