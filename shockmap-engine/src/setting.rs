//! Settings with per-chord overrides (modeshifts)
//!
//! A modeshift replaces a setting's value while its chord button is held.
//! Clearing one is two-step: [`SettingVariable::mark_modeshift_for_removal`]
//! only flags the entry, and [`SettingVariable::process_modeshift_removal`]
//! drops it later, once no command is mid-parse on it.
//!
//! A modeshift created by [`SettingVariable::at_chord`] starts from the
//! current base value and is provisional until [`SettingVariable::keep_modeshift`]
//! is called. Provisional entries are dropped by the same deferred removal.

use crate::buttons::ButtonId;
use crate::variable::Variable;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

struct SettingShared<T> {
    id: String,
    base: Variable<T>,
    modeshifts: Mutex<BTreeMap<ButtonId, Variable<T>>>,
    pending_removal: Mutex<BTreeSet<ButtonId>>,
    provisional: Mutex<BTreeSet<ButtonId>>,
}

/// A setting variable that may be overridden per chord button
pub struct SettingVariable<T> {
    shared: Arc<SettingShared<T>>,
}

impl<T> Clone for SettingVariable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> SettingVariable<T> {
    /// Wrap `base` as the setting identified by `id`
    pub fn new(id: impl Into<String>, base: Variable<T>) -> Self {
        Self {
            shared: Arc::new(SettingShared {
                id: id.into(),
                base,
                modeshifts: Mutex::new(BTreeMap::new()),
                pending_removal: Mutex::new(BTreeSet::new()),
                provisional: Mutex::new(BTreeSet::new()),
            }),
        }
    }

    /// Setting identifier, e.g. `MIN_GYRO_SENS`
    pub fn id(&self) -> &str {
        &self.shared.id
    }

    /// The unscoped variable
    pub fn variable(&self) -> &Variable<T> {
        &self.shared.base
    }

    /// Modeshift variable for `chord`, created provisional on first access
    pub fn at_chord(&self, chord: ButtonId) -> Variable<T> {
        self.shared
            .modeshifts
            .lock()
            .entry(chord)
            .or_insert_with(|| {
                debug!("Created modeshift {},{}", chord, self.shared.id);
                self.shared.provisional.lock().insert(chord);
                let child = self.shared.base.child();
                child.set(self.shared.base.get());
                child
            })
            .clone()
    }

    /// Keep the modeshift on `chord` past the next removal pass
    pub fn keep_modeshift(&self, chord: ButtonId) {
        self.shared.provisional.lock().remove(&chord);
    }

    /// True while the modeshift on `chord` was created but never kept
    pub fn is_provisional(&self, chord: ButtonId) -> bool {
        self.shared.provisional.lock().contains(&chord)
    }

    /// Existing modeshift variable for `chord`
    pub fn modeshift(&self, chord: ButtonId) -> Option<Variable<T>> {
        self.shared.modeshifts.lock().get(&chord).cloned()
    }

    /// Chords that currently carry a modeshift
    pub fn modeshift_chords(&self) -> Vec<ButtonId> {
        self.shared.modeshifts.lock().keys().copied().collect()
    }

    /// Flag the modeshift on `chord` for removal; nothing is removed yet
    pub fn mark_modeshift_for_removal(&self, chord: ButtonId) {
        self.shared.pending_removal.lock().insert(chord);
    }

    pub fn is_marked_for_removal(&self, chord: ButtonId) -> bool {
        self.shared.pending_removal.lock().contains(&chord)
    }

    /// Drop the modeshift on `chord` if it was flagged or is still
    /// provisional; true if removed
    pub fn process_modeshift_removal(&self, chord: ButtonId) -> bool {
        let marked = self.shared.pending_removal.lock().remove(&chord);
        let provisional = self.shared.provisional.lock().remove(&chord);
        if !(marked || provisional) {
            return false;
        }
        let removed = self.shared.modeshifts.lock().remove(&chord).is_some();
        if removed {
            debug!("Removed modeshift {},{}", chord, self.shared.id);
        }
        removed
    }

    /// Effective value while `active_chords` are held, oldest first.
    ///
    /// The most recently pressed chord with a modeshift wins.
    pub fn value_for(&self, active_chords: &[ButtonId]) -> T {
        let modeshifts = self.shared.modeshifts.lock();
        active_chords
            .iter()
            .rev()
            .find_map(|chord| modeshifts.get(chord))
            .map(Variable::get)
            .unwrap_or_else(|| self.shared.base.get())
    }

    /// Drop every modeshift and restore the default value
    pub fn reset(&self) {
        self.shared.modeshifts.lock().clear();
        self.shared.pending_removal.lock().clear();
        self.shared.provisional.lock().clear();
        self.shared.base.reset();
    }
}

impl<T: fmt::Debug> fmt::Debug for SettingVariable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingVariable")
            .field("id", &self.shared.id)
            .field("base", &self.shared.base)
            .field("modeshifts", &self.shared.modeshifts.lock().len())
            .finish()
    }
}
