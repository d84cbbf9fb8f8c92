// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for GUI updates.

use crate::models::{AppState, Banner, EnumerationSet, Field, FieldVisibility, Preview, Variant};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// The GUI listens for these instead of polling the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Active variant switched; carries the new group visibility
    VariantChanged {
        variant: Variant,
        visibility: FieldVisibility,
    },

    /// A bound input changed, either from the operator or from a status poll
    FieldChanged { field: Field, value: String },

    /// Option lists arrived from the backend
    EnumerationsLoaded { enumerations: EnumerationSet },

    /// Selected printer readiness flipped
    ReadinessChanged { ready: bool },

    /// Banner text or styling changed
    BannerChanged { banner: Banner },

    /// A new preview image and caption are available
    PreviewUpdated { preview: Preview },
}

/// Thread-safe state manager with event emission
///
/// This is the one owner of session state:
/// - [`read()`](Self::read) / [`snapshot()`](Self::snapshot) for access
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// Every mutation happens under the write lock, so writers are serialized
/// even when backend responses complete on different tokio workers.
pub struct StateManager {
    state: Arc<RwLock<AppState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state and a 100 event buffer
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(state)),
            state_tx,
        }
    }

    /// Clone of the whole state, safe to use without holding locks
    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let ready = state_manager.read(|state| state.printer_ready);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// Captures the old state, applies `update_fn`, diffs, and broadcasts one
    /// event per detected change. Returns the emitted events.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // No subscribers is fine (headless use)
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Mutate bookkeeping fields no subscriber watches (preview tokens)
    /// and return a value computed under the same write lock. Emits nothing.
    pub fn update_untracked<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut AppState) -> R,
    {
        let mut state = self.state.write().unwrap();
        f(&mut state)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.label.active_variant != new.label.active_variant {
            changes.push(StateChange::VariantChanged {
                variant: new.label.active_variant,
                visibility: new.visibility(),
            });
        }

        if old.enumerations != new.enumerations {
            changes.push(StateChange::EnumerationsLoaded {
                enumerations: new.enumerations.clone(),
            });
        }

        for field in Field::ALL {
            let value = new.label.values.get(field);
            if old.label.values.get(field) != value {
                changes.push(StateChange::FieldChanged {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if old.printer_ready != new.printer_ready {
            changes.push(StateChange::ReadinessChanged {
                ready: new.printer_ready,
            });
        }

        if old.banner != new.banner {
            changes.push(StateChange::BannerChanged {
                banner: new.banner.clone(),
            });
        }

        if old.preview != new.preview {
            if let Some(preview) = &new.preview {
                changes.push(StateChange::PreviewUpdated {
                    preview: preview.clone(),
                });
            }
        }

        changes
    }

    // Convenience methods for common state updates

    pub fn set_variant(&self, variant: Variant) -> Vec<StateChange> {
        self.update(|state| state.label.active_variant = variant)
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) -> Vec<StateChange> {
        let value = value.into();
        self.update(|state| state.label.values.set(field, value))
    }

    /// Select an alignment, or clear the radio group with `None`
    pub fn set_align(&self, align: Option<String>) -> Vec<StateChange> {
        self.update(|state| state.label.values.align = align)
    }

    pub fn set_banner(&self, banner: Banner) -> Vec<StateChange> {
        self.update(|state| state.banner = banner)
    }

    /// Record the width the layout leaves for the preview image
    pub fn set_preview_width(&self, width: u32) -> Vec<StateChange> {
        self.update(|state| state.preview_width = width)
    }

    /// Store option lists and pre-select the first entry of every empty
    /// select-backed field, as a `<select>` shows its first option
    pub fn load_enumerations(&self, enumerations: EnumerationSet) -> Vec<StateChange> {
        self.update(|state| {
            let defaults = [
                (Field::Printer, enumerations.printers.first()),
                (Field::Tape, enumerations.tapes.first()),
                (Field::Fontname, enumerations.fonts.first()),
                (Field::Dictionary, enumerations.dictionaries.first()),
            ];
            for (field, first) in defaults {
                if let Some(first) = first {
                    if state.label.values.get(field).is_empty() {
                        state.label.values.set(field, first.clone());
                    }
                }
            }
            state.enumerations = enumerations;
        })
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BannerKind;

    fn enumerations() -> EnumerationSet {
        EnumerationSet {
            tapes: vec!["9mm".to_string(), "12mm".to_string()],
            printers: vec!["P1".to_string()],
            fonts: vec!["Arial".to_string()],
            dictionaries: vec!["DICT_4X4".to_string()],
        }
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert_eq!(state.active_variant(), Variant::Text);
        assert!(!state.printer_ready);
        assert!(state.preview.is_none());
    }

    #[test]
    fn test_variant_change_carries_visibility() {
        let manager = StateManager::new();

        let changes = manager.set_variant(Variant::Wrap);

        assert_eq!(changes.len(), 1);
        match &changes[0] {
            StateChange::VariantChanged {
                variant,
                visibility,
            } => {
                assert_eq!(*variant, Variant::Wrap);
                assert!(visibility.label && visibility.length);
                assert!(!visibility.lines);
            }
            other => panic!("unexpected change {:?}", other),
        }
    }

    #[test]
    fn test_reselecting_variant_emits_nothing() {
        let manager = StateManager::new();
        manager.set_variant(Variant::Qr);

        let changes = manager.set_variant(Variant::Qr);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_field_change_detection() {
        let manager = StateManager::new();

        let changes = manager.set_field(Field::Qrtext, "hello");

        assert_eq!(
            changes,
            vec![StateChange::FieldChanged {
                field: Field::Qrtext,
                value: "hello".to_string()
            }]
        );
    }

    #[test]
    fn test_clearing_align() {
        let manager = StateManager::new();

        let changes = manager.set_align(None);

        assert!(matches!(
            &changes[0],
            StateChange::FieldChanged { field: Field::Align, value } if value.is_empty()
        ));
        assert_eq!(manager.read(|s| s.label.values.align.clone()), None);
    }

    #[test]
    fn test_banner_change_detection() {
        let manager = StateManager::new();

        let changes = manager.set_banner(Banner::danger("Printer not ready"));
        assert!(matches!(
            &changes[0],
            StateChange::BannerChanged { banner } if banner.kind == BannerKind::Danger
        ));

        // Same banner again is not a change
        assert!(manager.set_banner(Banner::danger("Printer not ready")).is_empty());
    }

    #[test]
    fn test_load_enumerations_selects_first_options() {
        let manager = StateManager::new();

        let changes = manager.load_enumerations(enumerations());

        assert!(changes
            .iter()
            .any(|c| matches!(c, StateChange::EnumerationsLoaded { .. })));

        let state = manager.snapshot();
        assert_eq!(state.enumerations, enumerations());
        assert_eq!(state.label.values.printer, "P1");
        assert_eq!(state.label.values.tape, "9mm");
        assert_eq!(state.label.values.fontname, "Arial");
        assert_eq!(state.label.values.dictionary, "DICT_4X4");
    }

    #[test]
    fn test_load_enumerations_keeps_existing_selection() {
        let manager = StateManager::new();
        manager.set_field(Field::Tape, "12mm");

        manager.load_enumerations(enumerations());

        assert_eq!(manager.read(|s| s.label.values.tape.clone()), "12mm");
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.update(|state| state.printer_ready = true);

        let event = rx.try_recv();
        assert_eq!(event.unwrap(), StateChange::ReadinessChanged { ready: true });
    }

    #[test]
    fn test_multiple_subscribers() {
        let manager = StateManager::new();
        let mut rx1 = manager.subscribe();
        let mut rx2 = manager.subscribe();

        manager.set_variant(Variant::Flag);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_preview_width_is_silent() {
        let manager = StateManager::new();
        let changes = manager.set_preview_width(320);

        assert!(changes.is_empty());
        assert_eq!(manager.read(|s| s.preview_width), 320);
    }

    #[test]
    fn test_clone_state_manager() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.set_field(Field::Label, "eth0");

        assert_eq!(manager2.snapshot().label.values.label, "eth0");
    }
}
