//! Screen-scoped listener registry
//!
//! One registry is owned by each screen (activity) context and handed to the
//! components that publish into it, replacing process-wide listener sets.
//! Dropping the registry drops every subscription made through it.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use miuix_core::{ImeVisibilityListener, ListenerRegistry};
//!
//! struct Keyboard(Cell<i32>);
//!
//! impl ImeVisibilityListener for Keyboard {
//!     fn on_ime_visibility_changed(&self, visible: bool, height: i32) {
//!         self.0.set(if visible { height } else { 0 });
//!     }
//! }
//!
//! let registry = ListenerRegistry::new();
//! let keyboard = Rc::new(Keyboard(Cell::new(0)));
//! registry.add_ime_listener(keyboard.clone());
//! registry.notify_ime_visibility(true, 840);
//! assert_eq!(keyboard.0.get(), 840);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::Insets;
use crate::listeners::ListenerSet;
use crate::state::AppBarState;

/// Observes a collapsing app bar
pub trait AppBarStateListener {
    /// The bar reached a new resting state
    fn on_app_bar_state_changed(&self, state: AppBarState);

    /// Collapse progress in `[0, 1]` (0 = expanded)
    fn on_collapse_fraction_changed(&self, _fraction: f32) {}
}

/// Observes the soft keyboard
pub trait ImeVisibilityListener {
    fn on_ime_visibility_changed(&self, visible: bool, height: i32);
}

/// Observes system window insets
pub trait WindowInsetsListener {
    fn on_window_insets_changed(&self, insets: Insets);
}

/// Listener sets owned by one screen context
#[derive(Default)]
pub struct ListenerRegistry {
    app_bar: RefCell<ListenerSet<dyn AppBarStateListener>>,
    ime: RefCell<ListenerSet<dyn ImeVisibilityListener>>,
    insets: RefCell<ListenerSet<dyn WindowInsetsListener>>,
    last_insets: RefCell<Option<Insets>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // App bar
    // =========================================================================

    pub fn add_app_bar_listener(&self, listener: Rc<dyn AppBarStateListener>) -> bool {
        self.app_bar.borrow_mut().add(listener)
    }

    pub fn remove_app_bar_listener(&self, listener: &Rc<dyn AppBarStateListener>) -> bool {
        self.app_bar.borrow_mut().remove(listener)
    }

    pub fn notify_app_bar_state(&self, state: AppBarState) {
        let listeners = self.app_bar.borrow().snapshot();
        tracing::debug!(?state, count = listeners.len(), "app bar state changed");
        for listener in listeners {
            listener.on_app_bar_state_changed(state);
        }
    }

    pub fn notify_collapse_fraction(&self, fraction: f32) {
        let listeners = self.app_bar.borrow().snapshot();
        for listener in listeners {
            listener.on_collapse_fraction_changed(fraction);
        }
    }

    // =========================================================================
    // IME
    // =========================================================================

    pub fn add_ime_listener(&self, listener: Rc<dyn ImeVisibilityListener>) -> bool {
        self.ime.borrow_mut().add(listener)
    }

    pub fn remove_ime_listener(&self, listener: &Rc<dyn ImeVisibilityListener>) -> bool {
        self.ime.borrow_mut().remove(listener)
    }

    pub fn notify_ime_visibility(&self, visible: bool, height: i32) {
        let listeners = self.ime.borrow().snapshot();
        for listener in listeners {
            listener.on_ime_visibility_changed(visible, height);
        }
    }

    // =========================================================================
    // Window insets
    // =========================================================================

    /// Add an insets listener; it immediately receives the last known insets
    pub fn add_insets_listener(&self, listener: Rc<dyn WindowInsetsListener>) -> bool {
        let added = self.insets.borrow_mut().add(listener.clone());
        if added {
            let last = *self.last_insets.borrow();
            if let Some(insets) = last {
                listener.on_window_insets_changed(insets);
            }
        }
        added
    }

    pub fn remove_insets_listener(&self, listener: &Rc<dyn WindowInsetsListener>) -> bool {
        self.insets.borrow_mut().remove(listener)
    }

    /// Publish new insets; identical consecutive values are not re-sent
    pub fn notify_window_insets(&self, insets: Insets) {
        if self.last_insets.replace(Some(insets)) == Some(insets) {
            return;
        }
        let listeners = self.insets.borrow().snapshot();
        for listener in listeners {
            listener.on_window_insets_changed(insets);
        }
    }

    /// Drop every subscription (screen destroyed)
    pub fn clear(&self) {
        self.app_bar.borrow_mut().clear();
        self.ime.borrow_mut().clear();
        self.insets.borrow_mut().clear();
        self.last_insets.replace(None);
    }

    pub fn listener_count(&self) -> usize {
        self.app_bar.borrow().len() + self.ime.borrow().len() + self.insets.borrow().len()
    }
}
