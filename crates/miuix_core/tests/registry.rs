//! Integration tests for the screen-scoped listener registry

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use miuix_core::{
    AppBarState, AppBarStateListener, Insets, ListenerRegistry, WindowInsetsListener,
};

#[derive(Default)]
struct RecordingAppBar {
    states: RefCell<Vec<AppBarState>>,
    fractions: RefCell<Vec<f32>>,
}

impl AppBarStateListener for RecordingAppBar {
    fn on_app_bar_state_changed(&self, state: AppBarState) {
        self.states.borrow_mut().push(state);
    }

    fn on_collapse_fraction_changed(&self, fraction: f32) {
        self.fractions.borrow_mut().push(fraction);
    }
}

#[derive(Default)]
struct RecordingInsets {
    calls: Cell<usize>,
    last: Cell<Insets>,
}

impl WindowInsetsListener for RecordingInsets {
    fn on_window_insets_changed(&self, insets: Insets) {
        self.calls.set(self.calls.get() + 1);
        self.last.set(insets);
    }
}

/// Unsubscribes itself the first time it is notified
struct OneShot {
    registry: Weak<ListenerRegistry>,
    me: RefCell<Option<Rc<dyn AppBarStateListener>>>,
    hits: Cell<usize>,
}

impl AppBarStateListener for OneShot {
    fn on_app_bar_state_changed(&self, _state: AppBarState) {
        self.hits.set(self.hits.get() + 1);
        if let (Some(registry), Some(me)) = (self.registry.upgrade(), self.me.borrow_mut().take())
        {
            registry.remove_app_bar_listener(&me);
        }
    }
}

#[test]
fn test_app_bar_listeners_receive_state_and_fraction() {
    let registry = ListenerRegistry::new();
    let listener = Rc::new(RecordingAppBar::default());
    assert!(registry.add_app_bar_listener(listener.clone()));
    // Second add of the same handle is a no-op
    assert!(!registry.add_app_bar_listener(listener.clone()));

    registry.notify_collapse_fraction(0.5);
    registry.notify_app_bar_state(AppBarState::Collapsed);

    assert_eq!(*listener.states.borrow(), vec![AppBarState::Collapsed]);
    assert_eq!(*listener.fractions.borrow(), vec![0.5]);
}

#[test]
fn test_listener_may_unsubscribe_during_notification() {
    let registry = Rc::new(ListenerRegistry::new());
    let one_shot = Rc::new(OneShot {
        registry: Rc::downgrade(&registry),
        me: RefCell::new(None),
        hits: Cell::new(0),
    });
    let handle: Rc<dyn AppBarStateListener> = one_shot.clone();
    *one_shot.me.borrow_mut() = Some(handle.clone());
    registry.add_app_bar_listener(handle);

    registry.notify_app_bar_state(AppBarState::Expanded);
    registry.notify_app_bar_state(AppBarState::Collapsed);

    assert_eq!(one_shot.hits.get(), 1);
    assert_eq!(registry.listener_count(), 0);
}

#[test]
fn test_insets_are_replayed_and_deduplicated() {
    let registry = ListenerRegistry::new();
    let insets = Insets {
        top: 96,
        bottom: 48,
        ..Default::default()
    };
    registry.notify_window_insets(insets);

    let listener = Rc::new(RecordingInsets::default());
    registry.add_insets_listener(listener.clone());
    assert_eq!(listener.calls.get(), 1);
    assert_eq!(listener.last.get(), insets);

    registry.notify_window_insets(insets);
    assert_eq!(listener.calls.get(), 1);

    registry.notify_window_insets(Insets::default());
    assert_eq!(listener.calls.get(), 2);
}

#[test]
fn test_clear_drops_everything() {
    let registry = ListenerRegistry::new();
    registry.add_app_bar_listener(Rc::new(RecordingAppBar::default()));
    registry.add_insets_listener(Rc::new(RecordingInsets::default()));
    assert_eq!(registry.listener_count(), 2);

    registry.clear();
    assert_eq!(registry.listener_count(), 0);
}
