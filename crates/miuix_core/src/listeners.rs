//! Identity-keyed listener sets
//!
//! Listeners are shared `Rc` handles compared by pointer identity, so adding
//! the same handle twice or removing one that was never added are no-ops.

use std::rc::Rc;

/// An insertion-ordered set of listener handles
pub struct ListenerSet<T: ?Sized> {
    listeners: Vec<Rc<T>>,
}

impl<T: ?Sized> ListenerSet<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Add a listener; returns false if it was already registered
    pub fn add(&mut self, listener: Rc<T>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Remove a listener; returns false if it was not registered
    pub fn remove(&mut self, listener: &Rc<T>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        before != self.listeners.len()
    }

    pub fn contains(&self, listener: &Rc<T>) -> bool {
        self.listeners.iter().any(|l| Rc::ptr_eq(l, listener))
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Clone the current handles so callbacks may mutate the set while being notified
    pub fn snapshot(&self) -> Vec<Rc<T>> {
        self.listeners.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<T>> {
        self.listeners.iter()
    }
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> &'static str;
    }

    struct Fixed(&'static str);

    impl Named for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut set: ListenerSet<dyn Named> = ListenerSet::new();
        let a: Rc<dyn Named> = Rc::new(Fixed("a"));

        assert!(set.add(a.clone()));
        assert!(!set.add(a.clone()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut set: ListenerSet<dyn Named> = ListenerSet::new();
        let a: Rc<dyn Named> = Rc::new(Fixed("a"));
        let b: Rc<dyn Named> = Rc::new(Fixed("a"));

        set.add(a.clone());
        // Equal contents, different identity
        assert!(!set.remove(&b));
        assert!(set.remove(&a));
        assert!(!set.remove(&a));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut set: ListenerSet<dyn Named> = ListenerSet::new();
        set.add(Rc::new(Fixed("first")));
        set.add(Rc::new(Fixed("second")));

        let names: Vec<_> = set.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
