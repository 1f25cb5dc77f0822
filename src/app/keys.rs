//! Scoped global key bindings.
//!
//! A [`KeyDispatcher`] maps keys to handlers that produce an [`Event`].
//! [`KeyDispatcher::bind`] returns a [`KeyBinding`] guard; the binding stays
//! active exactly as long as the guard lives, so a view that owns the guard
//! cannot leak its shortcut after it closes.
//!
//! At most one handler is bound per key. Binding a key again replaces the
//! handler, and the replaced guard's drop then leaves the newer binding
//! untouched.

use crate::app::handler::Event;
use crate::app::modes::Focus;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

/// Keys that can carry a global binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    Char(char),
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enter" | "return" => Ok(Self::Enter),
            "escape" | "esc" => Ok(Self::Escape),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::Char(c)),
                    _ => Err(format!("unknown key: {s}")),
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => write!(f, "Enter"),
            Self::Escape => write!(f, "Escape"),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

/// When a binding fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFilter {
    /// Regardless of focus.
    #[default]
    Always,

    /// Only while the search input does not have focus.
    UnlessTyping,
}

impl KeyFilter {
    const fn admits(self, focus: Focus) -> bool {
        match self {
            Self::Always => true,
            Self::UnlessTyping => !focus.is_typing(),
        }
    }
}

type Handler = Box<dyn FnMut() -> Event>;

struct Slot {
    id: u64,
    filter: KeyFilter,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    slots: HashMap<Key, Slot>,
}

/// Routes key presses to their bound handlers.
///
/// Clones share the same set of bindings.
///
/// # Examples
///
/// ```
/// use popcorn::app::keys::{Key, KeyDispatcher, KeyFilter};
/// use popcorn::app::{Event, Focus};
///
/// let keys = KeyDispatcher::new();
/// let binding = keys.bind(Key::Escape, KeyFilter::Always, || Event::CloseDetails);
/// assert_eq!(keys.dispatch(Key::Escape, Focus::Elsewhere), Some(Event::CloseDetails));
///
/// drop(binding);
/// assert_eq!(keys.dispatch(Key::Escape, Focus::Elsewhere), None);
/// ```
#[derive(Clone, Default)]
pub struct KeyDispatcher {
    registry: Rc<RefCell<Registry>>,
}

impl KeyDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `key` until the returned guard is dropped.
    ///
    /// Replaces any handler already bound to `key`.
    pub fn bind<F>(&self, key: Key, filter: KeyFilter, handler: F) -> KeyBinding
    where
        F: FnMut() -> Event + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;

        let replaced = registry
            .slots
            .insert(
                key,
                Slot {
                    id,
                    filter,
                    handler: Box::new(handler),
                },
            )
            .is_some();
        tracing::trace!(%key, id, replaced, "key bound");

        KeyBinding {
            registry: Rc::downgrade(&self.registry),
            key,
            id,
        }
    }

    /// Runs the handler bound to `key`, if any and if its filter admits
    /// `focus`, returning the event it produced.
    pub fn dispatch(&self, key: Key, focus: Focus) -> Option<Event> {
        let mut registry = self.registry.borrow_mut();
        let Some(slot) = registry.slots.get_mut(&key) else {
            tracing::trace!(%key, "no binding");
            return None;
        };
        if !slot.filter.admits(focus) {
            tracing::trace!(%key, ?focus, "binding filtered out");
            return None;
        }
        Some((slot.handler)())
    }

    #[must_use]
    pub fn is_bound(&self, key: Key) -> bool {
        self.registry.borrow().slots.contains_key(&key)
    }
}

impl fmt::Debug for KeyDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let keys: Vec<&Key> = registry.slots.keys().collect();
        f.debug_struct("KeyDispatcher").field("bound", &keys).finish()
    }
}

/// Guard for one key binding. Dropping it unbinds the key.
#[must_use = "the key is unbound as soon as the binding is dropped"]
pub struct KeyBinding {
    registry: Weak<RefCell<Registry>>,
    key: Key,
    id: u64,
}

impl KeyBinding {
    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }
}

impl Drop for KeyBinding {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.borrow_mut();
        if registry.slots.get(&self.key).is_some_and(|slot| slot.id == self.id) {
            registry.slots.remove(&self.key);
            tracing::trace!(key = %self.key, id = self.id, "key unbound");
        }
    }
}

impl fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unless_typing_skips_focused_input() {
        let keys = KeyDispatcher::new();
        let _binding = keys.bind(Key::Enter, KeyFilter::UnlessTyping, || Event::FocusSearch);
        assert_eq!(keys.dispatch(Key::Enter, Focus::SearchInput), None);
        assert_eq!(keys.dispatch(Key::Enter, Focus::Elsewhere), Some(Event::FocusSearch));
    }

    #[test]
    fn rebinding_replaces_and_old_guard_keeps_new_binding() {
        let keys = KeyDispatcher::new();
        let first = keys.bind(Key::Escape, KeyFilter::Always, || Event::CloseDetails);
        let _second = keys.bind(Key::Escape, KeyFilter::Always, || Event::Shutdown);
        assert_eq!(keys.dispatch(Key::Escape, Focus::Elsewhere), Some(Event::Shutdown));

        drop(first);
        assert!(keys.is_bound(Key::Escape));
        assert_eq!(keys.dispatch(Key::Escape, Focus::Elsewhere), Some(Event::Shutdown));
    }

    #[test]
    fn handler_state_persists_between_presses() {
        let keys = KeyDispatcher::new();
        let mut presses = 0u8;
        let _binding = keys.bind(Key::Char('r'), KeyFilter::Always, move || {
            presses += 1;
            Event::RateMovie(presses)
        });
        keys.dispatch(Key::Char('r'), Focus::Elsewhere);
        assert_eq!(keys.dispatch(Key::Char('r'), Focus::Elsewhere), Some(Event::RateMovie(2)));
    }

    #[test]
    fn guard_outliving_dispatcher_is_harmless() {
        let keys = KeyDispatcher::new();
        let binding = keys.bind(Key::Escape, KeyFilter::Always, || Event::CloseDetails);
        drop(keys);
        drop(binding);
    }

    #[test]
    fn parses_key_names() {
        assert_eq!("Enter".parse::<Key>(), Ok(Key::Enter));
        assert_eq!("esc".parse::<Key>(), Ok(Key::Escape));
        assert_eq!("q".parse::<Key>(), Ok(Key::Char('q')));
        assert!("f13".parse::<Key>().is_err());
    }
}
