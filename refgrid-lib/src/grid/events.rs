//! Input events and scoped global listeners
//!
//! Pointer release and keyboard shortcuts must reach a grid even when they
//! happen outside its bounds. Instead of ambient global handlers, each grid
//! holds a [`Subscription`] to an [`EventHub`] while it is mounted. Dropping
//! the subscription unregisters it, so no listener outlives its grid.

use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use tokio::sync::mpsc;

/// Modifier keys held during a click or key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Control key held
    pub ctrl: bool,
    /// Meta (Command) key held
    pub meta: bool,
    /// Shift key held
    pub shift: bool,
}

impl Modifiers {
    /// No modifiers
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
    };

    /// Control held.
    pub const CTRL: Self = Self {
        ctrl: true,
        meta: false,
        shift: false,
    };

    /// Shift held.
    pub const SHIFT: Self = Self {
        ctrl: false,
        meta: false,
        shift: true,
    };

    /// The platform "mod" key: Ctrl or Meta.
    pub fn is_mod(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: char,
    pub modifiers: Modifiers,
}

impl KeyChord {
    /// Creates a chord.
    pub fn new(key: char, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Creates a chord with Ctrl held.
    pub fn ctrl(key: char) -> Self {
        Self::new(key, Modifiers::CTRL)
    }
}

/// Grid-wide keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// mod+Z
    Undo,
    /// mod+Y
    Redo,
    /// mod+S
    Save,
}

impl Shortcut {
    /// Maps a chord to a shortcut, if it is one.
    pub fn from_chord(chord: KeyChord) -> Option<Self> {
        if !chord.modifiers.is_mod() {
            return None;
        }
        match chord.key.to_ascii_lowercase() {
            'z' => Some(Self::Undo),
            'y' => Some(Self::Redo),
            's' => Some(Self::Save),
            _ => None,
        }
    }
}

/// An event broadcast to every mounted grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// The pointer was released anywhere.
    PointerUp,
    /// A key was pressed anywhere.
    Key(KeyChord),
}

#[derive(Debug, Default)]
struct HubInner {
    listeners: DashMap<u64, mpsc::UnboundedSender<GridEvent>>,
    next_id: AtomicU64,
}

/// Source of window-level events.
///
/// Cheap to clone; clones share the listener registry.
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    inner: Arc<HubInner>,
}

impl EventHub {
    /// Creates a hub with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. It stays registered until the returned
    /// subscription is dropped.
    pub fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.listeners.insert(id, tx);
        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Broadcasts a pointer release.
    pub fn pointer_up(&self) -> usize {
        self.broadcast(GridEvent::PointerUp)
    }

    /// Broadcasts a key press.
    pub fn key(&self, chord: KeyChord) -> usize {
        self.broadcast(GridEvent::Key(chord))
    }

    /// Sends an event to every listener. Returns how many received it.
    pub fn broadcast(&self, event: GridEvent) -> usize {
        self.inner
            .listeners
            .iter()
            .filter(|listener| listener.value().send(event).is_ok())
            .count()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }
}

/// A registered listener on an [`EventHub`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<GridEvent>,
    hub: Weak<HubInner>,
}

impl Subscription {
    /// Takes every event received so far without waiting.
    pub fn drain(&mut self) -> Vec<GridEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.listeners.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts() {
        assert_eq!(Shortcut::from_chord(KeyChord::ctrl('z')), Some(Shortcut::Undo));
        assert_eq!(Shortcut::from_chord(KeyChord::ctrl('Y')), Some(Shortcut::Redo));
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(Shortcut::from_chord(KeyChord::new('s', meta)), Some(Shortcut::Save));
        assert_eq!(Shortcut::from_chord(KeyChord::new('s', Modifiers::SHIFT)), None);
        assert_eq!(Shortcut::from_chord(KeyChord::ctrl('x')), None);
    }

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let hub = EventHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.pointer_up(), 2);
        assert_eq!(a.drain(), vec![GridEvent::PointerUp]);
        assert_eq!(b.drain(), vec![GridEvent::PointerUp]);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_drop_unregisters() {
        let hub = EventHub::new();
        let first = hub.subscribe();
        let _second = hub.subscribe();
        assert_eq!(hub.listener_count(), 2);

        drop(first);
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(hub.key(KeyChord::ctrl('z')), 1);
    }

    #[test]
    fn test_subscription_outliving_hub() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe();
        hub.pointer_up();
        drop(hub);

        assert_eq!(sub.drain(), vec![GridEvent::PointerUp]);
        drop(sub);
    }
}
