use std::{cell::RefCell, rc::Rc};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

/// Resize notifications from whatever hosts the view (a window, a test).
/// Cloneable handle, every clone refers to the same listener set.
#[derive(Clone, Default)]
pub struct ResizeEvents(Rc<RefCell<Registry>>);

impl std::fmt::Debug for ResizeEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeEvents")
            .field("listeners", &self.len())
            .finish()
    }
}

impl ResizeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&self, f: F) -> ListenerId
    where
        F: Fn() + 'static,
    {
        let mut reg = self.0.borrow_mut();
        let id = ListenerId(reg.next_id);
        reg.next_id += 1;
        reg.listeners.push((id, Rc::new(f)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut reg = self.0.borrow_mut();
        let before = reg.listeners.len();
        reg.listeners.retain(|(l, _)| *l != id);
        reg.listeners.len() != before
    }

    /// Notify every listener, returns how many were called
    pub fn dispatch(&self) -> usize {
        // Listeners may add or remove listeners, so call them outside the borrow
        let listeners: Vec<Listener> = self
            .0
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for l in listeners.iter() {
            l();
        }
        listeners.len()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
