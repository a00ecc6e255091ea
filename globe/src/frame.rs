//! A single-threaded, manually stepped stand-in for a display's
//! animation-frame callback queue.
//!
//! Callbacks requested before a frame starts run during that frame; callbacks
//! requested while a frame is running wait for the next one. The host decides
//! when a frame happens by calling [`FrameScheduler::run_frame`].

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
    time::Duration,
};
use tracing::trace;

pub type FrameCallback = Box<dyn FnOnce(&FrameInfo)>;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct FrameRequestId(u64);

/// Bookkeeping for the frame currently being run
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct FrameInfo {
    /// 1-based index of the frame
    pub index: u64,
    /// Real time since the previous frame, as reported by the host
    pub real_elapsed: Duration,
    /// Real time accumulated over every frame so far
    pub real_time: Duration,
    /// Number of callbacks that ran in this frame
    pub callbacks: usize,
}

#[derive(Default)]
struct SchedulerState {
    next_id: u64,
    pending: Vec<(FrameRequestId, FrameCallback)>,
    info: FrameInfo,
}

/// Cloneable handle, every clone refers to the same queue
#[derive(Clone, Default)]
pub struct FrameScheduler(Rc<RefCell<SchedulerState>>);

/// A handle that doesn't keep the queue alive, for callbacks that re-arm
/// themselves from inside the queue
#[derive(Clone, Default)]
pub struct WeakFrameScheduler(Weak<RefCell<SchedulerState>>);

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.0.borrow();
        f.debug_struct("FrameScheduler")
            .field("pending", &st.pending.len())
            .field("info", &st.info)
            .finish()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downgrade(&self) -> WeakFrameScheduler {
        WeakFrameScheduler(Rc::downgrade(&self.0))
    }

    /// Queue `cb` for the next frame
    pub fn request_frame<F>(&self, cb: F) -> FrameRequestId
    where
        F: FnOnce(&FrameInfo) + 'static,
    {
        let mut st = self.0.borrow_mut();
        let id = FrameRequestId(st.next_id);
        st.next_id += 1;
        st.pending.push((id, Box::new(cb)));
        id
    }

    /// Revoke a queued callback. Returns false if it already ran or was
    /// already cancelled.
    pub fn cancel_frame(&self, id: FrameRequestId) -> bool {
        let mut st = self.0.borrow_mut();
        let before = st.pending.len();
        st.pending.retain(|(pending_id, _)| *pending_id != id);
        st.pending.len() != before
    }

    pub fn is_pending(&self, id: FrameRequestId) -> bool {
        self.0.borrow().pending.iter().any(|(p, _)| *p == id)
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().pending.len()
    }

    /// The most recently completed frame
    pub fn last_frame(&self) -> FrameInfo {
        self.0.borrow().info
    }

    /// Run every callback queued before this call, in request order
    pub fn run_frame(&self, real_elapsed: Duration) -> FrameInfo {
        let (batch, mut info) = {
            let mut st = self.0.borrow_mut();
            st.info.index += 1;
            st.info.real_elapsed = real_elapsed;
            st.info.real_time += real_elapsed;
            st.info.callbacks = 0;
            (std::mem::take(&mut st.pending), st.info)
        };

        info.callbacks = batch.len();
        for (_id, cb) in batch {
            cb(&info);
        }

        self.0.borrow_mut().info.callbacks = info.callbacks;
        trace!(frame = info.index, callbacks = info.callbacks, "Frame complete");
        info
    }
}

impl WeakFrameScheduler {
    pub fn upgrade(&self) -> Option<FrameScheduler> {
        self.0.upgrade().map(FrameScheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn callbacks_run_once_in_request_order() {
        let sched = FrameScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let log = log.clone();
            sched.request_frame(move |_| log.borrow_mut().push(n));
        }
        assert_eq!(sched.pending(), 3);

        let info = sched.run_frame(Duration::from_millis(16));
        assert_eq!(info.index, 1);
        assert_eq!(info.callbacks, 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);

        let info = sched.run_frame(Duration::from_millis(16));
        assert_eq!(info.callbacks, 0);
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(info.real_time, Duration::from_millis(32));
    }

    #[test]
    fn requests_from_inside_a_frame_wait_for_the_next() {
        let sched = FrameScheduler::new();
        let hits = Rc::new(Cell::new(0));

        let inner_sched = sched.clone();
        let inner_hits = hits.clone();
        sched.request_frame(move |_| {
            inner_hits.set(inner_hits.get() + 1);
            let again = inner_hits.clone();
            inner_sched.request_frame(move |_| again.set(again.get() + 10));
        });

        sched.run_frame(Duration::ZERO);
        assert_eq!(hits.get(), 1);
        assert_eq!(sched.pending(), 1);
        sched.run_frame(Duration::ZERO);
        assert_eq!(hits.get(), 11);
    }

    #[test]
    fn cancel() {
        let sched = FrameScheduler::new();
        let hit = Rc::new(Cell::new(false));
        let h = hit.clone();
        let id = sched.request_frame(move |_| h.set(true));
        assert!(sched.is_pending(id));
        assert!(sched.cancel_frame(id));
        assert!(!sched.cancel_frame(id));
        sched.run_frame(Duration::ZERO);
        assert!(!hit.get());
    }

    #[test]
    fn weak_handle() {
        let sched = FrameScheduler::new();
        let weak = sched.downgrade();
        assert!(weak.upgrade().is_some());
        drop(sched);
        assert!(weak.upgrade().is_none());
    }
}
