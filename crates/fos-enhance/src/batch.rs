//! Frame-batched updates
//!
//! Updates queued within one frame are deep-merged per target and applied
//! together on the next frame. Queueing again before the frame fires
//! cancels the pending request and schedules a fresh one.

use std::cell::{Cell, RefCell};

use crate::{EnhancedCollection, EnhancedElement, UpdateReport, Updates, Value};

/// Frame request id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host frame scheduling (the `requestAnimationFrame` pair)
pub trait FrameScheduler {
    fn request_frame(&self) -> FrameHandle;
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Scheduler that only records requests; the host fires frames by hand
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_id: Cell<u64>,
    requested: RefCell<Vec<FrameHandle>>,
    cancelled: RefCell<Vec<FrameHandle>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that were not cancelled
    pub fn pending(&self) -> Vec<FrameHandle> {
        let cancelled = self.cancelled.borrow();
        self.requested
            .borrow()
            .iter()
            .filter(|h| !cancelled.contains(h))
            .copied()
            .collect()
    }

    pub fn requested_count(&self) -> usize {
        self.requested.borrow().len()
    }

    pub fn cancelled_count(&self) -> usize {
        self.cancelled.borrow().len()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self) -> FrameHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = FrameHandle(id);
        self.requested.borrow_mut().push(handle);
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.cancelled.borrow_mut().push(handle);
    }
}

/// What a batched update applies to
#[derive(Debug, Clone)]
pub enum BatchTarget {
    Element(EnhancedElement),
    Collection(EnhancedCollection),
}

impl BatchTarget {
    fn same(&self, other: &BatchTarget) -> bool {
        match (self, other) {
            (BatchTarget::Element(a), BatchTarget::Element(b)) => a == b,
            (BatchTarget::Collection(a), BatchTarget::Collection(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    fn apply(&self, updates: Updates) -> UpdateReport {
        match self {
            BatchTarget::Element(el) => el.update_with_report(updates),
            BatchTarget::Collection(c) => c.update_with_report(updates),
        }
    }
}

impl From<EnhancedElement> for BatchTarget {
    fn from(el: EnhancedElement) -> Self {
        BatchTarget::Element(el)
    }
}

impl From<EnhancedCollection> for BatchTarget {
    fn from(c: EnhancedCollection) -> Self {
        BatchTarget::Collection(c)
    }
}

/// Per-frame update queue
pub struct UpdateBatcher<S: FrameScheduler> {
    scheduler: S,
    queue: Vec<(BatchTarget, Updates)>,
    frame: Option<FrameHandle>,
}

impl<S: FrameScheduler> UpdateBatcher<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            queue: Vec::new(),
            frame: None,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Number of targets with queued updates
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Frame currently scheduled, if any
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    /// Queue `updates` for `target`. Non-objects are dropped with a warning.
    pub fn queue(&mut self, target: impl Into<BatchTarget>, updates: impl Into<Value>) {
        let target = target.into();
        let updates = match updates.into() {
            Value::Object(map) => map,
            other => {
                tracing::warn!("[Batch] update() expects an object, got {}", other.kind());
                return;
            }
        };

        match self.queue.iter_mut().find(|(t, _)| t.same(&target)) {
            Some((_, queued)) => queued.deep_merge(updates),
            None => self.queue.push((target, updates)),
        }

        if let Some(old) = self.frame.take() {
            self.scheduler.cancel_frame(old);
        }
        self.frame = Some(self.scheduler.request_frame());
    }

    /// Frame callback. Stale handles are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Option<UpdateReport> {
        if self.frame != Some(handle) {
            tracing::trace!("[Batch] Ignoring stale frame {:?}", handle);
            return None;
        }
        Some(self.flush())
    }

    /// Apply everything queued, in queue order
    pub fn flush(&mut self) -> UpdateReport {
        if let Some(frame) = self.frame.take() {
            self.scheduler.cancel_frame(frame);
        }
        let queued = std::mem::take(&mut self.queue);
        tracing::debug!("[Batch] Flushing {} targets", queued.len());

        let mut report = UpdateReport::new();
        for (target, updates) in queued {
            report.absorb(target.apply(updates));
        }
        report
    }
}
