//! Tag-keyed animation scheduler.
//!
//! Widgets never own a running animation. They push a [`Tween`] (or a
//! timer) into the shared [`Animator`] and get called back from
//! [`Animator::tick`], which the owning loop runs between frames.
//!
//! Every entry carries an [`AnimationTag`] naming the logical field it
//! drives. Starting a new transition on a field means cancelling its tag
//! first; a cancelled entry is dropped together with its callbacks, so its
//! completion never runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Quadratic ease-in-out.
    QuadInOut,
}

impl Easing {
    /// Applies the easing function to a t value (0-1).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Opaque key naming one animated field.
///
/// Minted once per field when its owner is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationTag(u64);

impl AnimationTag {
    /// Mints a tag no other field shares.
    #[must_use]
    pub fn mint() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw tag value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Per-tick value sink. Must only store the value; it runs while the
/// animator's queue is detached.
pub type OnUpdate = Box<dyn FnMut(f32) + Send>;

/// Runs once when an entry finishes.
pub type OnComplete = Box<dyn FnOnce(&Animator) + Send>;

/// A scheduled transition of one scalar from `from` to `to`.
pub struct Tween {
    tag: AnimationTag,
    from: f32,
    to: f32,
    duration: Duration,
    easing: Easing,
    on_update: Option<OnUpdate>,
    on_complete: Option<OnComplete>,
}

impl Tween {
    /// Creates a linear tween.
    #[must_use]
    pub fn new(tag: AnimationTag, from: f32, to: f32, duration: Duration) -> Self {
        Self {
            tag,
            from,
            to,
            duration,
            easing: Easing::Linear,
            on_update: None,
            on_complete: None,
        }
    }

    /// Sets the easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Sets the per-tick value sink.
    #[must_use]
    pub fn on_update(mut self, f: impl FnMut(f32) + Send + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnOnce(&Animator) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for Tween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("tag", &self.tag)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .finish_non_exhaustive()
    }
}

struct Entry {
    id: u64,
    elapsed: Duration,
    finished: bool,
    tween: Tween,
}

impl Entry {
    /// Advances the entry and returns true once it has reached its target.
    fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;

        let progress = if self.tween.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.tween.duration.as_secs_f32()).min(1.0)
        };

        let eased = self.tween.easing.apply(progress);
        let value = if progress >= 1.0 {
            self.tween.to
        } else {
            self.tween.from + (self.tween.to - self.tween.from) * eased
        };

        if let Some(on_update) = self.tween.on_update.as_mut() {
            on_update(value);
        }

        progress >= 1.0
    }
}

#[derive(Default)]
struct Queue {
    entries: Vec<Entry>,
    next_id: u64,
}

/// Shared animation and timer queue.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct Animator {
    queue: Arc<Mutex<Queue>>,
}

impl Animator {
    /// Creates an empty animator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a tween. It starts advancing on the next tick.
    pub fn schedule(&self, tween: Tween) {
        let mut queue = self.queue.lock();
        let id = queue.next_id;
        queue.next_id += 1;
        queue.entries.push(Entry {
            id,
            elapsed: Duration::ZERO,
            finished: false,
            tween,
        });
    }

    /// Runs `f` once `duration` has elapsed, unless `tag` is cancelled first.
    pub fn start_timer(
        &self,
        tag: AnimationTag,
        duration: Duration,
        f: impl FnOnce(&Animator) + Send + 'static,
    ) {
        self.schedule(Tween::new(tag, 0.0, 0.0, duration).on_complete(f));
    }

    /// Drops every pending entry with `tag`, callbacks included.
    ///
    /// Returns the number of entries removed.
    pub fn cancel_by_tag(&self, tag: AnimationTag) -> usize {
        let removed: Vec<Entry> = {
            let mut queue = self.queue.lock();
            let (removed, kept): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut queue.entries)
                .into_iter()
                .partition(|entry| entry.tween.tag == tag);
            queue.entries = kept;
            removed
        };

        if !removed.is_empty() {
            tracing::trace!("Cancelled {} entries for tag {}", removed.len(), tag.raw());
        }
        // Callbacks may own guards; drop them outside the lock.
        removed.len()
    }

    /// Number of pending entries with `tag`.
    #[must_use]
    pub fn live_count(&self, tag: AnimationTag) -> usize {
        self.queue
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.tween.tag == tag)
            .count()
    }

    /// Total number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().entries.len()
    }

    /// Returns true if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances every entry by `dt`, then runs the completions of the
    /// entries that finished.
    ///
    /// A completion may schedule or cancel freely; an entry cancelled by an
    /// earlier completion in the same tick does not complete.
    pub fn tick(&self, dt: Duration) {
        let mut entries = std::mem::take(&mut self.queue.lock().entries);

        let mut finished = Vec::new();
        for entry in entries.iter_mut().filter(|entry| !entry.finished) {
            if entry.advance(dt) {
                entry.finished = true;
                finished.push(entry.id);
            }
        }

        {
            let mut queue = self.queue.lock();
            let scheduled_meanwhile = std::mem::take(&mut queue.entries);
            entries.extend(scheduled_meanwhile);
            queue.entries = entries;
        }

        for id in finished {
            let entry = {
                let mut queue = self.queue.lock();
                queue
                    .entries
                    .iter()
                    .position(|entry| entry.id == id)
                    .map(|pos| queue.entries.remove(pos))
            };

            if let Some(on_complete) = entry.and_then(|entry| entry.tween.on_complete) {
                on_complete(self);
            }
        }
    }
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("pending", &self.len())
            .finish()
    }
}
