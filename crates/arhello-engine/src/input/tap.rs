use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Default number of taps buffered between the UI and render threads.
pub const DEFAULT_TAP_CAPACITY: usize = 16;

/// A single tap in surface pixels (origin top-left).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tap {
    pub x: f32,
    pub y: f32,
}

impl Tap {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Fixed-capacity tap channel from the UI thread to the render thread.
///
/// Best-effort delivery: [`offer`](Self::offer) never blocks and drops the
/// new tap when the queue is full; [`poll`](Self::poll) never blocks and
/// yields at most one tap. Share with `Arc<TapQueue>`.
#[derive(Debug)]
pub struct TapQueue {
    tx: Sender<Tap>,
    rx: Receiver<Tap>,
    capacity: usize,
}

impl TapQueue {
    /// Creates a queue holding at most `capacity` taps (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Enqueues a tap. Returns `false` if the queue was full and the tap was dropped.
    pub fn offer(&self, tap: Tap) -> bool {
        match self.tx.try_send(tap) {
            Ok(()) => true,
            // Both ends live in `self`, so the channel cannot disconnect.
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                log::trace!("tap queue full; dropped tap at ({}, {})", tap.x, tap.y);
                false
            }
        }
    }

    /// Dequeues the oldest tap, if any.
    pub fn poll(&self) -> Option<Tap> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TapQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TAP_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn overflow_keeps_first_sixteen() {
        let queue = TapQueue::default();
        let accepted: Vec<bool> = (0..20)
            .map(|i| queue.offer(Tap::new(i as f32, 0.0)))
            .collect();

        assert!(accepted[..16].iter().all(|&a| a));
        assert!(accepted[16..].iter().all(|&a| !a));
        assert_eq!(queue.len(), 16);

        for i in 0..16 {
            assert_eq!(queue.poll(), Some(Tap::new(i as f32, 0.0)));
        }
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn poll_on_empty_returns_none() {
        let queue = TapQueue::new(4);
        assert!(queue.is_empty());
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn wraps_around_after_draining() {
        let queue = TapQueue::new(3);
        for round in 0..5 {
            let base = round as f32 * 10.0;
            assert!(queue.offer(Tap::new(base, 1.0)));
            assert!(queue.offer(Tap::new(base + 1.0, 1.0)));
            assert_eq!(queue.poll(), Some(Tap::new(base, 1.0)));
            assert_eq!(queue.poll(), Some(Tap::new(base + 1.0, 1.0)));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn space_frees_after_poll() {
        let queue = TapQueue::new(1);
        assert!(queue.offer(Tap::new(1.0, 1.0)));
        assert!(!queue.offer(Tap::new(2.0, 2.0)));
        assert_eq!(queue.poll(), Some(Tap::new(1.0, 1.0)));
        assert!(queue.offer(Tap::new(3.0, 3.0)));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let queue = TapQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.offer(Tap::new(0.0, 0.0)));
    }

    #[test]
    fn producer_thread_never_blocks() {
        let queue = Arc::new(TapQueue::default());
        let producer = Arc::clone(&queue);

        let dropped = std::thread::spawn(move || {
            (0..100)
                .filter(|&i| !producer.offer(Tap::new(i as f32, 0.0)))
                .count()
        })
        .join()
        .unwrap();

        assert_eq!(dropped, 84);
        assert_eq!(queue.len(), 16);
    }
}
