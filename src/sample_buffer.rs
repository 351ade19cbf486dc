//! Single-slot, non-blocking hand-off between a capture producer and the session engine.
//!
//! The slot holds at most one unconsumed [`Frame`]. Whichever side currently holds the
//! frame has exclusive access: the producer while filling, the consumer between
//! `try_acquire` and `release`. A rejected `fill` is the producer's backpressure
//! signal; whether it drops or blocks is the capture side's choice.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::frame::Frame;

/// The single-slot frame channel.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    slot: Mutex<Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    frame: Option<Frame>,
    leased: bool,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a frame to the consumer.
    ///
    /// Rejected (the frame is handed back) while a previous frame is still pending or
    /// the consumer has not yet called [`SampleBuffer::release`].
    pub fn fill(&self, frame: Frame) -> Result<(), Frame> {
        let mut slot = self.lock();
        if slot.frame.is_some() || slot.leased {
            return Err(frame);
        }
        slot.frame = Some(frame);
        Ok(())
    }

    /// Takes the pending frame, if any, leaving the slot leased until
    /// [`SampleBuffer::release`].
    pub fn try_acquire(&self) -> Option<Frame> {
        let mut slot = self.lock();
        if slot.leased {
            return None;
        }
        let frame = slot.frame.take()?;
        slot.leased = true;
        Some(frame)
    }

    /// Returns the slot to the producer. Must be called after processing an acquired
    /// frame before the next `fill` can succeed.
    pub fn release(&self) {
        self.lock().leased = false;
    }

    /// True when no frame is pending and the slot is not leased.
    pub fn is_idle(&self) -> bool {
        let slot = self.lock();
        slot.frame.is_none() && !slot.leased
    }

    // A poisoned lock means a panic mid-hand-off; the slot state itself is still
    // coherent (both fields are plain values), so we keep going.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
