//! Outbound buffer pool - one owned buffer per in-flight send.
//!
//! Every send gets its own slot from a fixed arena. A handle carries the
//! slot index plus a generation counter, so a handle that was already
//! released (or whose slot has since been reused) can never reach the
//! new owner's bytes. Acquiring a buffer never touches a buffer that is
//! still in flight; when the arena is exhausted the request is refused.
//!
//! No heap: slots are `heapless::Vec`s sized at compile time.

use crate::error::{EncodeError, Error};
use heapless::Vec;

/// Owned reference to one acquired buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferHandle {
    index: usize,
    generation: u32,
}

impl BufferHandle {
    /// Slot index inside the pool (diagnostics only).
    pub fn index(&self) -> usize {
        self.index
    }
}

struct Slot<const CAP: usize> {
    generation: u32,
    live: bool,
    capacity: usize,
    data: Vec<u8, CAP>,
}

impl<const CAP: usize> Slot<CAP> {
    fn empty() -> Self {
        Self {
            generation: 0,
            live: false,
            capacity: 0,
            data: Vec::new(),
        }
    }

    fn owned_by(&self, handle: BufferHandle) -> bool {
        self.live && self.generation == handle.generation
    }
}

/// Fixed arena of `SLOTS` buffers holding up to `CAP` bytes each.
pub struct BufferPool<const SLOTS: usize, const CAP: usize> {
    slots: [Slot<CAP>; SLOTS],
}

impl<const SLOTS: usize, const CAP: usize> BufferPool<SLOTS, CAP> {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot::empty()),
        }
    }

    /// Hand out a fresh buffer able to hold `capacity` bytes.
    pub fn acquire(&mut self, capacity: usize) -> Result<BufferHandle, Error> {
        if capacity > CAP {
            log_warn!("Outbound: {} bytes exceeds slot size {}", capacity, CAP);
            return Err(Error::AllocationFailed {
                requested: capacity,
            });
        }

        let Some((index, slot)) = self.slots.iter_mut().enumerate().find(|(_, s)| !s.live) else {
            log_warn!("Outbound: all {} buffers in flight", SLOTS);
            return Err(Error::AllocationFailed {
                requested: capacity,
            });
        };

        slot.generation = slot.generation.wrapping_add(1);
        slot.live = true;
        slot.capacity = capacity;
        slot.data.clear();

        log_debug!("Outbound: slot {} acquired ({} bytes)", index, capacity);
        Ok(BufferHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Let `encode` write into the buffer, then set the logical length
    /// to what it reports.
    ///
    /// `encode` sees the full acquired capacity; the capacity is an upper
    /// bound, the logical length is whatever was actually written.
    pub fn fill<F>(&mut self, handle: BufferHandle, encode: F) -> Result<usize, Error>
    where
        F: FnOnce(&mut [u8]) -> Result<usize, EncodeError>,
    {
        let slot = self.slot_mut(handle).ok_or(Error::StaleHandle)?;

        slot.data.clear();
        slot.data
            .resize(slot.capacity, 0)
            .map_err(|_| Error::AllocationFailed {
                requested: slot.capacity,
            })?;

        match encode(slot.data.as_mut_slice()) {
            Ok(written) => {
                slot.data.truncate(written);
                Ok(written)
            }
            Err(e) => {
                slot.data.clear();
                Err(e.into())
            }
        }
    }

    /// Logical contents of a live buffer.
    pub fn get(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.slots
            .get(handle.index)
            .filter(|s| s.owned_by(handle))
            .map(|s| s.data.as_slice())
    }

    /// Capacity the buffer was acquired with.
    pub fn capacity(&self, handle: BufferHandle) -> Option<usize> {
        self.slots
            .get(handle.index)
            .filter(|s| s.owned_by(handle))
            .map(|s| s.capacity)
    }

    /// Drop ownership of a buffer.
    ///
    /// Returns `false` (and does nothing) when the handle was already
    /// released or its slot has been handed to someone else since.
    pub fn release(&mut self, handle: BufferHandle) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        slot.live = false;
        slot.capacity = 0;
        slot.data.clear();
        log_debug!("Outbound: slot {} released", handle.index);
        true
    }

    /// Number of buffers currently in flight.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.live).count()
    }

    fn slot_mut(&mut self, handle: BufferHandle) -> Option<&mut Slot<CAP>> {
        self.slots
            .get_mut(handle.index)
            .filter(|s| s.owned_by(handle))
    }
}

impl<const SLOTS: usize, const CAP: usize> Default for BufferPool<SLOTS, CAP> {
    fn default() -> Self {
        Self::new()
    }
}
