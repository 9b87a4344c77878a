//! Tracking of adopted file descriptors.
//!
//! The [`DescriptorRegistry`] remembers every descriptor that an adapter has
//! adopted from its caller rather than opened itself. A descriptor in the
//! registry must never be closed by the adapter and must never be adopted a
//! second time while a handle for it is still alive.
//!
//! The registry is an ordered sequence with no duplicates. Its capacity grows
//! by doubling (starting at one slot) when an insert finds it full, and halves
//! when a removal leaves it at most half occupied.
//!
//! # Example
//!
//! ```rust
//! use zipfd::registry::{DescriptorRegistry, RemoveOutcome};
//!
//! let mut registry = DescriptorRegistry::new();
//! registry.add(5)?;
//! registry.add(9)?;
//! assert!(registry.contains(5));
//! assert_eq!(registry.capacity(), 2);
//!
//! assert!(registry.remove(5).removed());
//! assert_eq!(registry.remove(5), RemoveOutcome::NotFound);
//! # Ok::<(), zipfd::Error>(())
//! ```

use std::cell::RefCell;
use std::collections::TryReserveError;
use std::os::fd::RawFd;
use std::rc::Rc;

use crate::{Error, Result};

/// A registry shared by several adapters.
///
/// Sharing is explicit: every adapter built from the same `SharedRegistry`
/// sees the same set of adopted descriptors. There is no internal locking,
/// so a shared registry stays on one thread.
pub type SharedRegistry = Rc<RefCell<DescriptorRegistry>>;

/// Result of [`DescriptorRegistry::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The descriptor was not in the registry. Nothing changed.
    NotFound,
    /// The descriptor was removed and capacity was adjusted as needed.
    Removed,
    /// The descriptor was removed, but shrinking the backing storage failed.
    ///
    /// Membership is still correct; only the capacity stays larger than
    /// required.
    Degraded,
}

impl RemoveOutcome {
    /// Returns true if a descriptor was actually removed.
    pub fn removed(self) -> bool {
        !matches!(self, RemoveOutcome::NotFound)
    }
}

/// Ordered set of adopted descriptors.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    /// Adopted descriptors in insertion order.
    entries: Vec<RawFd>,
    /// Logical capacity. Follows the doubling/halving policy exactly,
    /// independent of whatever the allocator hands back.
    capacity: usize,
    #[cfg(test)]
    deny_allocations: bool,
}

impl DescriptorRegistry {
    /// Creates an empty registry with zero capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry wrapped for sharing between adapters.
    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Appends a descriptor.
    ///
    /// When the registry is full its capacity doubles first (a zero-capacity
    /// registry grows to one slot).
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateAdoption`] if `fd` is already present.
    /// - [`Error::AllocationFailure`] if the growth allocation fails.
    ///
    /// On error the registry is unchanged.
    pub fn add(&mut self, fd: RawFd) -> Result<()> {
        if self.contains(fd) {
            return Err(Error::DuplicateAdoption { fd });
        }

        if self.entries.len() == self.capacity {
            let new_capacity = if self.capacity == 0 {
                1
            } else {
                self.capacity
                    .checked_mul(2)
                    .ok_or(Error::AllocationFailure {
                        requested: usize::MAX,
                    })?
            };

            self.try_grow(new_capacity)
                .map_err(|_| Error::AllocationFailure {
                    requested: new_capacity,
                })?;
            self.capacity = new_capacity;
        }

        self.entries.push(fd);
        Ok(())
    }

    /// Removes the first occurrence of `fd`, keeping the order of the rest.
    ///
    /// If occupancy drops to half the capacity or less, the capacity is
    /// halved. A failed shrink is reported as [`RemoveOutcome::Degraded`] and
    /// is never an error.
    pub fn remove(&mut self, fd: RawFd) -> RemoveOutcome {
        let Some(index) = self.entries.iter().position(|&entry| entry == fd) else {
            return RemoveOutcome::NotFound;
        };
        self.entries.remove(index);

        if self.entries.len() <= self.capacity >> 1 {
            let new_capacity = self.capacity >> 1;
            if self.try_shrink(new_capacity).is_err() {
                log::warn!(
                    "descriptor registry could not shrink to {} slots, keeping {}",
                    new_capacity,
                    self.capacity
                );
                return RemoveOutcome::Degraded;
            }
            self.capacity = new_capacity;
        }

        RemoveOutcome::Removed
    }

    /// Returns true if `fd` is currently registered.
    pub fn contains(&self, fd: RawFd) -> bool {
        self.entries.contains(&fd)
    }

    /// Returns the number of registered descriptors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no descriptor is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the logical capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the registered descriptors in insertion order.
    pub fn as_slice(&self) -> &[RawFd] {
        &self.entries
    }

    fn try_grow(&mut self, new_capacity: usize) -> std::result::Result<(), TryReserveError> {
        self.check_allocation()?;
        let additional = new_capacity.saturating_sub(self.entries.len());
        self.entries.try_reserve_exact(additional)
    }

    fn try_shrink(&mut self, new_capacity: usize) -> std::result::Result<(), TryReserveError> {
        self.check_allocation()?;
        let mut shrunk = Vec::new();
        shrunk.try_reserve_exact(new_capacity)?;
        shrunk.extend_from_slice(&self.entries);
        self.entries = shrunk;
        Ok(())
    }

    #[cfg(not(test))]
    fn check_allocation(&self) -> std::result::Result<(), TryReserveError> {
        Ok(())
    }

    // An impossible reservation yields a real TryReserveError.
    #[cfg(test)]
    fn check_allocation(&self) -> std::result::Result<(), TryReserveError> {
        if self.deny_allocations {
            Vec::<RawFd>::new().try_reserve(usize::MAX)
        } else {
            Ok(())
        }
    }

    #[cfg(test)]
    pub(crate) fn deny_allocations(&mut self, deny: bool) {
        self.deny_allocations = deny;
    }
}
