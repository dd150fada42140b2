//! Fixed-capacity arena of callback slots
//!
//! Each unique tag owns one `CallbackRegistry`. A peripheral wrapper claims a
//! slot when it is created and releases it when dropped, so two wrappers that
//! share a tag still get separate slots instead of silently overwriting each
//! other's callbacks.
//!
//! Claiming hands out a [`SlotClaim`]: an owned, non-`Copy` token. Only the
//! holder of that token can give the slot back, so a slot in use can never be
//! freed from under its owner and handed to someone else.
//!
//! The slot count is checked at compile time:
//!
//! ```compile_fail
//! use stm32kit_core::CallbackRegistry;
//!
//! // More slots than there are trampolines
//! let registry = CallbackRegistry::<9>::default();
//! ```

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::slot::CallbackSlot;
use crate::Callback;

/// Upper bound on slots per registry (one trampoline per slot index)
pub const MAX_SLOTS: usize = 8;

/// Index of a slot inside its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotId(u8);

impl SlotId {
    pub(crate) const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Position of the slot inside its registry
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Ownership of one claimed slot
///
/// Returned by [`SlotRegistry::claim`] and consumed by
/// [`SlotRegistry::release`]. Dropping it without releasing keeps the slot
/// claimed for good.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use = "a claim that is dropped keeps its slot claimed forever"]
pub struct SlotClaim {
    id: SlotId,
    // Address of the issuing registry
    owner: usize,
}

impl SlotClaim {
    /// The claimed slot
    pub const fn id(&self) -> SlotId {
        self.id
    }
}

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Every slot is already claimed
    Exhausted,
    /// Slot index is outside this registry
    InvalidSlot,
    /// Slot exists but is not currently claimed
    NotClaimed,
    /// Claim was issued by a different registry
    ForeignClaim,
}

/// Object-safe view of a registry, independent of its slot count
pub trait SlotRegistry: Sync {
    /// Number of slots
    fn capacity(&self) -> usize;

    /// Number of slots currently claimed
    fn claimed(&self) -> usize;

    /// Claim the lowest free slot
    fn claim(&self) -> Result<SlotClaim, RegistryError>;

    /// Clear a slot and return it to the free pool
    fn release(&self, claim: SlotClaim) -> Result<(), RegistryError>;

    /// Borrow a claimed slot
    fn slot(&self, id: SlotId) -> Result<&CallbackSlot, RegistryError>;

    /// Store a callback in a claimed slot
    fn set(&self, id: SlotId, callback: Callback) -> Result<(), RegistryError> {
        self.slot(id)?.set(callback);
        Ok(())
    }

    /// Drop the callback held by a claimed slot
    fn clear(&self, id: SlotId) -> Result<(), RegistryError> {
        self.slot(id)?.clear();
        Ok(())
    }

    /// Run the callback held by a slot; unclaimed or unknown slots are a no-op
    fn fire(&self, id: SlotId) -> bool {
        self.slot(id).map(CallbackSlot::fire).unwrap_or(false)
    }
}

/// `N` callback slots plus a claim bitmap
pub struct CallbackRegistry<const N: usize> {
    slots: [CallbackSlot; N],
    claimed: Mutex<CriticalSectionRawMutex, Cell<u8>>,
}

impl<const N: usize> CallbackRegistry<N> {
    const VALID_SIZE: () = assert!(
        N > 0 && N <= MAX_SLOTS,
        "registry slot count must be between 1 and MAX_SLOTS"
    );

    /// An empty registry. `N` must be in `1..=MAX_SLOTS`.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_SIZE;

        Self {
            slots: [const { CallbackSlot::new() }; N],
            claimed: Mutex::new(Cell::new(0)),
        }
    }

    fn address(&self) -> usize {
        self as *const Self as usize
    }

    fn check(&self, id: SlotId) -> Result<u8, RegistryError> {
        if id.index() >= N {
            return Err(RegistryError::InvalidSlot);
        }
        let bit = 1u8 << id.0;
        if self.claimed.lock(|c| c.get()) & bit == 0 {
            return Err(RegistryError::NotClaimed);
        }
        Ok(bit)
    }
}

impl<const N: usize> Default for CallbackRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SlotRegistry for CallbackRegistry<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn claimed(&self) -> usize {
        self.claimed.lock(|c| c.get().count_ones() as usize)
    }

    fn claim(&self) -> Result<SlotClaim, RegistryError> {
        let claimed = self.claimed.lock(|c| {
            let bits = c.get();
            let index = (!bits).trailing_zeros() as usize;
            if index >= N {
                return None;
            }
            c.set(bits | (1 << index));
            Some(SlotId::new(index as u8))
        });

        match claimed {
            Some(id) => {
                debug!("claimed callback slot {}", id.index());
                Ok(SlotClaim {
                    id,
                    owner: self.address(),
                })
            }
            None => {
                warn!("callback registry exhausted ({} slots)", N);
                Err(RegistryError::Exhausted)
            }
        }
    }

    fn release(&self, claim: SlotClaim) -> Result<(), RegistryError> {
        if claim.owner != self.address() {
            return Err(RegistryError::ForeignClaim);
        }
        let id = claim.id;
        let bit = self.check(id)?;
        self.slots[id.index()].clear();
        self.claimed.lock(|c| c.set(c.get() & !bit));
        debug!("released callback slot {}", id.index());
        Ok(())
    }

    fn slot(&self, id: SlotId) -> Result<&CallbackSlot, RegistryError> {
        self.check(id)?;
        Ok(&self.slots[id.index()])
    }
}

impl<const N: usize> core::fmt::Debug for CallbackRegistry<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("capacity", &N)
            .field("claimed", &self.claimed())
            .finish()
    }
}
