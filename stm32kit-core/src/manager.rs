//! RAII binding of a callback slot to one HAL completion event

use core::marker::PhantomData;

use crate::dispatch::CallbackDispatch;
use crate::registry::{RegistryError, SlotClaim, SlotId, SlotRegistry};
use crate::slot::CallbackSlot;
use crate::tag::{assert_valid_tag, trampoline_for, HalCallback, UniqueTag};
use crate::Callback;

/// Errors from [`CallbackManager::new`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ManagerError<E> {
    /// No free slot in the tag's registry
    Registry(RegistryError),
    /// The dispatch facility refused the registration
    Dispatch(E),
}

impl<E> From<RegistryError> for ManagerError<E> {
    fn from(err: RegistryError) -> Self {
        ManagerError::Registry(err)
    }
}

/// Owns one claimed slot of `T`'s registry, registered under one event
///
/// While alive, the HAL invoking the registered trampoline runs whatever
/// callback is currently [`set`](Self::set). Dropping the manager unregisters
/// the trampoline, drops any pending callback and frees the slot.
///
/// If the HAL refuses to unregister, the trampoline may still fire later, so
/// the slot is emptied but stays claimed: no other manager can ever be handed
/// a slot whose trampoline is still wired to a dead peripheral's event.
pub struct CallbackManager<'d, T: UniqueTag, D: CallbackDispatch> {
    dispatch: &'d D,
    event: D::EventId,
    slot_id: SlotId,
    slot: &'static CallbackSlot,
    claim: Option<SlotClaim>,
    _tag: PhantomData<T>,
}

impl<'d, T: UniqueTag, D: CallbackDispatch> CallbackManager<'d, T, D> {
    /// Claim a slot from `T`'s registry and register its trampoline for
    /// `event`
    ///
    /// The slot is released again if registration fails.
    pub fn new(
        dispatch: &'d D,
        event: D::EventId,
        _tag: T,
    ) -> Result<Self, ManagerError<D::Error>> {
        assert_valid_tag::<T>();

        let registry = T::registry();
        let claim = registry.claim()?;
        let slot_id = claim.id();
        let slot = match registry.slot(slot_id) {
            Ok(slot) => slot,
            Err(err) => {
                if registry.release(claim).is_err() {
                    warn!("could not release slot {}", slot_id.index());
                }
                return Err(err.into());
            }
        };

        if let Err(err) = dispatch.register_callback(event, trampoline_for::<T>(slot_id)) {
            warn!("callback registration failed for slot {}", slot_id.index());
            if registry.release(claim).is_err() {
                warn!("could not release slot {}", slot_id.index());
            }
            return Err(ManagerError::Dispatch(err));
        }

        debug!("registered trampoline for slot {}", slot_id.index());
        Ok(Self {
            dispatch,
            event,
            slot_id,
            slot,
            claim: Some(claim),
            _tag: PhantomData,
        })
    }

    /// Arm the callback for the next completion, replacing any pending one
    pub fn set(&self, callback: Callback) {
        self.slot.set(callback);
    }

    /// Disarm the pending callback
    pub fn clear(&self) {
        self.slot.clear();
    }

    /// Whether a callback is armed
    pub fn is_set(&self) -> bool {
        self.slot.is_set()
    }

    /// The claimed slot
    pub fn slot_id(&self) -> SlotId {
        self.slot_id
    }

    /// The event the trampoline is registered under
    pub fn event(&self) -> D::EventId {
        self.event
    }

    /// The function pointer handed to the dispatch facility
    pub fn trampoline(&self) -> HalCallback {
        trampoline_for::<T>(self.slot_id)
    }
}

impl<T: UniqueTag, D: CallbackDispatch> Drop for CallbackManager<'_, T, D> {
    fn drop(&mut self) {
        self.slot.clear();

        if self.dispatch.unregister_callback(self.event).is_err() {
            warn!(
                "callback unregistration failed, slot {} stays claimed",
                self.slot_id.index()
            );
            return;
        }

        if let Some(claim) = self.claim.take() {
            if T::registry().release(claim).is_err() {
                warn!("could not release slot {}", self.slot_id.index());
            }
        }
    }
}

impl<T: UniqueTag, D: CallbackDispatch> core::fmt::Debug for CallbackManager<'_, T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackManager")
            .field("slot", &self.slot_id)
            .field("set", &self.is_set())
            .finish()
    }
}
