mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{MockDispatch, Rejected};
use proptest::prelude::*;
use stm32kit_core::{
    unique_tag, Callback, CallbackManager, ManagerError, RegistryError, SlotRegistry, UniqueTag,
};

fn counting(count: &Arc<AtomicUsize>) -> Callback {
    let count = count.clone();
    Callback::new(move || {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

unique_tag!(DeliveryTag);

#[test]
fn completion_runs_callback_once() {
    let hal = MockDispatch::new();
    let count = Arc::new(AtomicUsize::new(0));
    let manager = CallbackManager::new(&hal, 0, DeliveryTag).unwrap();

    manager.set(counting(&count));
    assert!(hal.raise(0));
    assert!(hal.raise(0));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(!manager.is_set());
}

unique_tag!(IsolationA);
unique_tag!(IsolationB);

#[test]
fn distinct_tags_do_not_observe_each_other() {
    let hal = MockDispatch::new();
    let a_hits = Arc::new(AtomicUsize::new(0));
    let b_hits = Arc::new(AtomicUsize::new(0));

    let a = CallbackManager::new(&hal, 0, IsolationA).unwrap();
    let b = CallbackManager::new(&hal, 1, IsolationB).unwrap();
    // Both got slot 0 of their own registry
    assert_eq!(a.slot_id(), b.slot_id());

    a.set(counting(&a_hits));
    b.set(counting(&b_hits));

    hal.raise(1);
    assert_eq!(a_hits.load(Ordering::SeqCst), 0);
    assert_eq!(b_hits.load(Ordering::SeqCst), 1);
    assert!(a.is_set());

    hal.raise(0);
    assert_eq!(a_hits.load(Ordering::SeqCst), 1);
}

unique_tag!(SharedTag, slots = 2);

#[test]
fn managers_sharing_a_tag_get_separate_slots() {
    let hal = MockDispatch::new();
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));

    let first = CallbackManager::new(&hal, 0, SharedTag).unwrap();
    let second = CallbackManager::new(&hal, 1, SharedTag).unwrap();
    assert_ne!(first.slot_id(), second.slot_id());
    assert_ne!(first.trampoline() as usize, second.trampoline() as usize);

    first.set(counting(&first_hits));
    second.set(counting(&second_hits));
    hal.raise(0);
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);

    // Registry is full until one of them goes away
    assert_eq!(
        CallbackManager::new(&hal, 2, SharedTag).err(),
        Some(ManagerError::Registry(RegistryError::Exhausted))
    );
    drop(first);
    let third = CallbackManager::new(&hal, 2, SharedTag).unwrap();
    assert_eq!(SharedTag::registry().claimed(), 2);
    drop(third);
    drop(second);
    assert_eq!(SharedTag::registry().claimed(), 0);
}

unique_tag!(DropTag);

#[test]
fn drop_unregisters_and_discards_pending_callback() {
    let hal = MockDispatch::new();
    let count = Arc::new(AtomicUsize::new(0));

    let manager = CallbackManager::new(&hal, 3, DropTag).unwrap();
    let trampoline = manager.trampoline();
    assert_eq!(
        hal.registered(3).map(|f| f as usize),
        Some(trampoline as usize)
    );

    manager.set(counting(&count));
    drop(manager);

    assert!(hal.registered(3).is_none());
    assert!(!hal.raise(3));
    // A stale copy of the trampoline held by the HAL is harmless
    trampoline(core::ptr::null_mut());
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(Arc::strong_count(&count), 1);
    assert_eq!(DropTag::registry().claimed(), 0);
}

unique_tag!(RejectTag, slots = 1);

#[test]
fn failed_registration_releases_slot() {
    let hal = MockDispatch::new();
    hal.fail_register.set(true);

    let result = CallbackManager::new(&hal, 0, RejectTag);
    assert_eq!(result.err(), Some(ManagerError::Dispatch(Rejected)));
    assert_eq!(RejectTag::registry().claimed(), 0);

    let manager = CallbackManager::new(&hal, 0, RejectTag).unwrap();
    assert_eq!(manager.slot_id().index(), 0);
}

unique_tag!(StubbornTag, slots = 2);

#[test]
fn failed_unregistration_quarantines_slot() {
    let hal = MockDispatch::new();
    hal.fail_unregister.set(true);
    let stale_hits = Arc::new(AtomicUsize::new(0));
    let fresh_hits = Arc::new(AtomicUsize::new(0));

    let stale = CallbackManager::new(&hal, 1, StubbornTag).unwrap();
    let stale_slot = stale.slot_id();
    stale.set(counting(&stale_hits));
    drop(stale);

    assert_eq!(hal.unregistered.get(), 1);
    assert_eq!(StubbornTag::registry().claimed(), 1);
    // Trampoline still registered, but its slot was emptied
    assert!(hal.raise(1));
    assert_eq!(stale_hits.load(Ordering::SeqCst), 0);

    // A new manager never inherits the slot still wired to event 1
    let fresh = CallbackManager::new(&hal, 2, StubbornTag).unwrap();
    assert_ne!(fresh.slot_id(), stale_slot);
    fresh.set(counting(&fresh_hits));
    hal.raise(1);
    assert_eq!(fresh_hits.load(Ordering::SeqCst), 0);
    assert!(fresh.is_set());

    assert_eq!(
        CallbackManager::new(&hal, 3, StubbornTag).err(),
        Some(ManagerError::Registry(RegistryError::Exhausted))
    );
}

unique_tag!(GuardedTag, slots = 2);
unique_tag!(ForeignTag);

#[test]
fn manager_slot_cannot_be_released_by_other_claims() {
    let hal = MockDispatch::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let manager = CallbackManager::new(&hal, 0, GuardedTag).unwrap();
    manager.set(counting(&hits));

    // A claim from another tag's registry is refused
    let foreign = ForeignTag::registry().claim().unwrap();
    assert_eq!(foreign.id(), manager.slot_id());
    assert_eq!(
        GuardedTag::registry().release(foreign),
        Err(RegistryError::ForeignClaim)
    );

    // A direct claim on the same registry gets a different slot, and giving
    // it back leaves the manager's slot alone
    let direct = GuardedTag::registry().claim().unwrap();
    assert_ne!(direct.id(), manager.slot_id());
    GuardedTag::registry().release(direct).unwrap();

    assert_eq!(GuardedTag::registry().claimed(), 1);
    assert!(manager.is_set());
    hal.raise(0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

unique_tag!(RearmTag);

#[test]
fn callback_can_arm_the_next_transfer() {
    static STAGE: AtomicUsize = AtomicUsize::new(0);

    let hal = MockDispatch::new();
    let manager = CallbackManager::new(&hal, 0, RearmTag).unwrap();
    let registry = RearmTag::registry();
    let id = manager.slot_id();

    manager.set(Callback::new(move || {
        STAGE.store(1, Ordering::SeqCst);
        let _ = registry.set(
            id,
            Callback::new(|| {
                STAGE.store(2, Ordering::SeqCst);
            }),
        );
    }));

    hal.raise(0);
    assert_eq!(STAGE.load(Ordering::SeqCst), 1);
    assert!(manager.is_set());
    hal.raise(0);
    assert_eq!(STAGE.load(Ordering::SeqCst), 2);
}

unique_tag!(PropertyTag);

proptest! {
    #[test]
    fn delivery_count_matches_arming(ops in proptest::collection::vec(0u8..3, 0..64)) {
        let hal = MockDispatch::new();
        let count = Arc::new(AtomicUsize::new(0));
        let manager = CallbackManager::new(&hal, 0, PropertyTag).unwrap();

        let mut armed = false;
        let mut expected = 0;
        for op in ops {
            match op {
                0 => {
                    manager.set(counting(&count));
                    armed = true;
                }
                1 => {
                    manager.clear();
                    armed = false;
                }
                _ => {
                    hal.raise(0);
                    if armed {
                        expected += 1;
                    }
                    armed = false;
                }
            }
            prop_assert_eq!(manager.is_set(), armed);
        }
        prop_assert_eq!(count.load(Ordering::SeqCst), expected);
    }
}
