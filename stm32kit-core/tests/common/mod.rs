//! Mock vendor callback facility for host tests

#![allow(dead_code)]

use core::ptr;
use std::cell::{Cell, RefCell};

use stm32kit_core::{CallbackDispatch, HalCallback};

pub const EVENTS: usize = 4;

/// Per-event function-pointer table, like a HAL handle's callback members
#[derive(Default)]
pub struct MockDispatch {
    table: RefCell<[Option<HalCallback>; EVENTS]>,
    /// Reject the next registration
    pub fail_register: Cell<bool>,
    /// Reject every unregistration
    pub fail_unregister: Cell<bool>,
    pub unregistered: Cell<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected;

impl MockDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the HAL interrupt handler does when `event` completes
    pub fn raise(&self, event: usize) -> bool {
        let callback = self.table.borrow()[event];
        match callback {
            Some(cb) => {
                cb(ptr::null_mut());
                true
            }
            None => false,
        }
    }

    pub fn registered(&self, event: usize) -> Option<HalCallback> {
        self.table.borrow()[event]
    }
}

impl CallbackDispatch for MockDispatch {
    type EventId = usize;
    type Error = Rejected;

    fn register_callback(&self, event: usize, callback: HalCallback) -> Result<(), Rejected> {
        if self.fail_register.replace(false) {
            return Err(Rejected);
        }
        self.table.borrow_mut()[event] = Some(callback);
        Ok(())
    }

    fn unregister_callback(&self, event: usize) -> Result<(), Rejected> {
        self.unregistered.set(self.unregistered.get() + 1);
        if self.fail_unregister.get() {
            return Err(Rejected);
        }
        self.table.borrow_mut()[event] = None;
        Ok(())
    }
}
