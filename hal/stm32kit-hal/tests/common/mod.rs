//! Recording vendor-HAL stand-in shared by the peripheral tests

#![allow(dead_code)]

use core::marker::PhantomData;
use core::ptr;
use std::cell::{Cell, RefCell};

use stm32kit_core::{CallbackDispatch, HalCallback};
use stm32kit_hal::{
    I2cBackend, I2cEvent, MaxAttempts, MemoryAddress, SpiBackend, SpiEvent, Timeout,
    TransferKind, UartBackend, UartEvent,
};

/// Byte written into every buffer a mock receive fills
pub const FILL: u8 = 0xA5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalError;

/// One call into the mock HAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub name: &'static str,
    pub kind: Option<TransferKind>,
    pub address: Option<u16>,
    pub memory: Option<MemoryAddress>,
    pub len: usize,
    pub timeout: Option<u32>,
}

impl Op {
    fn new(name: &'static str, len: usize) -> Self {
        Self {
            name,
            kind: None,
            address: None,
            memory: None,
            len,
            timeout: None,
        }
    }
}

pub trait EventIndex: Copy {
    fn index(self) -> usize;
}

impl EventIndex for UartEvent {
    fn index(self) -> usize {
        self as usize
    }
}

impl EventIndex for SpiEvent {
    fn index(self) -> usize {
        self as usize
    }
}

impl EventIndex for I2cEvent {
    fn index(self) -> usize {
        self as usize
    }
}

pub struct MockHal<E> {
    callbacks: RefCell<[Option<HalCallback>; 4]>,
    pub ops: RefCell<Vec<Op>>,
    /// Make every operation fail
    pub fail: Cell<bool>,
    /// Devices that acknowledge readiness checks
    pub ready: Cell<Option<u16>>,
    _event: PhantomData<E>,
}

impl<E: EventIndex> MockHal<E> {
    pub fn new() -> Self {
        Self {
            callbacks: RefCell::new([None; 4]),
            ops: RefCell::new(Vec::new()),
            fail: Cell::new(false),
            ready: Cell::new(None),
            _event: PhantomData,
        }
    }

    /// Simulate the completion interrupt for `event`
    pub fn complete(&self, event: E) {
        let callback = self.callbacks.borrow()[event.index()];
        if let Some(callback) = callback {
            callback(ptr::null_mut());
        }
    }

    pub fn is_registered(&self, event: E) -> bool {
        self.callbacks.borrow()[event.index()].is_some()
    }

    pub fn last_op(&self) -> Option<Op> {
        self.ops.borrow().last().cloned()
    }

    fn record(&self, op: Op) -> Result<(), HalError> {
        self.ops.borrow_mut().push(op);
        if self.fail.get() {
            Err(HalError)
        } else {
            Ok(())
        }
    }
}

impl<E: EventIndex> CallbackDispatch for MockHal<E> {
    type EventId = E;
    type Error = HalError;

    fn register_callback(&self, event: E, callback: HalCallback) -> Result<(), HalError> {
        self.callbacks.borrow_mut()[event.index()] = Some(callback);
        Ok(())
    }

    fn unregister_callback(&self, event: E) -> Result<(), HalError> {
        self.callbacks.borrow_mut()[event.index()] = None;
        Ok(())
    }
}

fn blocking(name: &'static str, len: usize, timeout: Timeout) -> Op {
    Op {
        timeout: Some(timeout.as_millis()),
        ..Op::new(name, len)
    }
}

fn started(name: &'static str, kind: TransferKind, len: usize) -> Op {
    Op {
        kind: Some(kind),
        ..Op::new(name, len)
    }
}

impl UartBackend for MockHal<UartEvent> {
    fn transmit_blocking(&self, data: &[u8], timeout: Timeout) -> Result<(), HalError> {
        self.record(blocking("transmit", data.len(), timeout))
    }

    fn receive_blocking(&self, buf: &mut [u8], timeout: Timeout) -> Result<(), HalError> {
        buf.fill(FILL);
        self.record(blocking("receive", buf.len(), timeout))
    }

    fn start_transmit(&self, kind: TransferKind, data: &'static [u8]) -> Result<(), HalError> {
        self.record(started("transmit", kind, data.len()))
    }

    fn start_receive(&self, kind: TransferKind, buf: &'static mut [u8]) -> Result<(), HalError> {
        buf.fill(FILL);
        self.record(started("receive", kind, buf.len()))
    }
}

impl SpiBackend for MockHal<SpiEvent> {
    fn transmit_blocking(&self, data: &[u8], timeout: Timeout) -> Result<(), HalError> {
        self.record(blocking("transmit", data.len(), timeout))
    }

    fn receive_blocking(&self, buf: &mut [u8], timeout: Timeout) -> Result<(), HalError> {
        buf.fill(FILL);
        self.record(blocking("receive", buf.len(), timeout))
    }

    fn transfer_blocking(
        &self,
        tx: &[u8],
        rx: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), HalError> {
        assert_eq!(tx.len(), rx.len());
        rx.copy_from_slice(tx);
        self.record(blocking("transfer", tx.len(), timeout))
    }

    fn start_transmit(&self, kind: TransferKind, data: &'static [u8]) -> Result<(), HalError> {
        self.record(started("transmit", kind, data.len()))
    }

    fn start_receive(&self, kind: TransferKind, buf: &'static mut [u8]) -> Result<(), HalError> {
        buf.fill(FILL);
        self.record(started("receive", kind, buf.len()))
    }

    fn start_transfer(
        &self,
        kind: TransferKind,
        tx: &'static [u8],
        rx: &'static mut [u8],
    ) -> Result<(), HalError> {
        assert_eq!(tx.len(), rx.len());
        rx.copy_from_slice(tx);
        self.record(started("transfer", kind, tx.len()))
    }
}

impl I2cBackend for MockHal<I2cEvent> {
    fn master_transmit_blocking(
        &self,
        address: u16,
        data: &[u8],
        timeout: Timeout,
    ) -> Result<(), HalError> {
        self.record(Op {
            address: Some(address),
            ..blocking("master_transmit", data.len(), timeout)
        })
    }

    fn master_receive_blocking(
        &self,
        address: u16,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), HalError> {
        buf.fill(FILL);
        self.record(Op {
            address: Some(address),
            ..blocking("master_receive", buf.len(), timeout)
        })
    }

    fn mem_write_blocking(
        &self,
        address: u16,
        memory: MemoryAddress,
        data: &[u8],
        timeout: Timeout,
    ) -> Result<(), HalError> {
        self.record(Op {
            address: Some(address),
            memory: Some(memory),
            ..blocking("mem_write", data.len(), timeout)
        })
    }

    fn mem_read_blocking(
        &self,
        address: u16,
        memory: MemoryAddress,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), HalError> {
        buf.fill(FILL);
        self.record(Op {
            address: Some(address),
            memory: Some(memory),
            ..blocking("mem_read", buf.len(), timeout)
        })
    }

    fn start_master_transmit(
        &self,
        kind: TransferKind,
        address: u16,
        data: &'static [u8],
    ) -> Result<(), HalError> {
        self.record(Op {
            address: Some(address),
            ..started("master_transmit", kind, data.len())
        })
    }

    fn start_master_receive(
        &self,
        kind: TransferKind,
        address: u16,
        buf: &'static mut [u8],
    ) -> Result<(), HalError> {
        buf.fill(FILL);
        self.record(Op {
            address: Some(address),
            ..started("master_receive", kind, buf.len())
        })
    }

    fn start_mem_write(
        &self,
        kind: TransferKind,
        address: u16,
        memory: MemoryAddress,
        data: &'static [u8],
    ) -> Result<(), HalError> {
        self.record(Op {
            address: Some(address),
            memory: Some(memory),
            ..started("mem_write", kind, data.len())
        })
    }

    fn start_mem_read(
        &self,
        kind: TransferKind,
        address: u16,
        memory: MemoryAddress,
        buf: &'static mut [u8],
    ) -> Result<(), HalError> {
        buf.fill(FILL);
        self.record(Op {
            address: Some(address),
            memory: Some(memory),
            ..started("mem_read", kind, buf.len())
        })
    }

    fn is_device_ready(
        &self,
        address: u16,
        attempts: MaxAttempts,
        timeout: Timeout,
    ) -> Result<(), HalError> {
        self.record(Op {
            address: Some(address),
            len: attempts.get() as usize,
            ..blocking("is_device_ready", 0, timeout)
        })?;
        if self.ready.get() == Some(address) {
            Ok(())
        } else {
            Err(HalError)
        }
    }
}

/// A `'static` buffer for async transfers
pub fn leak(len: usize) -> &'static mut [u8] {
    Box::leak(vec![0u8; len].into_boxed_slice())
}
