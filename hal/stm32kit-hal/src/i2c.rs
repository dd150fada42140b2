//! I2C master with completion callbacks
//!
//! Plain master transfers and register ("memory") transfers, where the HAL
//! first writes an 8 or 16 bit register address and then reads or writes
//! the payload.

use core::marker::PhantomData;

use stm32kit_core::{Callback, CallbackDispatch, CallbackManager, ManagerError, UniqueTag};

use crate::disarm_on_error;
use crate::message::{clamp_message, clamp_message_mut, MaxAttempts, Timeout};
use crate::mode::{AsyncMode, TransferKind, WorkingMode};

/// 7-bit device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct I2cAddress(u8);

impl I2cAddress {
    /// `None` if `address` does not fit in 7 bits
    pub const fn new(address: u8) -> Option<Self> {
        if address <= 0x7F {
            Some(Self(address))
        } else {
            None
        }
    }

    /// The unshifted 7-bit address
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Address in the form the vendor HAL expects (shifted left by one)
    pub const fn hal_address(self) -> u16 {
        (self.0 as u16) << 1
    }
}

/// Width of a register address
///
/// Discriminants match the HAL's `I2C_MEMADD_SIZE_*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum MemoryAddressSize {
    Bits8 = 1,
    Bits16 = 2,
}

/// Register address inside a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemoryAddress {
    Bits8(u8),
    Bits16(u16),
}

impl MemoryAddress {
    /// `None` if `address` does not fit in `size`
    pub const fn new(address: u16, size: MemoryAddressSize) -> Option<Self> {
        match size {
            MemoryAddressSize::Bits8 if address <= 0xFF => Some(Self::Bits8(address as u8)),
            MemoryAddressSize::Bits8 => None,
            MemoryAddressSize::Bits16 => Some(Self::Bits16(address)),
        }
    }

    /// Register address widened to 16 bits
    pub const fn address(self) -> u16 {
        match self {
            Self::Bits8(address) => address as u16,
            Self::Bits16(address) => address,
        }
    }

    /// Width the HAL sends the register address with
    pub const fn size(self) -> MemoryAddressSize {
        match self {
            Self::Bits8(_) => MemoryAddressSize::Bits8,
            Self::Bits16(_) => MemoryAddressSize::Bits16,
        }
    }
}

/// I2C completion events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cEvent {
    MasterTxComplete,
    MasterRxComplete,
    MemTxComplete,
    MemRxComplete,
}

/// Vendor I2C handle
///
/// `address` is always the shifted form from [`I2cAddress::hal_address`].
/// Lengths never exceed 65535 bytes.
pub trait I2cBackend: CallbackDispatch<EventId = I2cEvent> {
    /// Write `data` to the device, waiting up to `timeout`
    fn master_transmit_blocking(
        &self,
        address: u16,
        data: &[u8],
        timeout: Timeout,
    ) -> Result<(), Self::Error>;

    /// Read `buf` from the device, waiting up to `timeout`
    fn master_receive_blocking(
        &self,
        address: u16,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), Self::Error>;

    /// Write `data` to register `memory`, waiting up to `timeout`
    fn mem_write_blocking(
        &self,
        address: u16,
        memory: MemoryAddress,
        data: &[u8],
        timeout: Timeout,
    ) -> Result<(), Self::Error>;

    /// Read register `memory` into `buf`, waiting up to `timeout`
    fn mem_read_blocking(
        &self,
        address: u16,
        memory: MemoryAddress,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), Self::Error>;

    /// Start writing `data`; completion raises [`I2cEvent::MasterTxComplete`]
    fn start_master_transmit(
        &self,
        kind: TransferKind,
        address: u16,
        data: &'static [u8],
    ) -> Result<(), Self::Error>;

    /// Start filling `buf`; completion raises [`I2cEvent::MasterRxComplete`]
    fn start_master_receive(
        &self,
        kind: TransferKind,
        address: u16,
        buf: &'static mut [u8],
    ) -> Result<(), Self::Error>;

    /// Start a register write; completion raises [`I2cEvent::MemTxComplete`]
    fn start_mem_write(
        &self,
        kind: TransferKind,
        address: u16,
        memory: MemoryAddress,
        data: &'static [u8],
    ) -> Result<(), Self::Error>;

    /// Start a register read; completion raises [`I2cEvent::MemRxComplete`]
    fn start_mem_read(
        &self,
        kind: TransferKind,
        address: u16,
        memory: MemoryAddress,
        buf: &'static mut [u8],
    ) -> Result<(), Self::Error>;

    /// Check up to `attempts` times whether the device acknowledges
    fn is_device_ready(
        &self,
        address: u16,
        attempts: MaxAttempts,
        timeout: Timeout,
    ) -> Result<(), Self::Error>;
}

/// I2C master with default working mode `M`
///
/// Claims four slots of `T`'s registry, one per completion event.
pub struct I2c<'d, M: WorkingMode, T: UniqueTag, B: I2cBackend> {
    backend: &'d B,
    master_tx_complete: CallbackManager<'d, T, B>,
    master_rx_complete: CallbackManager<'d, T, B>,
    mem_tx_complete: CallbackManager<'d, T, B>,
    mem_rx_complete: CallbackManager<'d, T, B>,
    _mode: PhantomData<M>,
}

impl<'d, M: WorkingMode, T: UniqueTag, B: I2cBackend> I2c<'d, M, T, B> {
    /// Bind to `backend` and register all four completion trampolines
    pub fn new(backend: &'d B, tag: T) -> Result<Self, ManagerError<B::Error>> {
        Ok(Self {
            backend,
            master_tx_complete: CallbackManager::new(backend, I2cEvent::MasterTxComplete, tag)?,
            master_rx_complete: CallbackManager::new(backend, I2cEvent::MasterRxComplete, tag)?,
            mem_tx_complete: CallbackManager::new(backend, I2cEvent::MemTxComplete, tag)?,
            mem_rx_complete: CallbackManager::new(backend, I2cEvent::MemRxComplete, tag)?,
            _mode: PhantomData,
        })
    }

    /// The underlying HAL handle
    pub fn backend(&self) -> &'d B {
        self.backend
    }

    /// Write `data` to `address` with the default timeout
    pub fn transmit_blocking(&self, address: I2cAddress, data: &[u8]) -> Result<(), B::Error> {
        self.transmit_blocking_timeout(address, data, Timeout::DEFAULT)
    }

    /// Write `data` to `address`, giving up after `timeout`
    pub fn transmit_blocking_timeout(
        &self,
        address: I2cAddress,
        data: &[u8],
        timeout: Timeout,
    ) -> Result<(), B::Error> {
        self.backend
            .master_transmit_blocking(address.hal_address(), clamp_message(data), timeout)
    }

    /// Read `buf` from `address` with the default timeout
    pub fn receive_blocking(&self, address: I2cAddress, buf: &mut [u8]) -> Result<(), B::Error> {
        self.receive_blocking_timeout(address, buf, Timeout::DEFAULT)
    }

    /// Read `buf` from `address`, giving up after `timeout`
    pub fn receive_blocking_timeout(
        &self,
        address: I2cAddress,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), B::Error> {
        self.backend
            .master_receive_blocking(address.hal_address(), clamp_message_mut(buf), timeout)
    }

    /// Write `data` to register `memory` of `address`
    pub fn memory_write_blocking(
        &self,
        address: I2cAddress,
        memory: MemoryAddress,
        data: &[u8],
        timeout: Timeout,
    ) -> Result<(), B::Error> {
        self.backend
            .mem_write_blocking(address.hal_address(), memory, clamp_message(data), timeout)
    }

    /// Read register `memory` of `address` into `buf`
    pub fn memory_read_blocking(
        &self,
        address: I2cAddress,
        memory: MemoryAddress,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), B::Error> {
        self.backend.mem_read_blocking(
            address.hal_address(),
            memory,
            clamp_message_mut(buf),
            timeout,
        )
    }

    /// Write `data` in mode `N`, running `on_complete` when done
    pub fn transmit_with<N, F>(
        &self,
        address: I2cAddress,
        data: &'static [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        N: AsyncMode,
        F: FnMut() + Send + 'static,
    {
        self.master_tx_complete.set(Callback::new(on_complete));
        disarm_on_error(
            &self.master_tx_complete,
            self.backend.start_master_transmit(
                N::TRANSFER,
                address.hal_address(),
                clamp_message(data),
            ),
        )
    }

    /// Read into `buf` in mode `N`, running `on_complete` once it is full
    pub fn receive_with<N, F>(
        &self,
        address: I2cAddress,
        buf: &'static mut [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        N: AsyncMode,
        F: FnMut() + Send + 'static,
    {
        self.master_rx_complete.set(Callback::new(on_complete));
        disarm_on_error(
            &self.master_rx_complete,
            self.backend.start_master_receive(
                N::TRANSFER,
                address.hal_address(),
                clamp_message_mut(buf),
            ),
        )
    }

    /// Register write in mode `N`, running `on_complete` when done
    pub fn memory_write_with<N, F>(
        &self,
        address: I2cAddress,
        memory: MemoryAddress,
        data: &'static [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        N: AsyncMode,
        F: FnMut() + Send + 'static,
    {
        self.mem_tx_complete.set(Callback::new(on_complete));
        disarm_on_error(
            &self.mem_tx_complete,
            self.backend.start_mem_write(
                N::TRANSFER,
                address.hal_address(),
                memory,
                clamp_message(data),
            ),
        )
    }

    /// Register read in mode `N`, running `on_complete` once `buf` is full
    pub fn memory_read_with<N, F>(
        &self,
        address: I2cAddress,
        memory: MemoryAddress,
        buf: &'static mut [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        N: AsyncMode,
        F: FnMut() + Send + 'static,
    {
        self.mem_rx_complete.set(Callback::new(on_complete));
        disarm_on_error(
            &self.mem_rx_complete,
            self.backend.start_mem_read(
                N::TRANSFER,
                address.hal_address(),
                memory,
                clamp_message_mut(buf),
            ),
        )
    }

    /// Whether `address` acknowledges, with the default attempts and timeout
    pub fn is_device_ready(&self, address: I2cAddress) -> bool {
        self.is_device_ready_with(address, MaxAttempts::DEFAULT, Timeout::DEFAULT)
    }

    /// Whether `address` acknowledges within `attempts` tries
    pub fn is_device_ready_with(
        &self,
        address: I2cAddress,
        attempts: MaxAttempts,
        timeout: Timeout,
    ) -> bool {
        self.backend
            .is_device_ready(address.hal_address(), attempts, timeout)
            .is_ok()
    }
}

impl<'d, M: AsyncMode, T: UniqueTag, B: I2cBackend> I2c<'d, M, T, B> {
    /// [`transmit_with`](Self::transmit_with) in the default mode
    pub fn transmit<F>(
        &self,
        address: I2cAddress,
        data: &'static [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.transmit_with::<M, F>(address, data, on_complete)
    }

    /// [`receive_with`](Self::receive_with) in the default mode
    pub fn receive<F>(
        &self,
        address: I2cAddress,
        buf: &'static mut [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.receive_with::<M, F>(address, buf, on_complete)
    }

    /// [`memory_write_with`](Self::memory_write_with) in the default mode
    pub fn memory_write<F>(
        &self,
        address: I2cAddress,
        memory: MemoryAddress,
        data: &'static [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.memory_write_with::<M, F>(address, memory, data, on_complete)
    }

    /// [`memory_read_with`](Self::memory_read_with) in the default mode
    pub fn memory_read<F>(
        &self,
        address: I2cAddress,
        memory: MemoryAddress,
        buf: &'static mut [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.memory_read_with::<M, F>(address, memory, buf, on_complete)
    }
}
