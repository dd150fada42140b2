//! UART with completion callbacks
//!
//! Wraps a vendor UART handle ([`UartBackend`]). Blocking transfers poll with
//! a timeout; interrupt and DMA transfers run a closure when the HAL reports
//! completion.

use core::marker::PhantomData;

use stm32kit_core::{Callback, CallbackDispatch, CallbackManager, ManagerError, UniqueTag};

use crate::disarm_on_error;
use crate::message::{clamp_message, clamp_message_mut, Timeout};
use crate::mode::{AsyncMode, TransferKind, WorkingMode};

/// UART completion events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartEvent {
    TxComplete,
    RxComplete,
}

/// Vendor UART handle
///
/// Lengths passed here never exceed 65535 bytes.
pub trait UartBackend: CallbackDispatch<EventId = UartEvent> {
    /// Write `data`, waiting up to `timeout`
    fn transmit_blocking(&self, data: &[u8], timeout: Timeout) -> Result<(), Self::Error>;

    /// Fill `buf`, waiting up to `timeout`
    fn receive_blocking(&self, buf: &mut [u8], timeout: Timeout) -> Result<(), Self::Error>;

    /// Start writing `data`; completion raises [`UartEvent::TxComplete`]
    fn start_transmit(&self, kind: TransferKind, data: &'static [u8]) -> Result<(), Self::Error>;

    /// Start filling `buf`; completion raises [`UartEvent::RxComplete`]
    fn start_receive(&self, kind: TransferKind, buf: &'static mut [u8]) -> Result<(), Self::Error>;
}

/// UART peripheral with default working mode `M`
///
/// `T` identifies the instance; both completion events use slots of its
/// registry, which are released when the wrapper is dropped.
pub struct Uart<'d, M: WorkingMode, T: UniqueTag, B: UartBackend> {
    backend: &'d B,
    tx_complete: CallbackManager<'d, T, B>,
    rx_complete: CallbackManager<'d, T, B>,
    _mode: PhantomData<M>,
}

impl<'d, M: WorkingMode, T: UniqueTag, B: UartBackend> Uart<'d, M, T, B> {
    /// Bind to `backend` and register both completion trampolines
    pub fn new(backend: &'d B, tag: T) -> Result<Self, ManagerError<B::Error>> {
        let tx_complete = CallbackManager::new(backend, UartEvent::TxComplete, tag)?;
        let rx_complete = CallbackManager::new(backend, UartEvent::RxComplete, tag)?;
        Ok(Self {
            backend,
            tx_complete,
            rx_complete,
            _mode: PhantomData,
        })
    }

    /// The underlying HAL handle
    pub fn backend(&self) -> &'d B {
        self.backend
    }

    /// Blocking transmit with the default timeout
    pub fn transmit_blocking(&self, data: &[u8]) -> Result<(), B::Error> {
        self.transmit_blocking_timeout(data, Timeout::DEFAULT)
    }

    /// Blocking transmit, giving up after `timeout`
    pub fn transmit_blocking_timeout(&self, data: &[u8], timeout: Timeout) -> Result<(), B::Error> {
        self.backend.transmit_blocking(clamp_message(data), timeout)
    }

    /// Blocking receive with the default timeout
    pub fn receive_blocking(&self, buf: &mut [u8]) -> Result<(), B::Error> {
        self.receive_blocking_timeout(buf, Timeout::DEFAULT)
    }

    /// Blocking receive, giving up after `timeout`
    pub fn receive_blocking_timeout(
        &self,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), B::Error> {
        self.backend.receive_blocking(clamp_message_mut(buf), timeout)
    }

    /// Transmit in mode `N`, running `on_complete` when done
    pub fn transmit_with<N, F>(&self, data: &'static [u8], on_complete: F) -> Result<(), B::Error>
    where
        N: AsyncMode,
        F: FnMut() + Send + 'static,
    {
        self.tx_complete.set(Callback::new(on_complete));
        disarm_on_error(
            &self.tx_complete,
            self.backend.start_transmit(N::TRANSFER, clamp_message(data)),
        )
    }

    /// Receive in mode `N`, running `on_complete` once `buf` is full
    pub fn receive_with<N, F>(&self, buf: &'static mut [u8], on_complete: F) -> Result<(), B::Error>
    where
        N: AsyncMode,
        F: FnMut() + Send + 'static,
    {
        self.rx_complete.set(Callback::new(on_complete));
        disarm_on_error(
            &self.rx_complete,
            self.backend.start_receive(N::TRANSFER, clamp_message_mut(buf)),
        )
    }
}

impl<'d, M: AsyncMode, T: UniqueTag, B: UartBackend> Uart<'d, M, T, B> {
    /// Transmit in the default mode
    pub fn transmit<F>(&self, data: &'static [u8], on_complete: F) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.transmit_with::<M, F>(data, on_complete)
    }

    /// Receive in the default mode
    pub fn receive<F>(&self, buf: &'static mut [u8], on_complete: F) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.receive_with::<M, F>(buf, on_complete)
    }
}
