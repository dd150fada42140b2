//! SPI master with completion callbacks

use core::marker::PhantomData;

use stm32kit_core::{Callback, CallbackDispatch, CallbackManager, ManagerError, UniqueTag};

use crate::disarm_on_error;
use crate::message::{clamp_len, clamp_message, clamp_message_mut, Timeout};
use crate::mode::{AsyncMode, TransferKind, WorkingMode};

/// SPI completion events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiEvent {
    TxComplete,
    RxComplete,
    TxRxComplete,
}

/// Vendor SPI handle
///
/// Lengths passed here never exceed 65535 bytes, and `tx`/`rx` of a full
/// duplex transfer always have the same length.
pub trait SpiBackend: CallbackDispatch<EventId = SpiEvent> {
    /// Shift `data` out, returning once done or after `timeout`
    fn transmit_blocking(&self, data: &[u8], timeout: Timeout) -> Result<(), Self::Error>;

    /// Fill `buf`, returning once done or after `timeout`
    fn receive_blocking(&self, buf: &mut [u8], timeout: Timeout) -> Result<(), Self::Error>;

    /// Full duplex: shift `tx` out while filling `rx`
    fn transfer_blocking(
        &self,
        tx: &[u8],
        rx: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), Self::Error>;

    /// Start sending `data`; `TxComplete` fires when it is done
    fn start_transmit(&self, kind: TransferKind, data: &'static [u8]) -> Result<(), Self::Error>;

    /// Start filling `buf`; `RxComplete` fires when it is done
    fn start_receive(&self, kind: TransferKind, buf: &'static mut [u8]) -> Result<(), Self::Error>;

    /// Start a full duplex transfer; `TxRxComplete` fires when it is done
    fn start_transfer(
        &self,
        kind: TransferKind,
        tx: &'static [u8],
        rx: &'static mut [u8],
    ) -> Result<(), Self::Error>;
}

/// Length of a full duplex transfer: the shorter buffer, clamped
fn duplex_len(tx: &[u8], rx: &[u8]) -> usize {
    clamp_len(tx.len().min(rx.len())) as usize
}

/// SPI master with default working mode `M`
pub struct Spi<'d, M: WorkingMode, T: UniqueTag, B: SpiBackend> {
    backend: &'d B,
    tx_complete: CallbackManager<'d, T, B>,
    rx_complete: CallbackManager<'d, T, B>,
    txrx_complete: CallbackManager<'d, T, B>,
    _mode: PhantomData<M>,
}

impl<'d, M: WorkingMode, T: UniqueTag, B: SpiBackend> Spi<'d, M, T, B> {
    /// Bind to `backend`, claiming three slots of `T`'s registry
    pub fn new(backend: &'d B, tag: T) -> Result<Self, ManagerError<B::Error>> {
        Ok(Self {
            backend,
            tx_complete: CallbackManager::new(backend, SpiEvent::TxComplete, tag)?,
            rx_complete: CallbackManager::new(backend, SpiEvent::RxComplete, tag)?,
            txrx_complete: CallbackManager::new(backend, SpiEvent::TxRxComplete, tag)?,
            _mode: PhantomData,
        })
    }

    /// The wrapped vendor handle
    pub fn backend(&self) -> &'d B {
        self.backend
    }

    /// Send `data` with the default timeout
    pub fn transmit_blocking(&self, data: &[u8]) -> Result<(), B::Error> {
        self.transmit_blocking_timeout(data, Timeout::DEFAULT)
    }

    /// Send `data`, giving up after `timeout`
    pub fn transmit_blocking_timeout(&self, data: &[u8], timeout: Timeout) -> Result<(), B::Error> {
        self.backend.transmit_blocking(clamp_message(data), timeout)
    }

    /// Fill `buf` with the default timeout
    pub fn receive_blocking(&self, buf: &mut [u8]) -> Result<(), B::Error> {
        self.receive_blocking_timeout(buf, Timeout::DEFAULT)
    }

    /// Fill `buf`, giving up after `timeout`
    pub fn receive_blocking_timeout(
        &self,
        buf: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), B::Error> {
        self.backend.receive_blocking(clamp_message_mut(buf), timeout)
    }

    /// Full duplex transfer over the shorter of the two buffers
    pub fn transfer_blocking(&self, tx: &[u8], rx: &mut [u8]) -> Result<(), B::Error> {
        self.transfer_blocking_timeout(tx, rx, Timeout::DEFAULT)
    }

    /// Full duplex transfer, giving up after `timeout`
    pub fn transfer_blocking_timeout(
        &self,
        tx: &[u8],
        rx: &mut [u8],
        timeout: Timeout,
    ) -> Result<(), B::Error> {
        let len = duplex_len(tx, rx);
        self.backend.transfer_blocking(&tx[..len], &mut rx[..len], timeout)
    }

    /// Send `data` in mode `N`, running `on_complete` when it is done
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

    /// Fill `buf` in mode `N`, running `on_complete` when it is done
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

    /// Full duplex transfer in mode `N` over the shorter of the two buffers
    pub fn transfer_with<N, F>(
        &self,
        tx: &'static [u8],
        rx: &'static mut [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        N: AsyncMode,
        F: FnMut() + Send + 'static,
    {
        let len = duplex_len(tx, rx);
        let (rx, _) = rx.split_at_mut(len);
        self.txrx_complete.set(Callback::new(on_complete));
        disarm_on_error(
            &self.txrx_complete,
            self.backend.start_transfer(N::TRANSFER, &tx[..len], rx),
        )
    }
}

impl<'d, M: AsyncMode, T: UniqueTag, B: SpiBackend> Spi<'d, M, T, B> {
    /// [`transmit_with`](Self::transmit_with) in the default mode
    pub fn transmit<F>(&self, data: &'static [u8], on_complete: F) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.transmit_with::<M, F>(data, on_complete)
    }

    /// [`receive_with`](Self::receive_with) in the default mode
    pub fn receive<F>(&self, buf: &'static mut [u8], on_complete: F) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.receive_with::<M, F>(buf, on_complete)
    }

    /// [`transfer_with`](Self::transfer_with) in the default mode
    pub fn transfer<F>(
        &self,
        tx: &'static [u8],
        rx: &'static mut [u8],
        on_complete: F,
    ) -> Result<(), B::Error>
    where
        F: FnMut() + Send + 'static,
    {
        self.transfer_with::<M, F>(tx, rx, on_complete)
    }
}
