//! Working modes
//!
//! A peripheral wrapper is parameterised by its default working mode. Each
//! operation can still be run in another mode: the `*_blocking` methods are
//! always available and the `*_with::<M>` methods pick an asynchronous mode
//! per call.

mod sealed {
    pub trait Sealed {}
}

/// How an asynchronous transfer is started on the vendor HAL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferKind {
    /// `HAL_xxx_*_IT`
    Interrupt,
    /// `HAL_xxx_*_DMA`
    Dma,
}

/// Marker for a peripheral working mode
pub trait WorkingMode: sealed::Sealed {
    /// Async transfer flavour, `None` for blocking
    const KIND: Option<TransferKind>;
}

/// Working mode that completes through a callback
pub trait AsyncMode: WorkingMode {
    /// Transfer flavour used to start operations in this mode
    const TRANSFER: TransferKind;
}

/// Polled operations with a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Blocking;

/// Interrupt-driven operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interrupt;

/// DMA-driven operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dma;

impl sealed::Sealed for Blocking {}
impl sealed::Sealed for Interrupt {}
impl sealed::Sealed for Dma {}

impl WorkingMode for Blocking {
    const KIND: Option<TransferKind> = None;
}

impl WorkingMode for Interrupt {
    const KIND: Option<TransferKind> = Some(TransferKind::Interrupt);
}

impl WorkingMode for Dma {
    const KIND: Option<TransferKind> = Some(TransferKind::Dma);
}

impl AsyncMode for Interrupt {
    const TRANSFER: TransferKind = TransferKind::Interrupt;
}

impl AsyncMode for Dma {
    const TRANSFER: TransferKind = TransferKind::Dma;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_kinds() {
        assert_eq!(Blocking::KIND, None);
        assert_eq!(Interrupt::KIND, Some(Interrupt::TRANSFER));
        assert_eq!(Dma::KIND, Some(TransferKind::Dma));
    }
}
