//! Streaming CRC state
//!
//! Wraps the `init` / `update` / `finalize` triple so fragmented data
//! (UART chunks, DMA half-transfers) can be checksummed as it arrives.

use core::marker::PhantomData;

use crate::engine::Crc16Algorithm;

/// Running CRC over data received in pieces
#[derive(Debug, Clone, Copy)]
pub struct Digest<A: Crc16Algorithm> {
    crc: u16,
    _algorithm: PhantomData<A>,
}

impl<A: Crc16Algorithm> Default for Digest<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Crc16Algorithm> Digest<A> {
    /// Start a new calculation
    pub fn new() -> Self {
        Self {
            crc: A::init(),
            _algorithm: PhantomData,
        }
    }

    /// Feed more bytes
    pub fn update(&mut self, data: &[u8]) {
        self.crc = A::update(self.crc, data);
    }

    /// Checksum of everything fed so far
    ///
    /// Does not consume the digest; more data may be fed afterwards.
    pub fn finalize(&self) -> u16 {
        A::finalize(self.crc)
    }

    /// Restart from the initial value
    pub fn reset(&mut self) {
        self.crc = A::init();
    }

    /// Current (unfinalized) register value
    pub fn register(&self) -> u16 {
        self.crc
    }
}
