//! Seam to the vendor HAL's callback registration facility

use crate::tag::HalCallback;

/// Something that stores completion callbacks per event and invokes them
/// from interrupt context
///
/// On STM32 this is the HAL's `HAL_xxx_RegisterCallback` /
/// `HAL_xxx_UnRegisterCallback` pair bound to one peripheral handle.
pub trait CallbackDispatch {
    /// Which completion event a callback is attached to
    type EventId: Copy;
    /// Registration failure reported by the facility
    type Error;

    /// Route `event` to `callback`, replacing any previous registration
    fn register_callback(
        &self,
        event: Self::EventId,
        callback: HalCallback,
    ) -> Result<(), Self::Error>;

    /// Stop routing `event`
    fn unregister_callback(&self, event: Self::EventId) -> Result<(), Self::Error>;
}
