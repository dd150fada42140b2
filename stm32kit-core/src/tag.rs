//! Unique instance tags and their interrupt trampolines
//!
//! Vendor HALs accept a completion callback as a bare C function pointer with
//! no user context. To route that call back to a Rust closure, every
//! peripheral instance gets its own marker type (declared with
//! [`unique_tag!`](crate::unique_tag)) which owns a static
//! [`CallbackRegistry`](crate::registry::CallbackRegistry). For each slot of
//! that registry a separate `extern "C"` trampoline is monomorphised, so the
//! function pointer alone identifies the slot to fire.
//!
//! ```text
//! HAL IRQ handler ──► trampoline::<Uart1Tag, 2> ──► Uart1Tag registry ──► slot 2 ──► closure
//! ```

use core::ffi::c_void;
use core::marker::PhantomData;
use core::mem;

use crate::registry::{SlotId, SlotRegistry, MAX_SLOTS};

/// Completion callback signature expected by the vendor HAL
///
/// The argument is the HAL's peripheral handle; trampolines ignore it.
pub type HalCallback = extern "C" fn(*mut c_void);

/// Slot count used by `unique_tag!` when none is given
pub const DEFAULT_TAG_SLOTS: usize = 4;

/// Zero-sized marker identifying one peripheral instance
///
/// Implement it with [`unique_tag!`](crate::unique_tag), which also provides
/// the backing static registry. A tag that carries data is rejected when a
/// trampoline or manager is built for it:
///
/// ```compile_fail
/// use stm32kit_core::{trampoline_for, CallbackRegistry, SlotRegistry, UniqueTag};
///
/// #[derive(Clone, Copy)]
/// struct Fat(u32);
///
/// impl UniqueTag for Fat {
///     type Registry = CallbackRegistry<1>;
///
///     fn registry() -> &'static Self::Registry {
///         static REGISTRY: CallbackRegistry<1> = CallbackRegistry::new();
///         &REGISTRY
///     }
/// }
///
/// let claim = Fat::registry().claim().unwrap();
/// let _ = trampoline_for::<Fat>(claim.id());
/// ```
pub trait UniqueTag: Copy + Send + Sync + 'static {
    /// Registry holding this tag's callback slots
    type Registry: SlotRegistry + 'static;

    /// The tag's static registry
    fn registry() -> &'static Self::Registry;
}

struct ZeroSized<T>(PhantomData<T>);

impl<T> ZeroSized<T> {
    const OK: () = assert!(
        mem::size_of::<T>() == 0,
        "unique tags must be zero-sized marker types"
    );
}

/// Compile-time check that `T` is a valid tag
pub(crate) const fn assert_valid_tag<T: UniqueTag>() {
    #[allow(clippy::let_unit_value)]
    let () = ZeroSized::<T>::OK;
}

extern "C" fn trampoline<T: UniqueTag, const SLOT: u8>(_handle: *mut c_void) {
    if !T::registry().fire(SlotId::new(SLOT)) {
        trace!("trampoline fired on empty slot {}", SLOT);
    }
}

struct Trampolines<T>(PhantomData<T>);

impl<T: UniqueTag> Trampolines<T> {
    const TABLE: [HalCallback; MAX_SLOTS] = [
        trampoline::<T, 0>,
        trampoline::<T, 1>,
        trampoline::<T, 2>,
        trampoline::<T, 3>,
        trampoline::<T, 4>,
        trampoline::<T, 5>,
        trampoline::<T, 6>,
        trampoline::<T, 7>,
    ];
}

/// The bare function pointer that fires `slot` of `T`'s registry
///
/// Safe to hand to a HAL at any time: firing an empty or released slot does
/// nothing.
pub fn trampoline_for<T: UniqueTag>(slot: SlotId) -> HalCallback {
    assert_valid_tag::<T>();
    Trampolines::<T>::TABLE[slot.index()]
}

/// Declare a unique tag type with its own callback registry
///
/// ```
/// stm32kit_core::unique_tag!(pub Uart1Tag);
/// stm32kit_core::unique_tag!(Spi2Tag, slots = 3);
///
/// use stm32kit_core::{SlotRegistry, UniqueTag};
/// assert_eq!(Uart1Tag::registry().capacity(), 4);
/// assert_eq!(Spi2Tag::registry().capacity(), 3);
/// ```
///
/// Each invocation creates a distinct type with distinct storage, so
/// callbacks registered through one tag can never reach another.
#[macro_export]
macro_rules! unique_tag {
    ($(#[$meta:meta])* $vis:vis $name:ident) => {
        $crate::unique_tag!($(#[$meta])* $vis $name, slots = $crate::tag::DEFAULT_TAG_SLOTS);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident, slots = $slots:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        $vis struct $name;

        impl $crate::tag::UniqueTag for $name {
            type Registry = $crate::registry::CallbackRegistry<{ $slots }>;

            fn registry() -> &'static Self::Registry {
                static REGISTRY: $crate::registry::CallbackRegistry<{ $slots }> =
                    $crate::registry::CallbackRegistry::new();
                &REGISTRY
            }
        }
    };
}
