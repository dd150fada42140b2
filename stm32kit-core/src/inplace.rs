//! Fixed-capacity, allocation-free nullary callable
//!
//! [`InplaceFn`] type-erases a closure into an inline byte buffer plus a
//! static vtable, so it can be stored in `static` memory and invoked from an
//! interrupt handler without a heap.
//!
//! ```text
//! ┌──────────────────────────────┬─────────────────┐
//! │ storage: [u8; CAP] (align A) │ vtable: Option  │──► { invoke, drop }
//! └──────────────────────────────┴─────────────────┘
//! ```
//!
//! Capacity and alignment are checked when a closure is stored; a closure
//! that does not fit is a build error, never a runtime fault:
//!
//! ```compile_fail
//! use stm32kit_core::InplaceFn;
//!
//! let big = [0u8; 65];
//! let _f = InplaceFn::<64>::new(move || drop(big));
//! ```
//!
//! The same holds for a closure that needs more alignment than the buffer
//! provides:
//!
//! ```compile_fail
//! use stm32kit_core::{Align4, InplaceFn};
//!
//! let wide = 0u128;
//! let _f = InplaceFn::<64, Align4>::new(move || drop(wide));
//! ```
//!
//! Typical capture sizes on a 32-bit target: no captures 0 bytes, one
//! reference 4 bytes, a `&'static AtomicU32` plus a `u32` 8 bytes. The
//! default 64 bytes covers most completion callbacks.

use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, MaybeUninit};
use core::ptr;

/// Default inline buffer size in bytes
pub const DEFAULT_CAPACITY: usize = 64;

mod sealed {
    pub trait Sealed {}
}

/// Alignment of the inline buffer, selected with a marker type
pub trait Alignment: sealed::Sealed + Copy + Send + Sync + 'static {}

macro_rules! alignments {
    ($($(#[$meta:meta])* $name:ident = $align:literal;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        #[repr(align($align))]
        pub struct $name;

        impl sealed::Sealed for $name {}
        impl Alignment for $name {}
    )+};
}

alignments! {
    /// Byte alignment
    Align1 = 1;
    /// Half-word alignment
    Align2 = 2;
    /// Word alignment
    Align4 = 4;
    /// Double-word alignment, the largest native alignment on Cortex-M
    Align8 = 8;
    /// Quad-word alignment (`u128`, SIMD types on hosts)
    Align16 = 16;
}

/// Alignment used when none is given
pub type DefaultAlign = Align8;

#[repr(C)]
struct Storage<const CAP: usize, A: Alignment> {
    _align: [A; 0],
    bytes: [MaybeUninit<u8>; CAP],
}

impl<const CAP: usize, A: Alignment> Storage<CAP, A> {
    const fn uninit() -> Self {
        Self {
            _align: [],
            bytes: [MaybeUninit::uninit(); CAP],
        }
    }

    fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr().cast()
    }
}

struct VTable {
    invoke: unsafe fn(*mut u8),
    drop: unsafe fn(*mut u8),
}

struct Erased<F, R>(PhantomData<fn() -> (F, R)>);

impl<F, R> Erased<F, R>
where
    F: FnMut() -> R,
{
    const VTABLE: &'static VTable = &VTable {
        invoke: Self::invoke,
        drop: Self::drop_in_place,
    };

    /// # Safety
    /// `storage` must point to a live, properly aligned `F`.
    unsafe fn invoke(storage: *mut u8) {
        // SAFETY: guaranteed by the caller
        let f = unsafe { &mut *storage.cast::<F>() };
        let _ = f();
    }

    /// # Safety
    /// `storage` must point to a live, properly aligned `F` that is not used
    /// afterwards.
    unsafe fn drop_in_place(storage: *mut u8) {
        // SAFETY: guaranteed by the caller
        unsafe { ptr::drop_in_place(storage.cast::<F>()) }
    }
}

struct Fits<F, const CAP: usize, A>(PhantomData<(F, A)>);

impl<F, const CAP: usize, A: Alignment> Fits<F, CAP, A> {
    const OK: () = {
        assert!(
            mem::size_of::<F>() <= CAP,
            "callable captures too large for the inline buffer: reduce captures or raise the capacity"
        );
        assert!(
            mem::align_of::<F>() <= mem::align_of::<A>(),
            "callable alignment exceeds the inline buffer alignment"
        );
    };
}

/// Type-erased `FnMut()` stored inline, without allocation
///
/// - `CAP`: buffer size in bytes (default 64)
/// - `A`: buffer alignment marker (default [`Align8`])
///
/// Move-only. Calling an empty `InplaceFn` does nothing. Any return value of
/// the stored closure is discarded.
pub struct InplaceFn<const CAP: usize = DEFAULT_CAPACITY, A: Alignment = DefaultAlign> {
    storage: Storage<CAP, A>,
    vtable: Option<&'static VTable>,
}

impl<const CAP: usize, A: Alignment> InplaceFn<CAP, A> {
    /// Buffer size in bytes
    pub const CAPACITY: usize = CAP;

    /// An `InplaceFn` holding nothing
    pub const fn empty() -> Self {
        Self {
            storage: Storage::uninit(),
            vtable: None,
        }
    }

    /// Store `f`
    ///
    /// Fails to build if `F` is larger than `CAP` or more aligned than `A`.
    pub fn new<F, R>(f: F) -> Self
    where
        F: FnMut() -> R + Send + 'static,
    {
        #[allow(clippy::let_unit_value)]
        let () = Fits::<F, CAP, A>::OK;

        let mut this = Self::empty();
        // SAFETY: the buffer is uninitialised, at least `size_of::<F>()`
        // bytes long and aligned for `F` (checked above).
        unsafe { this.storage.as_mut_ptr().cast::<F>().write(f) };
        this.vtable = Some(Erased::<F, R>::VTABLE);
        this
    }

    /// Replace the held callable with `f`, dropping the old one first
    pub fn set<F, R>(&mut self, f: F)
    where
        F: FnMut() -> R + Send + 'static,
    {
        self.reset();
        *self = Self::new(f);
    }

    /// Invoke the held callable, if any
    pub fn call(&mut self) {
        if let Some(vtable) = self.vtable {
            // SAFETY: a vtable is only recorded after an `F` matching it was
            // written to the buffer, and it is cleared before that `F` dies.
            unsafe { (vtable.invoke)(self.storage.as_mut_ptr()) }
        }
    }

    /// Whether a callable is held
    pub fn is_set(&self) -> bool {
        self.vtable.is_some()
    }

    /// Drop the held callable, leaving this empty
    pub fn reset(&mut self) {
        // Clear the vtable before running the destructor so a panicking
        // destructor cannot lead to a second drop.
        if let Some(vtable) = self.vtable.take() {
            // SAFETY: the buffer holds the live `F` this vtable belongs to,
            // and it is never touched again after this call.
            unsafe { (vtable.drop)(self.storage.as_mut_ptr()) }
        }
    }

    /// Move the held callable out, leaving this empty
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::empty())
    }
}

impl<const CAP: usize, A: Alignment> Default for InplaceFn<CAP, A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const CAP: usize, A: Alignment> Drop for InplaceFn<CAP, A> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<const CAP: usize, A: Alignment> fmt::Debug for InplaceFn<CAP, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InplaceFn")
            .field("capacity", &CAP)
            .field("set", &self.is_set())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const CAP: usize, A: Alignment> defmt::Format for InplaceFn<CAP, A> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "InplaceFn(capacity={}, set={})", CAP, self.is_set())
    }
}
