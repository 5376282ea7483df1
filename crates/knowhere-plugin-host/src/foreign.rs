//! Handles for objects allocated on the extension side of the boundary.
//!
//! Release always goes through the extension's own destroy entry point; the
//! host never deallocates a foreign object itself, so allocators are never
//! mixed across the library boundary.

use knowhere_plugin_sdk::abi::{DestroyFactoryFn, FactoryBox, LifecycleBox};
use knowhere_plugin_sdk::{PluginFactory, PluginLifecycle};

/// Exclusively owned factory constructed inside an extension library.
///
/// Must be dropped while the originating library is still mapped; the loader
/// guarantees this through field order in its per-extension record.
pub(crate) struct ForeignFactory {
    ptr: *mut FactoryBox,
    destroy: DestroyFactoryFn,
}

impl ForeignFactory {
    /// # Safety
    ///
    /// `ptr` must be the non-null result of the library's create entry point
    /// and `destroy` the matching destroy entry point from the same library.
    pub(crate) unsafe fn from_raw(ptr: *mut FactoryBox, destroy: DestroyFactoryFn) -> Self {
        debug_assert!(!ptr.is_null());
        Self { ptr, destroy }
    }

    pub(crate) fn get(&self) -> &(dyn PluginFactory + 'static) {
        // Invariant: ptr is non-null and valid until drop. The boxed factory
        // is `dyn PluginFactory + 'static`, so the borrow carries that bound.
        unsafe { &**self.ptr }
    }
}

impl Drop for ForeignFactory {
    fn drop(&mut self) {
        unsafe { (self.destroy)(self.ptr) };
    }
}

// The contract bounds factories by Send + Sync; only the raw pointer
// suppresses the auto impls here.
unsafe impl Send for ForeignFactory {}
unsafe impl Sync for ForeignFactory {}

/// Lifecycle handler owned by the extension for the library's lifetime.
///
/// The fixed symbol set carries no destroy entry point for it, so the host
/// only borrows through the pointer and never frees it.
pub(crate) struct ForeignLifecycle {
    ptr: *mut LifecycleBox,
}

impl ForeignLifecycle {
    /// # Safety
    ///
    /// `ptr` must be the non-null result of the library's lifecycle entry
    /// point and stay valid until the library is closed.
    pub(crate) unsafe fn from_raw(ptr: *mut LifecycleBox) -> Self {
        debug_assert!(!ptr.is_null());
        Self { ptr }
    }

    pub(crate) fn get(&self) -> &dyn PluginLifecycle {
        unsafe { &**self.ptr }
    }
}

unsafe impl Send for ForeignLifecycle {}
unsafe impl Sync for ForeignLifecycle {}
