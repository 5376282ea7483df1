//! Export macro generating the unmangled entry points.

/// Emits the C-linkage contract symbols for an extension library.
///
/// The factory (and optional lifecycle) type must implement `Default`. Use
/// once per cdylib crate:
///
/// ```rust,ignore
/// declare_plugin!(MyFactory);
/// declare_plugin!(MyFactory, lifecycle: MyLifecycle);
/// ```
///
/// The generated `DestroyKnowherePluginFactory` reclaims the factory on the
/// extension side, keeping allocation and deallocation in the same library.
#[macro_export]
macro_rules! declare_plugin {
    ($factory:ty) => {
        $crate::declare_plugin!(@required $factory);
    };
    ($factory:ty, lifecycle: $lifecycle:ty) => {
        $crate::declare_plugin!(@required $factory);

        #[no_mangle]
        pub extern "C" fn GetKnowherePluginLifecycle() -> *mut $crate::abi::LifecycleBox {
            let handler: $crate::abi::LifecycleBox =
                Box::new(<$lifecycle as Default>::default());
            // Owned by the library for its lifetime; the host never frees it.
            Box::into_raw(Box::new(handler))
        }
    };
    (@required $factory:ty) => {
        #[no_mangle]
        pub extern "C" fn GetKnowherePluginAPIVersion() -> u32 {
            $crate::abi::PLUGIN_API_VERSION
        }

        #[no_mangle]
        pub extern "C" fn CreateKnowherePluginFactory() -> *mut $crate::abi::FactoryBox {
            let factory: $crate::abi::FactoryBox = Box::new(<$factory as Default>::default());
            Box::into_raw(Box::new(factory))
        }

        /// # Safety
        /// `factory` must originate from `CreateKnowherePluginFactory` in
        /// this same library and must not be used afterwards.
        #[no_mangle]
        pub unsafe extern "C" fn DestroyKnowherePluginFactory(
            factory: *mut $crate::abi::FactoryBox,
        ) {
            if !factory.is_null() {
                drop(unsafe { Box::from_raw(factory) });
            }
        }
    };
}
