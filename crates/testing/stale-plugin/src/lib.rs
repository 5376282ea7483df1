//! Fixture library reporting a contract version the host does not speak.
//!
//! The version gate runs before factory symbol resolution, so this library
//! exports nothing else.

use knowhere_plugin_sdk::abi::PLUGIN_API_VERSION;

#[no_mangle]
pub extern "C" fn GetKnowherePluginAPIVersion() -> u32 {
    PLUGIN_API_VERSION + 1
}
