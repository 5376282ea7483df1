//! Fixture library with a valid version gate and no factory entry points.

use knowhere_plugin_sdk::abi::PLUGIN_API_VERSION;

#[no_mangle]
pub extern "C" fn GetKnowherePluginAPIVersion() -> u32 {
    PLUGIN_API_VERSION
}
