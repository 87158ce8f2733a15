//! Fuzz target for credential and ICE config decoding
//!
//! Feeds arbitrary bytes to the JSON shapes the credential endpoint and the
//! ICE lookup return, and arbitrary strings to the ICE URL derivation.
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use huddle_app::{ConnectionDetails, ice_config_url};
use huddle_core::{IceServer, RoomOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<ConnectionDetails>(data);

    if let Ok(servers) = serde_json::from_slice::<Vec<IceServer>>(data) {
        // Whatever decodes must produce a usable config
        let options = RoomOptions::with_ice_servers(Some(servers));
        assert!(!options.rtc_config.ice_servers.is_empty());
    }

    if let Ok(text) = std::str::from_utf8(data) {
        assert!(ice_config_url(text).ends_with("/rtc/validate"));
    }
});
