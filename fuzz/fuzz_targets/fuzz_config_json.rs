//! Fuzz target: JSON config override
//!
//! Arbitrary bytes into `SystemConfig::from_json`. Anything it accepts must
//! also pass `validate()` and survive a serialise/parse round trip.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use cluster::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SystemConfig::from_json(json) {
        assert!(config.validate().is_ok());
        if let Ok(out) = serde_json::to_string(&config) {
            assert!(SystemConfig::from_json(&out).is_ok());
        }
    }
});
