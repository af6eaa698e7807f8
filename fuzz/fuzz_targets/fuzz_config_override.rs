//! Fuzz target: `AgitatorConfig::from_json`
//!
//! Any document that loads must also pass validation and yield a usable
//! full-scale duty.
//!
//! cargo fuzz run fuzz_config_override

#![no_main]

use agitator::config::AgitatorConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(cfg) = AgitatorConfig::from_json(doc) {
        assert!(cfg.validate().is_ok());
        assert!(cfg.duty_max() >= 1);
    }
});
