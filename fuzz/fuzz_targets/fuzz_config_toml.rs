#![no_main]

use libfuzzer_sys::fuzz_target;
use toggleview_core::{PanelConfig, PanelController};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that loads must be accepted by the controller.
    if let Ok(config) = PanelConfig::from_toml_str(text) {
        assert!(config.validate().is_empty());
        assert!(PanelController::new(config).is_ok());
    }
});
