use std::sync::Once;

use carbon_core::config::CONFIG_PATH_ENV;
use integration_tests::fixtures_dir;

static INIT: Once = Once::new();

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = fixtures_dir().join("test_dashboard_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test dashboard config at {}",
            config_path.display()
        );

        std::env::set_var(CONFIG_PATH_ENV, &config_path);
    });
}
