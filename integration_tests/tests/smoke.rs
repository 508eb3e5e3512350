mod common;

use carbon_core::{load_dashboard_config_from_env, DashboardContext, TickSource};
use integration_tests::fixture_dataset;

#[test]
fn env_config_builds_context() {
    common::ensure_test_config();
    let (config, metadata) = load_dashboard_config_from_env().unwrap();
    assert!(metadata.path().is_some(), "expected the fixture config to load");
    assert_eq!(config.title(), "Carbon Dashboard (test)");
    assert_eq!(config.tick_source(), TickSource::Client);

    let context = DashboardContext::new(config, fixture_dataset().unwrap()).unwrap();
    assert_eq!(context.dataset().len(), 4);
}
