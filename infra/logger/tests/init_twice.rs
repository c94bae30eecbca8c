use ncr_logger::{LevelFilter, Logger, LoggerError};
use serial_test::serial;

#[test]
#[serial]
fn init_twice_returns_subscriber_error() {
    let _logger = Logger::builder()
        .name("integration-init-twice")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("integration-init-twice-second")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second init should fail");

    assert!(
        matches!(err, LoggerError::Subscriber { .. }),
        "expected subscriber error for second init"
    );
}

#[test]
#[serial]
fn invalid_settings_fail_before_install() {
    let settings = ncr_logger::LoggerSettings {
        level: "chatty".to_owned(),
        ..ncr_logger::LoggerSettings::default()
    };
    let err = Logger::from_settings("integration-init-twice", &settings)
        .expect_err("unknown level should be rejected");
    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}
