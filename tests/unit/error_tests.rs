//! Unit tests for `AppError` display format and conversions.

use agent_steward::AppError;

#[test]
fn display_uses_lowercase_kind_prefix() {
    assert_eq!(AppError::Io("disk full".into()).to_string(), "io: disk full");
    assert_eq!(
        AppError::Decode("bad json".into()).to_string(),
        "decode: bad json"
    );
    assert_eq!(
        AppError::Cancelled("token fired".into()).to_string(),
        "cancelled: token fired"
    );
    assert_eq!(
        AppError::Config("missing".into()).to_string(),
        "config: missing"
    );
    assert_eq!(
        AppError::Notify("webhook 500".into()).to_string(),
        "notify: webhook 500"
    );
}

#[test]
fn messages_have_no_trailing_period() {
    let err = AppError::Io("write failed".into());
    assert!(!err.to_string().ends_with('.'));
}

#[test]
fn serde_json_errors_convert_to_decode() {
    let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: AppError = parse_err.into();
    assert!(matches!(err, AppError::Decode(_)));
}

#[test]
fn toml_errors_convert_to_config() {
    let parse_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
    let err: AppError = parse_err.into();
    assert!(err.to_string().starts_with("config: invalid config"));
}

#[test]
fn implements_std_error() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    let err = AppError::Cancelled("x".into());
    assert_error(&err);
    assert!(format!("{err:?}").contains("Cancelled"));
}
