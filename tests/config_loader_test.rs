use std::io::Write;

use picalc::domain::models::LogFormat;
use picalc::ConfigLoader;
use tempfile::NamedTempFile;

#[test]
fn test_env_overrides_defaults() {
    temp_env::with_vars(
        [
            ("PICALC_ENGINE__GUARD_DIGITS", Some("6")),
            ("PICALC_LOGGING__LEVEL", Some("debug")),
            ("PICALC_OUTPUT__SAVE", Some("false")),
        ],
        || {
            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.engine.guard_digits, 6);
            assert_eq!(config.engine.initial_precision, 100);
            assert_eq!(config.logging.level, "debug");
            assert!(!config.output.save);
        },
    );
}

#[test]
fn test_env_overrides_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "engine:\n  initial_precision: 40\n  progress_interval: 5\nlogging:\n  format: json"
    )
    .unwrap();
    file.flush().unwrap();

    temp_env::with_vars([("PICALC_ENGINE__PROGRESS_INTERVAL", Some("25"))], || {
        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.engine.initial_precision, 40);
        assert_eq!(config.engine.progress_interval, 25);
        assert_eq!(config.logging.format, LogFormat::Json);
    });
}

#[test]
fn test_invalid_env_value_rejected() {
    temp_env::with_vars([("PICALC_ENGINE__GUARD_DIGITS", Some("0"))], || {
        assert!(ConfigLoader::load().is_err());
    });
}

#[test]
fn test_malformed_file_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "engine:\n  guard_digits: plenty").unwrap();
    file.flush().unwrap();

    temp_env::with_vars_unset(["PICALC_ENGINE__GUARD_DIGITS"], || {
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    });
}
