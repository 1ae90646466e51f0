//! Startup logging: configuration fallbacks taken before the subscriber is
//! installed still end up in the log file.
//!
//! Installs the global subscriber, so this file holds a single test.

use std::collections::HashMap;

use harmony_rag::config::{LoggingConfig, Settings};
use harmony_rag::logging;

#[test]
fn test_load_warnings_reach_log_file() {
    let vars: HashMap<&str, &str> = [
        ("RATE_LIMIT_GENERATE", "bogus"),
        ("CORS_ORIGINS", "[]"),
    ]
    .into_iter()
    .collect();
    let settings = Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = LoggingConfig {
        file: dir.path().join("logs").join("app.log"),
        ..LoggingConfig::default()
    };

    logging::init(&config).unwrap();
    settings.log_loaded();

    let log = std::fs::read_to_string(&config.file).unwrap();
    assert!(log.contains("Logger initialized"), "{}", log);
    assert!(log.contains("Invalid RATE_LIMIT_GENERATE value \"bogus\""), "{}", log);
    assert!(log.contains("CORS_ORIGINS JSON list is empty, using default"), "{}", log);
    // the file records debug output even though the console level is info
    assert!(log.contains("Settings RATE_LIMIT_GENERATE: 3/minute"), "{}", log);
}
