//! Property-based tests for AppSettings serialization round-trip.
//!
//! These tests verify that AppSettings can be serialized to JSON
//! and deserialized back without data loss for arbitrary valid inputs.

use proptest::prelude::*;
use smartmark::types::settings::{
    AppSettings, DeletePolicy, LogFormat, LoggingSettings, SyncSettings,
};

// --- Arbitrary strategies for all settings sub-types ---

fn arb_delete_policy() -> impl Strategy<Value = DeletePolicy> {
    prop_oneof![
        Just(DeletePolicy::FireAndForget),
        (1u32..10, 0u64..10_000, 0u64..60_000).prop_map(
            |(max_attempts, initial_backoff_ms, max_backoff_ms)| DeletePolicy::Retry {
                max_attempts,
                initial_backoff_ms,
                max_backoff_ms,
            }
        ),
    ]
}

fn arb_log_format() -> impl Strategy<Value = LogFormat> {
    prop_oneof![Just(LogFormat::Text), Just(LogFormat::Json)]
}

fn arb_logging_settings() -> impl Strategy<Value = LoggingSettings> {
    (
        "[a-z_]{1,12}(=(trace|debug|info|warn|error))?",
        arb_log_format(),
        proptest::option::of("[a-zA-Z0-9/._-]{1,40}"),
    )
        .prop_map(|(filter, format, file)| LoggingSettings {
            filter,
            format,
            file,
        })
}

fn arb_app_settings() -> impl Strategy<Value = AppSettings> {
    (
        proptest::option::of("[a-zA-Z0-9/._-]{1,60}"),
        arb_delete_policy(),
        arb_logging_settings(),
    )
        .prop_map(|(database_path, delete_policy, logging)| AppSettings {
            database_path,
            sync: SyncSettings { delete_policy },
            logging,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Serializing then deserializing yields the original settings.
    #[test]
    fn prop_settings_json_roundtrip(settings in arb_app_settings()) {
        let json = serde_json::to_string(&settings).expect("serialize");
        let back: AppSettings = serde_json::from_str(&json).expect("deserialize");
        prop_assert_eq!(back, settings);
    }

    /// The delete policy is tagged by `mode` in its JSON form.
    #[test]
    fn prop_delete_policy_carries_mode_tag(policy in arb_delete_policy()) {
        let value = serde_json::to_value(&policy).expect("serialize");
        let mode = value.get("mode").and_then(|m| m.as_str()).map(str::to_string);
        let expected = match policy {
            DeletePolicy::FireAndForget => "fire_and_forget",
            DeletePolicy::Retry { .. } => "retry",
        };
        prop_assert_eq!(mode.as_deref(), Some(expected));
    }
}
