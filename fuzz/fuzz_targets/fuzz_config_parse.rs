#![no_main]

use libfuzzer_sys::fuzz_target;
use lingobind::{BindingsConfig, SweepReentry};

fuzz_target!(|data: (String, String)| {
    let (reentry, refresh_on) = data;

    // Parsing must never panic and must round-trip accepted names.
    if let Ok(policy) = reentry.parse::<SweepReentry>() {
        assert_eq!(policy.as_str().parse::<SweepReentry>(), Ok(policy));
    }

    let lookup = |key: &str| match key {
        lingobind::config::ENV_SWEEP_REENTRY => Some(reentry.clone()),
        lingobind::config::ENV_REFRESH_ON => Some(refresh_on.clone()),
        _ => None,
    };
    // Bad values fall back to defaults instead of failing.
    let config = BindingsConfig::from_lookup(lookup);
    assert!(config.watched_events().len() <= 2);
    if reentry.parse::<SweepReentry>().is_err() {
        assert_eq!(config.reentry, SweepReentry::Coalesce);
    }
});
