// Proptest settings shared by the property test binaries.
//
// PROPTEST_CASES sets the case count per property (default 8).
// PROPTEST_MAX_SHRINK_MS caps shrinking time in milliseconds.
//
// Generators build valid inputs directly; avoid prop_assume!.

use proptest::prelude::ProptestConfig;

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok().and_then(|s| s.parse::<u32>().ok())
}

pub fn proptest_prelude_config() -> ProptestConfig {
    let base = ProptestConfig::default();
    ProptestConfig {
        // No regression files for integration tests.
        failure_persistence: None,
        cases: env_u32("PROPTEST_CASES").unwrap_or(8).max(1),
        max_shrink_time: env_u32("PROPTEST_MAX_SHRINK_MS").unwrap_or(base.max_shrink_time),
        ..base
    }
}
