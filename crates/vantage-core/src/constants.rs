/// Vantage system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Actor recorded on audit events written by the engine itself.
pub const SYSTEM_ACTOR: &str = "system";

/// Maximum length of an experiment name.
pub const MAX_EXPERIMENT_NAME_LEN: usize = 200;

/// Maximum length of a URL target pattern.
pub const MAX_TARGET_PATTERN_LEN: usize = 2048;

/// Recommendation reasons surfaced to the dashboard.
pub mod reasons {
    pub const INSUFFICIENT_SAMPLE: &str = "insufficient sample size";
    pub const B_OUTPERFORMS_A: &str = "B significantly outperforms A";
    pub const A_OUTPERFORMS_B: &str = "A significantly outperforms B";
    pub const CONTINUE_TEST: &str = "no significant difference yet — continue test";
}
