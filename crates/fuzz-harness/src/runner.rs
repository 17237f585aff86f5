//! Case-count configuration shared by property tests

/// Environment variable overriding the number of cases per property
pub const CASES_ENV: &str = "FUZZ_CASES";

/// Fuzz test configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzConfig {
    /// Number of test cases to run
    pub cases: u32,
    /// Maximum shrink iterations on failure
    pub max_shrink_iters: u32,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl FuzzConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cases(mut self, n: u32) -> Self {
        self.cases = n;
        self
    }

    /// Apply `FUZZ_CASES` if it is set to a valid number
    pub fn from_env(self) -> Self {
        match std::env::var(CASES_ENV).ok().and_then(|v| v.parse().ok()) {
            Some(n) => self.cases(n),
            None => self,
        }
    }

    /// Generate proptest config from this
    pub fn to_proptest_config(&self) -> proptest::test_runner::Config {
        proptest::test_runner::Config {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..proptest::test_runner::Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = FuzzConfig::default();
        assert_eq!(config.cases, 256);
        assert_eq!(config.to_proptest_config().cases, 256);
    }

    #[test]
    fn test_config_builder() {
        let config = FuzzConfig::new().cases(32);
        assert_eq!(config.to_proptest_config().cases, 32);
        assert_eq!(config.to_proptest_config().max_shrink_iters, 1000);
    }
}
