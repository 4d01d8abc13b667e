use std::time::Duration;

use livecheck_core::CoreError;

/// Timing knobs of a binding instance.
#[derive(Debug, Clone)]
pub struct BindingConfig {
    /// Time without edits before the latest input is submitted.
    pub quiet_period: Duration,
    /// Interval at which the resolver re-checks the registry for a new job.
    pub poll_interval: Duration,
    /// Upper bound on waiting for a submitted job to appear in the registry.
    pub resolve_timeout: Duration,
    /// Whether a default input is generated when the binding is created.
    pub generate_on_create: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(200),
            poll_interval: Duration::from_millis(200),
            resolve_timeout: Duration::from_secs(30),
            generate_on_create: true,
        }
    }
}

impl BindingConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `LIVECHECK_QUIET_PERIOD_MS`    | `200`   |
    /// | `LIVECHECK_POLL_INTERVAL_MS`   | `200`   |
    /// | `LIVECHECK_RESOLVE_TIMEOUT_MS` | `30000` |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, CoreError> {
        let defaults = Self::default();
        Ok(Self {
            quiet_period: millis(&lookup, "LIVECHECK_QUIET_PERIOD_MS", defaults.quiet_period)?,
            poll_interval: millis(&lookup, "LIVECHECK_POLL_INTERVAL_MS", defaults.poll_interval)?,
            resolve_timeout: millis(
                &lookup,
                "LIVECHECK_RESOLVE_TIMEOUT_MS",
                defaults.resolve_timeout,
            )?,
            generate_on_create: defaults.generate_on_create,
        })
    }
}

fn millis(
    lookup: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration, CoreError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| CoreError::InvalidConfig { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = BindingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.quiet_period, Duration::from_millis(200));
        assert_eq!(config.poll_interval, Duration::from_millis(200));
        assert_eq!(config.resolve_timeout, Duration::from_secs(30));
        assert!(config.generate_on_create);
    }

    #[test]
    fn overrides_are_parsed_as_millis() {
        let config = BindingConfig::from_lookup(lookup(&[
            ("LIVECHECK_QUIET_PERIOD_MS", "50"),
            ("LIVECHECK_RESOLVE_TIMEOUT_MS", " 1500 "),
        ]))
        .unwrap();
        assert_eq!(config.quiet_period, Duration::from_millis(50));
        assert_eq!(config.resolve_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn garbage_is_rejected_with_var_name() {
        let err =
            BindingConfig::from_lookup(lookup(&[("LIVECHECK_POLL_INTERVAL_MS", "soon")]))
                .unwrap_err();
        assert_matches!(
            err,
            CoreError::InvalidConfig { var: "LIVECHECK_POLL_INTERVAL_MS", ref value } if value == "soon"
        );
    }
}
