use std::collections::HashMap;
use std::env;

/// Read-only view of the process environment handed to components that need it.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;

    /// Whether `key` is set to a truthy value (`1`, `true`, `yes`, `on`).
    fn flag(&self, key: &str) -> bool {
        self.var(key)
            .map(|value| {
                matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(false)
    }
}

/// Environment backed by the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// In-memory environment, mostly useful for tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", "yes", " on "] {
            let env = MapEnvironment::new().with("FLAG", value);
            assert!(env.flag("FLAG"), "{value} should be truthy");
        }
    }

    #[test]
    fn flag_rejects_missing_and_falsy_values() {
        let env = MapEnvironment::new().with("FLAG", "0").with("OTHER", "false");
        assert!(!env.flag("FLAG"));
        assert!(!env.flag("OTHER"));
        assert!(!env.flag("MISSING"));
    }
}
