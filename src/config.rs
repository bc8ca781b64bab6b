use std::collections::HashMap;

/// Init parameter holding the parse cache capacity.
pub const CACHE_SIZE_PARAM: &str = "jstl.el.expressionCacheSize";

/// Init parameter switching evaluation to strict mode.
pub const STRICT_MODE_PARAM: &str = "jstl.el.strictMode";

/// Default parse cache capacity.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of parsed expressions kept; 0 disables caching
    pub cache_capacity: usize,
    /// Turn the first recoverable failure into an error
    pub strict: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            strict: false,
        }
    }
}

impl EngineConfig {
    /// Reads the configuration from container init parameters. Malformed
    /// values are logged and ignored.
    pub fn from_init_parameters(params: &HashMap<String, String>) -> Self {
        let mut config = EngineConfig::default();

        if let Some(raw) = params.get(CACHE_SIZE_PARAM) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => config.cache_capacity = capacity,
                Err(_) => log::warn!(
                    "Ignoring {}='{}': not a non-negative integer, using {}",
                    CACHE_SIZE_PARAM,
                    raw,
                    DEFAULT_CACHE_CAPACITY
                ),
            }
        }

        if let Some(raw) = params.get(STRICT_MODE_PARAM) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "true" => config.strict = true,
                "false" => config.strict = false,
                _ => log::warn!("Ignoring {}='{}': expected true or false", STRICT_MODE_PARAM, raw),
            }
        }

        config
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
