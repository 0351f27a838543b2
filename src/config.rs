//! Registry configuration.

/// Configuration for a registry's backing slot pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of simultaneously live entries (default: 1024).
    ///
    /// The arena is sized for exactly this many slots at construction
    /// and never grows.
    pub max_elements: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_elements: 1024 }
    }
}

impl PoolConfig {
    /// Create a minimal config for testing or constrained environments.
    pub fn minimal() -> Self {
        Self { max_elements: 16 }
    }

    /// Builder pattern: set the maximum number of live entries.
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(PoolConfig::default().max_elements, 1024);
    }

    #[test]
    fn test_builder() {
        let config = PoolConfig::default().with_max_elements(8);
        assert_eq!(config.max_elements, 8);
    }
}
