/// Configuration for a [`HandleTable`](crate::handle::HandleTable).
///
/// Controls how many records may be open at once and how much slot storage
/// is reserved up front.
#[derive(Debug, Clone)]
pub struct HandleTableConfig {
    /// Maximum number of live handles. Creation beyond this fails.
    pub max_handles: usize,
    /// Number of slots reserved when the table is created.
    pub initial_capacity: usize,
}

impl Default for HandleTableConfig {
    fn default() -> Self {
        Self {
            max_handles: 65_536,
            initial_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_table_config_defaults() {
        let config = HandleTableConfig::default();
        assert_eq!(config.max_handles, 65_536);
        assert_eq!(config.initial_capacity, 64);
    }
}
