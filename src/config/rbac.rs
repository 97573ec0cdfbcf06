//! Access-control resolver configuration

use serde::{Deserialize, Serialize};

/// Remote access-control service (`[rbac]`). Absent section disables
/// context augmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbacConfig {
    pub base_url: String,
    #[serde(default = "default_rbac_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_rbac_timeout_ms() -> u64 {
    2_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbac_config_default_timeout() {
        let config: RbacConfig = toml::from_str(r#"base_url = "http://rbac:8080""#).unwrap();
        assert_eq!(config.base_url, "http://rbac:8080");
        assert_eq!(config.timeout_ms, 2_000);
    }
}
