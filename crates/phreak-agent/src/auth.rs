//! API key lookup

use phreak_core::{PhreakError, Result};
use std::env;

/// Read the API key from the environment variable named by `var`
pub fn get_api_key(var: &str) -> Result<String> {
    match env::var(var) {
        Ok(key) if !key.trim().is_empty() => {
            tracing::debug!("Using API key from {}", var);
            Ok(key)
        }
        _ => Err(PhreakError::Auth(format!(
            "No API key found. Set {}=sk-ant-... or change planner.api_key_env in .phreak/config.toml",
            var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable so they can run in parallel
    #[test]
    fn test_key_present() {
        env::set_var("PHREAK_TEST_KEY_PRESENT", "sk-ant-test");
        assert_eq!(get_api_key("PHREAK_TEST_KEY_PRESENT").unwrap(), "sk-ant-test");
    }

    #[test]
    fn test_key_missing() {
        env::remove_var("PHREAK_TEST_KEY_MISSING");
        let err = get_api_key("PHREAK_TEST_KEY_MISSING").unwrap_err();
        assert!(matches!(err, PhreakError::Auth(_)));
        assert!(err.to_string().contains("PHREAK_TEST_KEY_MISSING"));
    }

    #[test]
    fn test_blank_key_rejected() {
        env::set_var("PHREAK_TEST_KEY_BLANK", "  ");
        assert!(get_api_key("PHREAK_TEST_KEY_BLANK").is_err());
    }
}
