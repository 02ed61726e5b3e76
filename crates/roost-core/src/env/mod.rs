//! Environment helpers.

/// Public registry used when no override is configured.
pub const DEFAULT_ENDPOINT: &str = "https://x.roost.land";

/// Registry endpoint, overridable through `ROOST_ENDPOINT`.
pub fn registry_endpoint() -> String {
    std::env::var("ROOST_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        std::env::remove_var("ROOST_ENDPOINT");
        assert_eq!(registry_endpoint(), DEFAULT_ENDPOINT);
    }
}
