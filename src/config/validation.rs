use reqwest::Url;

use super::models::Config;

fn check_http_url(field: &str, value: &str, errors: &mut Vec<String>) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(format!(
            "{} '{}' must use http or https, not '{}'.",
            field,
            value,
            url.scheme()
        )),
        Err(e) => errors.push(format!("{} '{}' is not a valid URL: {}.", field, value, e)),
    }
}

/// Validates the logical consistency of a Config.
/// Returns Ok(()) if valid, or Err(Vec<String>) with a list of error messages if invalid.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Proxy
    if config.proxy.port == 0 {
        errors.push("proxy.port must not be 0.".to_string());
    }
    check_http_url("proxy.api_host", &config.proxy.api_host, &mut errors);
    if config.proxy.timeout_seconds == 0 {
        errors.push("proxy.timeout_seconds must be greater than 0.".to_string());
    }
    if config.proxy.max_body_bytes == 0 {
        errors.push("proxy.max_body_bytes must be greater than 0.".to_string());
    }

    // Client
    check_http_url("client.url", &config.client.url, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
