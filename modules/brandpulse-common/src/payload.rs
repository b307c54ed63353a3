//! Structural validation for completed analysis payloads.
//!
//! The payload itself is opaque to the core; only the presentation layer
//! interprets mentions, word clouds and the rest. What the core does care
//! about is not serving a cached payload that is missing the per-platform
//! breakdowns the dashboard cannot render without.

use serde_json::Value;

/// Platform keys a completed payload must carry under `platform_sentiment`.
pub const REQUIRED_PLATFORMS: [&str; 4] = ["Twitter", "LinkedIn", "Reddit", "News"];

/// Check that a payload has the required structure. Returns the first
/// missing piece as the rejection reason.
pub fn validate_results(value: &Value) -> Result<(), String> {
    let Some(obj) = value.as_object() else {
        return Err("payload is not a JSON object".to_string());
    };

    if !obj.get("overall_sentiment").is_some_and(Value::is_object) {
        return Err("missing overall_sentiment".to_string());
    }

    let Some(platforms) = obj.get("platform_sentiment").and_then(Value::as_object) else {
        return Err("missing platform_sentiment".to_string());
    };

    for platform in REQUIRED_PLATFORMS {
        if !platforms.contains_key(platform) {
            return Err(format!("platform_sentiment missing {platform}"));
        }
    }

    Ok(())
}
