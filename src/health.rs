use std::time::Duration;

use crate::error::ServiceResult;

/// One-line (or verbose multi-line) summary of a health probe.
pub fn health_summary(
    base_url: &str,
    result: &ServiceResult<String>,
    elapsed: Duration,
    verbose: bool,
) -> String {
    let (status, detail) = match result {
        Ok(body) => ("ok", body.as_str()),
        Err(_) => ("down", ""),
    };
    let error = result.as_ref().err().map(|e| e.to_string());
    let detail = error.as_deref().unwrap_or(detail);

    if verbose {
        format!(
            "status: {}\nbackend: {}\nlatency_ms: {}\ndetail: {}",
            status,
            base_url,
            elapsed.as_millis(),
            detail
        )
    } else {
        format!(
            "{} ({}, {}ms): {}",
            status,
            base_url,
            elapsed.as_millis(),
            detail
        )
    }
}
