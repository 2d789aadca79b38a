//! Helper functions and utilities
//! 
//! This module contains common helper functions used throughout the client.

use std::sync::OnceLock;
use chrono::{DateTime, Utc, Duration};
use regex::Regex;
use uuid::Uuid;

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Format the time remaining until `deadline` (or "expired")
pub fn format_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = deadline.signed_duration_since(now);

    if diff <= Duration::zero() {
        "expired".to_string()
    } else if diff < Duration::minutes(1) {
        format!("{}s", diff.num_seconds())
    } else if diff < Duration::hours(1) {
        format!("{}m", diff.num_minutes())
    } else if diff < Duration::days(1) {
        format!("{}h {}m", diff.num_hours(), diff.num_minutes() % 60)
    } else {
        format!("{}d", diff.num_days())
    }
}

/// Truncate text to a maximum length with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Username the backend expects at registration: the local part of the email
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

/// Sanitize filename for safe storage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Default file name for a downloaded certificate
pub fn certificate_file_name(event_title: Option<&str>, attendance_id: i64) -> String {
    match event_title.map(normalize_whitespace).filter(|t| !t.is_empty()) {
        Some(title) => format!("certificate_{}_{}.pdf", sanitize_filename(&title), attendance_id),
        None => format!("certificate_{}.pdf", attendance_id),
    }
}

/// Convert bytes to human readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;
    
    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }
    
    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
