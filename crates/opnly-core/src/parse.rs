// ── Free-text quantity parsing ──
//
// The diagnostics endpoints report sizes ("8.0G"), uptime ("up 0+07:16:41")
// and CPU load ("95.0% idle") as display strings. Every function here is
// total: input that does not match yields zero.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

#[allow(clippy::unwrap_used)]
static STORAGE_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([KkMmGgTt])?").unwrap());

#[allow(clippy::unwrap_used)]
static UPTIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"up\s+(\d+)\+(\d{1,2}):(\d{2})(?::(\d{2}))?").unwrap());

#[allow(clippy::unwrap_used)]
static CPU_IDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%\s+idle").unwrap());

const CPU_MARKER: &str = "CPU:";

/// Parse a storage size like `"8.0G"`, `"512M"` or `"1024"` into bytes.
///
/// Units are 1024-based and case-insensitive; a bare number is bytes.
pub fn parse_storage_size(text: &str) -> u64 {
    let Some(caps) = STORAGE_SIZE.captures(text) else {
        return 0;
    };
    let Some(number) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
        return 0;
    };
    let multiplier: f64 = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(unit) if unit == "K" => 1024.0,
        Some(unit) if unit == "M" => 1024.0_f64.powi(2),
        Some(unit) if unit == "G" => 1024.0_f64.powi(3),
        Some(unit) if unit == "T" => 1024.0_f64.powi(4),
        _ => 1.0,
    };

    #[allow(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let bytes = (number * multiplier).round() as u64;
    bytes
}

/// Parse `up D+HH:MM:SS` out of a `top` header line into seconds.
pub fn parse_uptime(line: &str) -> u64 {
    let Some(caps) = UPTIME.captures(line) else {
        return 0;
    };
    let field = |idx: usize| {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    field(1)
        .saturating_mul(86_400)
        .saturating_add(field(2) * 3_600)
        .saturating_add(field(3) * 60)
        .saturating_add(field(4))
}

/// Derive CPU usage from a `"... 95.0% idle"` token: `100 - idle`.
pub fn parse_cpu_usage_from_idle(line: &str) -> f64 {
    let Some(idle) = CPU_IDLE
        .captures_iter(line)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    else {
        return 0.0;
    };
    (100.0 - idle).clamp(0.0, 100.0)
}

/// Uptime from the first `top` header line.
pub fn uptime_from_headers(headers: &[String]) -> u64 {
    headers.first().map_or(0, |line| parse_uptime(line))
}

/// CPU usage from the first header line containing `CPU:`.
pub fn cpu_usage_from_headers(headers: &[String]) -> f64 {
    headers
        .iter()
        .find(|line| line.contains(CPU_MARKER))
        .map_or(0.0, |line| parse_cpu_usage_from_idle(line))
}

/// Coerce a number or numeric string into `u64`, defaulting to 0.
///
/// Memory counters arrive as either `8446976000` or `"8446976000"`
/// depending on firmware.
pub fn coerce_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| {
            #[allow(
                clippy::as_conversions,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            let truncated = n.as_f64().filter(|f| *f >= 0.0).map_or(0, |f| f as u64);
            truncated
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| {
                        #[allow(
                            clippy::as_conversions,
                            clippy::cast_possible_truncation,
                            clippy::cast_sign_loss
                        )]
                        let truncated = f as u64;
                        truncated
                    })
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}
