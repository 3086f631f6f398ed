//! Telemetry log parser.
//!
//! Parses the subtitle-style GPS log that drone firmware records next
//! to each video.
//!
//! # Format Overview
//!
//! The log consists of blocks separated by blank lines:
//! ```text
//! 1
//! 00:00:00,000 --> 00:00:01,000
//! F/2.8, SS 1000, ISO 100 GPS: (114.123456, 22.654321) H: 120.5m
//! ```
//!
//! Each block has an index line, a timing line (only the start time is
//! used), and one or more metadata lines. Coordinates appear either as
//! a combined `GPS: (lon, lat)` pair or as separate bracket tags
//! (`[latitude: ...]` / `[longtitude: ...]` - the firmware misspells
//! "longitude", both spellings are accepted). Altitude appears as
//! `H: <n>m` or `[altitude: ...]`. Blocks without coordinates are
//! dropped rather than emitted as invalid fixes.

use std::fs;
use std::path::Path;

use super::types::GpsFix;

/// Parse telemetry content into a chronological sequence of fixes.
///
/// Output order is file order, which the format guarantees to be
/// temporal order.
pub fn parse_telemetry(content: &str) -> Vec<GpsFix> {
    let content = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut fixes = Vec::new();

    for block in content.split("\n\n") {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .collect();

        if lines.len() < 3 {
            continue;
        }

        let Some(timestamp) = find_timestamp(lines[1]) else {
            continue;
        };

        let metadata = lines[2..].join(" ");

        let mut fix = GpsFix {
            timestamp,
            ..GpsFix::default()
        };

        // Combined pair takes priority; the pair order is (lon, lat).
        if let Some((lon, lat)) = parse_combined_pair(&metadata) {
            fix.longitude = lon;
            fix.latitude = lat;
            fix.valid = true;
        } else {
            let lat = bracket_tag(&metadata, "latitude");
            let lon = bracket_tag(&metadata, "longtitude")
                .or_else(|| bracket_tag(&metadata, "longitude"));
            if let (Some(lat), Some(lon)) = (lat, lon) {
                fix.latitude = lat;
                fix.longitude = lon;
                fix.valid = true;
            }
        }

        if let Some(alt) = height_tag(&metadata).or_else(|| bracket_tag(&metadata, "altitude")) {
            fix.altitude = alt;
        }

        if fix.valid {
            fixes.push(fix);
        }
    }

    fixes
}

/// Parse a telemetry file from disk.
pub fn parse_telemetry_file(path: &Path) -> std::io::Result<Vec<GpsFix>> {
    let bytes = fs::read(path)?;
    Ok(parse_telemetry(&String::from_utf8_lossy(&bytes)))
}

/// Find the first `HH:MM:SS,mmm` occurrence in a line and convert it to
/// seconds since log start.
fn find_timestamp(line: &str) -> Option<f64> {
    let bytes = line.as_bytes();
    if bytes.len() < 12 {
        return None;
    }
    for start in 0..=bytes.len() - 12 {
        let w = &bytes[start..start + 12];
        let shape_ok = w[2] == b':'
            && w[5] == b':'
            && w[8] == b','
            && [0, 1, 3, 4, 6, 7, 9, 10, 11]
                .iter()
                .all(|&i| w[i].is_ascii_digit());
        if !shape_ok {
            continue;
        }
        let digit = |i: usize| (w[i] - b'0') as f64;
        let hours = digit(0) * 10.0 + digit(1);
        let minutes = digit(3) * 10.0 + digit(4);
        let seconds = digit(6) * 10.0 + digit(7);
        let millis = digit(9) * 100.0 + digit(10) * 10.0 + digit(11);
        return Some(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0);
    }
    None
}

/// Extract a combined `GPS: (lon, lat)` pair.
fn parse_combined_pair(metadata: &str) -> Option<(f64, f64)> {
    let gps_at = metadata.find("GPS")?;
    let rest = &metadata[gps_at..];
    let open = rest.find('(')?;
    let close = rest[open..].find(')')? + open;
    let inner = &rest[open + 1..close];

    let mut parts = inner.splitn(2, ',');
    let first = parse_number(parts.next()?)?;
    let second = parse_number(parts.next()?)?;
    Some((first, second))
}

/// Extract a `[key: value]` bracket tag, case-insensitively.
fn bracket_tag(metadata: &str, key: &str) -> Option<f64> {
    // to_ascii_lowercase preserves byte offsets, so indices found in
    // the lowered copy are valid in the original.
    let lowered = metadata.to_ascii_lowercase();
    let needle = format!("[{}:", key);
    let at = lowered.find(&needle)?;
    let after = &metadata[at + needle.len()..];
    let end = after.find(']')?;
    parse_number(&after[..end])
}

/// Extract the `H: <n>m` altitude form.
fn height_tag(metadata: &str) -> Option<f64> {
    let mut search_from = 0;
    while let Some(rel) = metadata[search_from..].find("H:") {
        let at = search_from + rel;
        let after = metadata[at + 2..].trim_start();
        if let Some(stripped) = take_number(after) {
            let (value, rest) = stripped;
            if rest.starts_with('m') {
                return Some(value);
            }
        }
        search_from = at + 2;
    }
    None
}

/// Parse a trimmed numeric token.
fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Take a leading numeric token, returning the value and the remainder.
fn take_number(s: &str) -> Option<(f64, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !matches!(c, '0'..='9' | '-' | '+' | '.'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok().map(|v| (v, &s[end..]))
}
