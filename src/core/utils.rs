/// Units used by [`format_size`], 1024 apart.
const BINARY_UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// Formats a byte count as a human-readable string using binary units.
///
/// Values below 1024 are printed as whole bytes; everything above uses one
/// decimal place and the largest unit that keeps the value below 1024.
///
/// # Example
///
/// ```
/// use chanloader::core::utils::format_size;
///
/// assert_eq!(format_size(1), "1 Byte");
/// assert_eq!(format_size(1536), "1.5 KiB");
/// assert_eq!(format_size(50 * 1024 * 1024), "50.0 MiB");
/// ```
pub fn format_size(bytes: u64) -> String {
    match bytes {
        1 => "1 Byte".to_string(),
        0..=1023 => format!("{} Bytes", bytes),
        _ => format_scaled(bytes as f64),
    }
}

/// Formats a transfer rate in bytes per second (without the `/s` suffix).
///
/// Non-finite or negative speeds are shown as zero.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if !bytes_per_sec.is_finite() || bytes_per_sec <= 0.0 {
        return format_size(0);
    }
    if bytes_per_sec < 1024.0 {
        return format_size(bytes_per_sec as u64);
    }
    format_scaled(bytes_per_sec)
}

fn format_scaled(bytes: f64) -> String {
    let mut value = bytes / 1024.0;
    let mut unit = BINARY_UNITS[0];
    for next in &BINARY_UNITS[1..] {
        // Rounded value must stay below 1024 so "1024.0 KiB" never shows up.
        if value < 1023.95 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}

/// Replaces characters that are unsafe in file names.
///
/// Replaced characters:
/// - `/` and `\` (path separators)
/// - `:` `*` `?` `<` `>` `|` (reserved on Windows)
/// - `"` becomes `'`
/// - control characters
///
/// Leading and trailing whitespace and dots are trimmed so the result can
/// never be `.` or `..`.
///
/// # Example
///
/// ```
/// use chanloader::core::utils::escape_filename;
///
/// assert_eq!(escape_filename("../clip*.mp4"), "_clip_.mp4");
/// ```
pub fn escape_filename(filename: &str) -> String {
    let mut result = String::with_capacity(filename.len());

    for c in filename.chars() {
        match c {
            '/' | '\\' => result.push('_'),
            ':' | '*' | '?' | '<' | '>' | '|' => result.push('_'),
            '"' => result.push('\''),
            c if c.is_control() => result.push('_'),
            _ => result.push(c),
        }
    }

    let result = result.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if result.is_empty() {
        "unnamed".to_string()
    } else {
        result.to_string()
    }
}
