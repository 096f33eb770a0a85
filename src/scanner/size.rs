/// Format size in human-readable form with binary prefixes.
///
/// Divides by 1024 until the value drops below 1024, always printing two
/// decimals: `1536` becomes `"1.50 KB"`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

/// Units accepted by [`parse_tool_size`], largest first.
///
/// Order matters: checking `B` before `GB` would match the trailing byte
/// suffix of every unit.
const TOOL_UNITS: &[(&str, u64)] = &[
    ("TB", 1024 * 1024 * 1024 * 1024),
    ("GB", 1024 * 1024 * 1024),
    ("MB", 1024 * 1024),
    ("KB", 1024),
    ("B", 1),
];

/// Parse a size as printed by container tooling (`"1.2GB"`, `"512kB"`,
/// `"0B (virtual 1.1GB)"`) into bytes.
///
/// Anything in parentheses is discarded. Empty input, `N/A`, a missing unit
/// or an unparseable number all yield 0.
pub fn parse_tool_size(s: &str) -> u64 {
    let s = s.split('(').next().unwrap_or_default().trim().to_uppercase();

    if s.is_empty() || s == "N/A" {
        return 0;
    }

    for (unit, multiplier) in TOOL_UNITS {
        if let Some(number) = s.strip_suffix(unit) {
            return match number.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => {
                    (value * *multiplier as f64) as u64
                }
                _ => 0,
            };
        }
    }

    0
}
