//! Output lines.

use super::measure::Measure;

/// Human-readable size with binary prefixes and one decimal, e.g. `200.0B`, `1.5KiB`.
pub fn sizeof_fmt(num: u64) -> String {
    let mut value = num as f64;
    for unit in ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"] {
        if value.abs() < 1024.0 {
            return format!("{value:3.1}{unit}B");
        }
        value /= 1024.0;
    }
    format!("{value:.1}YiB")
}

/// One report line for a sender.
pub fn format_line(key: &str, value: u64, measure: Measure) -> String {
    match measure {
        Measure::Size => format!("{:>9}: '{key}'", sizeof_fmt(value)),
        Measure::Count => format!("{value} mails from : '{key}'"),
    }
}
