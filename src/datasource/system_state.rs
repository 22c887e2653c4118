use crate::{
    datasource::file_path::{BATTERY_SAVER_NODE, POWER_MODE_NODE, TRACE_ENABLE_NODE},
    utils::file_operate::sysfs_read,
};

/// Persisted integer power-mode indicator. Absent or malformed state reads
/// as None; range validation is the profile switch's business.
pub fn system_power_mode() -> Option<i64> {
    parse_mode(&sysfs_read(POWER_MODE_NODE))
}

/// Persisted battery-saver flag.
pub fn battery_saver_enabled() -> bool {
    parse_flag(&sysfs_read(BATTERY_SAVER_NODE))
}

/// Diagnostic trace-enable flag, gates the interaction trace marker.
pub fn trace_enabled() -> bool {
    parse_flag(&sysfs_read(TRACE_ENABLE_NODE))
}

fn parse_mode(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "true")
}
