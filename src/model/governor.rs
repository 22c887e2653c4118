use std::path::PathBuf;

use log::debug;

use crate::{
    datasource::file_path::{BACKLIGHT_BRIGHTNESS, INTERACTIVE_GOV_DIR},
    utils::file_operate::{rooted, sysfs_read_int, sysfs_write},
};

/// Governor tuning profiles, one per power mode plus the terminal
/// screen-off profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerMode {
    MaxPerformance = 0,
    OptimizedPerformance = 1,
    BatterySave = 2,
    UserCustom = 3,
    /// Screen-off profile, only reachable through an interactive-off
    /// transition
    NonInteractive = 4,
}

impl PowerMode {
    /// Persisted power-mode indicators map onto the four interactive
    /// profiles; anything else is out of range.
    pub fn from_persisted(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(PowerMode::MaxPerformance),
            1 => Some(PowerMode::OptimizedPerformance),
            2 => Some(PowerMode::BatterySave),
            3 => Some(PowerMode::UserCustom),
            _ => None,
        }
    }
}

/// One row of interactive-governor tunables, written verbatim. An empty
/// string leaves that tunable untouched.
pub struct GovernorProfile {
    pub hispeed_freq: &'static str,
    pub target_loads: &'static str,
    pub above_hispeed_delay: &'static str,
    pub timer_rate: &'static str,
    pub boost_factor: &'static str,
    pub min_sample_time: &'static str,
    pub go_hispeed_load: &'static str,
}

const PROFILES: [GovernorProfile; 5] = [
    // max performance
    GovernorProfile {
        hispeed_freq: "1122000",
        target_loads: "65 304000:75 1122000:80",
        above_hispeed_delay: "19000",
        timer_rate: "20000",
        boost_factor: "0",
        min_sample_time: "41000",
        go_hispeed_load: "90",
    },
    // optimized performance
    GovernorProfile {
        hispeed_freq: "1020000",
        target_loads: "65 256000:75 1020000:80",
        above_hispeed_delay: "19000",
        timer_rate: "20000",
        boost_factor: "0",
        min_sample_time: "30000",
        go_hispeed_load: "99",
    },
    // battery save
    GovernorProfile {
        hispeed_freq: "640000",
        target_loads: "65 256000:75 640000:80",
        above_hispeed_delay: "80000",
        timer_rate: "20000",
        boost_factor: "2",
        min_sample_time: "30000",
        go_hispeed_load: "99",
    },
    // user custom, optimized values until user tables land
    GovernorProfile {
        hispeed_freq: "1020000",
        target_loads: "65 256000:75 1020000:80",
        above_hispeed_delay: "19000",
        timer_rate: "20000",
        boost_factor: "0",
        min_sample_time: "30000",
        go_hispeed_load: "99",
    },
    // non-interactive
    GovernorProfile {
        hispeed_freq: "420000",
        target_loads: "80",
        above_hispeed_delay: "80000",
        timer_rate: "300000",
        boost_factor: "2",
        min_sample_time: "30000",
        go_hispeed_load: "99",
    },
];

pub fn profile_for(mode: PowerMode) -> &'static GovernorProfile {
    &PROFILES[mode as usize]
}

/// Profile to apply on an interactive-on transition. The battery-saver flag
/// wins over the persisted indicator; an absent or out-of-range indicator
/// falls back to optimized performance.
pub fn select_interactive_mode(persisted: Option<i64>, battery_saver: bool) -> PowerMode {
    if battery_saver {
        return PowerMode::BatterySave;
    }
    persisted
        .and_then(PowerMode::from_persisted)
        .unwrap_or(PowerMode::OptimizedPerformance)
}

pub fn apply_profile(mode: PowerMode) {
    apply_profile_at(&None, mode);
}

pub fn apply_profile_at(root: &Option<PathBuf>, mode: PowerMode) {
    let profile = profile_for(mode);
    debug!("Applying interactive governor profile: {mode:?}");
    write_tunable(root, "hispeed_freq", profile.hispeed_freq);
    write_tunable(root, "target_loads", profile.target_loads);
    write_tunable(root, "above_hispeed_delay", profile.above_hispeed_delay);
    write_tunable(root, "timer_rate", profile.timer_rate);
    write_tunable(root, "boost_factor", profile.boost_factor);
    write_tunable(root, "min_sample_time", profile.min_sample_time);
    write_tunable(root, "go_hispeed_load", profile.go_hispeed_load);
}

/// Externally-driven profile switch, only honoured while the display is on.
pub fn apply_profile_if_display_on(mode: PowerMode) {
    if sysfs_read_int(BACKLIGHT_BRIGHTNESS) != 0 {
        apply_profile(mode);
    } else {
        debug!("Display off, skipping profile {mode:?}");
    }
}

fn write_tunable(root: &Option<PathBuf>, name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    sysfs_write(rooted(root, &format!("{INTERACTIVE_GOV_DIR}/{name}")), value);
}
