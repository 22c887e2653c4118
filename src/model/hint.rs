use std::collections::HashMap;

use log::{debug, error};

pub const HINT_COUNT: usize = 7;

/// Transient workload phases signalled by higher-level system software.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerHint {
    Vsync = 0,
    Interaction = 1,
    CpuBoost = 2,
    LaunchBoost = 3,
    Audio = 4,
    LowPower = 5,
    /// Externally-driven governor profile request
    SetProfile = 6,
}

impl PowerHint {
    pub const ALL: [PowerHint; HINT_COUNT] = [
        PowerHint::Vsync,
        PowerHint::Interaction,
        PowerHint::CpuBoost,
        PowerHint::LaunchBoost,
        PowerHint::Audio,
        PowerHint::LowPower,
        PowerHint::SetProfile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PowerHint::Vsync => "vsync",
            PowerHint::Interaction => "interaction",
            PowerHint::CpuBoost => "cpu_boost",
            PowerHint::LaunchBoost => "launch_boost",
            PowerHint::Audio => "audio",
            PowerHint::LowPower => "low_power",
            PowerHint::SetProfile => "profile",
        }
    }

    pub fn from_raw(raw: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|&h| h as i64 == raw)
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|h| h.name() == name)
    }

    /// Minimum re-trigger interval in microseconds, zero = unthrottled.
    /// The interaction interval is slightly shorter than the interaction
    /// boost duration so the floor can be held continuously while the user
    /// keeps interacting.
    fn default_interval_us(self) -> u64 {
        match self {
            PowerHint::Interaction => 90_000,
            PowerHint::CpuBoost => 1_000_000,
            PowerHint::LaunchBoost => 1_000_000,
            PowerHint::Audio => 700_000,
            PowerHint::Vsync | PowerHint::LowPower | PowerHint::SetProfile => 0,
        }
    }
}

/// Parse one textual hint command from the hint node, e.g. `interaction`,
/// `vsync 1`, `profile 2`. Numeric hint ids are accepted as well.
pub fn parse_command(line: &str) -> Option<(PowerHint, Option<i64>)> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;

    let hint = PowerHint::from_name(head).or_else(|| {
        head.parse::<i64>()
            .ok()
            .and_then(PowerHint::from_raw)
    })?;

    let payload = match parts.next() {
        Some(arg) => Some(arg.parse::<i64>().ok()?),
        None => None,
    };

    Some((hint, payload))
}

#[derive(Clone, Copy, Default)]
struct HintSlot {
    last_us: Option<u64>,
    interval_us: u64,
}

/// Per-hint-type rate limiter over a monotonic microsecond clock.
/// Acceptance records the timestamp regardless of what dispatch later does
/// with the hint.
pub struct HintDebouncer {
    slots: [HintSlot; HINT_COUNT],
}

impl HintDebouncer {
    pub fn new() -> Self {
        let mut slots = [HintSlot::default(); HINT_COUNT];
        for hint in PowerHint::ALL {
            slots[hint as usize].interval_us = hint.default_interval_us();
        }
        Self { slots }
    }

    /// Board config may override individual intervals by hint name.
    pub fn with_overrides(overrides: &HashMap<String, u64>) -> Self {
        let mut debouncer = Self::new();
        for (name, &interval_us) in overrides {
            match PowerHint::from_name(name) {
                Some(hint) => {
                    debug!("Hint interval override: {name} = {interval_us}us");
                    debouncer.slots[hint as usize].interval_us = interval_us;
                }
                None => error!("Unknown hint in interval override: {name}"),
            }
        }
        debouncer
    }

    /// Returns whether the hint should be processed. A hint recurring within
    /// its interval is suppressed without touching any state; an accepted
    /// hint becomes the new reference point for its type.
    pub fn accept(&mut self, hint: PowerHint, now_us: u64) -> bool {
        let slot = &mut self.slots[hint as usize];
        if let Some(last_us) = slot.last_us {
            if slot.interval_us != 0 && now_us.saturating_sub(last_us) < slot.interval_us {
                debug!("Suppressed {} hint within {}us", hint.name(), slot.interval_us);
                return false;
            }
        }
        slot.last_us = Some(now_us);
        true
    }

    #[cfg(test)]
    fn interval_us(&self, hint: PowerHint) -> u64 {
        self.slots[hint as usize].interval_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_always_accepted() {
        let mut debouncer = HintDebouncer::new();
        assert!(debouncer.accept(PowerHint::Interaction, 0));
        assert!(debouncer.accept(PowerHint::Audio, 0));
    }

    #[test]
    fn recurrence_within_interval_is_suppressed() {
        let mut debouncer = HintDebouncer::new();
        assert!(debouncer.accept(PowerHint::Interaction, 1_000_000));
        assert!(!debouncer.accept(PowerHint::Interaction, 1_050_000));
        // 90ms elapsed since the accepted hint
        assert!(debouncer.accept(PowerHint::Interaction, 1_090_000));
    }

    #[test]
    fn suppressed_hint_does_not_move_the_window() {
        let mut debouncer = HintDebouncer::new();
        assert!(debouncer.accept(PowerHint::CpuBoost, 0));
        assert!(!debouncer.accept(PowerHint::CpuBoost, 999_999));
        // Still measured from t=0, not from the suppressed attempt
        assert!(debouncer.accept(PowerHint::CpuBoost, 1_000_000));
    }

    #[test]
    fn zero_interval_is_unthrottled() {
        let mut debouncer = HintDebouncer::new();
        assert!(debouncer.accept(PowerHint::LowPower, 10));
        assert!(debouncer.accept(PowerHint::LowPower, 11));
        assert!(debouncer.accept(PowerHint::LowPower, 11));
    }

    #[test]
    fn config_overrides_apply_by_name() {
        let mut overrides = HashMap::new();
        overrides.insert("interaction".to_string(), 120_000u64);
        overrides.insert("bogus".to_string(), 5u64);
        let debouncer = HintDebouncer::with_overrides(&overrides);
        assert_eq!(debouncer.interval_us(PowerHint::Interaction), 120_000);
        assert_eq!(debouncer.interval_us(PowerHint::Audio), 700_000);
    }

    #[test]
    fn parses_textual_commands() {
        assert_eq!(
            parse_command("interaction"),
            Some((PowerHint::Interaction, None))
        );
        assert_eq!(parse_command("vsync 1"), Some((PowerHint::Vsync, Some(1))));
        assert_eq!(
            parse_command("profile 2"),
            Some((PowerHint::SetProfile, Some(2)))
        );
        assert_eq!(parse_command("4"), Some((PowerHint::Audio, None)));
    }

    #[test]
    fn rejects_invalid_commands() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("warp_drive"), None);
        assert_eq!(parse_command("99"), None);
        assert_eq!(parse_command("vsync on"), None);
    }
}
