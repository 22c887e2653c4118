use log::{info, warn};

use crate::{
    datasource::file_path::{CPU0_MAX_FREQ, LP_CLUSTER_MAX_FREQ, SCALING_AVAILABLE_FREQS},
    utils::file_operate::{sysfs_read, sysfs_read_int},
};

/// Smallest catalog entry at or above this is the interaction boost target
pub const INTERACTION_BOOST_THRESHOLD: i64 = 1_326_000;
/// Smallest catalog entry at or above this is the animation boost target
pub const ANIMATION_BOOST_THRESHOLD: i64 = 1_044_000;

/// Hardware-valid CPU frequencies plus the boost targets derived from them.
/// Populated once before any hint is processed, immutable afterwards.
#[derive(Debug, Clone)]
pub struct FrequencyCatalog {
    available: Vec<i64>,
    lp_max: i64,
    cpu0_max: i64,
    interaction_boost: i64,
    animation_boost: i64,
}

impl FrequencyCatalog {
    /// Blocking discovery from cpufreq/cpuquiet nodes. Any node that cannot
    /// be read contributes an empty/zero value; discovery itself never fails.
    pub fn discover() -> Self {
        let raw = sysfs_read(SCALING_AVAILABLE_FREQS);
        let available = parse_freq_list(&raw);
        if available.is_empty() {
            warn!("No available frequencies discovered from {SCALING_AVAILABLE_FREQS}");
        }

        let lp_max = sysfs_read_int(LP_CLUSTER_MAX_FREQ);
        let cpu0_max = sysfs_read_int(CPU0_MAX_FREQ);

        let catalog = Self::from_parts(available, lp_max, cpu0_max);
        info!(
            "Frequency catalog: {} entries, lp_max={}KHz, cpu0_max={}KHz",
            catalog.available.len(),
            catalog.lp_max,
            catalog.cpu0_max
        );
        info!(
            "Boost targets: interaction={}KHz, animation={}KHz",
            catalog.interaction_boost, catalog.animation_boost
        );
        catalog
    }

    /// Derivation from already-read values. The boost targets default to the
    /// LP cluster max and are overwritten by the first catalog entry meeting
    /// their threshold; a catalog with no such entry keeps the fallback.
    pub fn from_parts(available: Vec<i64>, lp_max: i64, cpu0_max: i64) -> Self {
        let interaction_boost = first_at_or_above(&available, INTERACTION_BOOST_THRESHOLD)
            .unwrap_or(lp_max);
        let animation_boost =
            first_at_or_above(&available, ANIMATION_BOOST_THRESHOLD).unwrap_or(lp_max);

        Self {
            available,
            lp_max,
            cpu0_max,
            interaction_boost,
            animation_boost,
        }
    }

    pub fn interaction_boost(&self) -> i64 {
        self.interaction_boost
    }

    pub fn animation_boost(&self) -> i64 {
        self.animation_boost
    }

    pub fn lp_max(&self) -> i64 {
        self.lp_max
    }

    pub fn cpu0_max(&self) -> i64 {
        self.cpu0_max
    }

    /// Highest discovered frequency, used for the boot-time warmup boost.
    pub fn max_available(&self) -> i64 {
        self.available.last().copied().unwrap_or(0)
    }
}

/// Parse the whitespace-separated frequency list, preserving source order
/// (ascending by hardware convention). Malformed tokens are dropped.
pub fn parse_freq_list(raw: &str) -> Vec<i64> {
    raw.split_whitespace()
        .filter_map(|tok| tok.parse::<i64>().ok())
        .collect()
}

fn first_at_or_above(available: &[i64], threshold: i64) -> Option<i64> {
    available.iter().copied().find(|&freq| freq >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whitespace_separated_list() {
        assert_eq!(
            parse_freq_list("420000 1020000 1224000 1326000 1530000\n"),
            vec![420000, 1020000, 1224000, 1326000, 1530000]
        );
        assert_eq!(parse_freq_list(""), Vec::<i64>::new());
        assert_eq!(parse_freq_list("51000 garbage 102000"), vec![51000, 102000]);
    }

    #[test]
    fn derives_boost_targets_from_catalog() {
        let catalog = FrequencyCatalog::from_parts(
            vec![420000, 1020000, 1224000, 1326000, 1530000],
            420000,
            1530000,
        );
        assert_eq!(catalog.interaction_boost(), 1326000);
        assert_eq!(catalog.animation_boost(), 1224000);
        assert_eq!(catalog.max_available(), 1530000);
    }

    #[test]
    fn falls_back_to_lp_max_when_no_entry_meets_threshold() {
        let catalog = FrequencyCatalog::from_parts(vec![300000, 400000], 300000, 400000);
        assert_eq!(catalog.interaction_boost(), 300000);
        assert_eq!(catalog.animation_boost(), 300000);
    }

    #[test]
    fn empty_catalog_degrades_to_zero() {
        let catalog = FrequencyCatalog::from_parts(Vec::new(), 0, 0);
        assert_eq!(catalog.interaction_boost(), 0);
        assert_eq!(catalog.animation_boost(), 0);
        assert_eq!(catalog.max_available(), 0);
    }
}
