use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use log::{debug, error, info, warn};

use crate::{
    datasource::{
        board_config::BoardConfig, freq_catalog::FrequencyCatalog, system_state::trace_enabled,
    },
    model::{
        coordinator::{BOOST_PRIORITY, ConstraintCoordinator, QOS_DEFAULT_VALUE, Resource},
        dispatch::HintDispatcher,
        governor::{PowerMode, apply_profile_if_display_on},
        hint::{HintDebouncer, PowerHint},
        interactive::InteractiveController,
    },
    utils::time::now_micros,
};

/// CPU floor pinned to the top catalog frequency right after init, to cut
/// down the remaining boot time.
const BOOT_BOOST_DURATION: Duration = Duration::from_secs(15);

pub const FEATURE_DOUBLE_TAP_TO_WAKE: i32 = 1;

/// The power HAL context: immutable discovery results plus the two pieces
/// of mutable hint state (debounce table, vsync floor handle), owned here
/// instead of living in a process-wide singleton.
pub struct PowerHal {
    catalog: FrequencyCatalog,
    debouncer: Mutex<HintDebouncer>,
    dispatcher: HintDispatcher,
    controller: InteractiveController,
    trace: bool,
}

impl PowerHal {
    /// Runs frequency discovery and input device resolution synchronously;
    /// callers must not deliver hints until this returns.
    pub fn init(config: &BoardConfig, coordinator: Arc<dyn ConstraintCoordinator>) -> Self {
        let catalog = FrequencyCatalog::discover();
        let debouncer = HintDebouncer::with_overrides(&config.hint_intervals);
        let controller = InteractiveController::new(&config.input_devices);
        let trace = trace_enabled();

        let boot_freq = catalog.max_available();
        if boot_freq > 0 {
            coordinator.request_timed(
                Resource::CpuFreqMin,
                BOOST_PRIORITY,
                boot_freq,
                QOS_DEFAULT_VALUE,
                BOOT_BOOST_DURATION,
            );
            info!("Boot boost: CPU floor {boot_freq}KHz for {BOOT_BOOST_DURATION:?}");
        }

        Self {
            catalog,
            debouncer: Mutex::new(debouncer),
            dispatcher: HintDispatcher::new(coordinator),
            controller,
            trace,
        }
    }

    pub fn catalog(&self) -> &FrequencyCatalog {
        &self.catalog
    }

    /// Entry for one hint event. The debounce check-and-update is atomic
    /// per hint type; acceptance is recorded whether or not the hint's
    /// payload later turns out unusable.
    pub fn power_hint(&self, hint: PowerHint, payload: Option<i64>) {
        let now_us = now_micros();
        if !self.debouncer.lock().unwrap().accept(hint, now_us) {
            return;
        }
        debug!("Accepted {} hint, payload={payload:?}", hint.name());

        match hint {
            PowerHint::SetProfile => self.profile_hint(payload),
            _ => self.dispatcher.dispatch(hint, payload, self.trace),
        }
    }

    fn profile_hint(&self, payload: Option<i64>) {
        let Some(raw) = payload else {
            debug!("profile hint without payload, skipping");
            return;
        };
        match PowerMode::from_persisted(raw) {
            Some(mode) => apply_profile_if_display_on(mode),
            None => error!("Invalid profile hint mode = {raw}"),
        }
    }

    pub fn set_interactive(&self, on: bool) {
        info!("setInteractive: {}", if on { "on" } else { "off" });
        self.controller.set_interactive(on);
    }

    /// No feature is currently supported; double-tap-to-wake is rejected
    /// by name, everything else as unknown.
    pub fn set_feature(&self, feature: i32, _state: i32) {
        match feature {
            FEATURE_DOUBLE_TAP_TO_WAKE => warn!("Double tap to wake is not supported"),
            _ => warn!("Error setting the feature, it doesn't exist {feature}"),
        }
    }
}
