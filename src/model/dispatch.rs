use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use log::debug;

use crate::{
    datasource::file_path::TRACE_MARKER,
    model::{
        coordinator::{
            BOOST_PRIORITY, ConstraintCoordinator, ConstraintHandle, QOS_DEFAULT_VALUE, Resource,
        },
        hint::PowerHint,
    },
    utils::file_operate::sysfs_write,
};

/// CPU floor held while vsync callbacks are active
pub const VSYNC_MIN_CPU_FREQ: i64 = 300_000;

/// One timed override issued when a hint is accepted.
#[derive(Debug, Clone, Copy)]
pub struct BoostAction {
    pub resource: Resource,
    pub boosted: i64,
    pub default: i64,
    pub duration: Duration,
}

// During interaction some CPU/GPU/EMC floor is needed for smooth animation;
// the values are board constants, not catalog-derived.
const INTERACTION_ACTIONS: [BoostAction; 4] = [
    BoostAction {
        resource: Resource::OnlineCpusMin,
        boosted: 4,
        default: 2,
        duration: Duration::from_millis(500),
    },
    BoostAction {
        resource: Resource::CpuFreqMin,
        boosted: 1_530_000,
        default: 1_044_000,
        duration: Duration::from_millis(500),
    },
    BoostAction {
        resource: Resource::GpuFreqMin,
        boosted: 852_000,
        default: 72_000,
        duration: Duration::from_millis(500),
    },
    BoostAction {
        resource: Resource::EmcFreqMin,
        boosted: 396_000,
        default: QOS_DEFAULT_VALUE,
        duration: Duration::from_secs(2),
    },
];

// Force exactly 4 cores online while an app launch is in flight
const LAUNCH_BOOST_ACTIONS: [BoostAction; 1] = [BoostAction {
    resource: Resource::OnlineCpusMin,
    boosted: 4,
    default: 4,
    duration: Duration::from_secs(2),
}];

const CPU_BOOST_ACTIONS: [BoostAction; 4] = [
    BoostAction {
        resource: Resource::CpuFreqMin,
        boosted: 1_224_000,
        default: QOS_DEFAULT_VALUE,
        duration: Duration::from_millis(1500),
    },
    BoostAction {
        resource: Resource::OnlineCpusMin,
        boosted: 4,
        default: 2,
        duration: Duration::from_millis(1500),
    },
    BoostAction {
        resource: Resource::GpuFreqMin,
        boosted: 852_000,
        default: 180_000,
        duration: Duration::from_millis(1500),
    },
    BoostAction {
        resource: Resource::EmcFreqMin,
        boosted: 792_000,
        default: QOS_DEFAULT_VALUE,
        duration: Duration::from_millis(1500),
    },
];

const AUDIO_ACTIONS: [BoostAction; 1] = [BoostAction {
    resource: Resource::CpuFreqMin,
    boosted: 564_000,
    default: QOS_DEFAULT_VALUE,
    duration: Duration::from_secs(1),
}];

// Ceilings drop for a second: max frequency to 564MHz, cores to one
const LOW_POWER_ACTIONS: [BoostAction; 2] = [
    BoostAction {
        resource: Resource::CpuFreqMax,
        boosted: 564_000,
        default: 1_044_000,
        duration: Duration::from_secs(1),
    },
    BoostAction {
        resource: Resource::OnlineCpusMax,
        boosted: 1,
        default: 2,
        duration: Duration::from_secs(1),
    },
];

/// The hint-to-override mapping as inspectable data. Vsync and profile
/// hints carry no timed overrides; vsync toggles the indefinite floor below
/// and profile switching goes through the governor module.
pub fn actions_for(hint: PowerHint) -> &'static [BoostAction] {
    match hint {
        PowerHint::Interaction => &INTERACTION_ACTIONS,
        PowerHint::LaunchBoost => &LAUNCH_BOOST_ACTIONS,
        PowerHint::CpuBoost => &CPU_BOOST_ACTIONS,
        PowerHint::Audio => &AUDIO_ACTIONS,
        PowerHint::LowPower => &LOW_POWER_ACTIONS,
        PowerHint::Vsync | PowerHint::SetProfile => &[],
    }
}

/// Issues each accepted hint's overrides to the coordinator in table order
/// and owns the one non-timed constraint, the vsync CPU floor.
pub struct HintDispatcher {
    coordinator: Arc<dyn ConstraintCoordinator>,
    vsync_floor: Mutex<Option<ConstraintHandle>>,
}

impl HintDispatcher {
    pub fn new(coordinator: Arc<dyn ConstraintCoordinator>) -> Self {
        Self {
            coordinator,
            vsync_floor: Mutex::new(None),
        }
    }

    pub fn dispatch(&self, hint: PowerHint, payload: Option<i64>, trace: bool) {
        if hint == PowerHint::Vsync {
            let Some(enable) = payload else {
                debug!("vsync hint without payload, skipping");
                return;
            };
            self.set_vsync_floor(enable != 0);
            return;
        }

        if hint == PowerHint::Interaction && trace {
            sysfs_write(TRACE_MARKER, "Start POWER_HINT_INTERACTION\n");
        }

        for action in actions_for(hint) {
            self.coordinator.request_timed(
                action.resource,
                BOOST_PRIORITY,
                action.boosted,
                action.default,
                action.duration,
            );
        }
    }

    /// Presence of the handle is the sole truth of "floor outstanding":
    /// enabling twice issues one request, disabling without one is a no-op.
    fn set_vsync_floor(&self, enable: bool) {
        let mut floor = self.vsync_floor.lock().unwrap();
        match (enable, floor.take()) {
            (true, None) => {
                *floor = Some(self.coordinator.request_indefinite(
                    Resource::CpuFreqMin,
                    BOOST_PRIORITY,
                    VSYNC_MIN_CPU_FREQ,
                    QOS_DEFAULT_VALUE,
                ));
                debug!("vsync CPU floor set to {VSYNC_MIN_CPU_FREQ}");
            }
            (false, Some(handle)) => {
                self.coordinator.release(handle);
                debug!("vsync CPU floor released");
            }
            (true, outstanding @ Some(_)) => *floor = outstanding,
            (false, None) => {}
        }
    }
}
