use std::path::PathBuf;

use log::{info, warn};

use crate::{
    datasource::{
        file_path::{AVP_BOOST_SCLK, INPUT_CLASS_DIR},
        system_state::{battery_saver_enabled, system_power_mode},
    },
    model::governor::{PowerMode, apply_profile_at, select_interactive_mode},
    utils::file_operate::{node_exists, node_writable, rooted, sysfs_read, sysfs_write},
};

/// A configured logical input device and the kernel index it resolved to.
/// Unresolved devices stay configured but are skipped on every transition.
#[derive(Debug, Clone)]
pub struct InputDeviceBinding {
    pub name: String,
    pub dev_id: Option<u32>,
}

/// Handles interactive (screen-on/off) transitions: AVP boost flag, input
/// device enable state, and the governor profile switch.
pub struct InteractiveController {
    devices: Vec<InputDeviceBinding>,
    /// Prefix for node paths; only tests redirect this away from "/"
    root: Option<PathBuf>,
}

impl InteractiveController {
    /// Resolves each configured name against the enumerated input devices,
    /// scanning in ascending index order. The mapping is fixed for the
    /// process lifetime.
    pub fn new(input_names: &[String]) -> Self {
        let devices = resolve_bindings(input_names, |idx| {
            let path = format!("{INPUT_CLASS_DIR}/input{idx}/name");
            if node_exists(&path) {
                Some(sysfs_read(&path))
            } else {
                None
            }
        });

        for binding in &devices {
            match binding.dev_id {
                Some(id) => info!("Input device {} resolved to input{id}", binding.name),
                None => warn!("Input device {} not found, will be skipped", binding.name),
            }
        }

        Self {
            devices,
            root: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_bindings(devices: Vec<InputDeviceBinding>, root: Option<PathBuf>) -> Self {
        Self { devices, root }
    }

    pub fn set_interactive(&self, on: bool) {
        let state = if on { "1" } else { "0" };

        sysfs_write(rooted(&self.root, AVP_BOOST_SCLK), state);

        for binding in &self.devices {
            let Some(id) = binding.dev_id else {
                continue;
            };
            let path = rooted(&self.root, &format!("{INPUT_CLASS_DIR}/input{id}/enabled"));
            if !node_writable(&path) {
                continue;
            }
            if on {
                info!("Enabling input device:{id}");
            } else {
                info!("Disabling input device:{id}");
            }
            sysfs_write(&path, state);
        }

        let mode = if on {
            select_interactive_mode(system_power_mode(), battery_saver_enabled())
        } else {
            PowerMode::NonInteractive
        };
        apply_profile_at(&self.root, mode);
    }
}

/// Walk enumerated device names in ascending index order until every
/// configured name is matched or enumeration ends.
fn resolve_bindings(
    wanted: &[String],
    mut enumerate: impl FnMut(u32) -> Option<String>,
) -> Vec<InputDeviceBinding> {
    let mut bindings: Vec<InputDeviceBinding> = wanted
        .iter()
        .map(|name| InputDeviceBinding {
            name: name.clone(),
            dev_id: None,
        })
        .collect();

    let mut matched = 0;
    let mut idx = 0;
    while matched < bindings.len() {
        let Some(enumerated) = enumerate(idx) else {
            break;
        };
        let enumerated = enumerated.trim();
        for binding in &mut bindings {
            if binding.dev_id.is_none() && binding.name == enumerated {
                binding.dev_id = Some(idx);
                matched += 1;
            }
        }
        idx += 1;
    }

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_names_to_ascending_indices() {
        let enumerated = ["gpio-keys", "touch\n", "raydium_ts"];
        let bindings = resolve_bindings(&names(&["raydium_ts", "touch"]), |idx| {
            enumerated.get(idx as usize).map(|s| s.to_string())
        });
        assert_eq!(bindings[0].dev_id, Some(2));
        assert_eq!(bindings[1].dev_id, Some(1));
    }

    #[test]
    fn unmatched_names_stay_unresolved() {
        let enumerated = ["gpio-keys"];
        let bindings = resolve_bindings(&names(&["touch_fusion"]), |idx| {
            enumerated.get(idx as usize).map(|s| s.to_string())
        });
        assert_eq!(bindings[0].dev_id, None);
    }

    #[test]
    fn stops_scanning_once_all_matched() {
        let mut highest_probed = 0u32;
        let enumerated = ["touch", "raydium_ts", "gpio-keys", "joystick"];
        let bindings = resolve_bindings(&names(&["touch", "raydium_ts"]), |idx| {
            highest_probed = highest_probed.max(idx);
            enumerated.get(idx as usize).map(|s| s.to_string())
        });
        assert_eq!(bindings[0].dev_id, Some(0));
        assert_eq!(bindings[1].dev_id, Some(1));
        assert!(highest_probed <= 1);
    }

    #[test]
    fn first_matching_index_wins() {
        let enumerated = ["touch", "touch"];
        let bindings = resolve_bindings(&names(&["touch"]), |idx| {
            enumerated.get(idx as usize).map(|s| s.to_string())
        });
        assert_eq!(bindings[0].dev_id, Some(0));
    }

    #[test]
    fn empty_config_resolves_nothing() {
        let bindings = resolve_bindings(&[], |_| panic!("should not enumerate"));
        assert!(bindings.is_empty());
    }

    #[test]
    fn interactive_transitions_drive_devices_and_profile() {
        use std::fs;

        let root = std::env::temp_dir().join("powerhal_interactive_test");
        let _ = fs::remove_dir_all(&root);
        let enabled = root.join("sys/class/input/input3/enabled");
        fs::create_dir_all(enabled.parent().unwrap()).unwrap();
        fs::write(&enabled, "1").unwrap();
        let avp = root.join("sys/devices/platform/host1x/nvavp/boost_sclk");
        fs::create_dir_all(avp.parent().unwrap()).unwrap();
        let gov = root.join("sys/devices/system/cpu/cpufreq/interactive");
        fs::create_dir_all(&gov).unwrap();

        let controller = InteractiveController::from_bindings(
            vec![
                InputDeviceBinding {
                    name: "touch".to_string(),
                    dev_id: Some(3),
                },
                InputDeviceBinding {
                    name: "touch_fusion".to_string(),
                    dev_id: None,
                },
            ],
            Some(root.clone()),
        );

        controller.set_interactive(false);
        assert_eq!(fs::read_to_string(&enabled).unwrap(), "0");
        assert_eq!(fs::read_to_string(&avp).unwrap(), "0");
        // Screen-off always lands on the terminal profile row
        assert_eq!(
            fs::read_to_string(gov.join("hispeed_freq")).unwrap(),
            "420000"
        );
        assert_eq!(fs::read_to_string(gov.join("timer_rate")).unwrap(), "300000");

        controller.set_interactive(true);
        assert_eq!(fs::read_to_string(&enabled).unwrap(), "1");
        assert_eq!(fs::read_to_string(&avp).unwrap(), "1");
        // Every interactive row uses the fast timer
        assert_eq!(fs::read_to_string(gov.join("timer_rate")).unwrap(), "20000");
    }
}
