// Thread names
#![allow(dead_code)]
pub const HINT_THREAD: &str = "HintWatcher";
pub const INTERACTIVE_THREAD: &str = "InteractiveWatcher";
pub const LOG_LEVEL_THREAD: &str = "LogLevelWatcher";
pub const QOS_EXPIRY_THREAD: &str = "QosExpiry";

// cpufreq discovery nodes
pub const SCALING_AVAILABLE_FREQS: &str =
    "/sys/devices/system/cpu/cpu0/cpufreq/scaling_available_frequencies";
pub const LP_CLUSTER_MAX_FREQ: &str =
    "/sys/devices/system/cpu/cpuquiet/tegra_cpuquiet/idle_top_freq";
pub const CPU0_MAX_FREQ: &str = "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";

// PM QoS constraint nodes, one per boostable resource
pub const QOS_CPU_FREQ_MIN: &str = "/dev/cpu_freq_min";
pub const QOS_CPU_FREQ_MAX: &str = "/dev/cpu_freq_max";
pub const QOS_ONLINE_CPUS_MIN: &str = "/dev/min_online_cpus";
pub const QOS_ONLINE_CPUS_MAX: &str = "/dev/max_online_cpus";
pub const QOS_GPU_FREQ_MIN: &str = "/dev/gpu_freq_min";
pub const QOS_EMC_FREQ_MIN: &str = "/dev/emc_freq_min";

// Interactive governor tunables live under this directory
pub const INTERACTIVE_GOV_DIR: &str = "/sys/devices/system/cpu/cpufreq/interactive";

// AVP clock boost flag, toggled on interactive transitions
pub const AVP_BOOST_SCLK: &str = "/sys/devices/platform/host1x/nvavp/boost_sclk";
pub const BACKLIGHT_BRIGHTNESS: &str = "/sys/class/backlight/pwm-backlight/brightness";
pub const INPUT_CLASS_DIR: &str = "/sys/class/input";
pub const TRACE_MARKER: &str = "/sys/kernel/debug/tracing/trace_marker";

// Daemon control and state nodes
pub const BOARD_CONFIG_FILE: &str = "/data/adb/powerhal/powerhal.toml";
pub const HINT_NODE: &str = "/data/adb/powerhal/hint";
pub const INTERACTIVE_NODE: &str = "/data/adb/powerhal/interactive";
pub const POWER_MODE_NODE: &str = "/data/adb/powerhal/power_mode";
pub const BATTERY_SAVER_NODE: &str = "/data/adb/powerhal/battery_saver";
pub const TRACE_ENABLE_NODE: &str = "/data/adb/powerhal/ftrace_enable";
pub const LOG_LEVEL_PATH: &str = "/data/adb/powerhal/log_level";
