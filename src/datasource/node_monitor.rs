use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use inotify::WatchMask;
use log::{debug, error, info, warn};

use crate::{
    datasource::file_path::{HINT_NODE, HINT_THREAD, INTERACTIVE_NODE, INTERACTIVE_THREAD},
    model::{hint::parse_command, plugin::PowerHal},
    utils::{
        file_operate::{sysfs_read, sysfs_write},
        inotify::NodeWatcher,
    },
};

/// Blocks on the hint node and feeds every written command into the HAL.
pub fn monitor_hints(hal: Arc<PowerHal>) -> Result<()> {
    info!("{HINT_THREAD} Start");

    ensure_node(HINT_NODE)?;
    let mut watcher = NodeWatcher::new()?;
    watcher.add(HINT_NODE, WatchMask::CLOSE_WRITE | WatchMask::MODIFY)?;

    loop {
        watcher.wait()?;

        let content = drain_node(HINT_NODE);
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some((feature, state)) = parse_feature_command(line) {
                hal.set_feature(feature, state);
                continue;
            }
            match parse_command(line) {
                Some((hint, payload)) => hal.power_hint(hint, payload),
                None => error!("Invalid power hint: {line}"),
            }
        }
    }
}

/// Blocks on the interactive node; `1`/`0` writes drive screen-on/off
/// transitions. Repeated writes of the same state are ignored.
pub fn monitor_interactive(hal: Arc<PowerHal>) -> Result<()> {
    info!("{INTERACTIVE_THREAD} Start");

    ensure_node(INTERACTIVE_NODE)?;
    let mut watcher = NodeWatcher::new()?;
    watcher.add(INTERACTIVE_NODE, WatchMask::CLOSE_WRITE | WatchMask::MODIFY)?;

    let mut last_state: Option<bool> = None;
    loop {
        watcher.wait()?;

        let on = match sysfs_read(INTERACTIVE_NODE).trim() {
            "" => continue,
            "1" | "true" => true,
            "0" | "false" => false,
            other => {
                warn!("Invalid interactive state: {other}");
                continue;
            }
        };

        if last_state == Some(on) {
            debug!("Interactive state unchanged, skipping");
            continue;
        }
        last_state = Some(on);
        hal.set_interactive(on);
    }
}

/// Read the node and truncate it, so clients that append instead of
/// truncate-write do not get earlier commands replayed on the next wake.
fn drain_node(path: &str) -> String {
    let content = sysfs_read(path);
    if !content.is_empty() {
        sysfs_write(path, "");
    }
    content
}

/// `feature <id> <state>` lines address the feature toggle instead of the
/// hint path.
fn parse_feature_command(line: &str) -> Option<(i32, i32)> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "feature" {
        return None;
    }
    let feature = parts.next()?.parse::<i32>().ok()?;
    let state = parts.next()?.parse::<i32>().ok()?;
    Some((feature, state))
}

fn ensure_node(path: &str) -> Result<()> {
    let path_ref = Path::new(path);
    if path_ref.exists() {
        return Ok(());
    }
    if let Some(parent) = path_ref.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path_ref, "").with_context(|| format!("Failed to create node: {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feature_commands() {
        assert_eq!(parse_feature_command("feature 1 0"), Some((1, 0)));
        assert_eq!(parse_feature_command("feature 7 1"), Some((7, 1)));
        assert_eq!(parse_feature_command("feature 1"), None);
        assert_eq!(parse_feature_command("interaction"), None);
    }

    #[test]
    fn draining_consumes_pending_commands() {
        let dir = std::env::temp_dir().join("powerhal_node_monitor_test");
        fs::create_dir_all(&dir).unwrap();
        let node = dir.join("hint");
        let node_str = node.to_str().unwrap();
        fs::write(&node, "interaction\nvsync 1\n").unwrap();

        assert_eq!(drain_node(node_str), "interaction\nvsync 1\n");
        assert_eq!(fs::read_to_string(&node).unwrap(), "");
        // A second wake with nothing written replays nothing
        assert_eq!(drain_node(node_str), "");
    }
}
