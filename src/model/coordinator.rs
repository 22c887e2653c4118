use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
    path::PathBuf,
    sync::{Arc, Condvar, Mutex},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use log::debug;

use crate::{
    datasource::file_path::{
        QOS_CPU_FREQ_MAX, QOS_CPU_FREQ_MIN, QOS_EMC_FREQ_MIN, QOS_EXPIRY_THREAD, QOS_GPU_FREQ_MIN,
        QOS_ONLINE_CPUS_MAX, QOS_ONLINE_CPUS_MIN,
    },
    utils::file_operate::{rooted, sysfs_write},
};

/// Revert value for constraints without a meaningful default; the kernel
/// side treats it as "no constraint".
pub const QOS_DEFAULT_VALUE: i64 = -1;

pub const BOOST_PRIORITY: i32 = 35;

/// Boostable resources, each backed by one PM QoS node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    CpuFreqMin,
    CpuFreqMax,
    OnlineCpusMin,
    OnlineCpusMax,
    GpuFreqMin,
    EmcFreqMin,
}

impl Resource {
    pub fn node(self) -> &'static str {
        match self {
            Resource::CpuFreqMin => QOS_CPU_FREQ_MIN,
            Resource::CpuFreqMax => QOS_CPU_FREQ_MAX,
            Resource::OnlineCpusMin => QOS_ONLINE_CPUS_MIN,
            Resource::OnlineCpusMax => QOS_ONLINE_CPUS_MAX,
            Resource::GpuFreqMin => QOS_GPU_FREQ_MIN,
            Resource::EmcFreqMin => QOS_EMC_FREQ_MIN,
        }
    }
}

/// Identifier for an indefinite constraint, redeemed by `release`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstraintHandle(u64);

/// Timed/indefinite override service. Timed requests are fire-and-forget;
/// the implementation reverts each one after its duration unless a later
/// request for the same resource superseded it first (last-writer-wins).
pub trait ConstraintCoordinator: Send + Sync {
    fn request_timed(
        &self,
        resource: Resource,
        priority: i32,
        boosted: i64,
        default: i64,
        duration: Duration,
    );

    fn request_indefinite(
        &self,
        resource: Resource,
        priority: i32,
        boosted: i64,
        default: i64,
    ) -> ConstraintHandle;

    fn release(&self, handle: ConstraintHandle);
}

struct Expiry {
    deadline: Instant,
    seq: u64,
    resource: Resource,
    default: i64,
}

impl PartialEq for Expiry {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for Expiry {}

impl PartialOrd for Expiry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expiry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

struct IndefiniteConstraint {
    resource: Resource,
    boosted: i64,
    default: i64,
}

struct CoordState {
    next_seq: u64,
    /// seq of the request currently defining each resource's value
    active: HashMap<Resource, u64>,
    expiries: BinaryHeap<Reverse<Expiry>>,
    /// outstanding indefinite constraints, keyed by handle
    indefinite: HashMap<u64, IndefiniteConstraint>,
    shutdown: bool,
}

/// Newest outstanding indefinite constraint for a resource, if any. A timed
/// window that ends while such a constraint is alive falls back to it rather
/// than to the timed request's default.
fn newest_indefinite(state: &CoordState, resource: Resource) -> Option<(u64, i64)> {
    state
        .indefinite
        .iter()
        .filter(|(_, c)| c.resource == resource)
        .max_by_key(|(seq, _)| **seq)
        .map(|(seq, c)| (*seq, c.boosted))
}

struct Inner {
    state: Mutex<CoordState>,
    cv: Condvar,
    /// Prefix for node paths; only tests redirect this away from "/"
    root: Option<PathBuf>,
}

/// Coordinator writing boosted/reverted values straight to the QoS nodes.
/// A worker thread sleeps until the earliest pending deadline and reverts
/// expired constraints that are still the last writer for their resource.
/// All node writes happen under the state lock, so a revert can never land
/// after a strictly later request's boost.
pub struct QosWriter {
    inner: Arc<Inner>,
    worker: Option<thread::JoinHandle<()>>,
}

impl QosWriter {
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    #[cfg(test)]
    pub fn with_root(root: PathBuf) -> Result<Self> {
        Self::build(Some(root))
    }

    fn build(root: Option<PathBuf>) -> Result<Self> {
        let inner = Arc::new(Inner {
            state: Mutex::new(CoordState {
                next_seq: 0,
                active: HashMap::new(),
                expiries: BinaryHeap::new(),
                indefinite: HashMap::new(),
                shutdown: false,
            }),
            cv: Condvar::new(),
            root,
        });

        let worker_inner = inner.clone();
        let worker = thread::Builder::new()
            .name(QOS_EXPIRY_THREAD.to_string())
            .spawn(move || expiry_loop(&worker_inner))
            .with_context(|| "Failed to spawn QoS expiry thread")?;

        Ok(Self {
            inner,
            worker: Some(worker),
        })
    }
}

impl ConstraintCoordinator for QosWriter {
    fn request_timed(
        &self,
        resource: Resource,
        priority: i32,
        boosted: i64,
        default: i64,
        duration: Duration,
    ) {
        let deadline = Instant::now() + duration;
        {
            let mut state = self.inner.state.lock().unwrap();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.active.insert(resource, seq);
            state.expiries.push(Reverse(Expiry {
                deadline,
                seq,
                resource,
                default,
            }));
            write_node(&self.inner.root, resource, boosted);
        }
        debug!(
            "qos timed: {resource:?} prio={priority} boost={boosted} default={default} for {duration:?}"
        );
        self.inner.cv.notify_one();
    }

    fn request_indefinite(
        &self,
        resource: Resource,
        priority: i32,
        boosted: i64,
        default: i64,
    ) -> ConstraintHandle {
        let mut state = self.inner.state.lock().unwrap();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.active.insert(resource, seq);
        state.indefinite.insert(
            seq,
            IndefiniteConstraint {
                resource,
                boosted,
                default,
            },
        );
        write_node(&self.inner.root, resource, boosted);
        debug!("qos indefinite: {resource:?} prio={priority} boost={boosted}");
        ConstraintHandle(seq)
    }

    fn release(&self, handle: ConstraintHandle) {
        let mut state = self.inner.state.lock().unwrap();
        let Some(released) = state.indefinite.remove(&handle.0) else {
            debug!("release of unknown handle {handle:?}");
            return;
        };
        // Revert only if nothing newer took over the resource meanwhile
        if state.active.get(&released.resource) == Some(&handle.0) {
            match newest_indefinite(&state, released.resource) {
                Some((seq, boosted)) => {
                    state.active.insert(released.resource, seq);
                    write_node(&self.inner.root, released.resource, boosted);
                }
                None => {
                    state.active.remove(&released.resource);
                    write_node(&self.inner.root, released.resource, released.default);
                }
            }
        }
        debug!("qos released: {:?}", released.resource);
    }
}

impl Drop for QosWriter {
    fn drop(&mut self) {
        self.inner.state.lock().unwrap().shutdown = true;
        self.inner.cv.notify_one();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn expiry_loop(inner: &Inner) {
    let mut state = inner.state.lock().unwrap();
    loop {
        if state.shutdown {
            return;
        }

        let now = Instant::now();
        let mut reverted = false;
        while let Some(Reverse(next)) = state.expiries.peek() {
            if next.deadline > now {
                break;
            }
            let Some(Reverse(expired)) = state.expiries.pop() else {
                break;
            };
            if state.active.get(&expired.resource) == Some(&expired.seq) {
                match newest_indefinite(&state, expired.resource) {
                    Some((seq, boosted)) => {
                        state.active.insert(expired.resource, seq);
                        write_node(&inner.root, expired.resource, boosted);
                        debug!("qos expired: {:?} -> floor {boosted}", expired.resource);
                    }
                    None => {
                        state.active.remove(&expired.resource);
                        write_node(&inner.root, expired.resource, expired.default);
                        debug!("qos expired: {:?} -> {}", expired.resource, expired.default);
                    }
                }
            }
            reverted = true;
        }
        if reverted {
            continue;
        }

        let next_deadline = state.expiries.peek().map(|Reverse(e)| e.deadline);
        state = match next_deadline {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                inner.cv.wait_timeout(state, timeout).unwrap().0
            }
            None => inner.cv.wait(state).unwrap(),
        };
    }
}

fn write_node(root: &Option<PathBuf>, resource: Resource, value: i64) {
    sysfs_write(rooted(root, resource.node()), &value.to_string());
}

/// Recording stand-in for tests of callers that drive the coordinator.
#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Timed {
            resource: Resource,
            boosted: i64,
            default: i64,
            duration: Duration,
        },
        Indefinite {
            resource: Resource,
            boosted: i64,
        },
        Release(ConstraintHandle),
    }

    #[derive(Default)]
    pub struct RecordingCoordinator {
        pub calls: Mutex<Vec<Call>>,
        next_handle: Mutex<u64>,
    }

    impl RecordingCoordinator {
        pub fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut self.calls.lock().unwrap())
        }
    }

    impl ConstraintCoordinator for RecordingCoordinator {
        fn request_timed(
            &self,
            resource: Resource,
            _priority: i32,
            boosted: i64,
            default: i64,
            duration: Duration,
        ) {
            self.calls.lock().unwrap().push(Call::Timed {
                resource,
                boosted,
                default,
                duration,
            });
        }

        fn request_indefinite(
            &self,
            resource: Resource,
            _priority: i32,
            boosted: i64,
            _default: i64,
        ) -> ConstraintHandle {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Indefinite { resource, boosted });
            let mut next = self.next_handle.lock().unwrap();
            *next += 1;
            ConstraintHandle(*next)
        }

        fn release(&self, handle: ConstraintHandle) {
            self.calls.lock().unwrap().push(Call::Release(handle));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn test_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("powerhal_qos_{tag}"));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("dev")).unwrap();
        root
    }

    fn node_value(root: &PathBuf, resource: Resource) -> String {
        fs::read_to_string(root.join(resource.node().trim_start_matches('/'))).unwrap_or_default()
    }

    #[test]
    fn timed_request_boosts_then_reverts() {
        let root = test_root("timed");
        let writer = QosWriter::with_root(root.clone()).unwrap();

        writer.request_timed(
            Resource::CpuFreqMin,
            BOOST_PRIORITY,
            1530000,
            1044000,
            Duration::from_millis(40),
        );
        assert_eq!(node_value(&root, Resource::CpuFreqMin), "1530000");

        thread::sleep(Duration::from_millis(120));
        assert_eq!(node_value(&root, Resource::CpuFreqMin), "1044000");
    }

    #[test]
    fn later_request_supersedes_earlier_expiry() {
        let root = test_root("supersede");
        let writer = QosWriter::with_root(root.clone()).unwrap();

        writer.request_timed(
            Resource::OnlineCpusMin,
            BOOST_PRIORITY,
            4,
            2,
            Duration::from_millis(30),
        );
        writer.request_timed(
            Resource::OnlineCpusMin,
            BOOST_PRIORITY,
            3,
            1,
            Duration::from_millis(200),
        );

        // First window has lapsed, second is still active: its boost holds
        thread::sleep(Duration::from_millis(100));
        assert_eq!(node_value(&root, Resource::OnlineCpusMin), "3");

        thread::sleep(Duration::from_millis(180));
        assert_eq!(node_value(&root, Resource::OnlineCpusMin), "1");
    }

    #[test]
    fn indefinite_holds_until_released() {
        let root = test_root("indefinite");
        let writer = QosWriter::with_root(root.clone()).unwrap();

        let handle = writer.request_indefinite(
            Resource::CpuFreqMin,
            BOOST_PRIORITY,
            300000,
            QOS_DEFAULT_VALUE,
        );
        thread::sleep(Duration::from_millis(50));
        assert_eq!(node_value(&root, Resource::CpuFreqMin), "300000");

        writer.release(handle);
        assert_eq!(
            node_value(&root, Resource::CpuFreqMin),
            QOS_DEFAULT_VALUE.to_string()
        );
    }

    #[test]
    fn release_after_supersede_does_not_revert() {
        let root = test_root("release_superseded");
        let writer = QosWriter::with_root(root.clone()).unwrap();

        let handle = writer.request_indefinite(
            Resource::CpuFreqMin,
            BOOST_PRIORITY,
            300000,
            QOS_DEFAULT_VALUE,
        );
        writer.request_timed(
            Resource::CpuFreqMin,
            BOOST_PRIORITY,
            1224000,
            QOS_DEFAULT_VALUE,
            Duration::from_secs(5),
        );

        writer.release(handle);
        assert_eq!(node_value(&root, Resource::CpuFreqMin), "1224000");
    }

    #[test]
    fn timed_expiry_restores_outstanding_floor() {
        let root = test_root("floor_restore");
        let writer = QosWriter::with_root(root.clone()).unwrap();

        let floor = writer.request_indefinite(
            Resource::CpuFreqMin,
            BOOST_PRIORITY,
            300000,
            QOS_DEFAULT_VALUE,
        );
        writer.request_timed(
            Resource::CpuFreqMin,
            BOOST_PRIORITY,
            564000,
            QOS_DEFAULT_VALUE,
            Duration::from_millis(40),
        );
        assert_eq!(node_value(&root, Resource::CpuFreqMin), "564000");

        // The timed window lapses while the floor is still held
        thread::sleep(Duration::from_millis(120));
        assert_eq!(node_value(&root, Resource::CpuFreqMin), "300000");

        writer.release(floor);
        assert_eq!(
            node_value(&root, Resource::CpuFreqMin),
            QOS_DEFAULT_VALUE.to_string()
        );
    }
}
