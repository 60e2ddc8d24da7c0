//! Supervised instances and the fleet they form.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
};

/// 1-based identifier of a supervised instance, in command-line order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u32);

impl InstanceId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared "should be running" signal of one instance.
///
/// Exactly two writers touch it: the instance's supervisor clears it when the
/// process fails, and the fleet monitor sets it again. Clones share the cell.
#[derive(Debug, Clone)]
pub struct ActivationFlag(Arc<AtomicBool>);

impl ActivationFlag {
    pub fn new(active: bool) -> Self {
        Self(Arc::new(AtomicBool::new(active)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Supervisor side: mark the instance as failed.
    pub fn deactivate(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Monitor side: mark the instance as wanted again.
    ///
    /// Returns `true` if the flag was cleared before this call.
    pub fn activate(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}

/// One supervised chat server instance.
#[derive(Debug, Clone)]
pub struct InstanceDescriptor {
    pub id: InstanceId,
    pub port: u16,
    pub flag: ActivationFlag,
    failures: Arc<AtomicU32>,
}

impl InstanceDescriptor {
    /// New instances start active.
    pub fn new(id: InstanceId, port: u16) -> Self {
        Self {
            id,
            port,
            flag: ActivationFlag::new(true),
            failures: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Count one more failure, returning the new total.
    pub fn record_failure(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Every instance tracked by the supervisor process.
///
/// Shared between the per-instance supervisors and the fleet monitor; the
/// descriptors themselves never change after construction.
#[derive(Debug, Clone)]
pub struct FleetState {
    instances: Vec<InstanceDescriptor>,
}

impl FleetState {
    /// One descriptor per port, numbered from 1.
    pub fn new(ports: &[u16]) -> Self {
        let instances = ports
            .iter()
            .zip(1..)
            .map(|(&port, id)| InstanceDescriptor::new(InstanceId::new(id), port))
            .collect();
        Self { instances }
    }

    pub fn instances(&self) -> &[InstanceDescriptor] {
        &self.instances
    }

    pub fn get(&self, id: InstanceId) -> Option<&InstanceDescriptor> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
