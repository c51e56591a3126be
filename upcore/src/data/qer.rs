use crate::userplane::WredProfile;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering::Relaxed};

/// Uplink/downlink bit rate pair in kbit/s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitRate {
    pub dl: u64,
    pub ul: u64,
}

/// Rate parameters supplied by the control plane when creating or modifying
/// a rule.
#[derive(Clone, Copy, Debug, Default)]
pub struct QerValues {
    pub qfi: u8,
    pub gbr: BitRate,
    pub mbr: BitRate,
}

/// One QoS enforcement rule.  Identity is fixed at insertion; rate
/// parameters are updated in place by the control plane and read
/// concurrently by the packet path.
pub struct Qer {
    pub seid: u64,
    pub id: u32,
    qfi: AtomicU8,
    gbr: RateCell,
    mbr: RateCell,
    wred: RwLock<Option<WredProfile>>,
    queue_slot: Mutex<Option<usize>>,
}

struct RateCell {
    dl: AtomicU64,
    ul: AtomicU64,
}

impl RateCell {
    fn new(rate: BitRate) -> Self {
        Self {
            dl: AtomicU64::new(rate.dl),
            ul: AtomicU64::new(rate.ul),
        }
    }

    fn get(&self) -> BitRate {
        BitRate {
            dl: self.dl.load(Relaxed),
            ul: self.ul.load(Relaxed),
        }
    }

    fn set(&self, rate: BitRate) {
        self.dl.store(rate.dl, Relaxed);
        self.ul.store(rate.ul, Relaxed);
    }
}

impl Qer {
    pub fn new(seid: u64, id: u32, values: QerValues) -> Self {
        Self {
            seid,
            id,
            qfi: AtomicU8::new(values.qfi),
            gbr: RateCell::new(values.gbr),
            mbr: RateCell::new(values.mbr),
            wred: RwLock::new(None),
            queue_slot: Mutex::new(None),
        }
    }

    pub fn qfi(&self) -> u8 {
        self.qfi.load(Relaxed)
    }

    pub fn gbr(&self) -> BitRate {
        self.gbr.get()
    }

    pub fn mbr(&self) -> BitRate {
        self.mbr.get()
    }

    /// Apply a control-plane modification in place.  A concurrent reader may
    /// observe the old or the new value of each field independently.
    pub fn apply(&self, values: QerValues) {
        self.qfi.store(values.qfi, Relaxed);
        self.gbr.set(values.gbr);
        self.mbr.set(values.mbr);
    }

    /// Current shaping profile, if one has been configured.
    pub fn wred_profile(&self) -> Option<WredProfile> {
        self.wred.read().clone()
    }

    pub(crate) fn set_wred_profile(&self, profile: WredProfile) {
        *self.wred.write() = Some(profile);
    }

    pub(crate) fn queue_slot(&self) -> Option<usize> {
        *self.queue_slot.lock()
    }

    pub(crate) fn assign_queue_slot(&self, slot: usize) {
        *self.queue_slot.lock() = Some(slot);
    }

    pub(crate) fn take_queue_slot(&self) -> Option<usize> {
        self.queue_slot.lock().take()
    }
}

impl std::fmt::Display for Qer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:#x},{})", self.seid, self.id)
    }
}
