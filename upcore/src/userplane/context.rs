use super::notify::NotificationBridge;
use super::qer_table::QerIdTable;
use super::related::RelatedQerTable;
use super::wred::build_wred_profile;
use crate::{Config, PdrLink, Qer, QerValues};
use anyhow::{Result, bail, ensure};
use crossbeam_epoch::{Guard, pin};
use dashmap::DashMap;
use index_pool::IndexPool;
use parking_lot::Mutex;
use slog::{Logger, info, o};
use std::sync::Arc;

/// Per-device owner of the rule indices.  Every entry and membership link
/// lives and dies with its context; both tables share one bucket count.
pub struct UserplaneContext {
    qer_id_table: QerIdTable,
    related_qer_table: RelatedQerTable,
    // Serializes control-plane mutations.  Packet-path reads never take it.
    write_lock: Mutex<()>,
    shaped_queues: Mutex<IndexPool>,
    max_shaped_queues: usize,
    logger: Logger,
}

impl UserplaneContext {
    pub fn new(config: &Config, logger: Logger) -> Self {
        // At least one bucket.
        let hash_size = config.hash_table_size.max(1);
        Self {
            qer_id_table: QerIdTable::new(hash_size),
            related_qer_table: RelatedQerTable::new(hash_size),
            write_lock: Mutex::new(()),
            shaped_queues: Mutex::new(IndexPool::new()),
            max_shaped_queues: config.max_shaped_queues,
            logger,
        }
    }

    /// Packet-path lookup of a rule.  Lock-free; the returned reference
    /// stays valid for the guard's lifetime even if the rule is deleted
    /// concurrently.
    pub fn find_qer<'g>(&'g self, seid: u64, qer_id: u32, guard: &'g Guard) -> Option<&'g Qer> {
        self.qer_id_table.find(seid, qer_id, guard)
    }

    /// Add a rule and configure its shaping profile.  Fails if the identity
    /// already exists or no shaping queue slot is free.
    pub fn create_qer(
        &self,
        seid: u64,
        qer_id: u32,
        values: QerValues,
        config_time: u64,
    ) -> Result<()> {
        let _write = self.write_lock.lock();
        let guard = pin();
        ensure!(
            self.qer_id_table.find(seid, qer_id, &guard).is_none(),
            "QER {qer_id} already exists in session {seid:#x}"
        );
        let qer = Qer::new(seid, qer_id, values);
        self.configure_wred(&qer, config_time)?;
        info!(self.logger, "Created QER {qer}");
        self.qer_id_table.insert(qer, &guard);
        Ok(())
    }

    /// Apply a control-plane modification: update the rule's parameters in
    /// place, rebuild its shaping profile, and notify the owner of every PDR
    /// that references it.
    pub fn modify_qer(
        &self,
        seid: u64,
        qer_id: u32,
        values: QerValues,
        config_time: u64,
        bridge: &dyn NotificationBridge,
    ) -> Result<()> {
        let _write = self.write_lock.lock();
        let guard = pin();
        let Some(qer) = self.qer_id_table.find(seid, qer_id, &guard) else {
            bail!("QER {qer_id} not found in session {seid:#x}");
        };
        qer.apply(values);
        self.configure_wred(qer, config_time)?;
        self.qer_updated(qer, bridge);
        Ok(())
    }

    /// Propagate a parameter change to the owner of every PDR referencing
    /// this rule.  Does not itself mutate the rule.
    pub fn qer_updated(&self, qer: &Qer, bridge: &dyn NotificationBridge) {
        let guard = pin();
        for pdr in self.related_qer_table.related(qer.seid, qer.id, &guard) {
            bridge.on_qer_updated(pdr);
        }
    }

    /// Delete a rule: unlink it, tell the owner of each referencing PDR, and
    /// hand the entry to the collector.  Deleting an absent rule is a no-op
    /// and reports false.
    pub fn delete_qer(&self, seid: u64, qer_id: u32, bridge: &dyn NotificationBridge) -> bool {
        let _write = self.write_lock.lock();
        let guard = pin();
        let Some(qer) = self.qer_id_table.find(seid, qer_id, &guard) else {
            return false;
        };
        if let Some(slot) = qer.take_queue_slot() {
            let _ = self.shaped_queues.lock().return_id(slot);
        }
        self.qer_id_table.remove(seid, qer_id, &guard);
        for pdr in self.related_qer_table.related(seid, qer_id, &guard) {
            bridge.on_qer_deleted(pdr);
        }
        info!(self.logger, "Deleted QER ({seid:#x},{qer_id})");
        true
    }

    /// Collect ids of PDRs referencing `qer`, up to `out.len()`.  Returns
    /// the number written; a full buffer means there may be more.
    pub fn referencing_pdr_ids(&self, qer: &Qer, out: &mut [u16]) -> usize {
        let guard = pin();
        let mut n = 0;
        for pdr in self.related_qer_table.related(qer.seid, qer.id, &guard) {
            if n == out.len() {
                break;
            }
            out[n] = pdr.pdr_id();
            n += 1;
        }
        n
    }

    /// Re-register a PDR's membership token under its current QER id set,
    /// replacing the previous set in one step.
    pub fn rebind_pdr_qers(&self, link: &Arc<PdrLink>, qer_ids: &[u32]) {
        let _write = self.write_lock.lock();
        let guard = pin();
        self.related_qer_table.rebind(link, qer_ids, &guard);
    }

    fn configure_wred(&self, qer: &Qer, config_time: u64) -> Result<()> {
        if qer.queue_slot().is_none() {
            let slot = self.shaped_queues.lock().new_id();
            if slot >= self.max_shaped_queues {
                let _ = self.shaped_queues.lock().return_id(slot);
                bail!("No shaping queue slots available");
            }
            qer.assign_queue_slot(slot);
        }
        let profile = build_wred_profile(qer.gbr(), qer.mbr(), qer.qfi(), qer.id, config_time);
        qer.set_wred_profile(profile);
        Ok(())
    }
}

/// Registry of live device contexts, keyed by device name.
#[derive(Clone, Default)]
pub struct ContextTable(Arc<DashMap<String, Arc<UserplaneContext>>>);

impl ContextTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a context for a device.  Fails if the name is
    /// taken.
    pub fn add(
        &self,
        name: &str,
        config: &Config,
        logger: &Logger,
    ) -> Result<Arc<UserplaneContext>> {
        ensure!(!self.0.contains_key(name), "Device {name} already registered");
        let context = Arc::new(UserplaneContext::new(
            config,
            logger.new(o!("dev" => name.to_string())),
        ));
        self.0.insert(name.to_string(), context.clone());
        Ok(context)
    }

    pub fn get(&self, name: &str) -> Option<Arc<UserplaneContext>> {
        self.0.get(name).map(|context| context.clone())
    }

    /// Unregister a device.  Its entries are reclaimed once the last holder
    /// of the context drops it; in-flight readers finish on stale data.
    pub fn remove(&self, name: &str) -> bool {
        self.0.remove(name).is_some()
    }
}
