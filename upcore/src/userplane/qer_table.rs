use super::hash_index::HashIndex;
use super::seid::seid_and_u32_id_key;
use crate::Qer;
use crossbeam_epoch::Guard;

/// Primary per-device QER index, keyed by (SEID, rule id).
pub(crate) struct QerIdTable(HashIndex<Qer>);

impl QerIdTable {
    pub fn new(hash_size: usize) -> Self {
        Self(HashIndex::new(hash_size))
    }

    /// Packet-path lookup: lock-free and allocation-free.  Full identity is
    /// compared within the bucket; the first exact match wins.
    pub fn find<'g>(&'g self, seid: u64, qer_id: u32, guard: &'g Guard) -> Option<&'g Qer> {
        let key = seid_and_u32_id_key(seid, qer_id);
        let bucket = self.0.bucket_of(&key);
        self.0
            .iter(bucket, guard)
            .find(|qer| qer.seid == seid && qer.id == qer_id)
    }

    /// Link a new rule at its bucket head.  Identity uniqueness is the
    /// caller's contract.
    pub fn insert(&self, qer: Qer, guard: &Guard) {
        let key = seid_and_u32_id_key(qer.seid, qer.id);
        let bucket = self.0.bucket_of(&key);
        self.0.insert(bucket, qer, guard);
    }

    /// Unlink a rule and schedule its reclamation.  Removing a rule that was
    /// already unlinked is a no-op.
    pub fn remove(&self, seid: u64, qer_id: u32, guard: &Guard) -> bool {
        let key = seid_and_u32_id_key(seid, qer_id);
        let bucket = self.0.bucket_of(&key);
        self.0
            .remove_if(bucket, |qer| qer.seid == seid && qer.id == qer_id, guard)
    }
}
