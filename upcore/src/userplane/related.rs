use super::hash_index::HashIndex;
use super::seid::seid_and_u32_id_key;
use crate::PdrLink;
use crossbeam_epoch::Guard;
use std::sync::Arc;

/// One registration of a PDR's membership token under a QER id.
pub(crate) struct PdrAttachment {
    qer_id: u32,
    pdr: Arc<PdrLink>,
}

/// Reverse index answering "which PDRs reference QER X" without a scan of
/// all PDRs.  Keyed identically to the primary index; a PDR referencing N
/// QERs has N registrations sharing one token.
pub(crate) struct RelatedQerTable(HashIndex<PdrAttachment>);

impl RelatedQerTable {
    pub fn new(hash_size: usize) -> Self {
        Self(HashIndex::new(hash_size))
    }

    /// PDR tokens registered under (seid, qer_id), in bucket-scan order.
    pub fn related<'g>(
        &'g self,
        seid: u64,
        qer_id: u32,
        guard: &'g Guard,
    ) -> impl Iterator<Item = &'g PdrLink> {
        let key = seid_and_u32_id_key(seid, qer_id);
        let bucket = self.0.bucket_of(&key);
        self.0
            .iter(bucket, guard)
            .filter(move |att| att.qer_id == qer_id && att.pdr.seid() == seid)
            .map(|att| att.pdr.as_ref())
    }

    /// Re-register `link` under `qer_ids`, replacing whatever id set it was
    /// previously registered under.  An empty set leaves the token unlinked
    /// everywhere, which is the valid end state for a PDR that references no
    /// QER.
    pub fn rebind(&self, link: &Arc<PdrLink>, qer_ids: &[u32], guard: &Guard) {
        for old_id in link.replace_bound(qer_ids) {
            let key = seid_and_u32_id_key(link.seid(), old_id);
            let bucket = self.0.bucket_of(&key);
            self.0.remove_if(
                bucket,
                |att| att.qer_id == old_id && Arc::ptr_eq(&att.pdr, link),
                guard,
            );
        }
        for &qer_id in qer_ids {
            let key = seid_and_u32_id_key(link.seid(), qer_id);
            let bucket = self.0.bucket_of(&key);
            self.0.insert(
                bucket,
                PdrAttachment {
                    qer_id,
                    pdr: link.clone(),
                },
                guard,
            );
        }
    }
}
