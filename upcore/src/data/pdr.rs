use parking_lot::Mutex;

/// Membership token linking one PDR into the related-QER index.  A PDR owns
/// exactly one of these per session; `UserplaneContext::rebind_pdr_qers`
/// re-registers it under the PDR's current QER id set.  The token never
/// implies ownership of any QER.
pub struct PdrLink {
    seid: u64,
    pdr_id: u16,
    // QER ids this token is currently registered under.
    bound: Mutex<Vec<u32>>,
}

impl PdrLink {
    pub fn new(seid: u64, pdr_id: u16) -> Self {
        Self {
            seid,
            pdr_id,
            bound: Mutex::new(Vec::new()),
        }
    }

    pub fn seid(&self) -> u64 {
        self.seid
    }

    pub fn pdr_id(&self) -> u16 {
        self.pdr_id
    }

    /// QER ids the owning PDR currently references.
    pub fn qer_ids(&self) -> Vec<u32> {
        self.bound.lock().clone()
    }

    pub(crate) fn replace_bound(&self, qer_ids: &[u32]) -> Vec<u32> {
        std::mem::replace(&mut *self.bound.lock(), qer_ids.to_vec())
    }
}
