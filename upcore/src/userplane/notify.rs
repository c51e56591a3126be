use crate::PdrLink;

/// Consumer interface told when a rule change affects the PDRs referencing
/// it.  Callbacks run synchronously inside the triggering operation, once
/// per linked PDR, in bucket-scan order (no semantic ordering).
/// Implementations must not reenter the registry's write path and must not
/// retain the rule being deleted.
pub trait NotificationBridge: Send + Sync {
    fn on_qer_updated(&self, pdr: &PdrLink);
    fn on_qer_deleted(&self, pdr: &PdrLink);
}
