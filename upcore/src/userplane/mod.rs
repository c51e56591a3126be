mod context;
mod hash_index;
mod notify;
mod qer_table;
mod related;
mod seid;
mod wred;

pub use context::{ContextTable, UserplaneContext};
pub use notify::NotificationBridge;
pub use seid::{SEID_U32_ID_HEX_LEN, SeidU32IdKey, seid_and_u32_id_key};
pub use wred::{WRED_CLASSES, WredProfile, build_wred_profile};
