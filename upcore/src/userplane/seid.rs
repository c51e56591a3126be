/// Length of the canonical key: 8-byte SEID and 4-byte rule id as hex.
pub const SEID_U32_ID_HEX_LEN: usize = 24;

pub type SeidU32IdKey = [u8; SEID_U32_ID_HEX_LEN];

/// Render (SEID, rule id) into the fixed-width hex key used by both
/// per-device hash tables.  The same encoding covers QER identities and
/// related-QER registrations, so one hash function serves both tables.
pub fn seid_and_u32_id_key(seid: u64, id: u32) -> SeidU32IdKey {
    let mut raw = [0u8; 12];
    raw[..8].copy_from_slice(&seid.to_be_bytes());
    raw[8..].copy_from_slice(&id.to_be_bytes());
    let mut key = [0u8; SEID_U32_ID_HEX_LEN];
    hex::encode_to_slice(raw, &mut key).expect("key buffer sized for 12 bytes");
    key
}

#[test]
fn key_is_fixed_width_hex() {
    let key = seid_and_u32_id_key(0x1234, 0xab);
    assert_eq!(&key, b"0000000000001234000000ab");
}

#[test]
fn distinct_identities_make_distinct_keys() {
    assert_ne!(seid_and_u32_id_key(1, 2), seid_and_u32_id_key(2, 1));
    assert_ne!(seid_and_u32_id_key(0x0102, 3), seid_and_u32_id_key(0x01, 0x0203));
}
