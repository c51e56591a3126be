use crate::BitRate;

/// Number of priority classes per shaped queue.
pub const WRED_CLASSES: usize = 2;

/// Parameters handed to the external WRED queuing algorithm.  Derived from a
/// QER's rate parameters; it has no identity of its own and lives inside the
/// rule it was computed for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WredProfile {
    pub low_limit: [i64; WRED_CLASSES],
    pub high_limit: [i64; WRED_CLASSES],
    pub max_drop_prob: [i64; WRED_CLASSES],
    pub count: [i64; WRED_CLASSES],
    pub wq: i64,
    pub qfi: u8,
    pub queue_id: u32,
    pub last_update_time: u64,
}

/// Recompute the shaping profile for a rule.  Thresholds derive from the
/// downlink rates only; class 1 runs at half the class 0 threshold.
pub fn build_wred_profile(
    gbr: BitRate,
    mbr: BitRate,
    qfi: u8,
    queue_id: u32,
    config_time: u64,
) -> WredProfile {
    let low = bytes_per_interval(gbr.dl);
    let high = bytes_per_interval(mbr.dl);
    WredProfile {
        low_limit: [low, low / 2],
        high_limit: [high, high / 2],
        max_drop_prob: [5, 10], // 0.05 / 0.1
        count: [-1, -1],        // no samples yet
        wq: 2,                  // 0.002
        qfi,
        queue_id,
        last_update_time: config_time,
    }
}

// kbit/s scaled to bytes per 10ms scheduling interval, truncating at each
// step.
fn bytes_per_interval(rate_kbps: u64) -> i64 {
    (((rate_kbps * 1000) / 8) / 100) as i64
}

#[test]
fn profile_thresholds_from_downlink_rates() {
    let profile = build_wred_profile(
        BitRate { dl: 800, ul: 300 },
        BitRate { dl: 1600, ul: 600 },
        9,
        7,
        1234,
    );
    assert_eq!(profile.low_limit, [1000, 500]);
    assert_eq!(profile.high_limit, [2000, 1000]);
    assert_eq!(profile.max_drop_prob, [5, 10]);
    assert_eq!(profile.count, [-1, -1]);
    assert_eq!(profile.wq, 2);
    assert_eq!(profile.qfi, 9);
    assert_eq!(profile.queue_id, 7);
    assert_eq!(profile.last_update_time, 1234);
}

#[test]
fn thresholds_truncate_not_round() {
    // 7 kbit/s is 875 byte/s, 8.75 per interval, truncated to 8.
    let profile = build_wred_profile(BitRate { dl: 7, ul: 0 }, BitRate { dl: 9, ul: 0 }, 1, 1, 0);
    assert_eq!(profile.low_limit, [8, 4]);
    assert_eq!(profile.high_limit, [11, 5]);
}

#[test]
fn uplink_rates_do_not_affect_thresholds() {
    let a = build_wred_profile(BitRate { dl: 800, ul: 0 }, BitRate { dl: 1600, ul: 0 }, 1, 1, 0);
    let b = build_wred_profile(
        BitRate { dl: 800, ul: 9999 },
        BitRate { dl: 1600, ul: 9999 },
        1,
        1,
        0,
    );
    assert_eq!(a, b);
}
