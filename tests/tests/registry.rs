use anyhow::Result;
use upcore::{Config, ContextTable, pin};
use upcore_tests::framework::*;
use upcore_tests::RecordingBridge;

const SEID: u64 = 0x1122334455667788;

#[test]
fn insert_then_find_each_rule() -> Result<()> {
    let (context, _logger) = init();
    for id in 0..32u32 {
        context.create_qer(SEID, id, test_values(1, 800, 1600), 0)?;
        let guard = pin();
        let qer = context.find_qer(SEID, id, &guard).expect("rule just created");
        assert_eq!(qer.seid, SEID);
        assert_eq!(qer.id, id);
    }

    let guard = pin();
    assert!(context.find_qer(SEID, 99, &guard).is_none());
    assert!(context.find_qer(0x9999, 0, &guard).is_none());
    Ok(())
}

#[test]
fn duplicate_create_fails_and_keeps_original() -> Result<()> {
    let (context, _logger) = init();
    context.create_qer(SEID, 7, test_values(9, 800, 1600), 0)?;
    assert!(context.create_qer(SEID, 7, test_values(9, 100, 200), 0).is_err());

    let guard = pin();
    let qer = context.find_qer(SEID, 7, &guard).unwrap();
    assert_eq!(qer.gbr().dl, 800);
    assert_eq!(qer.qfi(), 9);
    Ok(())
}

#[test]
fn delete_is_idempotent() -> Result<()> {
    let (context, _logger) = init();
    let bridge = RecordingBridge::default();
    context.create_qer(SEID, 3, test_values(1, 800, 1600), 0)?;
    assert!(context.delete_qer(SEID, 3, &bridge));
    assert!(!context.delete_qer(SEID, 3, &bridge));

    let guard = pin();
    assert!(context.find_qer(SEID, 3, &guard).is_none());
    Ok(())
}

#[test]
fn modify_updates_parameters_and_profile() -> Result<()> {
    let (context, _logger) = init();
    let bridge = RecordingBridge::default();
    context.create_qer(SEID, 3, test_values(5, 800, 1600), 100)?;

    let guard = pin();
    let qer = context.find_qer(SEID, 3, &guard).unwrap();
    let profile = qer.wred_profile().expect("profile configured at creation");
    assert_eq!(profile.low_limit, [1000, 500]);
    assert_eq!(profile.high_limit, [2000, 1000]);
    assert_eq!(profile.queue_id, 3);
    assert_eq!(profile.last_update_time, 100);

    context.modify_qer(SEID, 3, test_values(5, 1600, 3200), 200, &bridge)?;
    assert_eq!(qer.gbr().dl, 1600);
    let profile = qer.wred_profile().unwrap();
    assert_eq!(profile.low_limit, [2000, 1000]);
    assert_eq!(profile.high_limit, [4000, 2000]);
    assert_eq!(profile.last_update_time, 200);

    assert!(
        context
            .modify_qer(SEID, 99, test_values(5, 1, 2), 300, &bridge)
            .is_err()
    );
    Ok(())
}

#[test]
fn shaping_queue_slots_are_bounded() -> Result<()> {
    let (context, _logger) = init_with_config(Config {
        hash_table_size: 16,
        max_shaped_queues: 2,
    });
    let bridge = RecordingBridge::default();
    context.create_qer(SEID, 1, test_values(1, 100, 200), 0)?;
    context.create_qer(SEID, 2, test_values(1, 100, 200), 0)?;
    assert!(context.create_qer(SEID, 3, test_values(1, 100, 200), 0).is_err());

    // A failed create leaves no entry behind.
    {
        let guard = pin();
        assert!(context.find_qer(SEID, 3, &guard).is_none());
    }

    // The pool recovers once a rule is deleted.
    assert!(context.delete_qer(SEID, 1, &bridge));
    context.create_qer(SEID, 4, test_values(1, 100, 200), 0)?;
    Ok(())
}

#[test]
fn context_table_registers_devices() -> Result<()> {
    let (_context, logger) = init();
    let devices = ContextTable::new();
    let dev = devices.add("upf0", &Config::default(), &logger)?;
    assert!(devices.add("upf0", &Config::default(), &logger).is_err());

    dev.create_qer(SEID, 1, test_values(1, 100, 200), 0)?;
    assert!(devices.get("upf0").is_some());
    assert!(devices.remove("upf0"));
    assert!(devices.get("upf0").is_none());
    assert!(!devices.remove("upf0"));
    Ok(())
}
