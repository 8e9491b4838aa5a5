//! End-to-end consistency properties of the coordinator.

use std::time::Duration;

use ledger_mirror::{CallContext, CoordinatorConfig, ErrorKind, InitResult, Mirror};
use ledger_mirror_gateway::{ContractInterface, MemoryLedger};
use ledger_mirror_store::MemoryMirror;
use ledger_mirror_testkit::fixtures::{value, SqliteFixture, TestFixture};
use ledger_mirror_testkit::generators::{invalid_decimal_text, valid_uint256_text};
use proptest::prelude::*;

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn write_confirm_sync_converges(text in valid_uint256_text()) {
        let equal = block_on(async {
            let fixture = TestFixture::new();
            let c = &fixture.coordinator;
            let ctx = fixture.ctx();

            c.initialize(&ctx).await.unwrap();
            c.write(&ctx, &text).await.unwrap();
            fixture.ledger.confirm_pending();
            c.sync(&ctx).await.unwrap();
            c.check(&ctx).await.unwrap()
        });
        prop_assert!(equal);
    }

    #[test]
    fn malformed_write_never_reaches_gateway(text in invalid_decimal_text()) {
        let (kind, submits) = block_on(async {
            let fixture = TestFixture::new();
            let err = fixture.coordinator.write(&fixture.ctx(), &text).await.unwrap_err();
            (err.kind(), fixture.ledger.submit_count())
        });
        prop_assert_eq!(kind, ErrorKind::InvalidArgument);
        prop_assert_eq!(submits, 0);
    }
}

#[tokio::test]
async fn test_signed_slot_round_trip() {
    let abi = r#"[
        {"type":"function","name":"get","inputs":[],"outputs":[{"type":"int256"}]},
        {"type":"function","name":"set","inputs":[{"type":"int256"}],"outputs":[]}
    ]"#;
    let ledger = MemoryLedger::with_interface(ContractInterface::from_json(abi).unwrap());
    let fixture = TestFixture::with_parts(ledger, MemoryMirror::new(), CoordinatorConfig::default());
    let c = &fixture.coordinator;
    let ctx = fixture.ctx();

    c.initialize(&ctx).await.unwrap();
    c.write(&ctx, "-123456789012345678901234567890").await.unwrap();
    fixture.ledger.confirm_pending();

    c.sync(&ctx).await.unwrap();
    assert_eq!(fixture.mirrored().as_deref(), Some("-123456789012345678901234567890"));
    assert!(c.check(&ctx).await.unwrap());
}

#[tokio::test]
async fn test_initialize_twice_leaves_value() {
    let fixture = TestFixture::with_mirror_value("17");
    let ctx = fixture.ctx();

    for _ in 0..2 {
        assert_eq!(
            fixture.coordinator.initialize(&ctx).await.unwrap(),
            InitResult::AlreadyPresent
        );
    }
    assert_eq!(fixture.mirrored().as_deref(), Some("17"));
}

#[tokio::test]
async fn test_failed_read_keeps_mirror() {
    let fixture = TestFixture::with_mirror_value("5");
    fixture.ledger.set_value(8u64);
    fixture.ledger.fail_reads(Some("connection refused"));

    let err = fixture.coordinator.sync(&fixture.ctx()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GatewayUnavailable);
    assert_eq!(fixture.mirrored().as_deref(), Some("5"));
}

#[tokio::test]
async fn test_fresh_start_is_consistent() {
    let fixture = TestFixture::new();
    let c = &fixture.coordinator;
    let ctx = fixture.ctx();

    assert_eq!(c.initialize(&ctx).await.unwrap(), InitResult::Created);
    assert_eq!(c.sync(&ctx).await.unwrap(), value(0));
    assert!(c.check(&ctx).await.unwrap());
}

#[tokio::test]
async fn test_drift_detected() {
    let fixture = TestFixture::with_mirror_value("5");
    fixture.ledger.set_value(7u64);
    assert!(!fixture.coordinator.check(&fixture.ctx()).await.unwrap());
}

#[tokio::test]
async fn test_write_does_not_touch_mirror() {
    let fixture = TestFixture::with_mirror_value("0");
    fixture.ledger.set_auto_confirm(true);

    fixture.coordinator.write(&fixture.ctx(), "99").await.unwrap();
    assert_eq!(fixture.mirrored().as_deref(), Some("0"));
    assert_eq!(fixture.mirror.write_count(), 0);
    assert!(!fixture.coordinator.check(&fixture.ctx()).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_syncs_last_write_wins() {
    let fixture = TestFixture::with_mirror_value("0");
    fixture.ledger.script_reads(vec![value(11), value(22)]);

    let mut handles = Vec::new();
    for _ in 0..32 {
        let c = fixture.coordinator.clone();
        handles.push(tokio::spawn(async move {
            c.sync(&CallContext::background()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mirrored = fixture.mirrored().unwrap();
    assert!(mirrored == "11" || mirrored == "22", "got {}", mirrored);
    assert_eq!(fixture.mirror.write_count(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_syncs_on_sqlite() {
    let fixture = SqliteFixture::new();
    let ctx = CallContext::background();
    fixture.coordinator.initialize(&ctx).await.unwrap();
    fixture.ledger.script_reads(vec![value(3), value(4)]);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let c = fixture.coordinator.clone();
        handles.push(tokio::spawn(async move {
            c.sync(&CallContext::background()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mirrored = fixture.coordinator.mirror().read(&ctx).await.unwrap();
    assert!(mirrored == "3" || mirrored == "4", "got {}", mirrored);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_yields_timeout_without_write() {
    let fixture = TestFixture::with_config(CoordinatorConfig {
        call_timeout: Some(Duration::from_millis(100)),
    });
    let c = &fixture.coordinator;
    c.initialize(&CallContext::background()).await.unwrap();
    fixture.ledger.set_value(5u64);
    fixture.ledger.set_latency(Duration::from_secs(2));

    let err = c.sync(&c.context()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(fixture.mirrored().as_deref(), Some("0"));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_yields_cancelled_without_write() {
    let fixture = TestFixture::with_mirror_value("0");
    fixture.ledger.set_value(5u64);
    fixture.ledger.set_latency(Duration::from_secs(10));

    let ctx = CallContext::background();
    let token = ctx.cancellation().clone();
    let (result, ()) = tokio::join!(fixture.coordinator.sync(&ctx), async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
    });

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
    assert_eq!(fixture.mirrored().as_deref(), Some("0"));
    assert_eq!(fixture.mirror.write_count(), 0);
}

#[tokio::test]
async fn test_mirror_survives_restart() {
    let fixture = SqliteFixture::new();
    let ctx = CallContext::background();

    fixture.coordinator.initialize(&ctx).await.unwrap();
    fixture.ledger.set_value(31u64);
    fixture.coordinator.sync(&ctx).await.unwrap();

    let restarted = fixture.reopen();
    assert_eq!(restarted.initialize(&ctx).await.unwrap(), InitResult::AlreadyPresent);
    assert!(restarted.check(&ctx).await.unwrap());
}
