// ==========================================
// 拆单集成测试
// ==========================================
// 覆盖范围: 数量守恒、拆单序号递增、原单补命名、已排原单裁剪
// ==========================================

mod helpers;

use std::sync::Arc;

use garment_aps::api::{ApiError, ScheduleApi};
use garment_aps::app::InMemoryScheduleStore;
use garment_aps::config::SchedulingConfig;
use garment_aps::engine::ScheduleEventType;
use helpers::order_builder::{d, OrderBuilder, SnapshotBuilder};
use helpers::test_appliers::RecordingPublisher;
use test_helpers::assert_schedule_invariants;

fn setup() -> (Arc<InMemoryScheduleStore>, Arc<RecordingPublisher>, ScheduleApi) {
    let snapshot = SnapshotBuilder::new()
        .line("L1", 100)
        .order(
            OrderBuilder::new("o1")
                .po("PO-2001")
                .quantity(1000)
                .cut_issue(1000, 800)
                .build(),
        )
        .order(
            OrderBuilder::new("o2")
                .po("PO-3001")
                .scheduled_on("L1", &[(2, 100), (3, 100), (4, 50)])
                .build(),
        )
        .build();
    let store = Arc::new(InMemoryScheduleStore::new(snapshot));
    let publisher = Arc::new(RecordingPublisher::default());
    let api = ScheduleApi::new(store.clone(), SchedulingConfig::default())
        .with_event_publisher(publisher.clone());
    (store, publisher, api)
}

#[tokio::test]
async fn test_split_conserves_quantity() {
    let (store, publisher, api) = setup();
    let snapshot = store.snapshot().unwrap();

    let result = api.split_order(&snapshot, "o1", 300).await.unwrap();
    let sibling = result.sibling.expect("应返回新建子单");

    let after = store.snapshot().unwrap();
    let original = after.find_order("o1").unwrap();
    let created = after.find_order(&sibling.id).unwrap();

    assert_eq!(original.order_quantity + created.order_quantity, 1000);
    assert_eq!(original.cut_quantity + created.cut_quantity, 1000);
    assert_eq!(original.issue_quantity + created.issue_quantity, 800);
    assert_eq!(created.issue_quantity, 240);

    assert_eq!(original.po_number, "PO-2001 Split 0");
    assert_eq!(original.split_number, Some(0));
    assert_eq!(created.po_number, "PO-2001 Split 1");
    assert_eq!(created.split_number, Some(1));
    assert!(!created.is_scheduled());

    let events = publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, ScheduleEventType::OrderSplit);
    assert!(events[0].affected_orders.contains(&sibling.id));
}

#[tokio::test]
async fn test_successive_splits_number_sequentially() {
    let (store, _publisher, api) = setup();

    let first = api
        .split_order(&store.snapshot().unwrap(), "o1", 300)
        .await
        .unwrap();
    let first_id = first.sibling.unwrap().id;

    // 对子单再拆，序号继续递增
    let second = api
        .split_order(&store.snapshot().unwrap(), &first_id, 100)
        .await
        .unwrap();
    assert_eq!(second.plan.split_number, 2);
    assert_eq!(second.plan.sibling.po_number, "PO-2001 Split 2");

    let third = api
        .split_order(&store.snapshot().unwrap(), "o1", 200)
        .await
        .unwrap();
    assert_eq!(third.plan.split_number, 3);

    let after = store.snapshot().unwrap();
    let total: u32 = after
        .orders
        .iter()
        .filter(|o| o.resolved_base_po() == "PO-2001")
        .map(|o| o.order_quantity)
        .sum();
    assert_eq!(total, 1000);
    // 原单仍为 Split 0，不重复改名
    assert_eq!(after.find_order("o1").unwrap().po_number, "PO-2001 Split 0");
}

#[tokio::test]
async fn test_split_scheduled_order_trims_plan() {
    let (store, _publisher, api) = setup();

    api.split_order(&store.snapshot().unwrap(), "o2", 120)
        .await
        .unwrap();

    let after = store.snapshot().unwrap();
    let original = after.find_order("o2").unwrap();
    assert_eq!(original.order_quantity, 130);
    assert_eq!(original.production_on(d(2)), 100);
    assert_eq!(original.production_on(d(3)), 30);
    assert_eq!(original.plan_end_date, Some(d(3)));
    assert_schedule_invariants(&after);
}

#[tokio::test]
async fn test_invalid_split_quantity_is_rejected() {
    let (store, publisher, api) = setup();
    let snapshot = store.snapshot().unwrap();

    for quantity in [0, 1000, 5000] {
        let err = api.split_order(&snapshot, "o1", quantity).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "quantity={}", quantity);
    }
    assert_eq!(store.snapshot().unwrap(), snapshot);
    assert!(publisher.events().is_empty());
}
