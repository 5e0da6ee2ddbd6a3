/// Property-based tests: whatever the Server does, replicas converge and
/// catch-up stays idempotent

use std::rc::Rc;

use proptest::prelude::*;
use serde_json::json;

use syncable_shared::{HostType, SyncConfig, SyncableCore, UpdateBatch};
use syncable_test::{counter_type, Harness};

#[derive(Clone, Debug)]
enum Op {
    Increment(i64),
    Label(String),
    Highlight,
    Settle,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-5i64..5).prop_map(Op::Increment),
        "[a-z]{0,4}".prop_map(Op::Label),
        Just(Op::Highlight),
        Just(Op::Settle),
    ]
}

proptest! {
    #[test]
    fn replicas_converge(ops in prop::collection::vec(op(), 0..40)) {
        let mut harness = Harness::new();
        let early = harness.add_client("alice");
        let late = harness.add_client("bob");
        let id = harness.create(early, "Counter");
        let late_session = harness.session(late);
        harness.server.share(&late_session, &id).unwrap();
        harness.mirror(early, &id);

        let mut expected_version = 0;
        for (index, op) in ops.iter().enumerate() {
            let core = harness.server.syncable_mut(&id).unwrap();
            match op {
                Op::Increment(by) => {
                    core.call("increment", vec![json!(by)]).unwrap();
                    expected_version += 1;
                }
                Op::Label(label) => {
                    if core.set("label", json!(label)).unwrap() {
                        expected_version += 1;
                    }
                }
                Op::Highlight => {
                    core.call("highlight", vec![]).unwrap();
                    expected_version += 1;
                }
                Op::Settle => {
                    harness.settle();
                }
            }
            if index == ops.len() / 2 {
                harness.mirror(late, &id);
            }
        }
        harness.settle();
        harness.mirror(late, &id);
        harness.settle();

        let server = harness.server.syncable_mut(&id).unwrap();
        prop_assert_eq!(server.version(), expected_version);
        let versions: Vec<u64> = server.log().iter().map(|entry| entry.version).collect();
        prop_assert_eq!(versions, (1..=expected_version).collect::<Vec<u64>>());
        let count = server.property("count").cloned();
        let label = server.property("label").cloned();

        for client in [early, late] {
            let replica = harness.client(client).syncable_mut(&id).unwrap();
            prop_assert_eq!(replica.version(), expected_version);
            prop_assert_eq!(replica.property("count").cloned(), count.clone());
            prop_assert_eq!(replica.property("label").cloned(), label.clone());
        }
    }

    #[test]
    fn catch_up_is_idempotent(
        ops in prop::collection::vec(op(), 1..30),
        replays in 1usize..4,
    ) {
        let kind = Rc::new(counter_type());
        let config = SyncConfig::default();
        let mut server = SyncableCore::new(kind.clone(), HostType::Server, &config);
        for op in &ops {
            match op {
                Op::Increment(by) => { server.call("increment", vec![json!(by)]).unwrap(); }
                Op::Label(label) => { server.set("label", json!(label)).unwrap(); }
                Op::Highlight => { server.call("highlight", vec![]).unwrap(); }
                Op::Settle => {}
            }
        }

        let mut replica = SyncableCore::with_id(kind, server.id().clone(), HostType::Client, &config);
        let batch = UpdateBatch {
            updates: server.entries_since(0).to_vec(),
            version: server.version(),
        };
        let applied = replica.apply_batch(&batch).unwrap();
        prop_assert_eq!(applied as u64, server.version());

        for _ in 0..replays {
            prop_assert_eq!(replica.apply_batch(&batch).unwrap(), 0);
        }

        // a suffix starting anywhere below the replica's version is also harmless
        let half = server.version() / 2;
        let suffix = UpdateBatch {
            updates: server.entries_since(half).to_vec(),
            version: server.version(),
        };
        prop_assert_eq!(replica.apply_batch(&suffix).unwrap(), 0);

        prop_assert_eq!(replica.version(), server.version());
        prop_assert_eq!(replica.property("count").cloned(), server.property("count").cloned());
        prop_assert_eq!(replica.property("label").cloned(), server.property("label").cloned());
    }
}
