/// Tests for refused links, Syncable recreation and replicas rejecting
/// updates they cannot apply

use std::{collections::BTreeMap, rc::Rc};

use serde_json::json;

use syncable_client::{ClientConfig, ClientError, ErrorEvent};
use syncable_server::ServerConfig;
use syncable_shared::{
    DrySyncable, HostType, ProcessUpdateError, SyncConfig, SyncableCore, SyncableId,
    PROCESS_UPDATES_EVENT, SYNCABLE_NOT_FOUND,
};
use syncable_test::{assert_caught_up, assert_replica_synced, chat_type, counter_type, protocol, Harness};

fn init() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn dry_of(type_name: &str, id: &str) -> DrySyncable {
    dry_at(type_name, id, 0)
}

fn dry_at(type_name: &str, id: &str, version: u64) -> DrySyncable {
    DrySyncable {
        type_name: type_name.to_string(),
        id: SyncableId::from(id),
        version,
        state: BTreeMap::new(),
        queues: BTreeMap::new(),
    }
}

#[test]
fn missing_syncable_gets_one_error_and_one_destroy() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");

    let id = harness.client(client).undry(dry_of("Counter", "ghost")).unwrap();
    harness.pump();

    let link = harness.link(client, &id).unwrap();
    assert_eq!(link.submits(), 1);
    assert_eq!(link.destroy_calls(), 1);
    assert!(link.is_destroyed());
    assert!(harness.link_key(client, &id).is_none());

    let mut events = harness.settle();
    let errors: Vec<_> = events[client].read::<ErrorEvent>().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, id);
    assert_eq!(errors[0].1.code, SYNCABLE_NOT_FOUND);
    assert!(!harness.client(client).contains(&id));
}

#[test]
fn not_found_replica_can_be_mirrored_again() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");

    let id = harness.client(client).undry(dry_of("Counter", "late")).unwrap();
    harness.pump();
    assert!(!harness.client(client).contains(&id));

    let core = SyncableCore::with_id(
        Rc::new(counter_type()),
        id.clone(),
        HostType::Server,
        &SyncConfig::default(),
    );
    let session = harness.session(client);
    harness.server.insert(&session, core).unwrap();
    harness.server.syncable_mut(&id).unwrap().set("label", json!("here")).unwrap();

    // the dead replica is gone, so this opens a fresh link
    harness.mirror(client, &id);
    harness.settle();

    assert!(!harness.link(client, &id).unwrap().is_destroyed());
    assert_replica_synced!(harness, client, &id, "label");
    assert_caught_up!(harness, client, &id);
}

#[test]
fn syncable_is_not_reachable_from_foreign_session() {
    init();
    let mut harness = Harness::new();
    let alice = harness.add_client("alice");
    let mallory = harness.add_client("mallory");
    let id = harness.create(alice, "Counter");

    harness.mirror(mallory, &id);

    assert!(harness.link(mallory, &id).unwrap().is_destroyed());
    assert_eq!(harness.server.link_count(&id), 0);

    let mut events = harness.settle();
    assert!(events[mallory].read::<ErrorEvent>().all(|(_, message)| message.is_not_found()));
}

#[test]
fn evicted_syncable_is_recreated_on_link() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");

    let id = harness.client(client).undry(dry_of("Chat", "keep-7")).unwrap();
    harness.pump();

    assert!(harness.link_key(client, &id).is_some());
    assert!(!harness.link(client, &id).unwrap().is_destroyed());
    assert_eq!(harness.server.link_count(&id), 1);

    let core = harness.server.syncable_mut(&id).unwrap();
    assert_eq!(core.property("topic"), Some(&json!("restored")));
    assert_eq!(core.version(), 1);

    // the restored state reaches the replica through the log
    harness.settle();
    assert_replica_synced!(harness, client, &id, "topic");
    assert_caught_up!(harness, client, &id);

    // the recreated instance replicates like any other
    let core = harness.server.syncable_mut(&id).unwrap();
    core.call("say", vec![json!("back")]).unwrap();
    harness.settle();
    let replica = harness.client(client).syncable(&id).unwrap();
    assert_eq!(replica.version(), 2);
}

#[test]
fn recreation_refuses_replicas_past_version_zero() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");

    let id = harness.client(client).undry(dry_at("Chat", "keep-3", 3)).unwrap();
    harness.pump();

    let link = harness.link(client, &id).unwrap();
    assert_eq!(link.destroy_calls(), 1);
    assert!(!harness.client(client).contains(&id));

    // rebuilt all the same; a fresh snapshot of it can be mirrored
    assert_eq!(harness.server.link_count(&id), 0);
    {
        let core = harness.server.syncable_mut(&id).unwrap();
        core.set_property("pinned", json!("rules"));
        core.set_property("topic", json!("d"));
    }

    harness.mirror(client, &id);
    harness.settle();

    assert_replica_synced!(harness, client, &id, "pinned");
    assert_replica_synced!(harness, client, &id, "topic");
    assert_caught_up!(harness, client, &id);
}

#[test]
fn handshake_ahead_of_the_log_is_refused() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.server.syncable_mut(&id).unwrap().call("increment", vec![]).unwrap();

    harness
        .client(client)
        .undry(dry_at("Counter", id.as_str(), 5))
        .unwrap();
    harness.pump();

    assert!(harness.link(client, &id).unwrap().is_destroyed());
    assert_eq!(harness.server.link_count(&id), 0);
    assert!(!harness.client(client).contains(&id));

    let mut events = harness.settle();
    let errors: Vec<_> = events[client].read::<ErrorEvent>().collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.is_not_found());
}

#[test]
fn recreation_yielding_nothing_or_failing_is_a_miss() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");

    let nothing = harness.client(client).undry(dry_of("Chat", "gone-1")).unwrap();
    let failing = harness.client(client).undry(dry_of("Chat", "broken-1")).unwrap();
    harness.pump();

    for id in [&nothing, &failing] {
        let link = harness.link(client, id).unwrap();
        assert_eq!(link.submits(), 1);
        assert_eq!(link.destroy_calls(), 1);
        assert!(harness.server.syncable(id).is_none());
    }
}

#[test]
fn recreation_can_be_disabled() {
    init();
    let config = ServerConfig {
        recreate_missing: false,
        ..ServerConfig::default()
    };
    let mut harness = Harness::with_configs(config, ClientConfig::default(), protocol());
    let client = harness.add_client("alice");

    let id = harness.client(client).undry(dry_of("Chat", "keep-1")).unwrap();
    harness.pump();

    assert!(harness.link(client, &id).unwrap().is_destroyed());
    assert!(harness.server.syncable(&id).is_none());
}

#[test]
fn hosted_syncable_is_not_recreated_for_another_session() {
    init();
    let mut harness = Harness::new();
    let alice = harness.add_client("alice");
    let mallory = harness.add_client("mallory");

    let core = SyncableCore::with_id(
        Rc::new(chat_type()),
        SyncableId::from("keep-2"),
        HostType::Server,
        &SyncConfig::default(),
    );
    let alice_session = harness.session(alice);
    let id = harness.server.insert(&alice_session, core).unwrap();

    harness.client(mallory).undry(dry_of("Chat", "keep-2")).unwrap();
    harness.pump();

    assert!(harness.link(mallory, &id).unwrap().is_destroyed());
    assert_eq!(harness.server.syncable_count(), 1);
}

#[test]
fn unknown_update_kind_is_rejected_before_mutation() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    let payload = json!({
        "updates": [
            {"version": 1, "kind": "set", "args": ["label", "first"]},
            {"version": 2, "kind": "teleport", "args": ["label", "second"]},
        ],
        "version": 2,
    });
    let err = harness
        .client(client)
        .receive_event(&id, PROCESS_UPDATES_EVENT, payload)
        .unwrap_err();

    match err {
        ClientError::ProcessUpdate(ProcessUpdateError::UnknownUpdate { kind, version }) => {
            assert_eq!(kind, "teleport");
            assert_eq!(version, 2);
        }
        other => panic!("expected an unknown update, got {:?}", other),
    }

    let replica = harness.client(client).syncable(&id).unwrap();
    assert_eq!(replica.version(), 1);
    assert_eq!(replica.state().get("label"), Some(&json!("first")));
}

#[test]
fn batch_with_gap_is_rejected() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    let payload = json!({
        "updates": [{"version": 3, "kind": "set", "args": ["label", "late"]}],
        "version": 3,
    });
    let err = harness
        .client(client)
        .receive_event(&id, PROCESS_UPDATES_EVENT, payload)
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::ProcessUpdate(ProcessUpdateError::VersionGap { local: 0, received: 3 })
    ));
}

#[test]
fn undry_of_unknown_type_fails() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");

    let err = harness.client(client).undry(dry_of("Spaceship", "x")).unwrap_err();
    assert!(matches!(err, ClientError::Syncable(_)));
    assert_eq!(harness.client(client).syncable_count(), 0);
}

#[test]
fn failed_connect_leaves_no_replica() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");

    harness.refuse_connections(client, true);
    let dry = harness.server.dry(&id).unwrap();
    let err = harness.client(client).undry(dry).unwrap_err();

    assert!(matches!(err, ClientError::Link(_)));
    assert!(!harness.client(client).contains(&id));
}

#[test]
fn undry_reuses_existing_replica() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);
    harness.client(client).syncable_mut(&id).unwrap().set("label", json!("local")).unwrap();

    let dry = harness.server.dry(&id).unwrap();
    let again = harness.client(client).undry(dry).unwrap();

    assert_eq!(again, id);
    assert_eq!(harness.client(client).syncable_count(), 1);
    assert_eq!(
        harness.client(client).syncable(&id).unwrap().state().get("label"),
        Some(&json!("local"))
    );
}

#[test]
fn removing_a_session_closes_its_links_and_drops_orphans() {
    init();
    let mut harness = Harness::new();
    let alice = harness.add_client("alice");
    let bob = harness.add_client("bob");

    let private = harness.create(alice, "Counter");
    let shared = harness.create(alice, "Counter");
    let bob_session = harness.session(bob);
    harness.server.share(&bob_session, &shared).unwrap();

    harness.mirror(alice, &private);
    harness.mirror(alice, &shared);
    harness.mirror(bob, &shared);
    assert_eq!(harness.server.link_count(&shared), 2);

    let alice_session = harness.session(alice);
    harness.server.remove_session(&alice_session);

    assert_eq!(harness.link(alice, &private).unwrap().destroy_calls(), 1);
    assert_eq!(harness.link(alice, &shared).unwrap().destroy_calls(), 1);
    assert_eq!(harness.link(bob, &shared).unwrap().destroy_calls(), 0);

    assert!(harness.server.syncable(&private).is_none());
    assert!(harness.server.syncable(&shared).is_some());
    assert_eq!(harness.server.syncable_count(), 1);
    assert_eq!(harness.server.link_count(&shared), 1);

    harness.server.syncable_mut(&shared).unwrap().call("increment", vec![]).unwrap();
    harness.settle();

    assert_caught_up!(harness, bob, &shared);
    assert_eq!(harness.link(alice, &shared).unwrap().submits(), 0);
}
