/// Tests for `sync`, `client` and `upstream` method dispatch on both sides

use serde_json::json;

use syncable_client::{ClientCall, ResponseEvent, UpstreamError};
use syncable_shared::{
    Dispatch, HandshakeConfig, MethodError, RequestId, UpstreamResponse, UPSTREAM_METHOD_EVENT,
};
use syncable_test::{assert_caught_up, assert_replica_synced, Harness, LinkPacket, LocalLinkPair};

fn init() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

#[test]
fn sync_method_replays_to_identical_state() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    let result = harness
        .server
        .syncable_mut(&id)
        .unwrap()
        .call("increment", vec![json!(5)])
        .unwrap();
    assert_eq!(result, Dispatch::Returned(json!(5)));

    // one `call` entry; the write inside the body is not logged again
    let core = harness.server.syncable(&id).unwrap();
    assert_eq!(core.version(), 1);
    assert_eq!(core.log().get(1).unwrap().args, vec![json!("increment"), json!(5)]);

    harness.settle();

    assert_replica_synced!(harness, client, &id, "count");
    assert_caught_up!(harness, client, &id);
}

#[test]
fn sync_method_on_replica_is_local_only() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    let result = harness.client(client).call(&id, "increment", vec![]).unwrap();
    assert_eq!(result, ClientCall::Returned(json!(1)));
    harness.settle();

    let replica = harness.client(client).syncable(&id).unwrap();
    assert_eq!(replica.version(), 0);
    assert!(replica.log().is_empty());
    assert_eq!(harness.server.syncable(&id).unwrap().version(), 0);
    assert!(harness.link(client, &id).unwrap().take_to_server().is_empty());
}

#[test]
fn client_method_is_logged_not_run_on_server() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    let result = harness
        .server
        .syncable_mut(&id)
        .unwrap()
        .call("highlight", vec![])
        .unwrap();
    assert_eq!(result, Dispatch::Logged);

    let core = harness.server.syncable(&id).unwrap();
    assert_eq!(core.version(), 1);
    assert!(!core.state().contains_key("highlighted"));

    harness.settle();

    let replica = harness.client(client).syncable(&id).unwrap();
    assert_eq!(replica.state().get("highlighted"), Some(&json!(true)));
}

#[test]
fn client_method_on_replica_runs_body() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    let result = harness.client(client).call(&id, "highlight", vec![]).unwrap();
    assert_eq!(result, ClientCall::Returned(json!(null)));
    assert_eq!(
        harness.client(client).syncable(&id).unwrap().state().get("highlighted"),
        Some(&json!(true))
    );
}

#[test]
fn upstream_method_round_trips() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    harness.server.syncable_mut(&id).unwrap().call("increment", vec![]).unwrap();
    harness.settle();

    let call = harness.client(client).call(&id, "reset", vec![]).unwrap();
    let request_id = match call {
        ClientCall::Pending(request_id) => request_id,
        other => panic!("upstream call should be forwarded, got {:?}", other),
    };

    let mut events = harness.settle();
    let responses: Vec<_> = events[client].read::<ResponseEvent>().collect();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].request_id, request_id);
    assert_eq!(responses[0].result, Ok(json!("reset")));

    // the body ran on the server and its write replicates on the next pass
    harness.settle();
    assert_eq!(
        harness.server.syncable_mut(&id).unwrap().property("count"),
        Some(&json!(0))
    );
    assert_replica_synced!(harness, client, &id, "count");
}

#[test]
fn upstream_method_error_reaches_caller() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    harness.client(client).call(&id, "refuse", vec![]).unwrap();
    let mut events = harness.settle();

    let response = events[client].read::<ResponseEvent>().next().unwrap();
    match response.result {
        Err(UpstreamError::Remote { method, message }) => {
            assert_eq!(method, "refuse");
            assert!(message.contains("refused"));
        }
        other => panic!("expected a remote error, got {:?}", other),
    }
}

#[test]
fn only_upstream_methods_are_remotely_invocable() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");

    let pair = LocalLinkPair::new();
    let session = harness.session(client);
    let link_key = harness
        .server
        .handle_link(&session, pair.server_end(), HandshakeConfig::new("Counter", &id, 0))
        .unwrap();

    let request_id = RequestId::new(7);
    harness
        .server
        .receive_demand(&link_key, request_id, UPSTREAM_METHOD_EVENT, json!(["increment", []]))
        .unwrap();

    let packets = pair.take_to_client();
    assert_eq!(packets.len(), 1);
    let LinkPacket::Response { request_id: answered, payload } = &packets[0] else {
        panic!("expected a response, got {:?}", packets[0]);
    };
    assert_eq!(*answered, request_id);

    let response: UpstreamResponse = serde_json::from_value(payload.clone()).unwrap();
    assert!(response.into_result().is_err());

    // nothing ran and the link stays usable
    assert_eq!(harness.server.syncable(&id).unwrap().version(), 0);
    assert!(!pair.is_destroyed());
}

#[test]
fn unknown_method_is_rejected_on_both_sides() {
    init();
    let mut harness = Harness::new();
    let client = harness.add_client("alice");
    let id = harness.create(client, "Counter");
    harness.mirror(client, &id);

    let err = harness
        .server
        .syncable_mut(&id)
        .unwrap()
        .call("explode", vec![])
        .unwrap_err();
    assert!(matches!(err, MethodError::UnknownMethod { .. }));

    assert!(harness.client(client).call(&id, "explode", vec![]).is_err());
}
