use std::collections::BTreeMap;

use serde_json::{json, Value};

use syncable_shared::{MethodError, Protocol, RecreateError, SyncableCore, SyncableType};

/// `Counter` and `Chat`, registered under their names.
pub fn protocol() -> Protocol {
    Protocol::builder()
        .add_type(counter_type())
        .add_type(chat_type())
        .build()
}

fn count_of(core: &mut SyncableCore) -> i64 {
    core.property("count").and_then(Value::as_i64).unwrap_or(0)
}

/// A number only the Server moves, plus a label both sides may write.
///
/// * `increment(by?)` sync: adds `by` (default 1) and returns the new count
/// * `highlight()` client: marks the replica highlighted, runs on clients only
/// * `reset()` upstream: puts the count back to zero
/// * `refuse()` upstream: always fails
pub fn counter_type() -> SyncableType {
    SyncableType::builder("Counter")
        .property("count", json!(0))
        .client_writable_property("label", json!(""))
        .sync_method("increment", |core, args| {
            let by = match args.first() {
                None => 1,
                Some(value) => value
                    .as_i64()
                    .ok_or_else(|| MethodError::invalid_arguments("increment", "expected an integer"))?,
            };
            let count = count_of(core) + by;
            core.set_property("count", json!(count));
            Ok(json!(count))
        })
        .client_method("highlight", |core, _| {
            core.set_property("highlighted", json!(true));
            Ok(Value::Null)
        })
        .upstream_method("reset", |core, _| {
            core.set_property("count", json!(0));
            Ok(json!("reset"))
        })
        .upstream_method("refuse", |_, _| Err(MethodError::body("refused")))
        .build()
}

/// A room with a `messages` and a `notices` queue. Rooms whose id starts
/// with `keep` can be recreated after eviction.
///
/// * `say(text)` sync: pushes onto `messages`
/// * `announce(text)` sync: pushes onto `notices`
/// * `wipe()` sync: clears `messages`
pub fn chat_type() -> SyncableType {
    SyncableType::builder("Chat")
        .property("topic", json!("general"))
        .property_with("participants", || json!([]))
        .sync_method("say", |core, args| {
            core.push_queue("messages", args.to_vec());
            Ok(Value::Null)
        })
        .sync_method("announce", |core, args| {
            core.push_queue("notices", args.to_vec());
            Ok(Value::Null)
        })
        .sync_method("wipe", |core, _| {
            core.clear_queue("messages");
            Ok(Value::Null)
        })
        .recreate(|_, handshake| {
            if handshake.id.as_str().starts_with("keep") {
                let mut state = BTreeMap::new();
                state.insert("topic".to_string(), json!("restored"));
                Ok(Some(state))
            } else if handshake.id.as_str().starts_with("broken") {
                Err(RecreateError("backing store unavailable".to_string()))
            } else {
                Ok(None)
            }
        })
        .build()
}
