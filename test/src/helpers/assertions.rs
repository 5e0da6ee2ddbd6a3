/// Assert that a replica's property matches the Server's copy
#[macro_export]
macro_rules! assert_replica_synced {
    ($harness:expr, $client:expr, $id:expr, $key:expr) => {
        let expected = $harness
            .server
            .syncable_mut($id)
            .and_then(|core| core.property($key).cloned());
        let actual = $harness
            .client($client)
            .syncable_mut($id)
            .and_then(|core| core.property($key).cloned());
        assert_eq!(
            actual, expected,
            "Property `{}` of {} diverged between Server and client {}",
            $key, $id, $client
        );
    };
}

/// Assert that a replica reached the Server's version
#[macro_export]
macro_rules! assert_caught_up {
    ($harness:expr, $client:expr, $id:expr) => {
        let expected = $harness.server.syncable($id).map(|core| core.version());
        let actual = $harness.client($client).syncable($id).map(|core| core.version());
        assert_eq!(
            actual, expected,
            "Client {} is not caught up on {}",
            $client, $id
        );
    };
}
