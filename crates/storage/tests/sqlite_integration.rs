use storage::repository::Storage;

#[tokio::test]
async fn round_trips_state_entries_in_memory_db() {
    let storage = Storage::sqlite("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .unwrap();

    let key = "prep:dsa:completed:WIPRO";
    assert_eq!(storage.state.get(key).await.unwrap(), None);

    storage
        .state
        .put(key, r#"{"WIPRO|ARRAYS|Two Sum":true}"#)
        .await
        .unwrap();
    assert_eq!(
        storage.state.get(key).await.unwrap().as_deref(),
        Some(r#"{"WIPRO|ARRAYS|Two Sum":true}"#)
    );
}

#[tokio::test]
async fn put_overwrites_previous_value() {
    let storage = Storage::sqlite("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .unwrap();

    storage
        .state
        .put("prep:dsa:selected", "\"WIPRO\"")
        .await
        .unwrap();
    storage
        .state
        .put("prep:dsa:selected", "\"TCS\"")
        .await
        .unwrap();

    assert_eq!(
        storage
            .state
            .get("prep:dsa:selected")
            .await
            .unwrap()
            .as_deref(),
        Some("\"TCS\"")
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let url = "sqlite:file:memdb_migrate?mode=memory&cache=shared";
    let first = Storage::sqlite(url).await.unwrap();
    first.state.put("k", "v").await.unwrap();

    // A second Storage over the same live database re-runs the migrations.
    let second = Storage::sqlite(url).await.unwrap();
    assert_eq!(second.state.get("k").await.unwrap().as_deref(), Some("v"));
}
