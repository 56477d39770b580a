// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use pretty_assertions::assert_eq;
use serde_json::json;
use techhaus_core::*;
use techhaus_warehouse_inmem::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn table_ref() -> TableRef {
    TableRef::new("proj", "raw", "raw_events")
}

fn schema() -> Vec<ColumnSchema> {
    vec![
        ColumnSchema::new("event_id", "INTEGER").required(),
        ColumnSchema::new("event_name", "STRING"),
        ColumnSchema::new("start_date", "TIMESTAMP"),
    ]
}

fn rows(value: serde_json::Value) -> Vec<Record> {
    serde_json::from_value(value).unwrap()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_get_table() {
    let warehouse = WarehouseClientInMemory::new();
    warehouse.create_table(table_ref(), schema());

    let metadata = warehouse.get_table(&table_ref()).await.unwrap();
    assert_eq!(metadata.schema, schema());
    assert_eq!(metadata.num_rows, Some(0));

    let missing = TableRef::new("proj", "raw", "missing");
    assert!(matches!(
        warehouse.get_table(&missing).await,
        Err(GetTableError::NotFound(TableNotFoundError { table_ref })) if table_ref == missing
    ));
}

#[test_log::test(tokio::test)]
async fn test_load_replaces_content() {
    let warehouse = WarehouseClientInMemory::new();
    warehouse.create_table(table_ref(), schema());
    warehouse
        .append_rows(
            &table_ref(),
            rows(json!([
                {"event_id": 100, "event_name": "Old", "start_date": null},
                {"event_id": 101, "event_name": "Older", "start_date": null},
            ])),
        )
        .unwrap();

    let new_rows = rows(json!([
        {"event_id": 1, "event_name": "Concert", "start_date": "2024-01-01T20:00:00Z"},
    ]));

    let summary = warehouse
        .load_truncate(&table_ref(), &schema(), new_rows.clone())
        .await
        .unwrap();

    assert_eq!(summary.job_id, "job_1");
    assert_eq!(summary.output_rows, Some(1));
    assert_eq!(warehouse.rows(&table_ref()), Some(new_rows));
}

#[test_log::test(tokio::test)]
async fn test_load_rejects_invalid_rows_and_keeps_content() {
    let warehouse = WarehouseClientInMemory::new();
    warehouse.create_table(table_ref(), schema());

    let original = rows(json!([{"event_id": 1, "event_name": "A", "start_date": null}]));
    warehouse
        .load_truncate(&table_ref(), &schema(), original.clone())
        .await
        .unwrap();

    for (bad_rows, expected) in [
        (
            json!([{"event_id": null, "event_name": "A", "start_date": null}]),
            "missing required field: event_id",
        ),
        (
            json!([{"event_id": 1, "event_name": "A", "start_date": "tomorrow"}]),
            "cannot convert value \"tomorrow\" to TIMESTAMP for field start_date",
        ),
        (
            json!([{"event_id": 1, "unknown": 5}]),
            "no such field: unknown",
        ),
    ] {
        let err = warehouse
            .load_truncate(&table_ref(), &schema(), rows(bad_rows))
            .await
            .unwrap_err();

        match err {
            LoadJobError::Rejected(e) => {
                assert_eq!(e.reason.as_deref(), Some("invalid"));
                assert!(e.message.ends_with(expected), "message: {}", e.message);
            }
            LoadJobError::Internal(e) => panic!("Unexpected error: {e:?}"),
        }
    }

    assert_eq!(warehouse.rows(&table_ref()), Some(original));
}

#[test_log::test(tokio::test)]
async fn test_fail_next_load() {
    let warehouse = WarehouseClientInMemory::new();
    warehouse.create_table(table_ref(), schema());
    warehouse.fail_next_load("Quota exceeded");

    let err = warehouse
        .load_truncate(&table_ref(), &schema(), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LoadJobError::Rejected(e) if e.message == "Quota exceeded"));

    warehouse
        .load_truncate(&table_ref(), &schema(), Vec::new())
        .await
        .unwrap();
}
