// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use dill::CatalogBuilder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use pretty_assertions::assert_eq;
use serde_json::json;
use techhaus::domain::*;
use techhaus::testing::{ExtractLoadListenerCollecting, ObjectStoreRegistryFixed};
use techhaus::*;
use techhaus_warehouse_inmem::WarehouseClientInMemory;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

struct ExtractLoadHarness {
    store: Arc<InMemory>,
    warehouse: Arc<WarehouseClientInMemory>,
    listener: Arc<ExtractLoadListenerCollecting>,
    service: Arc<dyn ExtractLoadService>,
}

impl ExtractLoadHarness {
    fn new() -> Self {
        let store = Arc::new(InMemory::new());

        let catalog = CatalogBuilder::new()
            .add_value(ObjectStoreRegistryFixed::new().with_store("activetix", store.clone()))
            .bind::<dyn ObjectStoreRegistry, ObjectStoreRegistryFixed>()
            .add::<ObjectStoreReaderImpl>()
            .add::<WarehouseClientInMemory>()
            .add_value(ExtractLoadListenerCollecting::new())
            .bind::<dyn ExtractLoadListener, ExtractLoadListenerCollecting>()
            .add::<ExtractLoadServiceImpl>()
            .build();

        Self {
            store,
            warehouse: catalog.get_one().unwrap(),
            listener: catalog.get_one().unwrap(),
            service: catalog.get_one().unwrap(),
        }
    }

    async fn put_json(&self, key: &str, value: serde_json::Value) {
        self.store
            .put(
                &Path::from(key),
                PutPayload::from(serde_json::to_vec(&value).unwrap()),
            )
            .await
            .unwrap();
    }

    fn create_table(&self, entity: &EntitySpec, columns: &[(&str, &str)]) {
        self.warehouse.create_table(
            entity.table.clone(),
            columns
                .iter()
                .map(|(name, data_type)| ColumnSchema::new(*name, *data_type))
                .collect(),
        );
    }

    fn rows(&self, entity: &EntitySpec) -> serde_json::Value {
        serde_json::Value::Array(
            self.warehouse
                .rows(&entity.table)
                .unwrap()
                .into_iter()
                .map(serde_json::Value::Object)
                .collect(),
        )
    }
}

fn builtin(name: &str) -> EntitySpec {
    EntityCatalog::builtin().get(name).unwrap().clone()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_customers_are_cleaned_and_loaded() {
    let harness = ExtractLoadHarness::new();
    let customers = builtin("customers");

    harness.create_table(
        &customers,
        &[
            ("customer_code", "STRING"),
            ("birthday", "DATE"),
            ("nationality", "STRING"),
        ],
    );
    harness
        .put_json(
            &customers.source.key,
            json!([
                {"customer_code": "C1", "birthday": "1990-13-01", "nationality": "vietnam", "phone": "secret"},
                {"customer_code": "C2", "birthday": "1990-12-01", "nationality": "thailand", "phone": "secret"},
            ]),
        )
        .await;

    let result = harness.service.extract_load(&customers).await.unwrap();

    assert!(result.is_loaded());
    assert_eq!(result.number_of_rows, 2);
    assert_eq!(result.number_of_rows_loaded(), 2);
    assert_eq!(
        harness.rows(&customers),
        json!([
            {"customer_code": "C1", "birthday": null, "nationality": "VN"},
            {"customer_code": "C2", "birthday": "1990-12-01", "nationality": "thailand"},
        ])
    );
    assert_eq!(
        harness.listener.reports(),
        [RowCountReport {
            entity: "customers".to_string(),
            table_ref: customers.table.clone(),
            number_of_rows: 2,
            status: ExtractLoadStatus::Loaded,
        }]
    );
}

#[test_log::test(tokio::test)]
async fn test_login_keeps_latest_record_per_customer() {
    let harness = ExtractLoadHarness::new();
    let login = builtin("login");

    harness.create_table(
        &login,
        &[
            ("customer_code", "STRING"),
            ("created_at", "TIMESTAMP"),
            ("updated_at", "TIMESTAMP"),
        ],
    );
    harness
        .put_json(
            &login.source.key,
            json!([
                {"customer_code": "C1", "created_at": "2024-01-01 08:00:00", "updated_at": "2024-01-02 08:00:00"},
                {"customer_code": "C1", "created_at": "2024-01-01 08:00:00", "updated_at": "2024-01-03 08:00:00"},
                {"customer_code": null, "created_at": "2024-01-01 08:00:00", "updated_at": "2024-01-05 08:00:00"},
                {"customer_code": "C1", "created_at": "2024-01-01 08:00:00", "updated_at": "2024-01-01 08:00:00"},
            ]),
        )
        .await;

    let result = harness.service.extract_load(&login).await.unwrap();

    assert_eq!(result.number_of_rows, 1);
    assert_eq!(
        harness.rows(&login),
        json!([
            {"customer_code": "C1", "created_at": "2024-01-01T08:00:00Z", "updated_at": "2024-01-03T08:00:00Z"},
        ])
    );
}

#[test_log::test(tokio::test)]
async fn test_load_failure_is_reported_with_row_count() {
    let harness = ExtractLoadHarness::new();
    let orders = builtin("sale_orders");

    harness.create_table(&orders, &[("order_id", "INTEGER")]);
    harness
        .put_json(
            &orders.source.key,
            json!([{"order_id": 1}, {"order_id": 2}, {"order_id": 3}]),
        )
        .await;
    harness.warehouse.fail_next_load("Access Denied");

    let result = harness.service.extract_load(&orders).await.unwrap();

    assert!(!result.is_loaded());
    assert_eq!(result.number_of_rows, 3);
    assert_eq!(result.number_of_rows_loaded(), 0);

    match &result.outcome {
        LoadOutcome::Failed(e) => assert_eq!(e.rows_attempted, 3),
        LoadOutcome::Loaded(_) => panic!("Load was expected to fail"),
    }

    assert_eq!(
        harness.listener.reports(),
        [RowCountReport {
            entity: "sale_orders".to_string(),
            table_ref: orders.table.clone(),
            number_of_rows: 3,
            status: ExtractLoadStatus::LoadFailed,
        }]
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_table_aborts_task() {
    let harness = ExtractLoadHarness::new();
    let events = builtin("events");

    let res = harness.service.extract_load(&events).await;

    assert!(
        matches!(res, Err(ExtractLoadError::TableNotFound(ref e)) if e.table_ref == events.table),
        "{res:?}"
    );
    assert!(harness.listener.reports().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_missing_object_aborts_task() {
    let harness = ExtractLoadHarness::new();
    let events = builtin("events");
    harness.create_table(&events, &[("event_id", "INTEGER")]);

    let res = harness.service.extract_load(&events).await;

    assert!(
        matches!(res, Err(ExtractLoadError::Read(ReadError::ObjectNotFound(_)))),
        "{res:?}"
    );
}

#[test_log::test(tokio::test)]
async fn test_strict_datetime_failure_aborts_task_but_reports_rows() {
    let harness = ExtractLoadHarness::new();
    let events = builtin("events");

    harness.create_table(
        &events,
        &[
            ("event_id", "INTEGER"),
            ("event_name", "STRING"),
            ("event_type", "STRING"),
            ("start_date", "TIMESTAMP"),
            ("end_date", "TIMESTAMP"),
        ],
    );
    harness
        .put_json(
            &events.source.key,
            json!([
                {"event_id": 1, "event_name": "a", "event_type": "b", "start_date": "soon", "end_date": null},
                {"event_id": 2, "event_name": "c", "event_type": "d", "start_date": null, "end_date": null},
            ]),
        )
        .await;

    let res = harness.service.extract_load(&events).await;

    assert!(
        matches!(
            res,
            Err(ExtractLoadError::Cleaning {
                number_of_rows: 2,
                source: CleaningError::UnparsableDateTime(ref e),
            }) if e.column == "start_date" && e.row == 0
        ),
        "{res:?}"
    );
    assert_eq!(
        harness.listener.reports(),
        [RowCountReport {
            entity: "events".to_string(),
            table_ref: events.table.clone(),
            number_of_rows: 2,
            status: ExtractLoadStatus::Aborted,
        }]
    );
    assert_eq!(harness.rows(&events), json!([]));
}
