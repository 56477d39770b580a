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
use pretty_assertions::assert_eq;
use serde_json::json;
use techhaus::domain::*;
use techhaus::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn write_json(root: &std::path::Path, bucket: &str, key: &str, value: &serde_json::Value) {
    let path = root.join(bucket).join(key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec(value).unwrap()).unwrap();
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test(tokio::test)]
async fn test_reads_objects_from_bucket_directories() {
    let tempdir = tempfile::tempdir().unwrap();
    write_json(
        tempdir.path(),
        "activetix",
        "datalakehouse/customer/customer.json",
        &json!([{"id": 1, "name": "Alice"}]),
    );

    let catalog = CatalogBuilder::new()
        .add_value(LocalStoreConfig::new(tempdir.path()))
        .add::<ObjectStoreRegistryLocalFs>()
        .add::<ObjectStoreReaderImpl>()
        .build();

    let reader = catalog.get_one::<dyn ObjectStoreReader>().unwrap();

    let table = reader
        .read_table(
            &ObjectLocation::new("activetix", "datalakehouse/customer/customer.json"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(table.num_rows(), 1);
    assert_eq!(table.value(0, "name"), Some(&json!("Alice")));

    let res = reader
        .read_table(&ObjectLocation::new("activetix", "datalakehouse/missing.json"), None)
        .await;
    assert!(matches!(res, Err(ReadError::ObjectNotFound(_))), "{res:?}");
}

#[test_log::test]
fn test_stores_are_cached_per_bucket() {
    let tempdir = tempfile::tempdir().unwrap();
    std::fs::create_dir(tempdir.path().join("bucket-a")).unwrap();

    let registry = ObjectStoreRegistryLocalFs::new(Arc::new(LocalStoreConfig::new(tempdir.path())));

    let a1 = registry.get_store("bucket-a").unwrap();
    let a2 = registry.get_store("bucket-a").unwrap();

    assert!(Arc::ptr_eq(&a1, &a2));
}

#[test_log::test]
fn test_rejects_missing_and_escaping_buckets() {
    let tempdir = tempfile::tempdir().unwrap();

    let registry = ObjectStoreRegistryLocalFs::new(Arc::new(LocalStoreConfig::new(tempdir.path())));

    assert!(registry.get_store("missing").is_err());
    assert!(registry.get_store("..").is_err());
    assert!(registry.get_store("a/b").is_err());
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
