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

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn clean(rules: &[CleaningRule], input: serde_json::Value) -> serde_json::Value {
    let mut table = Table::from_records(serde_json::from_value(input).unwrap());
    apply_rules(rules, &mut table).unwrap();

    serde_json::Value::Array(
        table
            .into_records()
            .into_iter()
            .map(serde_json::Value::Object)
            .collect(),
    )
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test_log::test]
fn test_customers() {
    let rules = [
        CleaningRule::parse_datetime("birthday", OnParseError::Coerce),
        CleaningRule::replace("nationality", "vietnam", "VN"),
    ];

    assert_eq!(
        clean(
            &rules,
            json!([
                {"birthday": "1990-13-01", "nationality": "vietnam"},
                {"birthday": "1990-12-01", "nationality": "thailand"},
            ])
        ),
        json!([
            {"birthday": null, "nationality": "VN"},
            {"birthday": "1990-12-01T00:00:00Z", "nationality": "thailand"},
        ])
    );
}

#[test_log::test]
fn test_organizers() {
    let rules = [
        CleaningRule::title("merchant_name_en"),
        CleaningRule::dedupe(["merchant_id"], Keep::First),
    ];

    assert_eq!(
        clean(
            &rules,
            json!([
                {"merchant_id": 7, "merchant_name_en": "acme corp"},
                {"merchant_id": 7, "merchant_name_en": "ACME CORP"},
            ])
        ),
        json!([{"merchant_id": 7, "merchant_name_en": "Acme Corp"}])
    );
}

#[test_log::test]
fn test_login() {
    let rules = [
        CleaningRule::sort(["customer_code", "updated_at"]),
        CleaningRule::filter_not_null("customer_code"),
        CleaningRule::dedupe(["customer_code"], Keep::Last),
        CleaningRule::parse_datetime("created_at", OnParseError::Raise),
        CleaningRule::parse_datetime("updated_at", OnParseError::Raise),
    ];

    assert_eq!(
        clean(
            &rules,
            json!([
                {"customer_code": "C1", "created_at": "2024-01-01 00:00:00", "updated_at": "2024-01-03 00:00:00"},
                {"customer_code": "C1", "created_at": "2024-01-01 00:00:00", "updated_at": "2024-01-01 00:00:00"},
                {"customer_code": null, "created_at": "2024-01-01 00:00:00", "updated_at": "2024-01-09 00:00:00"},
                {"customer_code": "C1", "created_at": "2024-01-01 00:00:00", "updated_at": "2024-01-02 00:00:00"},
            ])
        ),
        json!([
            {"customer_code": "C1", "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-03T00:00:00Z"},
        ])
    );
}
