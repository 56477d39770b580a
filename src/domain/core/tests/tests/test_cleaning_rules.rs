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

fn table(value: serde_json::Value) -> Table {
    Table::from_records(serde_json::from_value(value).unwrap())
}

fn records(table: &Table) -> serde_json::Value {
    serde_json::Value::Array(
        table
            .to_records()
            .into_iter()
            .map(serde_json::Value::Object)
            .collect(),
    )
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_parse_datetime_coerce_nulls_unparsable_values() {
    let mut t = table(json!([
        {"d": "2020-01-02"},
        {"d": "garbage"},
        {"d": null},
        {"d": ""},
        {"d": 17},
    ]));

    CleaningRule::parse_datetime("d", OnParseError::Coerce)
        .apply(&mut t)
        .unwrap();

    assert_eq!(
        records(&t),
        json!([
            {"d": "2020-01-02T00:00:00Z"},
            {"d": null},
            {"d": null},
            {"d": null},
            {"d": null},
        ])
    );
}

#[test]
fn test_parse_datetime_raise_fails_whole_batch() {
    let mut t = table(json!([
        {"d": "2020-01-02"},
        {"d": "2020-02-31"},
    ]));
    let before = t.clone();

    let err = CleaningRule::parse_datetime("d", OnParseError::Raise)
        .apply(&mut t)
        .unwrap_err();

    assert_eq!(
        err,
        CleaningError::UnparsableDateTime(UnparsableDateTimeError {
            column: "d".to_string(),
            row: 1,
            value: "\"2020-02-31\"".to_string(),
        })
    );
    assert_eq!(t, before);
}

#[test]
fn test_parse_datetime_keeps_nulls_in_raise_mode() {
    let mut t = table(json!([{"d": null}, {"d": "2020-01-02 03:04:05"}]));

    CleaningRule::parse_datetime("d", OnParseError::Raise)
        .apply(&mut t)
        .unwrap();

    assert_eq!(
        records(&t),
        json!([{"d": null}, {"d": "2020-01-02T03:04:05Z"}])
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_title_case() {
    assert_eq!(title_case("acme corp"), "Acme Corp");
    assert_eq!(title_case("ACME CORP"), "Acme Corp");
    assert_eq!(title_case("rock-n-roll night"), "Rock-N-Roll Night");
    assert_eq!(title_case("1st event"), "1St Event");
    assert_eq!(title_case(""), "");
}

#[test]
fn test_normalize_text_skips_non_strings() {
    let mut t = table(json!([
        {"c": "vietnam vietnam"},
        {"c": null},
        {"c": 5},
    ]));

    CleaningRule::replace("c", "vietnam", "VN")
        .apply(&mut t)
        .unwrap();

    assert_eq!(
        records(&t),
        json!([{"c": "VN VN"}, {"c": null}, {"c": 5}])
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_dedupe_keep_first_and_last() {
    let input = json!([
        {"k": 1, "v": "a"},
        {"k": 2, "v": "b"},
        {"k": 1, "v": "c"},
        {"k": 3, "v": "d"},
        {"k": 2, "v": "e"},
    ]);

    let mut first = table(input.clone());
    CleaningRule::dedupe(["k"], Keep::First)
        .apply(&mut first)
        .unwrap();
    assert_eq!(
        records(&first),
        json!([
            {"k": 1, "v": "a"},
            {"k": 2, "v": "b"},
            {"k": 3, "v": "d"},
        ])
    );

    let mut last = table(input);
    CleaningRule::dedupe(["k"], Keep::Last)
        .apply(&mut last)
        .unwrap();
    assert_eq!(
        records(&last),
        json!([
            {"k": 1, "v": "c"},
            {"k": 3, "v": "d"},
            {"k": 2, "v": "e"},
        ])
    );
}

#[test]
fn test_dedupe_is_idempotent() {
    let mut t = table(json!([
        {"a": 1, "b": "x", "c": 1},
        {"a": 1, "b": "x", "c": 2},
        {"a": 1, "b": "y", "c": 3},
        {"a": null, "b": null, "c": 4},
        {"a": null, "b": null, "c": 5},
        {"a": 2, "b": "x", "c": 6},
    ]));

    let rule = CleaningRule::dedupe(["a", "b"], Keep::Last);

    rule.apply(&mut t).unwrap();
    let once = t.clone();
    rule.apply(&mut t).unwrap();

    assert_eq!(t, once);
    assert_eq!(
        t.column("c").unwrap().cloned().collect::<Vec<_>>(),
        [json!(2), json!(3), json!(5), json!(6)]
    );
}

#[test]
fn test_dedupe_compares_numbers_by_value() {
    let mut t = table(json!([
        {"merchant_id": 1, "v": "a"},
        {"merchant_id": 1.0, "v": "b"},
        {"merchant_id": "1", "v": "c"},
        {"merchant_id": 1.5, "v": "d"},
        {"merchant_id": -0.0, "v": "e"},
        {"merchant_id": 0, "v": "f"},
    ]));

    CleaningRule::dedupe(["merchant_id"], Keep::First)
        .apply(&mut t)
        .unwrap();

    assert_eq!(
        t.column("v").unwrap().cloned().collect::<Vec<_>>(),
        [json!("a"), json!("c"), json!("d"), json!("e")]
    );
}

#[test]
fn test_dedupe_empty_subset_uses_all_columns() {
    let mut t = table(json!([
        {"a": 1, "b": 1},
        {"a": 1, "b": 1},
        {"a": 1, "b": 2},
    ]));

    CleaningRule::dedupe(Vec::<String>::new(), Keep::First)
        .apply(&mut t)
        .unwrap();

    assert_eq!(t.num_rows(), 2);
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_sort_is_stable_with_nulls_last() {
    let mut t = table(json!([
        {"k": "b", "n": 1},
        {"k": null, "n": 2},
        {"k": "a", "n": 3},
        {"k": "b", "n": 4},
        {"k": "a", "n": 5},
    ]));

    CleaningRule::sort(["k"]).apply(&mut t).unwrap();

    assert_eq!(
        t.column("n").unwrap().cloned().collect::<Vec<_>>(),
        [json!(3), json!(5), json!(1), json!(4), json!(2)]
    );
}

#[test]
fn test_sort_descending_keeps_nulls_last() {
    let mut t = table(json!([{"k": 1}, {"k": null}, {"k": 10}, {"k": 2.5}]));

    CleaningRule::Sort {
        by: vec!["k".to_string()],
        ascending: false,
    }
    .apply(&mut t)
    .unwrap();

    assert_eq!(
        t.column("k").unwrap().cloned().collect::<Vec<_>>(),
        [json!(10), json!(2.5), json!(1), json!(null)]
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_filter_not_null() {
    let mut t = table(json!([{"k": 1}, {"k": null}, {"other": 3}]));

    CleaningRule::filter_not_null("k").apply(&mut t).unwrap();

    assert_eq!(records(&t), json!([{"k": 1, "other": null}]));
}

#[test]
fn test_unknown_column_is_rejected() {
    let mut t = table(json!([{"a": 1}]));

    let err = CleaningRule::title("missing").apply(&mut t).unwrap_err();

    assert_eq!(
        err,
        CleaningError::UnknownColumn {
            rule: "title(missing)".to_string(),
            column: "missing".to_string(),
        }
    );
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_rules_deserialize_from_yaml() {
    let rules: Vec<CleaningRule> = serde_yaml::from_str(indoc::indoc!(
        r#"
        - kind: parseDateTime
          column: birthday
          onError: coerce
        - kind: parseDateTime
          column: start_date
          format: "%d/%m/%Y"
        - kind: normalizeText
          column: nationality
          op:
            kind: replace
            from: vietnam
            to: VN
        - kind: normalizeText
          column: event_name
          op:
            kind: title
        - kind: sort
          by: [customer_code, updated_at]
        - kind: filterNotNull
          column: customer_code
        - kind: dedupe
          subset: [customer_code]
          keep: last
        "#,
    ))
    .unwrap();

    assert_eq!(
        rules,
        vec![
            CleaningRule::parse_datetime("birthday", OnParseError::Coerce),
            CleaningRule::ParseDateTime {
                column: "start_date".to_string(),
                format: DateTimeFormat::Exact("%d/%m/%Y".to_string()),
                on_error: OnParseError::Raise,
            },
            CleaningRule::replace("nationality", "vietnam", "VN"),
            CleaningRule::title("event_name"),
            CleaningRule::sort(["customer_code", "updated_at"]),
            CleaningRule::filter_not_null("customer_code"),
            CleaningRule::dedupe(["customer_code"], Keep::Last),
        ]
    );
}

#[test]
fn test_rules_reject_unknown_fields() {
    let res: Result<CleaningRule, _> = serde_yaml::from_str("kind: filterNotNull\ncolumn: a\nextra: 1\n");
    assert!(res.is_err());
}

#[test]
fn test_rules_display() {
    let rendered: Vec<_> = [
        CleaningRule::parse_datetime("birthday", OnParseError::Coerce),
        CleaningRule::replace("nationality", "vietnam", "VN"),
        CleaningRule::dedupe(["event_id", "merchant_id"], Keep::First),
        CleaningRule::sort(["customer_code", "updated_at"]),
        CleaningRule::filter_not_null("customer_code"),
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    assert_eq!(
        rendered,
        [
            "parse-datetime(birthday, mixed, coerce)",
            "replace(nationality, \"vietnam\" -> \"VN\")",
            "dedupe([event_id, merchant_id], keep=first)",
            "sort([customer_code, updated_at], asc)",
            "filter-not-null(customer_code)",
        ]
    );
}
