// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use techhaus_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const BUCKET: &str = "activetix";
const PROJECT: &str = "activeTix";
const DATASET: &str = "raw";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Set of entities the pipeline knows how to extract and load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCatalog {
    entities: Vec<EntitySpec>,
}

impl EntityCatalog {
    pub fn new(entities: Vec<EntitySpec>) -> Result<Self, DuplicateEntityError> {
        for (i, entity) in entities.iter().enumerate() {
            if entities[..i].iter().any(|e| e.name == entity.name) {
                return Err(DuplicateEntityError {
                    name: entity.name.clone(),
                });
            }
        }
        Ok(Self { entities })
    }

    /// Entities of the ticketing data lake
    pub fn builtin() -> Self {
        Self {
            entities: builtin_entities(),
        }
    }

    pub fn entities(&self) -> &[EntitySpec] {
        &self.entities
    }

    pub fn get(&self, name: &str) -> Option<&EntitySpec> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Resolves names in the given order, all entities when `names` is empty
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&EntitySpec>, UnknownEntityError> {
        if names.is_empty() {
            return Ok(self.entities.iter().collect());
        }

        names
            .iter()
            .map(|name| {
                self.get(name.as_ref()).ok_or_else(|| UnknownEntityError {
                    name: name.as_ref().to_string(),
                })
            })
            .collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn entity(name: &str, key: &str, rules: Vec<CleaningRule>) -> EntitySpec {
    EntitySpec {
        name: name.to_string(),
        table: TableRef::new(PROJECT, DATASET, format!("raw_{name}")),
        source: ObjectLocation::new(BUCKET, key),
        project_to_table_columns: true,
        rules,
    }
}

fn builtin_entities() -> Vec<EntitySpec> {
    vec![
        entity(
            "sale_orders",
            "datalakehouse/saleorder/saleorder.json",
            vec![],
        ),
        entity(
            "order_items",
            "datalakehouse/saleorderitem/saleorderitem.json",
            vec![],
        ),
        entity(
            "order_attendant",
            "datalakehouse/saleorderattendant/saleorderattendant.json",
            vec![],
        ),
        entity(
            "customers",
            "datalakehouse/customer/customer.json",
            vec![
                CleaningRule::parse_datetime("birthday", OnParseError::Coerce),
                CleaningRule::replace("nationality", "vietnam", "VN"),
            ],
        ),
        entity(
            "organizers",
            "datalakehouse/saleorderevent/saleorderevent.json",
            vec![
                CleaningRule::title("merchant_name_en"),
                CleaningRule::dedupe(["merchant_id"], Keep::First),
            ],
        ),
        entity(
            "events",
            "datalakehouse/event/event.json",
            vec![
                CleaningRule::parse_datetime("start_date", OnParseError::Raise),
                CleaningRule::parse_datetime("end_date", OnParseError::Raise),
                CleaningRule::title("event_name"),
                CleaningRule::title("event_type"),
            ],
        ),
        entity(
            "order_events",
            "datalakehouse/saleorderevent/saleorderevent.json",
            vec![CleaningRule::dedupe(["event_id", "merchant_id"], Keep::First)],
        ),
        entity(
            "login",
            "datalakehouse/login/login.json",
            vec![
                CleaningRule::sort(["customer_code", "updated_at"]),
                CleaningRule::filter_not_null("customer_code"),
                CleaningRule::dedupe(["customer_code"], Keep::Last),
                CleaningRule::parse_datetime("created_at", OnParseError::Raise),
                CleaningRule::parse_datetime("updated_at", OnParseError::Raise),
            ],
        ),
    ]
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Entity '{name}' is declared more than once")]
pub struct DuplicateEntityError {
    pub name: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown entity '{name}'")]
pub struct UnknownEntityError {
    pub name: String,
}
