//! Typed schema bundle.
//!
//! Field names mirror the service's camelCase wire format. Attribute
//! payloads (`attr`, `data`, relation blobs) stay as `serde_json::Value`:
//! their shape varies per project and templates consume them untyped.

use crate::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaBundle {
    #[serde(default)]
    pub project: Vec<Project>,
    #[serde(default)]
    pub enums: Vec<Enum>,
    #[serde(default)]
    pub enum_items: Vec<EnumItem>,
    #[serde(default)]
    pub data_types: Vec<DataType>,
    #[serde(default)]
    pub uis: Vec<Ui>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub table_columns: Vec<TableColumn>,
    #[serde(default)]
    pub main_pages: Vec<MainPage>,
    #[serde(default)]
    pub pagination_options: Vec<PaginationOption>,
    #[serde(default)]
    pub pagination_fields: Vec<PaginationField>,
    #[serde(default)]
    pub paginations: Vec<Pagination>,
    /// Filled in by the embedder after setup, never by the service.
    #[serde(default)]
    pub computed: SchemaComputed,
}

/// Derived data the embedder computes once the pagination details are known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaComputed {
    /// Route → names of the generated modules that must hot-reload when the
    /// route becomes active.
    #[serde(default)]
    pub hot_module_by_route: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enum {
    pub id: String,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumItem {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ui {
    pub id: String,
    pub code: String,
    pub cate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub attr: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub index: bool,
    #[serde(default)]
    pub db_type: String,
    #[serde(default)]
    pub db_length: Option<String>,
    #[serde(default)]
    pub db_default: Option<String>,
    #[serde(default)]
    pub db_notnull: bool,
    #[serde(default)]
    pub db_unsigned: bool,
    #[serde(default)]
    pub db_auto_increment: bool,
    #[serde(default)]
    pub db_comment: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub attr: Value,
    #[serde(default)]
    pub project_table_code: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub project_field_id: Value,
    #[serde(default)]
    pub project_enum_code: Value,
    #[serde(default)]
    pub project_ui_code: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainPage {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attr: Value,
    #[serde(default)]
    pub relation_attr: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub group_code: String,
    #[serde(default)]
    pub project_table_code: String,
    #[serde(default)]
    pub project_pagination_option_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationField {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub project_pagination_code: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub project_table_relation_id: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub project_table_code: String,
    #[serde(default)]
    pub relation_data: Value,
}

impl SchemaBundle {
    /// Look up a pagination option by its configured display name.
    pub fn pagination_option_by_name(&self, name: &str) -> Result<&PaginationOption, SchemaError> {
        self.pagination_options
            .iter()
            .find(|option| option.name == name)
            .ok_or_else(|| SchemaError::MissingPaginationOption {
                name: name.to_string(),
            })
    }

    /// The main page a pagination hangs off, matched by group code.
    pub fn main_page_by_code(&self, code: &str) -> Option<&MainPage> {
        self.main_pages.iter().find(|page| page.code == code)
    }

    /// Every pagination attached to a pagination option.
    pub fn paginations_for_option(&self, option_id: &str) -> Vec<&Pagination> {
        self.paginations
            .iter()
            .filter(|pagination| pagination.project_pagination_option_id == option_id)
            .collect()
    }

    /// The configured fields of one pagination, matched on both table code
    /// and pagination code.
    pub fn fields_for_pagination(&self, pagination: &Pagination) -> Vec<&PaginationField> {
        self.pagination_fields
            .iter()
            .filter(|field| {
                field.project_table_code == pagination.project_table_code
                    && field.project_pagination_code == pagination.code
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SchemaBundle {
        serde_json::from_value(json!({
            "project": [{ "id": "p1", "name": "shop" }],
            "mainPages": [
                { "id": "m1", "name": "Suppliers", "code": "sup-pliers", "data": {} },
                { "id": "m2", "name": "Orders", "code": "orders", "data": {} }
            ],
            "paginationOptions": [
                { "id": "o1", "name": "crud", "attr": [], "relationAttr": [] }
            ],
            "paginations": [
                {
                    "id": "g1", "code": "index", "data": [],
                    "groupCode": "sup-pliers",
                    "projectTableCode": "suppliers",
                    "projectPaginationOptionId": "o1"
                },
                {
                    "id": "g2", "code": "index", "data": [],
                    "groupCode": "orders",
                    "projectTableCode": "orders",
                    "projectPaginationOptionId": "other"
                }
            ],
            "paginationFields": [
                {
                    "id": "f1",
                    "projectPaginationCode": "index",
                    "projectTableCode": "suppliers",
                    "data": [{ "tableColumnCode": "name" }]
                },
                {
                    "id": "f2",
                    "projectPaginationCode": "index",
                    "projectTableCode": "orders",
                    "data": []
                }
            ]
        }))
        .expect("sample bundle deserializes")
    }

    #[test]
    fn test_camel_case_wire_names() {
        let bundle = sample();
        assert_eq!(bundle.pagination_options[0].name, "crud");
        assert_eq!(bundle.paginations[0].group_code, "sup-pliers");
        assert!(bundle.computed.hot_module_by_route.is_empty());
    }

    #[test]
    fn test_option_lookup_by_name() {
        let bundle = sample();
        assert_eq!(bundle.pagination_option_by_name("crud").expect("found").id, "o1");
        let err = bundle.pagination_option_by_name("absent").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingPaginationOption { name } if name == "absent"
        ));
    }

    #[test]
    fn test_paginations_for_option() {
        let bundle = sample();
        let hits = bundle.paginations_for_option("o1");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].group_code, "sup-pliers");
    }

    #[test]
    fn test_fields_match_on_both_codes() {
        let bundle = sample();
        let fields = bundle.fields_for_pagination(bundle.paginations_for_option("o1")[0]);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].id, "f1");
    }

    #[test]
    fn test_bundle_round_trips_through_json() {
        let bundle = sample();
        let text = serde_json::to_string(&bundle).expect("serializes");
        let back: SchemaBundle = serde_json::from_str(&text).expect("deserializes");
        assert_eq!(back.main_pages.len(), 2);
        assert_eq!(back.pagination_options[0].name, "crud");
    }
}
