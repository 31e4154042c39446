use chrono::NaiveDate;
use serde_json::json;

use fixtura_core::{SchemaCatalog, validate_catalog};
use fixtura_generate::{FixtureRequest, GenerationError, Value};

fn catalog() -> SchemaCatalog {
    let raw = json!({
        "types": [
            {
                "name": "Customer",
                "default_locales": ["en"],
                "fields": [
                    { "name": "firstName", "kind": "scalar", "scalar": "text", "meta": { "max_length": 30 } },
                    { "name": "email", "kind": "scalar", "scalar": "text", "meta": { "format": "email" } },
                    { "name": "inn", "kind": "scalar", "scalar": "text", "meta": {} },
                    {
                        "name": "addresses",
                        "kind": "list",
                        "element": { "kind": "object", "type_name": "Address" },
                        "meta": {},
                        "list": { "min_items": 1, "max_items": 2 }
                    }
                ]
            },
            {
                "name": "Address",
                "fields": [
                    {
                        "name": "street",
                        "kind": "scalar",
                        "scalar": "text",
                        "meta": { "min_length": 4, "max_length": 40, "forbidden_characters": "#" }
                    },
                    { "name": "city", "kind": "scalar", "scalar": "text", "meta": {} }
                ]
            }
        ]
    });
    let catalog: SchemaCatalog = serde_json::from_value(raw).expect("catalog");
    validate_catalog(&catalog).expect("valid catalog");
    catalog
}

const REQUEST: &str = r#"
type = "Customer"
count = 4
seed = 77
strict = true

[config]
legal_entity_tax_id = true

[[fixed_list_sizes]]
path = "addresses"
size = 3

[[invalidations]]
path = "addresses/*/street"
kind = "CONTAINS_FORBIDDEN_CHARACTERS"

[[values]]
path = "addresses/[1]/city"
value = "Moscow"

[[field_locales]]
path = "firstName"
locale = "de-DE"
"#;

#[test]
fn toml_request_drives_a_full_build() {
    let catalog = catalog();
    let request = FixtureRequest::from_toml_str(REQUEST).expect("request");
    let (customers, report) = request
        .apply(&catalog)
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"))
        .build_list_with_report(request.count)
        .expect("build");

    assert_eq!(customers.len(), 4);
    assert_eq!(report.seed, 77);
    assert_eq!(report.manual_values_applied, 4);
    assert_eq!(report.invalidations_applied, 12);
    for customer in &customers {
        let addresses = customer.get("addresses").and_then(Value::as_list).expect("addresses");
        assert_eq!(addresses.len(), 3);
        for address in addresses {
            let street = address
                .as_object()
                .and_then(|address| address.get("street"))
                .and_then(Value::as_str)
                .expect("street");
            assert!(street.ends_with('#'), "{street}");
        }
        let json = customer.to_json();
        assert_eq!(json["addresses"][1]["city"], json!("Moscow"));
        assert_eq!(json["inn"].as_str().map(str::len), Some(10));
    }
}

#[test]
fn same_request_reproduces_output() {
    let catalog = catalog();
    let request = FixtureRequest::from_toml_str(REQUEST).expect("request");
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
    let first = request
        .apply(&catalog)
        .with_reference_date(date)
        .build_list(2)
        .expect("first");
    let second = request
        .apply(&catalog)
        .with_reference_date(date)
        .build_list(2)
        .expect("second");
    assert_eq!(first, second);
}

#[test]
fn bad_request_path_surfaces_at_build() {
    let catalog = catalog();
    let request = FixtureRequest::from_json_str(
        r#"{"type": "Customer", "values": [{"path": "addresses//city", "value": "Paris"}]}"#,
    )
    .expect("request");
    let err = request.apply(&catalog).build().expect_err("bad path");
    assert!(matches!(err, GenerationError::InvalidOverride(_)));
}
