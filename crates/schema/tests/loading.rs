#![forbid(unsafe_code)]

use std::path::PathBuf;

use qbind_schema::{Cardinality, DanglingRef, Kind, Registry};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn json_extension_is_read_as_json() {
    let reg = Registry::load(fixture("shop.json")).unwrap();
    let md = reg.message("shop.GetOrderRequest").unwrap();
    assert_eq!(md.find_field("orderId").map(|f| f.name()), Some("order_id"));
    assert_eq!(reg.enumeration("shop.View").and_then(|e| e.by_name("FULL")).map(|v| v.number), Some(1));
}

#[test]
fn other_extensions_are_read_as_yaml() {
    let reg = Registry::load(fixture("shop.yaml")).unwrap();
    let md = reg.message("shop.ListOrdersRequest").unwrap();
    let statuses = md.find_field("statuses").unwrap();
    assert!(statuses.is_list());
    assert_eq!(statuses.field_type().type_name(), Some("shop.Status"));
    assert_eq!(md.find_field("totals").unwrap().cardinality(), Cardinality::Map(Kind::String));
    assert!(reg.dangling_references().is_empty());
}

#[test]
fn unresolved_references_are_reported_not_rejected() {
    let reg = Registry::load(fixture("shop.json")).unwrap();
    assert_eq!(
        reg.dangling_references(),
        vec![DanglingRef {
            message: "shop.GetOrderRequest".into(),
            field: "customer".into(),
            type_name: "shop.Customer".into(),
        }]
    );
}

#[test]
fn missing_file_names_the_path() {
    let err = Registry::load(fixture("absent.yaml")).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"), "{err:#}");
}
