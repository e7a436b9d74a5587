#![forbid(unsafe_code)]

use qbind_decode::{decode, render_json, DecodeError, ErrorBody, PathFilter, QueryValues};
use qbind_schema::Registry;
use serde_json::json;

const TYPE: &str = "library.ListBooksRequest";

fn registry() -> Registry {
    Registry::load(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/library.yaml")).unwrap()
}

fn render(query: &str) -> serde_json::Value {
    let reg = registry();
    let msg = decode(&QueryValues::parse(query), &reg, TYPE, &PathFilter::new()).unwrap();
    render_json(&msg, &reg)
}

#[test]
fn fixture_has_no_dangling_references() {
    assert!(registry().dangling_references().is_empty());
}

#[test]
fn decoded_request_renders_canonical_json() {
    let got = render(concat!(
        "shelf.location.accessible=true&page_size=25&genre=HISTORY",
        "&authors=Le%20Guin&authors=Borges&isbns=9780441478125",
        "&labels[lang]=en&ratings[5]=0.5",
        "&published_after=1700000000&max_age=36h&read_mask=title,authors",
        "&min_pages=100&cover_hash=3q2%2B7w%3D%3D&extra=%7B%22a%22%3A1%7D&id=77",
    ));
    assert_eq!(
        got,
        json!({
            "pageSize": 25,
            "genre": "HISTORY",
            "authors": ["Le Guin", "Borges"],
            "isbns": ["9780441478125"],
            "labels": {"lang": "en"},
            "ratings": {"5": 0.5},
            "publishedAfter": "2023-11-14T22:13:20Z",
            "maxAge": "129600s",
            "readMask": "title,authors",
            "minPages": 100,
            "coverHash": "3q2+7w==",
            "extra": {"a": 1.0},
            "shelf": {"location": {"accessible": true}},
            "id": "77",
        })
    );
}

#[test]
fn pre_epoch_millisecond_timestamp_renders_exact_instant() {
    assert_eq!(render("published_after=-100000000500"), json!({"publishedAfter": "1966-10-31T14:13:19.500Z"}));
}

#[test]
fn error_body_carries_the_message() {
    let reg = registry();
    let err = decode(&QueryValues::parse("title=Dune&id=5"), &reg, TYPE, &PathFilter::new()).unwrap_err();
    assert!(matches!(err, DecodeError::OneofConflict { .. }));
    let body = ErrorBody::from(&err);
    assert_eq!(body.code, 1);
    assert!(body.message.contains("lookup"), "{}", body.message);
}

#[test]
fn path_bound_fields_are_filtered() {
    let reg = registry();
    let filter = PathFilter::from_paths(["parent"]);
    let msg = decode(&QueryValues::parse("parent=shelves/3&page_token=abc"), &reg, TYPE, &filter).unwrap();
    assert_eq!(render_json(&msg, &reg), json!({"pageToken": "abc"}));
}
