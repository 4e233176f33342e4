use json_path::{Configuration, Error, JsonPath, JsonPathExt, ReadOption};
use serde_json::{json, Value};
use test_log::test;

fn store_json() -> Value {
    json!({
        "store": {
            "book": [
                {
                    "category": "reference",
                    "author": "Nigel Rees",
                    "title": "Sayings of the Century",
                    "price": 8.95
                },
                {
                    "category": "fiction",
                    "author": "Evelyn Waugh",
                    "title": "Sword of Honour",
                    "price": 12.99
                },
                {
                    "category": "fiction",
                    "author": "Herman Melville",
                    "title": "Moby Dick",
                    "isbn": "0-553-21311-3",
                    "price": 8.99
                },
                {
                    "category": "fiction",
                    "author": "J. R. R. Tolkien",
                    "title": "The Lord of the Rings",
                    "isbn": "0-395-19395-8",
                    "price": 22.99
                }
            ],
            "bicycle": {
                "color": "red",
                "price": 19.95
            }
        }
    })
}

#[test]
fn all_book_authors() {
    let value = store_json();
    let nodes = value.read_path("$.store.book[*].author").unwrap();
    assert_eq!(
        nodes,
        json!([
            "Nigel Rees",
            "Evelyn Waugh",
            "Herman Melville",
            "J. R. R. Tolkien"
        ])
    );
}

#[test]
fn all_authors_by_scan() {
    let value = store_json();
    let nodes = value.read_path("$..author").unwrap();
    assert_eq!(
        nodes,
        json!([
            "Nigel Rees",
            "Evelyn Waugh",
            "Herman Melville",
            "J. R. R. Tolkien"
        ])
    );
}

#[test]
fn all_things_in_store() {
    let value = store_json();
    let nodes = value.read_path("$.store.*").unwrap();
    let items = nodes.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(&items[0], value.pointer("/store/book").unwrap());
    assert_eq!(&items[1], value.pointer("/store/bicycle").unwrap());
}

#[test]
fn all_prices_by_scan() {
    let value = store_json();
    let nodes = value.read_path("$.store..price").unwrap();
    assert_eq!(nodes, json!([8.95, 12.99, 8.99, 22.99, 19.95]));
}

#[test]
fn single_book_by_index() {
    let value = store_json();
    let node = value.read_path("$.store.book[2].title").unwrap();
    assert_eq!(node, json!("Moby Dick"));
}

#[test]
fn single_book_by_negative_index() {
    let value = store_json();
    let node = value.read_path("$.store.book[-1].title").unwrap();
    assert_eq!(node, json!("The Lord of the Rings"));
}

#[test]
fn books_by_index_list() {
    let value = store_json();
    let nodes = value.read_path("$.store.book[0,2].title").unwrap();
    assert_eq!(nodes, json!(["Sayings of the Century", "Moby Dick"]));
}

#[test]
fn books_cheaper_than_ten() {
    let value = store_json();
    let nodes = value.read_path("$.store.book[?(@.price < 10)].title").unwrap();
    assert_eq!(nodes, json!(["Sayings of the Century", "Moby Dick"]));
}

#[test]
fn fiction_books_cheaper_than_ten() {
    let value = store_json();
    let nodes = value
        .read_path("$.store.book[?(@.category == 'fiction' && @.price < 10)].title")
        .unwrap();
    assert_eq!(nodes, json!(["Moby Dick"]));
}

#[test]
fn reference_or_expensive_books() {
    let value = store_json();
    let nodes = value
        .read_path("$.store.book[?(@.category == 'reference' || @.price > 20)].title")
        .unwrap();
    assert_eq!(
        nodes,
        json!(["Sayings of the Century", "The Lord of the Rings"])
    );
}

#[test]
fn books_with_isbn() {
    let value = store_json();
    let nodes = value.read_path("$.store.book[?(@.isbn)].title").unwrap();
    assert_eq!(nodes, json!(["Moby Dick", "The Lord of the Rings"]));
}

#[test]
fn all_array_items_then_field() {
    let value = store_json();
    let nodes = value.read_path("$.store.book[*].price").unwrap();
    assert_eq!(nodes, json!([8.95, 12.99, 8.99, 22.99]));
}

#[test]
fn multi_key_field_subset() {
    let value = store_json();
    let nodes = value.read_path("$.store.book[0]['title','price']").unwrap();
    assert_eq!(
        nodes,
        json!({"title": "Sayings of the Century", "price": 8.95})
    );
}

#[test]
fn root_path_returns_whole_document() {
    let value = store_json();
    assert_eq!(value.read_path("$").unwrap(), value);
}

#[test]
fn missing_terminal_field_is_null() {
    let value = store_json();
    assert_eq!(value.read_path("$.store.missing").unwrap(), json!(null));
}

#[test]
fn missing_intermediate_field_is_path_not_found() {
    let value = store_json();
    let err = value.read_path("$.store.missing.title").unwrap_err();
    assert!(matches!(err, Error::PathNotFound { .. }));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn missing_field_throws_when_option_set() {
    let value = json!({"a": 1});
    let config = Configuration::default().with_option(ReadOption::ThrowOnMissingProperty);
    let path = JsonPath::compile("$.missing").unwrap();
    assert!(matches!(
        path.read_with(&value, &config),
        Err(Error::PathNotFound { .. })
    ));
}

#[test]
fn read_does_not_mutate_the_document() {
    let value = store_json();
    let before = value.clone();
    value.read_path("$..price").unwrap();
    value.read_path("$.store.book[?(@.price < 10)]").unwrap();
    assert_eq!(value, before);
}

#[test]
fn compiled_path_is_reusable_and_cloneable() {
    let value = store_json();
    let path = JsonPath::compile("$.store.book[0].author").unwrap();
    let clone = path.clone();
    assert_eq!(path.read(&value).unwrap(), json!("Nigel Rees"));
    assert_eq!(clone.read(&value).unwrap(), json!("Nigel Rees"));
}

#[test]
fn scan_order_is_document_order() {
    let value = json!({"a": {"b": {"c": 1}}, "x": {"c": 2}});
    assert_eq!(json_path::read(&value, "$..c").unwrap(), json!([1, 2]));
}

#[test]
fn wildcard_over_object_values() {
    let value = json!({"a": 1, "b": 2, "c": 3});
    assert_eq!(json_path::read(&value, "$.*").unwrap(), json!([1, 2, 3]));
}

#[test]
fn scan_into_bracket_field() {
    let value = store_json();
    let nodes = value.read_path("$..['isbn']").unwrap();
    assert_eq!(nodes, json!(["0-553-21311-3", "0-395-19395-8"]));
}

#[test]
fn quoted_keys_with_special_characters() {
    let value = json!({"a.b": {"c": 1}, "x,y": 2});
    assert_eq!(json_path::read(&value, "$['a.b'].c").unwrap(), json!(1));
    assert_eq!(json_path::read(&value, "$['x,y']").unwrap(), json!(2));
}
