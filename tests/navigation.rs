//! Structural invariants of the node encoding, checked mechanically over
//! a set of documents, plus value-accessor agreement with serde_json.

use flatjson::{key_hash, Document, NodeId, NodeType, Parser};
use rstest::rstest;

const CORPUS: &[&[u8]] = &[
    b"null",
    b"[]",
    b"{}",
    b"[1, 2.5, true, false, null, \"hi\"]",
    br#"{"a":1,"b":true,"c":null}"#,
    br#"{"user":{"name":"Alice","age":30,"active":true},"tags":[]}"#,
    br#"[[],[[]],[[[1]]],{"k":[{"x":null}]}]"#,
    br#"{"a":{"b":{"c":{"d":[1,2,3,{"e":"f"}]}}},"g":0.25}"#,
    br#"[{"id":1,"vals":[1,2]},{"id":2,"vals":[]},{"id":3,"vals":[3]}]"#,
];

fn parse(input: &[u8]) -> Parser {
    let mut parser = Parser::new();
    parser.feed(input).expect("feed");
    parser.finish().expect("finish");
    parser
}

/// Walks every node and asserts the arena invariants the navigation
/// layer depends on.
fn check_invariants(doc: &Document<'_>) {
    let nodes = doc.arena().nodes();
    for (index, node) in nodes.iter().enumerate() {
        let id = NodeId(index as u32);
        match node.ty {
            NodeType::Array | NodeType::Object => {
                // Descendant skip lands on a sibling or one past the end.
                let skip = index + 1 + node.hash as usize;
                assert!(skip <= nodes.len(), "skip out of range at {index}");
                match doc.next_sibling(id) {
                    Some(next) => assert_eq!(next.index(), skip),
                    None => assert_eq!(skip, nodes.len()),
                }

                // Walking direct children covers exactly the descendants.
                let mut walked = 0usize;
                let mut seen = 0u32;
                let mut child = doc.first_child(id);
                while let Some(c) = child {
                    let child_node = doc.node(c);
                    walked += 1 + if child_node.ty.is_container() {
                        child_node.hash as usize
                    } else {
                        0
                    };
                    seen += 1;
                    if node.ty == NodeType::Object {
                        // Key, then its value subtree.
                        assert_eq!(child_node.ty, NodeType::String, "key at {}", c.index());
                        assert_eq!(child_node.hash, key_hash(doc.raw(c)));
                        let value = doc.next_sibling(c).expect("key must have a value");
                        let value_node = doc.node(value);
                        if value_node.ty.is_scalar() {
                            assert_eq!(value_node.hash, child_node.hash);
                        }
                        walked += 1 + if value_node.ty.is_container() {
                            value_node.hash as usize
                        } else {
                            0
                        };
                        child = doc.next_sibling(value);
                    } else {
                        child = doc.next_sibling(c);
                    }
                    if let Some(next) = child {
                        if next.index() >= skip {
                            child = None;
                        }
                    }
                }
                assert_eq!(seen, node.children, "direct children at {index}");
                assert_eq!(walked, node.hash as usize, "descendants at {index}");
            }
            _ => {
                assert_eq!(node.children, 0, "scalar with children at {index}");
                match doc.next_sibling(id) {
                    Some(next) => assert_eq!(next.index(), index + 1),
                    None => assert_eq!(index + 1, nodes.len()),
                }
            }
        }
    }
}

#[rstest]
fn corpus_satisfies_arena_invariants() {
    for input in CORPUS {
        let parser = parse(input);
        check_invariants(&parser.document(input));
    }
}

#[rstest]
fn array_indexing_matches_serde_json() {
    let source = br#"[10,[20,30],{"a":40},50,[5]]"#;
    let parser = parse(source);
    let doc = parser.document(source);
    let root = doc.root().unwrap();

    let oracle: serde_json::Value = serde_json::from_slice(source).unwrap();
    let oracle = oracle.as_array().unwrap();
    assert_eq!(doc.node(root).children as usize, oracle.len());

    assert_eq!(doc.as_int(doc.array_element(root, 0).unwrap()), Some(10));
    assert_eq!(doc.as_int(doc.array_element(root, 3).unwrap()), Some(50));
    let inner = doc.array_element(root, 1).unwrap();
    assert_eq!(
        doc.as_int(doc.array_element(inner, 1).unwrap()),
        oracle[1][1].as_i64()
    );
}

#[rstest]
fn object_lookup_matches_serde_json() {
    let source = br#"{"alpha":1,"beta":{"gamma":[true,false]},"delta":-7.25,"epsilon":"text"}"#;
    let parser = parse(source);
    let doc = parser.document(source);
    let root = doc.root().unwrap();
    let oracle: serde_json::Value = serde_json::from_slice(source).unwrap();

    assert_eq!(
        doc.as_int(doc.object_value(root, "alpha").unwrap()),
        oracle["alpha"].as_i64()
    );
    assert_eq!(
        doc.as_float(doc.object_value(root, "delta").unwrap()),
        oracle["delta"].as_f64()
    );
    let beta = doc.object_value(root, "beta").unwrap();
    let gamma = doc.object_value(beta, "gamma").unwrap();
    assert!(doc.as_bool(doc.array_element(gamma, 0).unwrap()));
    assert!(!doc.as_bool(doc.array_element(gamma, 1).unwrap()));
    assert_eq!(
        doc.raw(doc.object_value(root, "epsilon").unwrap()),
        b"text"
    );
}

#[rstest]
fn lookup_misses_cleanly() {
    let source = br#"{"a":1,"ab":2}"#;
    let parser = parse(source);
    let doc = parser.document(source);
    let root = doc.root().unwrap();

    assert!(doc.object_value(root, "a").is_some());
    assert!(doc.object_value(root, "ab").is_some());
    assert_eq!(doc.object_value(root, "abc"), None);
    assert_eq!(doc.object_value(root, ""), None);
    // Lookup on a non-object is a miss, not a panic.
    let one = doc.object_value(root, "a").unwrap();
    assert_eq!(doc.object_value(one, "a"), None);
}

#[rstest]
fn first_child_of_scalars_and_empty_containers() {
    let source = br#"[1,[],{}]"#;
    let parser = parse(source);
    let doc = parser.document(source);
    let root = doc.root().unwrap();

    let one = doc.array_element(root, 0).unwrap();
    assert_eq!(doc.first_child(one), None);
    let empty_array = doc.array_element(root, 1).unwrap();
    assert_eq!(doc.first_child(empty_array), None);
    let empty_object = doc.array_element(root, 2).unwrap();
    assert_eq!(doc.first_child(empty_object), None);
}

#[rstest]
fn lookup_never_escapes_the_object_subtree() {
    // "b" exists in the outer object only; probing the inner object must
    // not walk on into the outer entries that follow it.
    let source = br#"{"a":{"x":1},"b":2}"#;
    let parser = parse(source);
    let doc = parser.document(source);
    let inner = doc.object_value(doc.root().unwrap(), "a").unwrap();
    assert_eq!(doc.object_value(inner, "b"), None);
    assert_eq!(doc.object_value(inner, "a"), None);
    assert!(doc.object_value(inner, "x").is_some());
}

#[rstest]
fn duplicate_keys_resolve_to_the_first_match() {
    let source = br#"{"k":1,"k":2}"#;
    let parser = parse(source);
    let doc = parser.document(source);
    let value = doc.object_value(doc.root().unwrap(), "k").unwrap();
    assert_eq!(doc.as_int(value), Some(1));
}
