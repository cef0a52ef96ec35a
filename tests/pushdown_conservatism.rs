//! Pushdown Conservatism Tests
//!
//! A filter is pushed down only for the exact shape:
//! - single entry
//! - path equal to the sole primary-key field
//! - equality operator
//! - object identifier operand
//!
//! Everything else falls back, and a corrupted identifier is a hard error.

use docproxy::compiler::Backend;
use docproxy::config::PushdownConfig;
use docproxy::planner::{FallbackReason, PushdownAnalyzer, PushdownError, PushdownPlan};
use docproxy::schema::{Catalog, CollectionMeta, SchemaAccessor, SchemaError, SchemaResult};
use serde_json::{json, Value as Json};

const HEX: &str = "507f1f77bcf86cd799439011";

// =============================================================================
// Helper Functions
// =============================================================================

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.register(CollectionMeta::new("users", ["_id"])).unwrap();
    catalog.register(CollectionMeta::new("events", ["key"])).unwrap();
    catalog
        .register(CollectionMeta::new("logs", Vec::<String>::new()))
        .unwrap();
    catalog
        .register(CollectionMeta::new("sharded", ["_id", "shard"]))
        .unwrap();
    catalog
}

fn analyzer() -> PushdownAnalyzer<Catalog> {
    PushdownAnalyzer::from_config(&PushdownConfig::default(), catalog())
}

fn fallback_reason(collection: &str, filter: Json) -> FallbackReason {
    match analyzer().analyze_json(collection, &filter).unwrap() {
        PushdownPlan::Fallback { reason } => reason,
        other => panic!("expected fallback for {}, got {:?}", filter, other),
    }
}

/// Accessor that always fails, standing in for unreachable metadata storage
struct Unreachable;

impl SchemaAccessor for Unreachable {
    fn primary_key_fields(&self, _collection: &str) -> SchemaResult<Vec<String>> {
        Err(SchemaError::Unavailable("metadata store offline".into()))
    }
}

// =============================================================================
// Eligible Shape
// =============================================================================

#[test]
fn test_exact_shape_is_eligible() {
    let plan = analyzer()
        .analyze_json("users", &json!({"_id": {"$oid": HEX}}))
        .unwrap();

    assert!(plan.is_eligible());
    let predicate = plan.predicate().unwrap();
    assert_eq!(predicate.params(), [format!(r#"{{"$oid":"{}"}}"#, HEX)]);
    assert!(!predicate.template().contains(HEX));
}

#[test]
fn test_explicit_eq_operator_is_eligible() {
    let plan = analyzer()
        .analyze_json("users", &json!({"_id": {"$eq": {"$oid": HEX}}}))
        .unwrap();
    assert!(plan.is_eligible());
}

#[test]
fn test_non_id_primary_key_is_eligible() {
    let plan = analyzer()
        .analyze_json("events", &json!({"key": {"$oid": HEX}}))
        .unwrap();
    assert!(plan.is_eligible());
    assert_eq!(plan.predicate().unwrap().field(), "key");
}

#[test]
fn test_every_backend_binds_one_parameter() {
    for backend in [Backend::Postgresql, Backend::Sqlite, Backend::Mysql] {
        let config = PushdownConfig {
            backend,
            ..PushdownConfig::default()
        };
        let analyzer = PushdownAnalyzer::from_config(&config, catalog());
        let plan = analyzer
            .analyze_json("users", &json!({"_id": {"$oid": HEX}}))
            .unwrap();
        assert_eq!(plan.predicate().unwrap().params().len(), 1, "{}", backend);
    }
}

// =============================================================================
// Fallback Shapes
// =============================================================================

#[test]
fn test_string_id_falls_back() {
    assert_eq!(
        fallback_reason("users", json!({"_id": HEX})),
        FallbackReason::UnsupportedValueType
    );
}

#[test]
fn test_other_literal_types_fall_back() {
    for operand in [
        json!(1),
        json!(1.5),
        json!({"$numberLong": "7"}),
        json!(null),
        json!(true),
        json!([{"$oid": HEX}]),
        json!({"a": 1}),
        json!({"$binary": {"base64": "AQI=", "subType": "00"}}),
    ] {
        assert_eq!(
            fallback_reason("users", json!({ "_id": operand.clone() })),
            FallbackReason::UnsupportedValueType,
            "{}",
            operand
        );
    }
}

#[test]
fn test_two_entries_fall_back() {
    assert_eq!(
        fallback_reason("users", json!({"_id": {"$oid": HEX}, "other": 1})),
        FallbackReason::MultipleEntries
    );
    // two operators on the primary key are two entries as well
    assert_eq!(
        fallback_reason(
            "users",
            json!({"_id": {"$gte": {"$oid": HEX}, "$lte": {"$oid": HEX}}})
        ),
        FallbackReason::MultipleEntries
    );
}

#[test]
fn test_composite_key_always_falls_back() {
    for filter in [
        json!({"_id": {"$oid": HEX}}),
        json!({"shard": 1}),
        json!({"_id": HEX}),
    ] {
        assert_eq!(
            fallback_reason("sharded", filter),
            FallbackReason::CompositePrimaryKey
        );
    }
}

#[test]
fn test_no_primary_key_falls_back() {
    assert_eq!(
        fallback_reason("logs", json!({"_id": {"$oid": HEX}})),
        FallbackReason::NoPrimaryKey
    );
}

#[test]
fn test_non_key_paths_fall_back() {
    for path in ["other", "_id.x", "a._id", "_id.0"] {
        let mut filter = serde_json::Map::new();
        filter.insert(path.to_string(), json!({"$oid": HEX}));
        assert_eq!(
            fallback_reason("users", Json::Object(filter)),
            FallbackReason::UnsupportedFieldPath,
            "{}",
            path
        );
    }
}

#[test]
fn test_non_equality_operators_fall_back() {
    for operand in [
        json!({"$ne": {"$oid": HEX}}),
        json!({"$gt": {"$oid": HEX}}),
        json!({"$in": [{"$oid": HEX}]}),
        json!({"$exists": true}),
        json!({"$type": "objectId"}),
    ] {
        assert_eq!(
            fallback_reason("users", json!({ "_id": operand.clone() })),
            FallbackReason::UnsupportedOperator,
            "{}",
            operand
        );
    }
}

#[test]
fn test_array_and_negation_operators_fall_back() {
    for operand in [
        json!({"$not": {"$ne": {"$oid": HEX}}}),
        json!({"$all": [{"$oid": HEX}]}),
        json!({"$elemMatch": {"$eq": {"$oid": HEX}}}),
        json!({"$mod": [2, 0]}),
    ] {
        assert_eq!(
            fallback_reason("users", json!({ "_id": operand.clone() })),
            FallbackReason::UnsupportedOperator,
            "{}",
            operand
        );
    }
}

#[test]
fn test_logical_clauses_fall_back() {
    for op in ["$and", "$or", "$nor"] {
        let mut filter = serde_json::Map::new();
        filter.insert(op.to_string(), json!([{"_id": {"$oid": HEX}}]));
        assert_eq!(
            fallback_reason("users", Json::Object(filter)),
            FallbackReason::UnsupportedOperator,
            "{}",
            op
        );
    }
    // a clause beside a field entry is a second entry
    assert_eq!(
        fallback_reason(
            "users",
            json!({"_id": {"$oid": HEX}, "$or": [{"a": 1}]})
        ),
        FallbackReason::MultipleEntries
    );
}

#[test]
fn test_logical_clause_never_consults_schema() {
    let analyzer = PushdownAnalyzer::from_config(&PushdownConfig::default(), Unreachable);
    let plan = analyzer
        .analyze_json("users", &json!({"$or": [{"_id": {"$oid": HEX}}]}))
        .unwrap();
    assert_eq!(plan.fallback_reason(), Some(FallbackReason::UnsupportedOperator));
}

#[test]
fn test_empty_filter_falls_back() {
    assert_eq!(
        fallback_reason("users", json!({})),
        FallbackReason::EmptyFilter
    );
    // $comment alone is not an entry
    assert_eq!(
        fallback_reason("users", json!({"$comment": "all"})),
        FallbackReason::EmptyFilter
    );
}

#[test]
fn test_disabled_pushdown_falls_back() {
    let analyzer = analyzer().with_pushdown_disabled(true);
    let plan = analyzer
        .analyze_json("users", &json!({"_id": {"$oid": HEX}}))
        .unwrap();
    assert_eq!(plan.fallback_reason(), Some(FallbackReason::Disabled));
}

// =============================================================================
// Hard Errors
// =============================================================================

#[test]
fn test_truncated_object_id_is_corrupted_value() {
    for hex in ["507f1f77", "507f1f77bcf86cd79943901100", ""] {
        let err = analyzer()
            .analyze_json("users", &json!({"_id": {"$oid": hex}}))
            .unwrap_err();
        assert!(err.is_corrupted_value(), "{:?}", hex);
        assert_eq!(err.code(), "DOCPROXY_CORRUPTED_VALUE");
    }
}

#[test]
fn test_corrupted_value_only_surfaces_on_eligible_shape() {
    // a bad identifier on a non-key path is simply not pushed down
    assert_eq!(
        fallback_reason("users", json!({"other": {"$oid": "507f"}})),
        FallbackReason::UnsupportedFieldPath
    );
}

#[test]
fn test_malformed_filter_rejected() {
    let err = analyzer()
        .analyze_json("users", &json!({"_id": {"$regex": "x"}}))
        .unwrap_err();
    assert!(matches!(err, PushdownError::Malformed(_)));
    assert_eq!(err.code(), "DOCPROXY_FILTER_MALFORMED");
}

#[test]
fn test_unknown_collection_is_not_no_primary_key() {
    let err = analyzer()
        .analyze_json("missing", &json!({"_id": {"$oid": HEX}}))
        .unwrap_err();
    assert!(matches!(
        err,
        PushdownError::Schema(SchemaError::UnknownCollection(_))
    ));
}

#[test]
fn test_accessor_failure_propagates() {
    let analyzer = PushdownAnalyzer::from_config(&PushdownConfig::default(), Unreachable);
    let err = analyzer
        .analyze_json("users", &json!({"_id": {"$oid": HEX}}))
        .unwrap_err();
    assert_eq!(
        err,
        PushdownError::Schema(SchemaError::Unavailable("metadata store offline".into()))
    );
}

#[test]
fn test_accessor_not_consulted_for_multi_entry_filters() {
    let analyzer = PushdownAnalyzer::from_config(&PushdownConfig::default(), Unreachable);
    let plan = analyzer
        .analyze_json("users", &json!({"a": 1, "b": 2}))
        .unwrap();
    assert_eq!(plan.fallback_reason(), Some(FallbackReason::MultipleEntries));
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_classification_is_deterministic() {
    let analyzer = analyzer();
    let filter = json!({"_id": {"$oid": HEX}});
    let first = analyzer.analyze_json("users", &filter).unwrap();
    for _ in 0..100 {
        assert_eq!(analyzer.analyze_json("users", &filter).unwrap(), first);
    }
}
