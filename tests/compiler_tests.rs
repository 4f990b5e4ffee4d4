// tests/compiler_tests.rs

mod common;

use common::{compile, schema};
use proptest::prelude::*;
use sieve_lang::condition::{CompareOp, Test};
use sieve_lang::{
    CompileError, Compiler, Condition, ConditionSink, ConverterRegistry, EntityType, FieldType,
    Schema, TypeFieldCache, Value, register_converter,
};

fn compiled(root: &str, filter: &str) -> String {
    let schema = schema();
    let (condition, _) = compile(&schema, root, filter).unwrap();
    condition.to_string()
}

// ============================================================================
// Folding
// ============================================================================

#[test]
fn test_single_predicate() {
    assert_eq!(compiled("Author", "firstName = 'Charles'"), "firstName = 'Charles'");
}

#[test]
fn test_strict_left_to_right_fold() {
    assert_eq!(
        compiled("Author", "age = 1 || age = 2 && firstName = 'x'"),
        "((age = 1 OR age = 2) AND firstName = 'x')"
    );
    assert_eq!(
        compiled("Author", "age = 1 && age = 2 || firstName = 'x'"),
        "((age = 1 AND age = 2) OR firstName = 'x')"
    );
}

#[test]
fn test_parentheses_override_fold() {
    assert_eq!(
        compiled("Author", "age = 1 || (age = 2 && firstName = 'x')"),
        "(age = 1 OR (age = 2 AND firstName = 'x'))"
    );
    assert_eq!(compiled("Author", "((age = 1))"), "age = 1");
}

#[test]
fn test_keyword_and_symbol_synonyms() {
    assert_eq!(
        compiled("Author", "age = 1 and age = 2 OR age = 3"),
        compiled("Author", "age = 1 && age = 2 || age = 3")
    );
}

proptest! {
    #[test]
    fn prop_chains_fold_left(ops in prop::collection::vec(any::<bool>(), 1..12)) {
        let mut filter = "age = 0".to_string();
        let mut expected = "age = 0".to_string();
        for (i, is_and) in ops.iter().enumerate() {
            let n = i + 1;
            let (symbol, word) = if *is_and { ("&&", "AND") } else { ("||", "OR") };
            filter.push_str(&format!(" {symbol} age = {n}"));
            expected = format!("({expected} {word} age = {n})");
        }
        prop_assert_eq!(compiled("Author", &filter), expected);
    }
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_relational_values_are_typed() {
    let schema = schema();
    let (condition, _) = compile(&schema, "Author", "age >= 30").unwrap();
    match condition {
        Condition::Compare { field, op, value } => {
            assert_eq!(field.dotted(), "age");
            assert_eq!(op, CompareOp::GreaterEqual);
            assert_eq!(value, Value::I32(30));
        }
        other => panic!("Expected comparison, got {other}"),
    }
}

#[test]
fn test_boolean_and_null_tests() {
    let schema = schema();
    let test_cases = vec![
        ("address.isApartment is true", Test::True),
        ("address.isApartment is false", Test::False),
        ("email is null", Test::Null),
        ("email is not null", Test::NotNull),
    ];
    for (filter, expected) in test_cases {
        let (condition, _) = compile(&schema, "Author", filter).unwrap();
        assert!(
            matches!(condition, Condition::Test { test, .. } if test == expected),
            "Failed for filter: {}",
            filter
        );
    }
}

#[test]
fn test_string_matching_is_uppercased() {
    let schema = schema();
    let test_cases = vec![
        ("firstName contains 'ar'", "%AR%", false),
        ("firstName starts 'ch'", "CH%", false),
        ("firstName not contains '.'", "%.%", true),
        ("firstName not starts 'Ch'", "CH%", true),
    ];
    for (filter, expected_pattern, expected_negated) in test_cases {
        let (condition, _) = compile(&schema, "Author", filter).unwrap();
        match condition {
            Condition::Like {
                pattern, negated, ..
            } => {
                assert_eq!(pattern, expected_pattern, "Failed for filter: {}", filter);
                assert_eq!(negated, expected_negated, "Failed for filter: {}", filter);
            }
            other => panic!("Expected LIKE for {filter}, got {other}"),
        }
    }
}

#[test]
fn test_string_matching_does_not_convert() {
    assert_eq!(compiled("Author", "age contains '3'"), "UPPER(age) LIKE '%3%'");
}

#[test]
fn test_in_keeps_value_order() {
    assert_eq!(
        compiled("Author", "address.street in ('Street B', 'Street A')"),
        "address.street IN ('Street B', 'Street A')"
    );
}

#[test]
fn test_not_in_negates_membership() {
    let schema = schema();
    let (condition, _) = compile(&schema, "Author", "age not in (1, 2)").unwrap();
    match condition {
        Condition::Not(inner) => match *inner {
            Condition::In { values, .. } => assert_eq!(values, vec![Value::I32(1), Value::I32(2)]),
            other => panic!("Expected IN, got {other}"),
        },
        other => panic!("Expected NOT, got {other}"),
    }
}

#[test]
fn test_between_is_inclusive_range() {
    assert_eq!(
        compiled("Author", "age between 50 and 100"),
        "age BETWEEN 50 AND 100"
    );
}

#[test]
fn test_enum_values() {
    let schema = schema();
    let (condition, _) = compile(&schema, "Author", "gender in ('FEMALE', 'MALE')").unwrap();
    match condition {
        Condition::In { values, .. } => assert_eq!(
            values,
            vec![
                Value::Enum {
                    enum_name: "Gender".to_string(),
                    variant: "FEMALE".to_string()
                },
                Value::Enum {
                    enum_name: "Gender".to_string(),
                    variant: "MALE".to_string()
                },
            ]
        ),
        other => panic!("Expected IN, got {other}"),
    }
}

#[test]
fn test_inherited_fields_resolve() {
    assert_eq!(compiled("Author", "lastName = 'Darwin'"), "lastName = 'Darwin'");
}

// ============================================================================
// Joins
// ============================================================================

#[test]
fn test_one_join_per_prefix() {
    let schema = schema();
    let (_, joins) = compile(
        &schema,
        "Author",
        "address.street = 'a' && address.number = '3' || address.isApartment is true",
    )
    .unwrap();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].segment, "address");
    assert_eq!(joins[0].entity, "Address");
    assert_eq!(joins[0].parent, None);
}

#[test]
fn test_nested_joins_share_prefixes() {
    let schema = schema();
    let (condition, joins) = compile(
        &schema,
        "Post",
        "comments.author.email = 'x' || comments.content = 'y' && author.lastName = 'z'",
    )
    .unwrap();

    let segments: Vec<(&str, Option<usize>)> = joins
        .iter()
        .map(|join| (join.segment.as_str(), join.parent))
        .collect();
    assert_eq!(
        segments,
        vec![("comments", None), ("author", Some(0)), ("author", None)]
    );
    assert_eq!(joins[1].entity, "Author");
    assert_eq!(condition.atoms(), 3);
}

#[test]
fn test_join_cache_is_per_compilation() {
    let schema = schema();
    let compiler = Compiler::new();
    let mut sink = ConditionSink::new(&schema, "Author");
    compiler.compile(&mut sink, "address.street = 'a'").unwrap();
    compiler.compile(&mut sink, "address.street = 'b'").unwrap();
    assert_eq!(sink.joins().len(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_syntax_error_is_reported() {
    let schema = schema();
    let err = compile(&schema, "Author", "age = 1 &&").unwrap_err();
    match err {
        CompileError::Syntax(e) => assert_eq!((e.line, e.column), (1, 11)),
        other => panic!("Expected syntax error, got {other}"),
    }
}

#[test]
fn test_unknown_segments() {
    let schema = schema();
    let test_cases = vec![
        ("nickname = 'x'", "nickname"),
        ("office.street = 'x'", "office"),
        ("address.zip = 'x'", "zip"),
        ("firstName.length = 1", "firstName"),
    ];
    for (filter, expected_segment) in test_cases {
        match compile(&schema, "Author", filter).unwrap_err() {
            CompileError::SchemaResolution { segment, .. } => {
                assert_eq!(segment, expected_segment, "Failed for filter: {}", filter)
            }
            other => panic!("Expected resolution error for {filter}, got {other}"),
        }
    }
}

#[test]
fn test_relationship_is_not_a_terminal_value() {
    let schema = schema();
    let err = compile(&schema, "Author", "address = 'x'").unwrap_err();
    assert!(err.is_conversion(), "got {err}");
}

#[test]
fn test_conversion_error_names_field_and_literal() {
    let schema = schema();
    match compile(&schema, "Author", "age = 'thirty'").unwrap_err() {
        CompileError::Conversion {
            target_type,
            field_name,
            literal,
            ..
        } => {
            assert_eq!(target_type, FieldType::I32);
            assert_eq!(field_name, "age");
            assert_eq!(literal, "thirty");
        }
        other => panic!("Expected conversion error, got {other}"),
    }
    assert!(compile(&schema, "Author", "age = 3000000000").unwrap_err().is_conversion());
}

#[test]
fn test_enum_variants_are_case_sensitive() {
    let schema = schema();
    assert!(compile(&schema, "Author", "gender = 'MALE'").is_ok());
    assert!(compile(&schema, "Author", "gender = 'male'").unwrap_err().is_conversion());
}

#[test]
fn test_no_partial_result_after_error() {
    let schema = schema();
    let mut sink = ConditionSink::new(&schema, "Author");
    let result = Compiler::new().compile(&mut sink, "age = 1 && nickname = 'x' && age = 2");
    assert!(result.unwrap_err().is_schema_resolution());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_attribute_mapper() {
    let schema = schema();
    let compiler = Compiler::new().with_attribute_mapper(|path| match path {
        "name" => "firstName".to_string(),
        other => other.replace("home.", "address."),
    });
    let mut sink = ConditionSink::new(&schema, "Author");
    let condition = compiler
        .compile(&mut sink, "name = 'Charles' && home.street = 'Street A'")
        .unwrap();
    assert_eq!(
        condition.to_string(),
        "(firstName = 'Charles' AND address.street = 'Street A')"
    );
}

#[test]
fn test_custom_type_with_registered_converter() {
    let schema = Schema::new().with_entity(
        EntityType::new("Invoice")
            .field("total", FieldType::Custom("Cents".into())),
    );
    let money = FieldType::Custom("Cents".into());

    register_converter(money, |text| {
        let (units, cents) = text.split_once('.').unwrap_or((text, ""));
        let cents = format!("{cents:0<2}");
        Ok(Value::I64(units.parse::<i64>()? * 100 + cents.parse::<i64>()?))
    });

    let test_cases = vec![("total > 12.05", 1205), ("total > 12.5", 1250), ("total > 12", 1200)];
    for (filter, expected) in test_cases {
        let (condition, _) = compile(&schema, "Invoice", filter).unwrap();
        assert!(
            matches!(condition, Condition::Compare { value: Value::I64(cents), .. } if cents == expected),
            "Failed for filter: {}",
            filter
        );
    }
}

#[test]
fn test_custom_type_without_converter() {
    let schema = Schema::new().with_entity(
        EntityType::new("Parcel")
            .field("weight", FieldType::Custom("UnregisteredWeight".into())),
    );
    let err = compile(&schema, "Parcel", "weight = 3").unwrap_err();
    assert!(err.is_conversion());
}

#[test]
fn test_private_registry_overrides_builtin() {
    let schema = schema();
    let registry = ConverterRegistry::with_builtins();
    registry.register(FieldType::Text, |text| Ok(Value::Text(text.to_lowercase())));
    let field_types = TypeFieldCache::new();

    let compiler = Compiler::new()
        .with_converters(&registry)
        .with_field_types(&field_types);
    let mut sink = ConditionSink::new(&schema, "Author");
    let condition = compiler.compile(&mut sink, "firstName = 'CHARLES'").unwrap();

    assert_eq!(condition.to_string(), "firstName = 'charles'");
    assert!(!field_types.is_empty());
    assert_eq!(compiled("Author", "firstName = 'CHARLES'"), "firstName = 'CHARLES'");
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_compilations_share_global_tables() {
    let shards: Vec<FieldType> = (0..8)
        .map(|i| FieldType::Custom(format!("Shard{i}")))
        .collect();

    let schemas: Vec<Schema> = std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..3 {
                for (i, ty) in shards.iter().enumerate() {
                    let offset = i as i64 * 1000;
                    register_converter(ty.clone(), move |text| {
                        Ok(Value::I64(offset + text.parse::<i64>()?))
                    });
                }
            }
        });

        let workers: Vec<_> = (0..8)
            .map(|i| {
                scope.spawn(move || {
                    let ty = if i % 2 == 0 { FieldType::I32 } else { FieldType::Text };
                    let schema = Schema::new().with_entity(
                        EntityType::new("Reading")
                            .field("value", ty)
                            .field("label", FieldType::Text),
                    );
                    for round in 0..50 {
                        let filter = format!("value = {round} && label = 'r{round}'");
                        let mut sink = ConditionSink::new(&schema, "Reading");
                        let condition = Compiler::new().compile(&mut sink, &filter).unwrap();
                        let expected = if i % 2 == 0 {
                            format!("(value = {round} AND label = 'r{round}')")
                        } else {
                            format!("(value = '{round}' AND label = 'r{round}')")
                        };
                        assert_eq!(condition.to_string(), expected, "Failed for filter: {}", filter);
                    }
                    schema
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    });

    let cache = TypeFieldCache::global();
    for (i, schema) in schemas.iter().enumerate() {
        let expected = if i % 2 == 0 { FieldType::I32 } else { FieldType::Text };
        assert!(cache.contains(schema, "Reading", "value"));
        assert!(cache.contains(schema, "Reading", "label"));
        assert_eq!(cache.lookup(schema, "Reading", "value"), Some(expected));
    }

    for (i, ty) in shards.iter().enumerate() {
        let schema = Schema::new().with_entity(EntityType::new("Meter").field("reading", ty.clone()));
        let (condition, _) = compile(&schema, "Meter", "reading = 7").unwrap();
        let expected = i as i64 * 1000 + 7;
        assert!(
            matches!(condition, Condition::Compare { value: Value::I64(n), .. } if n == expected),
            "Failed for {ty}"
        );
    }
}
