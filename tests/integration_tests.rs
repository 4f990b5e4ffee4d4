mod common;

use common::{authors, blog_post, compile, schema};
use serde_json::{Value as Json, json};
use sieve_lang::{Evaluator, Schema, output::to_json};

/// Last names of the records `filter` keeps.
fn matching(schema: &Schema, root: &str, records: &[Json], filter: &str) -> Vec<String> {
    let (condition, _) = compile(schema, root, filter).unwrap();
    Evaluator::new()
        .filter(&condition, records)
        .into_iter()
        .map(|record| record["lastName"].as_str().unwrap_or("").to_string())
        .collect()
}

fn authors_matching(filter: &str) -> Vec<String> {
    matching(&schema(), "Author", &authors(), filter)
}

#[test]
fn test_atomic_predicates_on_authors() {
    let test_cases = vec![
        ("firstName = 'Charles'", vec!["Darwin"]),
        ("firstName != 'Charles'", vec!["Tolkien"]),
        ("age > 30", vec!["Darwin"]),
        ("age >= 30", vec!["Darwin", "Tolkien"]),
        ("age < 70", vec!["Tolkien"]),
        ("age <= 70", vec!["Darwin", "Tolkien"]),
        ("address.isApartment is true", vec!["Darwin"]),
        ("address.isApartment is false", vec!["Tolkien"]),
        ("email is null", vec!["Darwin"]),
        ("email is not null", vec!["Tolkien"]),
        ("firstName contains '.'", vec!["Tolkien"]),
        ("firstName starts 'ch'", vec!["Darwin"]),
        ("firstName not contains '.'", vec!["Darwin"]),
        ("firstName not starts 'ch'", vec!["Tolkien"]),
        ("age between 50 and 100", vec!["Darwin"]),
        ("age between 30 and 70", vec!["Darwin", "Tolkien"]),
        ("address.street in ('Street A', 'Street B')", vec!["Darwin", "Tolkien"]),
        ("address.street not in ('Street A', 'Street B')", vec![]),
        ("address.number = '300'", vec!["Tolkien"]),
        ("gender = 'MALE'", vec!["Darwin", "Tolkien"]),
        ("birthday < '1850-01-01'", vec!["Darwin"]),
    ];

    for (filter, expected) in test_cases {
        assert_eq!(authors_matching(filter), expected, "Failed for filter: {}", filter);
    }
}

#[test]
fn test_combined_predicates_on_authors() {
    let test_cases = vec![
        ("firstName = 'Charles' && age >= 30", vec!["Darwin"]),
        ("firstName = 'Charles' and age >= 30", vec!["Darwin"]),
        (
            "(firstName = 'Charles' && age >= 30) || (firstName contains '.' && email is not null)",
            vec!["Darwin", "Tolkien"],
        ),
        (
            "(firstName = 'Charles' && age >= 30) or (firstName contains '.' && email is not null)",
            vec!["Darwin", "Tolkien"],
        ),
        ("firstName = 'Charles' && (age < 30 || email is null)", vec!["Darwin"]),
        ("firstName = 'Charles' and (age < 30 or email is null)", vec!["Darwin"]),
    ];

    for (filter, expected) in test_cases {
        assert_eq!(authors_matching(filter), expected, "Failed for filter: {}", filter);
    }
}

#[test]
fn test_fold_order_changes_the_result() {
    // (age > 60 || age < 40) && email is not null
    assert_eq!(
        authors_matching("age > 60 || age < 40 && email is not null"),
        vec!["Tolkien"]
    );
    assert_eq!(
        authors_matching("age > 60 || (age < 40 && email is not null)"),
        vec!["Darwin", "Tolkien"]
    );
    // (email is null && age < 40) || age < 40
    assert_eq!(
        authors_matching("email is null && age < 40 || age < 40"),
        vec!["Tolkien"]
    );
}

#[test]
fn test_relationships_through_collections() {
    let schema = schema();
    let posts = vec![blog_post()];
    let test_cases = vec![
        ("author.lastName = 'One' || comments.content = 'Comment 1'", 1),
        ("comments.content = 'Comment 1'", 1),
        ("comments.author.email = 'a_two@mail.com'", 1),
        ("comments.author.email = 'nobody@mail.com'", 0),
        ("category.name starts 'prog'", 1),
        ("rating >= 4.5 && views between 1000 and 2000", 1),
        ("rating > 4.5", 0),
    ];

    for (filter, expected) in test_cases {
        assert_eq!(
            matching(&schema, "Post", &posts, filter).len(),
            expected,
            "Failed for filter: {}",
            filter
        );
    }
}

#[test]
fn test_condition_json() {
    let schema = schema();
    let (condition, _) =
        compile(&schema, "Author", "age >= 30 && address.street in ('Street A')").unwrap();
    let json: Json = serde_json::from_str(&to_json(&condition)).unwrap();
    assert_eq!(
        json,
        json!({
            "op": "and",
            "left": {"op": ">=", "field": "age", "value": 30},
            "right": {"op": "in", "field": "address.street", "values": ["Street A"]}
        })
    );
}

#[cfg(feature = "cli")]
mod cli {
    use sieve_lang::cli::{
        CheckOptions, CheckResult, CliError, FilterOptions, execute_check, execute_filter,
    };

    const SCHEMA: &str = r#"{
        "entities": {
            "Person": {"fields": {"firstName": "text", "age": "i32", "address": "entity:Address"}},
            "Author": {"extends": "Person", "fields": {"email": "text"}},
            "Address": {"fields": {"street": "text"}}
        }
    }"#;

    #[test]
    fn test_check_syntax_only() {
        let options = CheckOptions {
            filter: "age > 1 && name contains 'x'".to_string(),
            syntax_only: true,
            ..Default::default()
        };
        assert!(matches!(execute_check(&options), Ok(CheckResult::SyntaxValid)));
    }

    #[test]
    fn test_check_compiles_with_renames() {
        let options = CheckOptions {
            filter: "home.street = 'Street A' || home.street = 'Street B'".to_string(),
            schema: Some(SCHEMA.to_string()),
            entity: "Author".to_string(),
            renames: vec!["home=address".to_string()],
            syntax_only: false,
        };
        match execute_check(&options).unwrap() {
            CheckResult::Compiled { condition, joins } => {
                assert_eq!(joins, 1);
                assert_eq!(condition["op"], "or");
                assert_eq!(condition["left"]["field"], "address.street");
            }
            other => panic!("Expected compiled condition, got {other:?}"),
        }
    }

    #[test]
    fn test_check_reports_errors() {
        let options = CheckOptions {
            filter: "nickname = 'x'".to_string(),
            schema: Some(SCHEMA.to_string()),
            entity: "Author".to_string(),
            ..Default::default()
        };
        assert!(matches!(execute_check(&options), Err(CliError::Compile(_))));

        let options = CheckOptions {
            filter: "age = 1".to_string(),
            schema: Some(SCHEMA.to_string()),
            entity: "Editor".to_string(),
            ..Default::default()
        };
        assert!(matches!(execute_check(&options), Err(CliError::UnknownEntity(_))));

        let options = CheckOptions {
            filter: "age = 1".to_string(),
            ..Default::default()
        };
        assert!(matches!(execute_check(&options), Err(CliError::MissingSchema)));
    }

    #[test]
    fn test_filter_records() {
        let options = FilterOptions {
            filter: "age >= 30 && address.street = 'Street A'".to_string(),
            schema: SCHEMA.to_string(),
            entity: "Author".to_string(),
            renames: vec![],
            input: Some(
                r#"[
                    {"firstName": "Charles", "age": 70, "address": {"street": "Street A"}},
                    {"firstName": "Ada", "age": 36, "address": {"street": "Street B"}},
                    {"firstName": "Kid", "age": 9, "address": {"street": "Street A"}}
                ]"#
                .to_string(),
            ),
        };
        let kept = execute_filter(&options).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["firstName"], "Charles");
    }

    #[test]
    fn test_filter_without_input() {
        let options = FilterOptions {
            filter: "age = 1".to_string(),
            schema: SCHEMA.to_string(),
            entity: "Author".to_string(),
            ..Default::default()
        };
        assert!(matches!(execute_filter(&options), Err(CliError::NoInput)));
    }
}
