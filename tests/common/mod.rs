#![allow(dead_code)]

use serde_json::{Value as Json, json};
use sieve_lang::{
    CompileError, Compiler, Condition, ConditionSink, EntityType, FieldType, Schema,
    condition::JoinRecord,
};

pub fn schema() -> Schema {
    Schema::new()
        .with_enum("Gender", ["MALE", "FEMALE"])
        .with_entity(
            EntityType::new("Person")
                .field("firstName", FieldType::Text)
                .field("lastName", FieldType::Text)
                .field("age", FieldType::I32)
                .field("address", FieldType::Entity("Address".into())),
        )
        .with_entity(
            EntityType::new("Author")
                .extends("Person")
                .field("id", FieldType::Uuid)
                .field("email", FieldType::Text)
                .field("gender", FieldType::Enum("Gender".into()))
                .field("birthday", FieldType::Date)
                .field("createdAt", FieldType::Instant)
                .field("posts", FieldType::Collection("Post".into())),
        )
        .with_entity(
            EntityType::new("Address")
                .field("street", FieldType::Text)
                .field("number", FieldType::Text)
                .field("isApartment", FieldType::Bool),
        )
        .with_entity(EntityType::new("Category").field("name", FieldType::Text))
        .with_entity(
            EntityType::new("Post")
                .field("content", FieldType::Text)
                .field("rating", FieldType::Decimal)
                .field("views", FieldType::I64)
                .field("category", FieldType::Entity("Category".into()))
                .field("author", FieldType::Entity("Author".into()))
                .field("comments", FieldType::Collection("Comment".into())),
        )
        .with_entity(
            EntityType::new("Comment")
                .field("content", FieldType::Text)
                .field("author", FieldType::Entity("Author".into())),
        )
}

/// Compiles `filter` against `root` with the default compiler.
pub fn compile(
    schema: &Schema,
    root: &str,
    filter: &str,
) -> Result<(Condition, Vec<JoinRecord>), CompileError> {
    let mut sink = ConditionSink::new(schema, root);
    let condition = Compiler::new().compile(&mut sink, filter)?;
    Ok((condition, sink.joins().to_vec()))
}

pub fn darwin() -> Json {
    json!({
        "firstName": "Charles",
        "lastName": "Darwin",
        "email": null,
        "age": 70,
        "gender": "MALE",
        "birthday": "1809-02-12",
        "address": {"street": "Street A", "number": "700", "isApartment": true}
    })
}

pub fn tolkien() -> Json {
    json!({
        "firstName": "J. R. R.",
        "lastName": "Tolkien",
        "email": "tolkien@youmail.com",
        "age": 30,
        "gender": "MALE",
        "birthday": "1892-01-03",
        "address": {"street": "Street B", "number": "300", "isApartment": false}
    })
}

pub fn authors() -> Vec<Json> {
    vec![darwin(), tolkien()]
}

pub fn blog_post() -> Json {
    let author_one = json!({
        "firstName": "Author", "lastName": "One", "email": "a_one@mail.com", "age": 20,
        "address": {"street": "Street A", "number": "109", "isApartment": true}
    });
    let author_two = json!({
        "firstName": "Author", "lastName": "Two", "email": "a_two@mail.com", "age": 26,
        "address": {"street": "Street A", "number": "109", "isApartment": true}
    });
    json!({
        "content": "My blog post",
        "rating": "4.5",
        "views": 1200,
        "category": {"name": "Programming"},
        "author": author_one.clone(),
        "comments": [
            {"content": "Comment 1", "author": author_two},
            {"content": "Comment 2", "author": author_one}
        ]
    })
}
