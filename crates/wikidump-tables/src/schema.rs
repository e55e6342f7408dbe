//! Arrow schema definitions for the converted tables

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

/// `page`: one row per page
pub static PAGE: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("namespace", DataType::Int64, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("is_redirect", DataType::Boolean, false),
        Field::new("is_new", DataType::Boolean, false),
        Field::new("latest", DataType::Int64, false),
    ]))
});

/// `pagelinks`: one row per (source page, target title) link
pub static PAGELINKS: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("from_id", DataType::Int64, false),
        Field::new("from_namespace", DataType::Int64, false),
        Field::new("to_namespace", DataType::Int64, false),
        Field::new("to_title", DataType::Utf8, false),
    ]))
});

/// `redirect`: one row per redirect page
pub static REDIRECT: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(vec![
        Field::new("from_id", DataType::Int64, false),
        Field::new("namespace", DataType::Int64, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("interwiki", DataType::Utf8, false),
    ]))
});

pub fn page() -> SchemaRef {
    PAGE.clone()
}

pub fn pagelinks() -> SchemaRef {
    PAGELINKS.clone()
}

pub fn redirect() -> SchemaRef {
    REDIRECT.clone()
}
