//! Flattening of schema and example corpora into indexable documents.
//!
//! Each function here picks one flattening policy; callers are free to build
//! [`Document`]s differently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{Document, Metadata};

/// Metadata key holding a table name.
pub const TABLE_NAME: &str = "table_name";
/// Metadata key holding a column name.
pub const COLUMN_NAME: &str = "column_name";
/// Metadata key holding a column description.
pub const DESCRIPTION: &str = "description";
/// Metadata key holding a `CREATE TABLE` statement.
pub const DDL_TEXT: &str = "ddl_text";
/// Metadata key holding a natural-language question.
pub const QUESTION: &str = "question";
/// Metadata key holding the SQL that answers a question.
pub const SQL_TEXT: &str = "sql_text";

/// A natural-language question paired with the SQL that answers it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionSql {
    /// The question as a user would phrase it.
    pub question: String,
    /// The reference SQL.
    pub sql: String,
}

impl QuestionSql {
    /// Create a question/SQL pair.
    pub fn new(question: impl Into<String>, sql: impl Into<String>) -> Self {
        Self { question: question.into(), sql: sql.into() }
    }
}

/// One document per table, indexed on its DDL.
pub fn ddl_documents(ddl: &BTreeMap<String, String>) -> Vec<Document> {
    ddl.iter()
        .map(|(table, statement)| {
            let metadata = Metadata::from([
                (TABLE_NAME.to_string(), table.clone()),
                (DDL_TEXT.to_string(), statement.clone()),
            ]);
            Document::new(statement.clone(), metadata)
        })
        .collect()
}

/// One document per column, indexed on `"{table}.{column}: {description}"`.
pub fn column_documents(descriptions: &BTreeMap<String, BTreeMap<String, String>>) -> Vec<Document> {
    descriptions
        .iter()
        .flat_map(|(table, columns)| {
            columns.iter().map(move |(column, description)| {
                let metadata = Metadata::from([
                    (TABLE_NAME.to_string(), table.clone()),
                    (COLUMN_NAME.to_string(), column.clone()),
                    (DESCRIPTION.to_string(), description.clone()),
                ]);
                Document::new(format!("{table}.{column}: {description}"), metadata)
            })
        })
        .collect()
}

/// One document per pair, indexed on the question.
pub fn question_sql_documents(pairs: &[QuestionSql]) -> Vec<Document> {
    pairs
        .iter()
        .map(|pair| {
            let metadata = Metadata::from([
                (QUESTION.to_string(), pair.question.clone()),
                (SQL_TEXT.to_string(), pair.sql.clone()),
            ]);
            Document::new(pair.question.clone(), metadata)
        })
        .collect()
}
