//! Prompt assembly for SQL generation and cleanup of model output.

use serde::{Deserialize, Serialize};

/// Instruction sent as the system message with every generation prompt.
pub const SYSTEM_PROMPT: &str = "You are a SQL expert. Generate a correct SQL query from the \
provided information. Return only the SQL statement, without any explanation.";

/// Summary of the Sakila sample schema used when no schema text is supplied.
pub const SAKILA_SCHEMA: &str = "\
Main tables of the Sakila database:

1. actor - actors
   - actor_id: actor ID
   - first_name: first name
   - last_name: last name

2. film - films
   - film_id: film ID
   - title: film title
   - description: description
   - release_year: release year
   - rental_rate: rental rate
   - length: running time
   - rating: rating

3. customer - customers
   - customer_id: customer ID
   - first_name: first name
   - last_name: last name
   - email: email address
   - store_id: store ID

4. rental - rentals
   - rental_id: rental ID
   - rental_date: rental date
   - customer_id: customer ID
   - inventory_id: inventory ID

5. category - film categories
   - category_id: category ID
   - name: category name

6. film_actor - film to actor link
   - film_id: film ID
   - actor_id: actor ID

7. film_category - film to category link
   - film_id: film ID
   - category_id: category ID
";

/// A retrieved question/SQL example.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarExample {
    /// Similarity of the stored question to the user question.
    pub similarity: f64,
    /// The stored question.
    pub question: String,
    /// The SQL that answers the stored question.
    pub sql: String,
}

/// A retrieved column description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMatch {
    /// Similarity of the description to the user question.
    pub similarity: f64,
    /// Table owning the column.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Human-written description of the column.
    pub description: String,
}

/// Renders the user prompt from schema text and retrieved context.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    schema: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(SAKILA_SCHEMA)
    }
}

impl PromptBuilder {
    /// Create a builder that embeds `schema` verbatim in every prompt.
    pub fn new(schema: impl Into<String>) -> Self {
        Self { schema: schema.into() }
    }

    /// The schema text placed at the top of each prompt.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Render the generation prompt for `question`.
    pub fn build(&self, question: &str, fields: &[FieldMatch], examples: &[SimilarExample]) -> String {
        let mut prompt = String::from("Generate a SQL statement for the user question using the information below.\n\n");

        prompt.push_str("=== Database Schema ===\n");
        prompt.push_str(self.schema.trim_end());
        prompt.push_str("\n\n=== Relevant Fields ===\n");
        for field in fields {
            prompt.push_str(&format!("- {}.{}: {}\n", field.table, field.column, field.description));
        }

        prompt.push_str("\n=== Similar Examples ===\n");
        for (i, example) in examples.iter().enumerate() {
            prompt.push_str(&format!("{}. Question: {}\n", i + 1, example.question));
            prompt.push_str(&format!("   SQL: {}\n\n", example.sql));
        }

        prompt.push_str("\n=== User Question ===\n");
        prompt.push_str(question);
        prompt.push_str("\n\nWrite the corresponding SQL statement:\n");
        prompt
    }
}

/// Strip markdown code fences and surrounding whitespace from a completion.
pub fn clean_sql_response(response: &str) -> String {
    response.replace("```sql", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_fields_and_numbered_examples() {
        let builder = PromptBuilder::new("actor(actor_id, first_name)");
        let fields = vec![FieldMatch {
            similarity: 0.8,
            table: "actor".to_string(),
            column: "first_name".to_string(),
            description: "演员的名字".to_string(),
        }];
        let examples = vec![SimilarExample {
            similarity: 0.5,
            question: "显示所有演员的姓名".to_string(),
            sql: "SELECT first_name, last_name FROM actor".to_string(),
        }];

        let prompt = builder.build("查找演员名字", &fields, &examples);
        assert!(prompt.contains("=== Database Schema ===\nactor(actor_id, first_name)\n"));
        assert!(prompt.contains("- actor.first_name: 演员的名字\n"));
        assert!(prompt.contains("1. Question: 显示所有演员的姓名\n   SQL: SELECT first_name, last_name FROM actor\n"));
        assert!(prompt.ends_with("=== User Question ===\n查找演员名字\n\nWrite the corresponding SQL statement:\n"));
    }

    #[test]
    fn default_builder_uses_sakila_schema() {
        assert_eq!(PromptBuilder::default().schema(), SAKILA_SCHEMA);
    }

    #[test]
    fn strips_code_fences() {
        assert_eq!(clean_sql_response("```sql\nSELECT 1;\n```\n"), "SELECT 1;");
        assert_eq!(clean_sql_response("  SELECT title FROM film  "), "SELECT title FROM film");
    }
}
