//! Benchmark cases over the Sakila sample database.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::difficulty::Difficulty;
use crate::error::Result;
use crate::evaluator::EvalCase;

/// A benchmark question with its reference SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkCase {
    pub question: String,
    pub ground_truth: String,
    pub difficulty: Difficulty,
    pub category: String,
}

impl BenchmarkCase {
    fn new(question: &str, ground_truth: &str, difficulty: Difficulty, category: &str) -> Self {
        Self {
            question: question.to_string(),
            ground_truth: ground_truth.to_string(),
            difficulty,
            category: category.to_string(),
        }
    }

    /// Pair this case with a model's prediction.
    pub fn with_prediction(&self, predicted: impl Into<String>) -> EvalCase {
        EvalCase::new(self.question.clone(), predicted, self.ground_truth.clone())
    }
}

/// The seven basic Sakila cases, easy to hard.
pub fn basic_cases() -> Vec<BenchmarkCase> {
    vec![
        BenchmarkCase::new(
            "查找所有演员的姓名",
            "SELECT first_name, last_name FROM actor",
            Difficulty::Easy,
            "basic_select",
        ),
        BenchmarkCase::new("有多少部电影？", "SELECT COUNT(*) FROM film", Difficulty::Easy, "aggregation"),
        BenchmarkCase::new(
            "查找评级为 PG 的电影标题",
            "SELECT title FROM film WHERE rating = \"PG\"",
            Difficulty::Easy,
            "filtering",
        ),
        BenchmarkCase::new(
            "查找演员 John 参演的所有电影",
            "SELECT f.title\n\
             FROM film f\n\
             JOIN film_actor fa ON f.film_id = fa.film_id\n\
             JOIN actor a ON fa.actor_id = a.actor_id\n\
             WHERE a.first_name = \"John\"",
            Difficulty::Medium,
            "join",
        ),
        BenchmarkCase::new(
            "每个类别有多少部电影？",
            "SELECT c.name, COUNT(fc.film_id) as film_count\n\
             FROM category c\n\
             LEFT JOIN film_category fc ON c.category_id = fc.category_id\n\
             GROUP BY c.category_id, c.name",
            Difficulty::Medium,
            "group_by",
        ),
        BenchmarkCase::new(
            "查找租赁次数最多的前5部电影",
            "SELECT f.title, COUNT(r.rental_id) as rental_count\n\
             FROM film f\n\
             JOIN inventory i ON f.film_id = i.film_id\n\
             JOIN rental r ON i.inventory_id = r.inventory_id\n\
             GROUP BY f.film_id, f.title\n\
             ORDER BY rental_count DESC\n\
             LIMIT 5",
            Difficulty::Hard,
            "complex_aggregation",
        ),
        BenchmarkCase::new(
            "查找从未被租赁的电影",
            "SELECT f.title\n\
             FROM film f\n\
             LEFT JOIN inventory i ON f.film_id = i.film_id\n\
             LEFT JOIN rental r ON i.inventory_id = r.inventory_id\n\
             WHERE r.rental_id IS NULL",
            Difficulty::Hard,
            "subquery",
        ),
    ]
}

/// Write `cases` to `path` as a pretty-printed JSON array. Non-ASCII text
/// is written as-is.
///
/// # Errors
///
/// Returns [`EvalError::Io`](crate::EvalError::Io) or
/// [`EvalError::Serialization`](crate::EvalError::Serialization) on failure.
pub fn save_cases(cases: &[BenchmarkCase], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, cases)?;
    writer.flush()?;
    info!(path = %path.display(), cases = cases.len(), "saved benchmark cases");
    Ok(())
}

/// Read cases written by [`save_cases`].
pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<BenchmarkCase>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
