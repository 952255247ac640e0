//! Demo dataset generator.
//!
//! Produces a customer table with the kinds of problems the cleaning
//! pipeline is meant to fix: duplicate rows, missing emails, inconsistent
//! casing and padding in text columns, impossible ages and a few extreme
//! purchase amounts. The output is deterministic for a given seed.

use crate::error::Result;
use crate::table::Table;
use polars::prelude::*;
use rand::prelude::*;
use tracing::debug;

/// Default number of rows, duplicates included.
pub const DEFAULT_SAMPLE_ROWS: usize = 50;

/// Default RNG seed.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carla", "David", "Emma", "Farid", "Grace", "Hugo", "Ines", "Jonas", "Kenji",
    "Lena", "Marco", "Nadia", "Omar", "Priya",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Garcia", "Kowalski", "Nguyen", "Okafor", "Rossi", "Schmidt", "Tanaka", "Dubois",
    "Silva",
];

const GENDERS: &[&str] = &["Male", "male", "MALE", "Female", " Female", "female "];

const CITIES: &[&str] = &[
    "New York",
    " new york",
    "London",
    "london ",
    "Paris",
    "PARIS",
    "Tokyo",
    "  Tokyo ",
];

const INVALID_AGES: &[i64] = &[-4, 150, 212];

/// Builder-configured generator for the demo dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleDataset {
    rows: usize,
    seed: u64,
}

impl Default for SampleDataset {
    fn default() -> Self {
        Self {
            rows: DEFAULT_SAMPLE_ROWS,
            seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl SampleDataset {
    pub fn builder() -> SampleDatasetBuilder {
        SampleDatasetBuilder::default()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of exact duplicate rows appended to the generated rows.
    pub fn duplicate_rows(&self) -> usize {
        if self.rows < 2 {
            0
        } else {
            (self.rows / 20).max(1)
        }
    }

    /// Generate the table.
    pub fn generate(&self) -> Result<Table> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let unique_rows = self.rows - self.duplicate_rows();

        let mut records: Vec<CustomerRecord> = (0..unique_rows)
            .map(|i| CustomerRecord::random(i, &mut rng))
            .collect();

        for _ in 0..self.duplicate_rows() {
            let source = rng.gen_range(0..unique_rows);
            records.push(records[source].clone());
        }

        debug!(
            "Generated sample dataset: {} rows ({} duplicates), seed {}",
            records.len(),
            self.duplicate_rows(),
            self.seed
        );

        let df = df![
            "customer_id" => records.iter().map(|r| r.customer_id).collect::<Vec<_>>(),
            "name" => records.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            "age" => records.iter().map(|r| r.age).collect::<Vec<_>>(),
            "gender" => records.iter().map(|r| r.gender.to_string()).collect::<Vec<_>>(),
            "email" => records.iter().map(|r| r.email.clone()).collect::<Vec<_>>(),
            "city" => records.iter().map(|r| r.city.to_string()).collect::<Vec<_>>(),
            "purchase_amount" => records.iter().map(|r| r.purchase_amount).collect::<Vec<_>>(),
        ]?;

        Ok(Table::from_dataframe(df))
    }
}

#[derive(Debug, Clone)]
struct CustomerRecord {
    customer_id: i64,
    name: String,
    age: i64,
    gender: &'static str,
    email: Option<String>,
    city: &'static str,
    purchase_amount: f64,
}

impl CustomerRecord {
    fn random(index: usize, rng: &mut StdRng) -> Self {
        let first = pick(FIRST_NAMES, rng);
        let last = pick(LAST_NAMES, rng);
        let customer_id = 1001 + index as i64;

        // Problems sit at fixed positions so every seed carries all of them
        let age = if index % 17 == 5 {
            INVALID_AGES[(index / 17) % INVALID_AGES.len()]
        } else {
            rng.gen_range(18..=75)
        };
        let email = (index % 10 != 7).then(|| {
            format!(
                "{}.{}{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                customer_id
            )
        });
        let purchase_amount = if index % 23 == 11 {
            rng.gen_range(5_000.0..20_000.0)
        } else {
            rng.gen_range(10.0..500.0)
        };

        Self {
            customer_id,
            name: format!("{} {}", first, last),
            age,
            gender: pick(GENDERS, rng),
            email,
            city: pick(CITIES, rng),
            purchase_amount: (purchase_amount * 100.0_f64).round() / 100.0,
        }
    }
}

fn pick<T: Copy>(items: &[T], rng: &mut StdRng) -> T {
    items[rng.gen_range(0..items.len())]
}

/// Builder for [`SampleDataset`].
#[derive(Debug, Default)]
pub struct SampleDatasetBuilder {
    rows: Option<usize>,
    seed: Option<u64>,
}

impl SampleDatasetBuilder {
    /// Total number of rows, duplicates included.
    /// Default: 50
    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Default: 42
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate the table with the configured size and seed.
    pub fn build(self) -> Result<Table> {
        SampleDataset {
            rows: self.rows.unwrap_or(DEFAULT_SAMPLE_ROWS),
            seed: self.seed.unwrap_or(DEFAULT_SAMPLE_SEED),
        }
        .generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::DataCleaner;
    use crate::types::ColumnKind;

    #[test]
    fn test_default_shape_and_kinds() {
        let table = SampleDataset::builder().build().unwrap();
        assert_eq!(table.shape(), (50, 7));
        assert_eq!(
            table.column_names(),
            vec![
                "customer_id",
                "name",
                "age",
                "gender",
                "email",
                "city",
                "purchase_amount"
            ]
        );
        assert_eq!(table.kind("age").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.kind("purchase_amount").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.kind("gender").unwrap(), ColumnKind::Text);
    }

    #[test]
    fn test_same_seed_same_table() {
        let a = SampleDataset::builder().seed(7).build().unwrap();
        let b = SampleDataset::builder().seed(7).build().unwrap();
        let c = SampleDataset::builder().seed(8).build().unwrap();
        assert!(a.same_data(&b));
        assert!(!a.same_data(&c));
    }

    #[test]
    fn test_embedded_problems() {
        let table = SampleDataset::builder().rows(100).build().unwrap();
        let df = table.dataframe();

        assert_eq!(DataCleaner::duplicate_count(df).unwrap(), 5);
        assert!(df.column("email").unwrap().null_count() >= 9);

        let ages = df.column("age").unwrap().i64().unwrap();
        assert!(ages.into_iter().flatten().any(|a| !(0..=120).contains(&a)));

        let amounts = df.column("purchase_amount").unwrap().f64().unwrap();
        assert!(amounts.into_iter().flatten().any(|a| a >= 5_000.0));
    }

    #[test]
    fn test_tiny_datasets() {
        assert_eq!(SampleDataset::builder().rows(0).build().unwrap().height(), 0);
        let one = SampleDataset::builder().rows(1).build().unwrap();
        assert_eq!(one.height(), 1);
        assert_eq!(DataCleaner::duplicate_count(one.dataframe()).unwrap(), 0);
    }
}
