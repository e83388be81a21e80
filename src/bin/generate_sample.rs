//! Writes the same synthetic table as `sample_data.{csv,json,parquet}` into
//! the current directory, for trying out the viewer.

use std::sync::Arc;

use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{json, Value};

const ROWS: usize = 250;

const FIRST_NAMES: [&str; 8] = ["Ann", "Bob", "Carla", "Dmitri", "Eve", "Farid", "Gus", "Hana"];
const CITIES: [&str; 4] = ["Oslo", "Lima", "Osaka", "Tunis"];
const DEPARTMENTS: [&str; 3] = ["Sales", "Research", "Support"];

/// Deterministic PRNG (splitmix64).
struct SimpleRng(u64);

impl SimpleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct Person {
    id: i64,
    name: String,
    city: &'static str,
    department: &'static str,
    /// Every seventh person has no recorded age.
    age: Option<i64>,
    score: f64,
    active: bool,
}

fn generate(rng: &mut SimpleRng) -> Vec<Person> {
    (0..ROWS)
        .map(|i| Person {
            id: i as i64 + 1,
            name: format!("{} {}", rng.pick(&FIRST_NAMES), (b'A' + (i % 26) as u8) as char),
            city: rng.pick(&CITIES),
            department: rng.pick(&DEPARTMENTS),
            age: (i % 7 != 3).then(|| 18 + (rng.next_u64() % 50) as i64),
            score: (rng.next_f64() * 1000.0).round() / 10.0,
            active: rng.next_f64() > 0.3,
        })
        .collect()
}

fn write_csv(people: &[Person], path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer
        .write_record(["id", "name", "city", "department", "age", "score", "active"])
        .expect("Failed to write CSV header");
    for p in people {
        writer
            .write_record([
                p.id.to_string(),
                p.name.clone(),
                p.city.to_string(),
                p.department.to_string(),
                p.age.map(|a| a.to_string()).unwrap_or_default(),
                p.score.to_string(),
                p.active.to_string(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");
}

fn write_json(people: &[Person], path: &str) {
    let rows: Vec<Value> = people
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "city": p.city,
                "department": p.department,
                "age": p.age,
                "score": p.score,
                "active": p.active,
            })
        })
        .collect();
    let file = std::fs::File::create(path).expect("Failed to create JSON file");
    serde_json::to_writer_pretty(file, &rows).expect("Failed to write JSON");
}

fn write_parquet(people: &[Person], path: &str) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("department", DataType::Utf8, false),
        Field::new("age", DataType::Int64, true),
        Field::new("score", DataType::Float64, false),
        Field::new("active", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(people.iter().map(|p| p.id))),
            Arc::new(StringArray::from_iter_values(people.iter().map(|p| p.name.as_str()))),
            Arc::new(StringArray::from_iter_values(people.iter().map(|p| p.city))),
            Arc::new(StringArray::from_iter_values(people.iter().map(|p| p.department))),
            Arc::new(people.iter().map(|p| p.age).collect::<Int64Array>()),
            Arc::new(Float64Array::from_iter_values(people.iter().map(|p| p.score))),
            Arc::new(people.iter().map(|p| Some(p.active)).collect::<BooleanArray>()),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng(42);
    let people = generate(&mut rng);

    write_csv(&people, "sample_data.csv");
    write_json(&people, "sample_data.json");
    write_parquet(&people, "sample_data.parquet");

    println!(
        "Wrote {} rows to sample_data.csv, sample_data.json and sample_data.parquet",
        people.len()
    );
}
