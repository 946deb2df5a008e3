use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    rank: &'static str,
    discipline: &'static str,
    yrs_since_phd: i64,
    yrs_service: i64,
    sex: &'static str,
    salary: i64,
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    (0..n)
        .map(|_| {
            let sex = if rng.next_f64() < 0.1 { "Female" } else { "Male" };
            let discipline = if rng.next_f64() < 0.45 { "A" } else { "B" };
            let yrs_since_phd = rng.range(1, 56);
            let yrs_service = rng.range(0, yrs_since_phd.min(60));
            let (rank, base) = match yrs_since_phd {
                0..=7 => ("AsstProf", 80_000.0),
                8..=15 => ("AssocProf", 94_000.0),
                _ => ("Prof", 126_000.0),
            };
            let bonus = if discipline == "B" { 12_000.0 } else { 0.0 };
            let salary = rng.gauss(base + bonus, 14_000.0).max(57_000.0).round() as i64;
            Row { rank, discipline, yrs_since_phd, yrs_service, sex, salary }
        })
        .collect()
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["", "rank", "discipline", "yrs.since.phd", "yrs.service", "sex", "salary"])?;
    for (i, row) in rows.iter().enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            row.rank.to_string(),
            row.discipline.to_string(),
            row.yrs_since_phd.to_string(),
            row.yrs_service.to_string(),
            row.sex.to_string(),
            row.salary.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let text = |f: fn(&Row) -> &'static str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());
    let int = |f: fn(&Row) -> i64| Int64Array::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("rank", DataType::Utf8, false),
        Field::new("discipline", DataType::Utf8, false),
        Field::new("yrs.since.phd", DataType::Int64, false),
        Field::new("yrs.service", DataType::Int64, false),
        Field::new("sex", DataType::Utf8, false),
        Field::new("salary", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| r.rank)),
            Arc::new(text(|r| r.discipline)),
            Arc::new(int(|r| r.yrs_since_phd)),
            Arc::new(int(|r| r.yrs_service)),
            Arc::new(text(|r| r.sex)),
            Arc::new(int(|r| r.salary)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 397);

    write_csv("salaries_sample.csv", &rows)?;
    write_parquet("salaries_sample.parquet", &rows)?;

    println!(
        "Wrote {} faculty records to salaries_sample.csv and salaries_sample.parquet",
        rows.len()
    );
    Ok(())
}
