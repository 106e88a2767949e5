use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

use ionic_trends::data::export::write_csv;
use ionic_trends::data::model::{
    PublicationRecord, Strategy, TopicId, TopicNames, YEAR_MAX, YEAR_MIN,
};

/// Write a synthetic publication table as CSV and Parquet.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// PRNG seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

/// Topic name and publications per year under TS at the end of the range.
const TOPICS: [(&str, f64); 6] = [
    ("Ionic Liquids (All)", 9000.0),
    ("ILs in Electrochemistry", 2200.0),
    ("ILs in Batteries", 900.0),
    ("ILs in Electrodeposition", 260.0),
    ("ILs in Electrochemical Manufacturing", 70.0),
    ("Elevated-T IL Electrochemical Manufacturing", 12.0),
];

/// Share of TS hits a narrower strategy still finds.
fn strategy_factor(strategy: Strategy) -> f64 {
    match strategy {
        Strategy::TS => 1.0,
        Strategy::KW => 0.55,
        Strategy::TI => 0.3,
    }
}

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Exponential growth towards `final_count`, with multiplicative noise.
fn yearly_count(final_count: f64, year: u16, rng: &mut SimpleRng) -> u64 {
    let years_before_end = f64::from(YEAR_MAX - year);
    let expected = final_count * (-0.16 * years_before_end).exp();
    let noisy = expected * rng.gauss(1.0, 0.08).max(0.0);
    noisy.round() as u64
}

fn generate(seed: u64) -> (Vec<PublicationRecord>, TopicNames) {
    let mut rng = SimpleRng::new(seed);
    let mut records = Vec::new();
    let mut names = TopicNames::default();

    for (topic, (name, final_count)) in TopicId::all().zip(TOPICS) {
        names.insert_first(topic, name);
        for strategy in Strategy::ALL {
            for year in YEAR_MIN..=YEAR_MAX {
                records.push(PublicationRecord {
                    topic,
                    strategy,
                    year,
                    count: yearly_count(final_count * strategy_factor(strategy), year, &mut rng),
                });
            }
        }
    }
    (records, names)
}

fn write_parquet(path: &Path, records: &[PublicationRecord], names: &TopicNames) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Year", DataType::Int64, false),
        Field::new("Search_Topic_ID", DataType::Int64, false),
        Field::new("Search_Topic", DataType::Utf8, false),
        Field::new("Search_Level", DataType::Utf8, false),
        Field::new("Record_Count", DataType::Int64, false),
    ]));

    let topic_names: Vec<String> = records.iter().map(|r| names.name(r.topic)).collect();
    let counts = records
        .iter()
        .map(|r| i64::try_from(r.count))
        .collect::<Result<Vec<_>, _>>()
        .context("count does not fit Int64")?;

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(records.iter().map(|r| i64::from(r.year)))),
            Arc::new(Int64Array::from_iter_values(
                records.iter().map(|r| i64::from(r.topic.get())),
            )),
            Arc::new(StringArray::from_iter_values(topic_names.iter())),
            Arc::new(StringArray::from_iter_values(
                records.iter().map(|r| r.strategy.code()),
            )),
            Arc::new(Int64Array::from(counts)),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let (records, names) = generate(args.seed);

    let csv_path = args.out_dir.join("master_database_detailed.csv");
    let file = File::create(&csv_path).with_context(|| format!("creating {}", csv_path.display()))?;
    write_csv(BufWriter::new(file), &records, &names).context("writing CSV")?;

    let parquet_path = args.out_dir.join("master_database_detailed.parquet");
    write_parquet(&parquet_path, &records, &names)?;

    println!(
        "Wrote {} records to {} and {}",
        records.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
