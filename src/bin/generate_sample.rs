use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (mean, std) per measurement, roughly the published per-species figures.
struct Morphology {
    species: &'static str,
    bill_length: (f64, f64),
    bill_depth: (f64, f64),
    flipper_length: (f64, f64),
    body_mass: (f64, f64),
    /// (island, number of birds)
    colonies: &'static [(&'static str, usize)],
}

const MORPHOLOGY: [Morphology; 3] = [
    Morphology {
        species: "Adelie",
        bill_length: (38.8, 2.7),
        bill_depth: (18.3, 1.2),
        flipper_length: (190.0, 6.5),
        body_mass: (3700.0, 460.0),
        colonies: &[("Torgersen", 52), ("Biscoe", 44), ("Dream", 56)],
    },
    Morphology {
        species: "Gentoo",
        bill_length: (47.5, 3.1),
        bill_depth: (15.0, 1.0),
        flipper_length: (217.0, 6.5),
        body_mass: (5076.0, 504.0),
        colonies: &[("Biscoe", 124)],
    },
    Morphology {
        species: "Chinstrap",
        bill_length: (48.8, 3.3),
        bill_depth: (18.4, 1.1),
        flipper_length: (196.0, 7.1),
        body_mass: (3733.0, 384.0),
        colonies: &[("Dream", 68)],
    },
];

/// Every cell optional so a few rows can carry missing values.
#[derive(Default)]
struct Columns {
    species: Vec<Option<String>>,
    island: Vec<Option<String>>,
    bill_length_mm: Vec<Option<f64>>,
    bill_depth_mm: Vec<Option<f64>>,
    flipper_length_mm: Vec<Option<f64>>,
    body_mass_g: Vec<Option<f64>>,
    sex: Vec<Option<String>>,
    year: Vec<Option<i64>>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();
    let mut row_id = 0usize;

    for m in &MORPHOLOGY {
        for &(island, count) in m.colonies {
            for i in 0..count {
                // Males are larger on every axis.
                let male = i % 2 == 0;
                let shift = if male { 0.5 } else { -0.5 };
                let mut sample = |(mean, std): (f64, f64), decimals: i32| {
                    let scale = 10f64.powi(decimals);
                    let v = rng.gauss(mean + shift * std, std * 0.85).max(mean * 0.5);
                    (v * scale).round() / scale
                };

                let bill_length = sample(m.bill_length, 1);
                let bill_depth = sample(m.bill_depth, 1);
                let flipper = sample(m.flipper_length, 0);
                let mass = (sample(m.body_mass, 0) / 25.0).round() * 25.0;

                // Sprinkle in the kind of gaps the field data has.
                let all_missing = row_id % 97 == 3;
                let sex_missing = row_id % 41 == 10;

                cols.species.push(Some(m.species.to_string()));
                cols.island.push(Some(island.to_string()));
                cols.bill_length_mm.push((!all_missing).then_some(bill_length));
                cols.bill_depth_mm.push((!all_missing).then_some(bill_depth));
                cols.flipper_length_mm.push((!all_missing).then_some(flipper));
                cols.body_mass_g.push((!all_missing).then_some(mass));
                cols.sex.push(
                    (!(all_missing || sex_missing))
                        .then(|| if male { "male" } else { "female" }.to_string()),
                );
                cols.year.push(Some(2007 + (i % 3) as i64));
                row_id += 1;
            }
        }
    }
    cols
}

fn write_csv(path: &Path, cols: &Columns) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record([
        "species",
        "island",
        "bill_length_mm",
        "bill_depth_mm",
        "flipper_length_mm",
        "body_mass_g",
        "sex",
        "year",
    ])?;

    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "NA".to_string());
    let num = |v: &Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "NA".to_string());
    for i in 0..cols.species.len() {
        writer.write_record([
            text(&cols.species[i]),
            text(&cols.island[i]),
            num(&cols.bill_length_mm[i]),
            num(&cols.bill_depth_mm[i]),
            num(&cols.flipper_length_mm[i]),
            num(&cols.body_mass_g[i]),
            text(&cols.sex[i]),
            cols.year[i].map(|y| y.to_string()).unwrap_or_else(|| "NA".to_string()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, cols: &Columns) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("species", DataType::Utf8, true),
        Field::new("island", DataType::Utf8, true),
        Field::new("bill_length_mm", DataType::Float64, true),
        Field::new("bill_depth_mm", DataType::Float64, true),
        Field::new("flipper_length_mm", DataType::Float64, true),
        Field::new("body_mass_g", DataType::Float64, true),
        Field::new("sex", DataType::Utf8, true),
        Field::new("year", DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(cols.species.clone())),
            Arc::new(StringArray::from(cols.island.clone())),
            Arc::new(Float64Array::from(cols.bill_length_mm.clone())),
            Arc::new(Float64Array::from(cols.bill_depth_mm.clone())),
            Arc::new(Float64Array::from(cols.flipper_length_mm.clone())),
            Arc::new(Float64Array::from(cols.body_mass_g.clone())),
            Arc::new(StringArray::from(cols.sex.clone())),
            Arc::new(Int64Array::from(cols.year.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/penguins.csv"));

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);

    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&output_path, &cols)?,
        "parquet" | "pq" => write_parquet(&output_path, &cols)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!(
        "Wrote {} penguins to {}",
        cols.species.len(),
        output_path.display()
    );
    Ok(())
}
