use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use pathway_explorer::config::{AppConfig, CRITERIA, ELIGIBLE_SCENARIOS, POWER_SECTOR};
use pathway_explorer::data::aggregate::chart_years;
use pathway_explorer::data::export::to_xlsx;
use pathway_explorer::data::model::{CellValue, Column, Table};

/// Minimal deterministic PRNG (splitmix64)
struct SimpleRng(u64);

impl SimpleRng {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[-spread, spread]`.
    fn jitter(&mut self, spread: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * spread
    }
}

const SCENARIOS: [(&str, f64); 5] = [
    ("IEA NZE", 0.97),
    ("IEA APS", 0.75),
    ("IPCC C1 - SSP1", 0.92),
    ("IPCC C1 - SSP2", 0.88),
    ("IPCC C2 - LED", 0.95),
];

/// (metric, unit, 2020 level)
const METRICS: [(&str, &str, f64); 3] = [
    ("Power sector emissions", "tCO2e", 13_500.0),
    ("Emission intensity", "tCO2/MWh", 0.46),
    ("Zero carbon capacity share", "% Zero Carbon Capacity", 38.0),
];

/// Linear path from `base` in 2020 towards `base * (1 - cut)` in 2050.
fn pathway(base: f64, cut: f64, rising: bool, rng: &mut SimpleRng) -> Vec<f64> {
    let years = chart_years();
    let last = years.len().saturating_sub(1).max(1) as f64;
    years
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let t = i as f64 / last;
            let level = if rising {
                base + (100.0 - base) * cut * t
            } else {
                base * (1.0 - cut * t)
            };
            (level * (1.0 + rng.jitter(0.03))).max(0.0)
        })
        .collect()
}

fn power_sector(rng: &mut SimpleRng) -> Result<Table> {
    let years = chart_years();
    let mut scenario = Vec::new();
    let mut metric = Vec::new();
    let mut unit = Vec::new();
    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); years.len()];

    for &(m, u, base) in &METRICS {
        let rising = u.starts_with('%');
        let mut rows: Vec<(String, Vec<f64>)> = SCENARIOS
            .iter()
            .map(|&(name, cut)| (name.to_string(), pathway(base, cut, rising, rng)))
            .collect();

        // Source workbooks ship a pre-computed median row per metric.
        let median: Vec<f64> = (0..years.len())
            .map(|i| {
                let mut col: Vec<f64> = rows.iter().map(|(_, v)| v[i]).collect();
                col.sort_by(f64::total_cmp);
                col[col.len() / 2]
            })
            .collect();
        rows.push(("Median (IPCC)".to_string(), median));

        for (name, path) in rows {
            scenario.push(CellValue::from(name));
            metric.push(CellValue::from(m));
            unit.push(CellValue::from(u));
            for (slot, v) in values.iter_mut().zip(path) {
                slot.push(CellValue::Float((v * 1000.0).round() / 1000.0));
            }
        }
    }

    let mut columns = vec![
        Column::new("Scenario", scenario),
        Column::new("Metric", metric),
        Column::new("Unit", unit),
    ];
    for (year, vals) in years.iter().zip(values) {
        columns.push(Column::new(year.to_string(), vals));
    }
    Ok(Table::new(columns)?)
}

fn eligible_scenarios() -> Result<Table> {
    let models = ["MESSAGEix-GLOBIOM", "REMIND-MAgPIE", "IMAGE", "WITCH"];
    let variables = ["Emissions|CO2", "Secondary Energy|Electricity", "Capacity|Electricity|Solar"];
    let mut rows = Vec::new();
    for (i, model) in models.iter().enumerate() {
        for (j, variable) in variables.iter().enumerate() {
            rows.push(vec![
                CellValue::from(*model),
                CellValue::from(format!("SSP{}-1.9", 1 + (i + j) % 3)),
                CellValue::from(if j % 2 == 0 { "World" } else { "R5ASIA" }),
                CellValue::from(*variable),
            ]);
        }
    }
    let header = ["Model", "Scenario", "Region", "Variable"].map(String::from).to_vec();
    Ok(Table::from_rows(header, rows)?)
}

fn phase_out() -> Result<Table> {
    let header = ["Model", "Scenario", "Region", "Variable", "Phase-out year"]
        .map(String::from)
        .to_vec();
    let rows = vec![
        vec!["IEA".into(), "NZE".into(), "OECD".into(), "Unabated coal power".into(), CellValue::Integer(2030)],
        vec!["IEA".into(), "NZE".into(), "World".into(), "Unabated coal power".into(), CellValue::Integer(2040)],
        vec!["IEA".into(), "NZE".into(), "World".into(), "Unabated gas power".into(), CellValue::Integer(2040)],
    ];
    Ok(Table::from_rows(header, rows)?)
}

fn write_parquet(table: &Table, path: &Path) -> Result<()> {
    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();
    for col in table.columns() {
        if col.values.iter().all(|v| v.as_f64().is_some() || v.is_null()) {
            fields.push(Field::new(col.name.as_str(), DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(
                col.values.iter().map(CellValue::as_f64).collect::<Vec<_>>(),
            )));
        } else {
            fields.push(Field::new(col.name.as_str(), DataType::Utf8, true));
            arrays.push(Arc::new(StringArray::from(
                col.values.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            )));
        }
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let bytes = to_xlsx(table)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} rows to {}", table.n_rows(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args_os().nth(1) {
        Some(dir) => AppConfig::with_data_dir(PathBuf::from(dir)),
        None => AppConfig::from_env(),
    };
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;

    let mut rng = SimpleRng(42);
    let power = power_sector(&mut rng)?;
    write_xlsx(&power, &config.dataset_path(&POWER_SECTOR))?;

    let parquet_path = config.dataset_path(&POWER_SECTOR).with_extension("parquet");
    write_parquet(&power, &parquet_path)?;
    println!("Wrote {} rows to {}", power.n_rows(), parquet_path.display());

    write_xlsx(&eligible_scenarios()?, &config.dataset_path(&ELIGIBLE_SCENARIOS))?;
    write_xlsx(&phase_out()?, &config.dataset_path(&CRITERIA))?;
    Ok(())
}
