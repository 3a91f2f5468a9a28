use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled, settings::Style};

use bias_scope::data::load_templates;
use bias_scope::domain::{ActiveRange, BiasType, Formula};
use bias_scope::models::{
    Condition, FormulaTemplate, compress_ranges, format_formula, parse_scan_response,
};
use bias_scope::utils::{epoch_ms_to_date_time, format_duration};
use bias_scope::{PERSISTENCE, ScanResult};

/// Prints where each saved formula held over a scan result.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Saved scan response (JSON)
    #[arg(long)]
    results: PathBuf,

    /// JSON array of formulas
    #[arg(long, conflicts_with = "template")]
    formulas: Option<PathBuf>,

    /// Name of a saved template to analyse instead of --formulas
    #[arg(long)]
    template: Option<String>,

    /// Template library file
    #[arg(long)]
    templates: Option<PathBuf>,
}

#[derive(Tabled)]
struct RangeRow {
    #[tabled(rename = "Bias")]
    bias: String,
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Span")]
    span: String,
}

fn read_formulas(args: &Args) -> Result<Vec<Formula>> {
    if let Some(path) = &args.formulas {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read formulas from {}", path.display()))?;
        return serde_json::from_str(&json)
            .with_context(|| format!("{} is not a JSON array of formulas", path.display()));
    }
    let Some(name) = &args.template else {
        bail!("Pass --formulas <FILE> or --template <NAME>");
    };
    let library_path = args
        .templates
        .clone()
        .unwrap_or_else(|| PathBuf::from(PERSISTENCE.templates.path));
    let library = load_templates(&library_path)?;
    let template = library
        .get(FormulaTemplate::id_for(name))
        .with_context(|| format!("No template named '{}' in {}", name, library_path.display()))?;
    Ok(template.formulas.clone())
}

fn read_result(path: &Path) -> Result<ScanResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scan results from {}", path.display()))?;
    Ok(parse_scan_response(&json)?)
}

/// Price-based formulas are checked at each prediction's own price.
fn active_ranges(condition: &Condition, result: &ScanResult) -> Vec<ActiveRange> {
    match condition.evaluate() {
        Some(evaluation) => evaluation.ranges,
        None => {
            let truth: Vec<(i64, bool)> = result
                .predictions()
                .iter()
                .filter_map(|p| {
                    condition
                        .holds_at(p.price_at_prediction, p.timestamp)
                        .map(|held| (p.timestamp, held))
                })
                .collect();
            compress_ranges(&truth)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let result = read_result(&args.results)?;
    let mut formulas = read_formulas(&args)?;
    formulas.sort_by_key(|f| f.bias_type.map(BiasType::index));

    let metrics = result.metrics();
    println!(
        "{} predictions, {} correct ({:.1}%)",
        metrics.total_predictions, metrics.correct_count, metrics.accuracy_percentage
    );

    let mut rows = Vec::new();
    for formula in &formulas {
        let Some(bias) = formula.bias_type else {
            log::warn!("Skipping formula without a bias: {}", format_formula(formula));
            continue;
        };
        let text = format_formula(formula);
        let condition = match Condition::resolve(formula, result.indicators()) {
            Ok(c) => c,
            Err(issue) => {
                rows.push(RangeRow {
                    bias: bias.to_string(),
                    formula: text,
                    index: "-".to_string(),
                    from: issue.to_string(),
                    to: String::new(),
                    span: String::new(),
                });
                continue;
            }
        };
        let ranges = active_ranges(&condition, &result);
        if ranges.is_empty() {
            rows.push(RangeRow {
                bias: bias.to_string(),
                formula: text.clone(),
                index: "-".to_string(),
                from: "never active".to_string(),
                to: String::new(),
                span: String::new(),
            });
        }
        for (i, range) in ranges.iter().enumerate() {
            rows.push(RangeRow {
                bias: bias.to_string(),
                formula: text.clone(),
                index: (i + 1).to_string(),
                from: epoch_ms_to_date_time(range.first_time),
                to: epoch_ms_to_date_time(range.last_time),
                span: format_duration(range.last_time - range.first_time),
            });
        }
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
