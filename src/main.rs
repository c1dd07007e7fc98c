use clap::{Parser, ValueEnum};
use color_eyre::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ifc_compliance::export::{export_json, export_violations_csv};
use ifc_compliance::parser::parse_ifc_file;
use ifc_compliance::report::Reporter;
use ifc_compliance::rules::{Category, RuleRegistry};

#[derive(Parser, Debug)]
#[command(name = "ifc-compliance")]
#[command(about = "IFC Rule Engine - check a building model against code thresholds")]
#[command(version)]
struct Args {
    /// Path to IFC file
    #[arg(required = true)]
    file: PathBuf,

    /// Directory holding <category>/<rule>.yaml configs
    #[arg(long, value_name = "DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Where to write the JSON report
    #[arg(long, value_name = "FILE", default_value = "outputs/compliance_report.json")]
    output: PathBuf,

    /// Rule category to run
    #[arg(long, value_enum, default_value_t = CategoryArg::All)]
    category: CategoryArg,

    /// Also write violations as CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Leave passed rules out of the report
    #[arg(long)]
    failed_only: bool,

    /// Print every violation and enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CategoryArg {
    All,
    #[value(name = "fire_safety")]
    FireSafety,
    #[value(name = "accessibility")]
    Accessibility,
    #[value(name = "building_control")]
    BuildingControl,
}

impl CategoryArg {
    fn categories(self) -> Vec<Category> {
        match self {
            Self::All => Category::ALL.to_vec(),
            Self::FireSafety => vec![Category::FireSafety],
            Self::Accessibility => vec![Category::Accessibility],
            Self::BuildingControl => vec![Category::BuildingControl],
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.verbose);

    let started = Instant::now();
    let model = parse_ifc_file(&args.file)?;
    println!("Model: {}", args.file.display());
    println!("Schema: {}", model.schema());
    println!("Elements: {}", model.element_count());

    let registry = RuleRegistry::load(&args.config_dir);
    let categories = args.category.categories();
    let results = registry.run(&model, &categories);

    let model_path = args.file.display().to_string();
    let mut metadata: BTreeMap<String, serde_json::Value> = BTreeMap::new();
    metadata.insert("schema".to_string(), model.schema().into());
    metadata.insert("element_count".to_string(), model.element_count().into());
    metadata.insert(
        "categories".to_string(),
        categories.iter().map(|c| c.as_str()).collect::<Vec<_>>().into(),
    );

    let reporter = Reporter::new().with_passed_rules(!args.failed_only);
    let report = reporter.generate(&model_path, &results, metadata);
    export_json(&report, &args.output)?;
    println!("Report: {}", args.output.display());

    if let Some(csv_path) = &args.csv {
        export_violations_csv(&results, csv_path)?;
        println!("Violations CSV: {}", csv_path.display());
    }

    let summary = reporter.summary(&results);
    println!();
    println!("Rules checked: {}", summary.total_rules);
    println!("Passed: {}", summary.passed);
    println!("Failed: {}", summary.failed);
    println!("Compliance rate: {:.1}%", summary.compliance_rate);
    for failed in &summary.failed_rules {
        println!("  {} {} ({} violations)", failed.rule_id, failed.name, failed.violations);
    }

    if args.verbose {
        for result in results.iter().filter(|r| !r.violations.is_empty()) {
            println!();
            for line in reporter.format_violations(result, true) {
                println!("{line}");
            }
        }
    }

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "compliance check finished");
    Ok(())
}
