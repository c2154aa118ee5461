//! Subcommand drivers wiring the dataset, scoring, and diagnostics crates.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;

use mofdata::{
    clean_property_set, load_reference_set, read_records, write_records, MofColumnSet,
    MofRegistry, RunMode,
};
use propmodel::regression_statistics;
use scscore::{score_batch, FingerprintScorer, ScoreConfig, SynthScorer};

use crate::config::ScreenConfig;
use crate::results::{read_predictions_csv, write_regression_csv, write_report_json};

/// Arguments for the `prepare` subcommand.
#[derive(Debug)]
pub struct PrepareArgs {
    /// Reference (generator) CSV defining the MOF vocabulary.
    pub reference: PathBuf,
    /// Property CSV to validate and filter.
    pub input: PathBuf,
    /// Path for the cleaned output CSV.
    pub output: PathBuf,
    /// Optional path for the JSON removal-count report.
    pub report: Option<PathBuf>,
    /// Target property columns that must be present.
    pub targets: Vec<String>,
    /// Real or test run.
    pub mode: RunMode,
    /// Keep rows with duplicate SMILES in the reference set.
    pub keep_duplicates: bool,
    /// Attach synthesizability scores using these weights.
    pub scscore_weights: Option<PathBuf>,
    /// Filter and schema configuration.
    pub config: ScreenConfig,
}

/// Arguments for the `score` subcommand.
#[derive(Debug)]
pub struct ScoreArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub weights: PathBuf,
    pub workers: Option<usize>,
    pub partition_multiplier: Option<usize>,
    pub config: ScreenConfig,
}

/// Arguments for the `registry` subcommand.
#[derive(Debug)]
pub struct RegistryArgs {
    pub reference: PathBuf,
    pub columns: MofColumnSet,
    pub mode: RunMode,
    pub config: ScreenConfig,
}

/// Arguments for the `stats` subcommand.
#[derive(Debug)]
pub struct StatsArgs {
    pub input: PathBuf,
    pub targets: Vec<String>,
    pub prefix: String,
    pub output: Option<PathBuf>,
}

/// Build the registry from the reference set and run the filter pipeline.
pub fn run_prepare(args: PrepareArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    let schema = &args.config.schema;

    let reference =
        load_reference_set(&args.reference, schema, args.keep_duplicates, args.mode)?;
    let registry = MofRegistry::from_records(&reference)?;

    let scorer: Option<FingerprintScorer> = match &args.scscore_weights {
        Some(path) => Some(
            FingerprintScorer::restore(path)
                .with_context(|| format!("restoring scorer from {}", path.display()))?,
        ),
        None => None,
    };

    let (records, report) = clean_property_set(
        &args.input,
        &args.targets,
        &registry,
        &args.config.filter,
        args.mode,
        schema,
        scorer.as_ref().map(|s| s as &dyn SynthScorer),
    )?;

    write_records(&args.output, &records, schema)?;
    if let Some(report_path) = &args.report {
        write_report_json(report_path, &report)?;
    }

    println!("\n--- Prepare Summary ---");
    println!("Unique MOFs: {}", registry.len());
    println!("Loaded: {}", report.loaded);
    for stage in &report.stages {
        println!("Removed ({}): {}", stage.stage, stage.removed);
    }
    println!("Kept: {}", report.kept);
    println!("Output: {}", args.output.display());
    println!("Elapsed: {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Parallel-score a CSV's SMILES column and write the augmented table.
pub fn run_score(args: ScoreArgs) -> anyhow::Result<()> {
    let schema = &args.config.schema;
    let table = read_records(&args.input, schema)?;
    let mut records = table.records;

    let scorer = FingerprintScorer::restore(&args.weights)
        .with_context(|| format!("restoring scorer from {}", args.weights.display()))?;
    let smiles: Vec<String> = records.iter().map(|r| r.smiles.clone()).collect();
    let score_config = ScoreConfig {
        workers: args.workers,
        partition_multiplier: args.partition_multiplier,
    };
    let scores = score_batch(&smiles, &scorer, &score_config)?;

    for (record, score) in records.iter_mut().zip(scores) {
        record.scscore = Some(score);
    }
    write_records(&args.output, &records, schema)?;

    println!("Scored {} molecules -> {}", records.len(), args.output.display());
    Ok(())
}

/// Build and print the identity registry in ID order.
pub fn run_registry(args: RegistryArgs) -> anyhow::Result<()> {
    let reference = load_reference_set(&args.reference, &args.config.schema, false, args.mode)?;
    let registry = MofRegistry::from_records(&reference)?;

    println!("columns: {}", args.columns.columns().join(","));
    for (id, key) in registry.iter() {
        match args.columns {
            MofColumnSet::Id => println!("{id}"),
            MofColumnSet::Cats => println!("{key}"),
            MofColumnSet::All => println!("{id}\t{key}"),
        }
    }
    println!("Found {} unique MOFs", registry.len());
    Ok(())
}

/// Compute regression diagnostics from a predictions CSV.
pub fn run_stats(args: StatsArgs) -> anyhow::Result<()> {
    let (y_true, y_pred) = read_predictions_csv(&args.input, &args.targets)?;
    let table =
        regression_statistics(y_true.view(), y_pred.view(), &args.targets, &args.prefix)?;

    let [r2_col, mae_col, rmse_col] = table.metric_columns();
    println!("{:<24} {:>10} {:>10} {:>10}", "label", r2_col, mae_col, rmse_col);
    for row in &table.rows {
        println!(
            "{:<24} {:>10.4} {:>10.4} {:>10.4}",
            row.label, row.r2, row.mae, row.rmse
        );
    }

    if let Some(output) = &args.output {
        write_regression_csv(output, &table)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const REFERENCE_CSV: &str = "\
smiles,metal_node,organic_core,topology,id2mof
C1CC1,Cu,benzene,pcu,0
CCO,Zn,imidazole,sod,1
CCC,Co,pyrazole,dia,2
";

    const PROPERTY_CSV: &str = "\
smiles,metal_node,organic_core,topology,mask,co2_uptake,co2n2_selectivity,co2ch4_selectivity
C1CC1,Cu,benzene,pcu,true,1.0,50.0,40.0
CCO,Zn,imidazole,sod,false,2.0,60.0,30.0
CCC,Co,pyrazole,dia,true,3.0,250.0,20.0
CCN,Ni,unknown,xyz,true,4.0,70.0,10.0
CCO,Zn,imidazole,sod,true,5.0,80.0,90.0
";

    #[test]
    fn test_prepare_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let reference = write_file(&tmp, "reference.csv", REFERENCE_CSV);
        let input = write_file(&tmp, "props.csv", PROPERTY_CSV);
        let output = tmp.path().join("clean.csv");
        let report_path = tmp.path().join("report.json");

        run_prepare(PrepareArgs {
            reference,
            input,
            output: output.clone(),
            report: Some(report_path.clone()),
            targets: vec!["co2_uptake".to_string()],
            mode: RunMode::Real,
            keep_duplicates: false,
            scscore_weights: None,
            config: ScreenConfig::default(),
        })
        .unwrap();

        // Of 5 rows: one masked out, one unknown identity, one over the
        // selectivity bound. Two survive with canonical IDs attached.
        let cleaned = read_records(&output, &ScreenConfig::default().schema).unwrap();
        assert_eq!(cleaned.records.len(), 2);
        assert_eq!(cleaned.records[0].id2mof, Some(0));
        assert_eq!(cleaned.records[1].id2mof, Some(1));

        let report: mofdata::FilterReport =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report.loaded, 5);
        assert_eq!(report.kept, 2);
        assert!(report.is_balanced());
        let removed: Vec<usize> = report.stages.iter().map(|s| s.removed).collect();
        assert_eq!(removed, vec![1, 1, 1]);
    }

    #[test]
    fn test_prepare_missing_target_fails() {
        let tmp = TempDir::new().unwrap();
        let reference = write_file(&tmp, "reference.csv", REFERENCE_CSV);
        let input = write_file(&tmp, "props.csv", PROPERTY_CSV);

        let err = run_prepare(PrepareArgs {
            reference,
            input,
            output: tmp.path().join("clean.csv"),
            report: None,
            targets: vec!["h2_uptake".to_string()],
            mode: RunMode::Real,
            keep_duplicates: false,
            scscore_weights: None,
            config: ScreenConfig::default(),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("h2_uptake"));
    }

    #[test]
    fn test_stats_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let input = write_file(
            &tmp,
            "preds.csv",
            "co2_uptake_true,co2_uptake_pred\n1.0,1.0\n2.0,2.0\n",
        );
        let output = tmp.path().join("stats.csv");

        run_stats(StatsArgs {
            input,
            targets: vec!["co2_uptake".to_string()],
            prefix: "test_".to_string(),
            output: Some(output.clone()),
        })
        .unwrap();

        let contents = std::fs::read_to_string(&output).unwrap();
        assert!(contents.contains("test_R2"));
        assert!(contents.contains("co2_uptake,1,0,0"));
    }
}
