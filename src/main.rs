use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prettytable::{Table, row};
use std::path::PathBuf;

use vqa_bench::{
    Config, Dataset, EvaluationResult, OpenAiCompatClient, PipelineKind, SceneDetector,
    run_pipelines, telemetry,
};

#[derive(Parser)]
#[command(name = "vqa-bench")]
#[command(about = "Evaluate vision-language models on VQA with zero-shot, CV-augmented and chain-of-thought pipelines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or all pipelines over the dataset and score them with the judge
    Run {
        /// zero-shot, classic, dl, or all
        #[arg(long, default_value = "all")]
        pipeline: String,
        /// Only evaluate the first N rows
        #[arg(long)]
        limit: Option<usize>,
        /// Also print full results (predictions included) as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the scene facts the CV detector finds in one image
    Detect {
        /// Image file path
        image: PathBuf,
    },
    /// Show one dataset sample and what the detector sees in it
    Show {
        /// Row index
        index: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = {
        let _bootstrap = telemetry::bootstrap();
        Config::load().context("loading configuration")?
    };
    let _logging = telemetry::install(&config.logging).context("configuring logging")?;

    match cli.command {
        Commands::Run {
            pipeline,
            limit,
            json,
        } => {
            let kinds = parse_pipelines(&pipeline)?;
            let mut dataset = load_dataset(&config)?;
            if let Some(n) = limit {
                dataset.truncate(n);
            }

            let model = OpenAiCompatClient::new(&config.model);
            let judge_model = OpenAiCompatClient::new(&config.judge);
            let results = run_pipelines(&kinds, &config, &model, &judge_model, &dataset).await;

            print_summary(&results);
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
        Commands::Detect { image } => {
            let detector = SceneDetector::new(config.detector.clone());
            let facts = detector.detect_path(&image);
            if facts.is_empty() {
                println!("No objects detected in {}", image.display());
            }
            for fact in facts {
                println!("{}", fact);
            }
        }
        Commands::Show { index } => {
            let dataset = load_dataset(&config)?;
            println!("{}", dataset.describe(index)?);
            let row = dataset.row(index)?;
            let detector = SceneDetector::new(config.detector.clone());
            println!("{}", vqa_bench::prompts::scene_context(&detector.detect_path(&row.image_path)));
        }
    }

    Ok(())
}

fn parse_pipelines(arg: &str) -> Result<Vec<PipelineKind>> {
    if arg.eq_ignore_ascii_case("all") {
        return Ok(PipelineKind::ALL.to_vec());
    }
    arg.split(',')
        .map(|s| s.trim().parse::<PipelineKind>().map_err(anyhow::Error::msg))
        .collect()
}

fn load_dataset(config: &Config) -> Result<Dataset> {
    Dataset::load_csv(
        &config.dataset.csv_path,
        &config.dataset.images_dir,
        &config.dataset.image_extension,
    )
    .context("loading dataset")
}

fn print_summary(results: &[EvaluationResult]) {
    let mut table = Table::new();
    table.add_row(row!["Pipeline", "Accuracy", "Correct", "Judged", "Status"]);
    for r in results {
        let status = match &r.halted {
            None => "complete".to_string(),
            Some(f) => format!("halted at row {} ({})", f.row_index, f.error),
        };
        table.add_row(row![
            r.pipeline,
            format!("{:.4}", r.accuracy),
            r.correct(),
            r.judged(),
            status
        ]);
    }
    table.printstd();
}
