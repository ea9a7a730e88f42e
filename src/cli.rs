//! Command line surface: flag parsing and the order stages run in.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::config::{self, PipelineConfig};
use crate::eval::EvalReport;
use crate::pipeline::{Pipeline, PipelineError};

/// Classify text as English or not with a byte-histogram logistic regression.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "englid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct Cli {
    /// Remove every stored sample before anything else runs
    #[arg(short, long)]
    pub clear: bool,

    /// Regenerate samples and the dataset before training
    #[arg(short, long)]
    pub gen_data: bool,

    /// Only split text files into samples (plus matching random samples)
    #[arg(short = 'T', long)]
    pub text_only: bool,

    /// Only rebuild the dataset from stored samples
    #[arg(short, long)]
    pub dataset_only: bool,

    /// Text files to split into English samples
    #[arg(short, long, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Load a saved model instead of training, optionally from PATH
    #[arg(short, long, value_name = "PATH", num_args = 0..=1)]
    pub retrieve_model: Option<Option<PathBuf>>,

    /// Report accuracy of the model on the dataset
    #[arg(short, long)]
    pub test: bool,

    /// Prompt for text and print its English probability
    #[arg(short, long)]
    pub interactive: bool,

    /// Suppress progress output on stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file to use instead of the one in the app directory
    #[arg(long, value_name = "PATH", env = "ENGLID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the sample database, dataset and model
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Fraction of the dataset held out of training for --test
    #[arg(long, value_name = "FRACTION")]
    pub holdout: Option<f64>,
}

/// Where the model for `--test`/`--interactive` comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Train,
    Load(Option<PathBuf>),
}

/// Stages selected by a set of flags, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub clear: bool,
    pub add_samples: bool,
    pub build_dataset: bool,
    pub model: Option<ModelSource>,
    pub test: bool,
    pub interactive: bool,
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub samples_added: usize,
    pub dataset_rows: Option<usize>,
    pub report: Option<EvalReport>,
    pub predictions: usize,
}

impl Cli {
    /// Decide which stages run.
    ///
    /// The model stage is skipped only when the flags ask for data preparation
    /// alone (`-c`, `-T` or `-d` without `-t`, `-i` or `-r`).
    pub fn plan(&self) -> RunPlan {
        let data_only = self.clear || self.text_only || self.dataset_only;
        let needs_model =
            self.test || self.interactive || self.retrieve_model.is_some() || !data_only;
        let model = needs_model.then(|| match &self.retrieve_model {
            Some(path) => ModelSource::Load(path.clone()),
            None => ModelSource::Train,
        });
        RunPlan {
            clear: self.clear,
            add_samples: self.gen_data || self.text_only,
            build_dataset: self.gen_data || self.dataset_only,
            model,
            test: self.test,
            interactive: self.interactive,
        }
    }

    /// Load the config file and apply command line overrides.
    pub fn load_config(&self) -> Result<PipelineConfig, PipelineError> {
        let mut config = config::load_or_default(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = Some(dir.clone());
        }
        if let Some(fraction) = self.holdout {
            config.evaluation.holdout_fraction = fraction;
        }
        Ok(config.normalized())
    }
}

/// Execute the planned stages against one pipeline, closing it on every path.
pub fn run<R: BufRead, W: Write>(
    cli: &Cli,
    input: R,
    mut output: W,
) -> Result<RunSummary, PipelineError> {
    let pipeline = Pipeline::open(cli.load_config()?)?;
    let result = run_plan(&pipeline, cli, input, &mut output);
    let closed = pipeline.close();
    let summary = result?;
    closed?;
    Ok(summary)
}

fn run_plan<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    cli: &Cli,
    input: R,
    output: &mut W,
) -> Result<RunSummary, PipelineError> {
    let plan = cli.plan();
    let mut summary = RunSummary::default();
    if plan.clear {
        pipeline.clear_samples()?;
    }
    if plan.add_samples {
        summary.samples_added = pipeline.generate_samples(&cli.files)?.total();
    }
    if plan.build_dataset {
        summary.dataset_rows = Some(pipeline.generate_dataset()?.len());
    }
    let Some(source) = plan.model else {
        return Ok(summary);
    };
    let model = match source {
        ModelSource::Train => pipeline.train_model()?,
        ModelSource::Load(path) => pipeline.load_model(path.as_deref())?,
    };
    if plan.test {
        let report = pipeline.run_test(&model)?;
        write_report(output, &report)?;
        summary.report = Some(report);
    }
    if plan.interactive {
        summary.predictions = pipeline.run_interactive(&model, input, &mut *output)?;
    }
    Ok(summary)
}

fn write_report<W: Write>(output: &mut W, report: &EvalReport) -> std::io::Result<()> {
    writeln!(output, "Test Complete.")?;
    writeln!(output)?;
    writeln!(output, "Correct: {}", report.correct)?;
    writeln!(output, "Total: {}", report.total)?;
    writeln!(output, "Percent: {:.3}", report.percent())?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("englid").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn bare_invocation_trains() {
        let plan = parse(&[]).plan();
        assert_eq!(plan.model, Some(ModelSource::Train));
        assert!(!plan.add_samples && !plan.build_dataset && !plan.clear);
    }

    #[test]
    fn gen_data_regenerates_everything_then_trains() {
        let plan = parse(&["-g", "-t"]).plan();
        assert!(plan.add_samples && plan.build_dataset && plan.test);
        assert_eq!(plan.model, Some(ModelSource::Train));
    }

    #[test]
    fn data_preparation_flags_skip_the_model() {
        assert_eq!(parse(&["-T"]).plan().model, None);
        assert_eq!(parse(&["-d"]).plan().model, None);
        assert_eq!(parse(&["-c"]).plan().model, None);
        let plan = parse(&["-c", "-T", "-d"]).plan();
        assert!(plan.clear && plan.add_samples && plan.build_dataset);
    }

    #[test]
    fn retrieve_model_takes_an_optional_path() {
        assert_eq!(parse(&["-r"]).plan().model, Some(ModelSource::Load(None)));
        assert_eq!(
            parse(&["-r", "m.bin", "-i"]).plan().model,
            Some(ModelSource::Load(Some(PathBuf::from("m.bin"))))
        );
        assert_eq!(
            parse(&["-d", "-r"]).plan().model,
            Some(ModelSource::Load(None))
        );
    }

    #[test]
    fn files_and_overrides_parse() {
        let cli = parse(&[
            "-T",
            "-f",
            "a.txt",
            "b.txt",
            "--data-dir",
            "/tmp/englid",
            "--holdout",
            "0.2",
        ]);
        assert_eq!(cli.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/englid")));
        assert_eq!(cli.holdout, Some(0.2));
    }

    #[test]
    fn report_matches_expected_layout() {
        let report = EvalReport {
            correct: 3,
            total: 4,
            accuracy: 0.75,
            confusion: Default::default(),
        };
        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Test Complete.\n\nCorrect: 3\nTotal: 4\nPercent: 75.000\n"
        );
    }
}
