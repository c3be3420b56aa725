//! ferrite-logreg command line.
//!
//!   ferrite-logreg pack    --idx-dir mnist/ --out mnist.json.gz
//!   ferrite-logreg train   --data mnist.json.gz
//!   ferrite-logreg predict --model best_model.json --data mnist.json.gz
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};

use ferrite_logreg::data::{idx, load_split, save_split};
use ferrite_logreg::{train_loop, Dataset, LogisticRegression, ModelMetadata, Predictor, Split, TrainConfig};

#[derive(Parser, Debug)]
#[command(name = "ferrite-logreg")]
#[command(about = "Multinomial logistic regression on MNIST with early-stopped mini-batch SGD")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model, writing the best one seen on the validation split
    Train(TrainArgs),
    /// Classify data with a saved model
    Predict(PredictArgs),
    /// Convert raw MNIST IDX files into a dataset container
    Pack(PackArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Dataset container (.json / .json.gz) or directory of IDX files
    #[arg(long)]
    data: PathBuf,

    /// JSON file with training settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    learning_rate: Option<f32>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    patience: Option<usize>,

    /// Where to write the best model
    #[arg(long)]
    save: Option<PathBuf>,

    /// Number of output classes (default: highest label in the data plus one)
    #[arg(long)]
    classes: Option<usize>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["data", "split", "image"])))]
struct PredictArgs {
    /// Model written by `train`
    #[arg(long, default_value = "best_model.json")]
    model: PathBuf,

    /// Dataset container or IDX directory; its test split is classified
    #[arg(long)]
    data: Option<PathBuf>,

    /// Single-split container (custom data)
    #[arg(long)]
    split: Option<PathBuf>,

    /// Image file to classify
    #[arg(long)]
    image: Option<PathBuf>,

    /// Treat the image as dark strokes on a light background
    #[arg(long, default_value_t = false)]
    invert: bool,

    /// How many predictions to print
    #[arg(long, default_value_t = 10)]
    count: usize,
}

#[derive(Args, Debug)]
struct PackArgs {
    /// Directory holding the four MNIST IDX files (optionally .gz)
    #[arg(long)]
    idx_dir: PathBuf,

    /// Output dataset container
    #[arg(long, default_value = "mnist.json.gz")]
    out: PathBuf,

    /// Training rows moved to the validation split
    #[arg(long, default_value_t = idx::DEFAULT_VALIDATION_SIZE)]
    validation_size: usize,

    /// Also write the first `custom_count` test rows as a single-split container
    #[arg(long)]
    custom_out: Option<PathBuf>,

    #[arg(long, default_value_t = 100)]
    custom_count: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => run_train(args),
        Command::Predict(args) => run_predict(args),
        Command::Pack(args) => run_pack(args),
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => TrainConfig::load_json(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => TrainConfig::default(),
    };
    if let Some(lr) = args.learning_rate {
        config.learning_rate = lr;
    }
    if let Some(epochs) = args.epochs {
        config.n_epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(patience) = args.patience {
        config.patience = patience;
    }
    if let Some(save) = args.save {
        config.save_path = Some(save);
    }
    config.validate()?;

    let dataset = Dataset::load(&args.data)
        .with_context(|| format!("Failed to load dataset {}", args.data.display()))?;

    let n_in = dataset.n_features();
    let n_classes = args.classes.unwrap_or_else(|| dataset.n_classes());
    if n_classes < 2 {
        bail!("need at least two classes, got {}", n_classes);
    }
    let metadata = if n_in == 28 * 28 && n_classes == 10 {
        ModelMetadata::mnist()
    } else {
        ModelMetadata::default()
    };
    let mut model = LogisticRegression::new(n_in, n_classes).with_metadata(metadata);

    log::info!("training a {}→{} logistic regression", n_in, n_classes);
    let summary = train_loop(&mut model, &dataset, &config, None)?;

    if let Some(path) = &config.save_path {
        log::info!("best model saved to {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let predictor = Predictor::from_file(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;

    if let Some(path) = &args.image {
        let (class, p) = predictor
            .predict_image(path, args.invert)
            .with_context(|| format!("Failed to classify {}", path.display()))?;
        println!("{}: {} (p = {:.4})", path.display(), predictor.label(class), p);
        return Ok(());
    }

    let split: Split = if let Some(path) = &args.data {
        Dataset::load(path)
            .with_context(|| format!("Failed to load dataset {}", path.display()))?
            .test
    } else if let Some(path) = &args.split {
        load_split(path).with_context(|| format!("Failed to load split {}", path.display()))?
    } else {
        bail!("one of --data, --split or --image is required")
    };

    let (predictions, error) = predictor.predict_split(&split)?;

    println!("Predicted values for the first {} examples:", args.count.min(split.len()));
    println!("{:>12}  {:>12}", "True Label", "Predicted");
    println!("{}", "-".repeat(27));
    for (truth, predicted) in split.labels.iter().zip(&predictions).take(args.count) {
        println!("{:>12}  {:>12}", predictor.label(*truth as usize), predictor.label(*predicted));
    }
    println!("\nError over {} examples: {:.2}%", split.len(), error * 100.0);
    Ok(())
}

fn run_pack(args: PackArgs) -> Result<()> {
    let dataset = idx::load_idx_dir(&args.idx_dir, args.validation_size)
        .with_context(|| format!("Failed to read IDX files in {}", args.idx_dir.display()))?;
    dataset
        .save(&args.out)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    log::info!(
        "wrote {} ({} / {} / {} rows)",
        args.out.display(),
        dataset.train.len(),
        dataset.valid.len(),
        dataset.test.len()
    );

    if let Some(path) = &args.custom_out {
        let n = args.custom_count.min(dataset.test.len());
        save_split(&dataset.test.slice(0, n), path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("wrote {} custom rows to {}", n, path.display());
    }
    Ok(())
}
