//! Command-line driver: loads MNIST, trains a sigmoid network, reports
//! accuracy, and optionally saves the trained model.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sigmoid_mlp::{argmax, train_loop, Dataset, MnistLoader, Network, TrainConfig};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sigmoid-mlp")]
#[command(about = "Train and evaluate a sigmoid feed-forward network on MNIST", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new network and report test accuracy
    Train {
        /// JSON config file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the four MNIST IDX files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Number of epochs
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Examples per reporting batch
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// SGD learning rate
        #[arg(long)]
        learning_rate: Option<f64>,

        /// Maximum number of training examples
        #[arg(long)]
        train_limit: Option<usize>,

        /// Maximum number of test examples
        #[arg(long)]
        test_limit: Option<usize>,

        /// Hidden layer sizes, e.g. "30" or "128,64"
        #[arg(long, value_delimiter = ',')]
        hidden: Option<Vec<usize>>,

        /// RNG seed for initialization and shuffling
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of test predictions to print after training
        #[arg(long)]
        preview: Option<usize>,

        /// Write the trained model to this JSON file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Evaluate a saved model on the test split
    Evaluate {
        /// Model file written by `train --save`
        #[arg(short, long)]
        model: PathBuf,

        /// Directory holding the MNIST IDX files
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Maximum number of test examples
        #[arg(long)]
        test_limit: Option<usize>,

        /// Number of test predictions to print
        #[arg(long, default_value = "5")]
        preview: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            config,
            data_dir,
            epochs,
            batch_size,
            learning_rate,
            train_limit,
            test_limit,
            hidden,
            seed,
            preview,
            save,
        } => {
            let mut config = match config {
                Some(path) => TrainConfig::load_json(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => TrainConfig::default(),
            };
            if let Some(v) = data_dir { config.data_dir = v; }
            if let Some(v) = epochs { config.epochs = v; }
            if let Some(v) = batch_size { config.batch_size = v; }
            if let Some(v) = learning_rate { config.learning_rate = v; }
            if let Some(v) = train_limit { config.train_limit = Some(v); }
            if let Some(v) = test_limit { config.test_limit = Some(v); }
            if let Some(v) = seed { config.seed = Some(v); }
            if let Some(v) = preview { config.preview = v; }
            if let Some(sizes) = hidden {
                let input = config.topology.first().copied().unwrap_or(784);
                let output = config.topology.last().copied().unwrap_or(10);
                config.topology = std::iter::once(input)
                    .chain(sizes)
                    .chain(std::iter::once(output))
                    .collect();
            }
            run_train(&config, save)
        }
        Commands::Evaluate { model, data_dir, test_limit, preview } => {
            run_evaluate(&model, data_dir, test_limit, preview)
        }
    }
}

fn run_train(config: &TrainConfig, save: Option<PathBuf>) -> Result<()> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("Using seed {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    info!("Loading MNIST data from: {}", config.data_dir.display());
    let loader = MnistLoader::new(&config.data_dir);
    let train = loader.load_training(config.train_limit).context("loading training data")?;
    info!("Loaded {} training examples", train.len());
    let test = loader.load_test(config.test_limit).context("loading test data")?;
    info!("Loaded {} test examples", test.len());

    let topology = config.topology.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" -> ");
    info!("Creating neural network with layers: {}", topology);
    let mut network = Network::new(&config.topology, config.learning_rate, &mut rng)
        .context("building network")?;

    info!(
        "Training for {} epochs with batch size {}...",
        config.epochs, config.batch_size
    );
    let start = Instant::now();
    train_loop(&mut network, &train, &test, config, &mut rng).context("training")?;
    info!("Training completed in {} seconds", start.elapsed().as_secs());

    let accuracy = network.evaluate(&test.inputs, &test.targets)?;
    info!("Final test accuracy: {:.2}%", accuracy);

    print_preview(&network, &test, config.preview)?;

    if let Some(path) = save {
        network.save_json(&path)
            .with_context(|| format!("saving model to {}", path.display()))?;
        info!("Saved model to {}", path.display());
    }

    Ok(())
}

fn run_evaluate(model: &Path, data_dir: PathBuf, test_limit: Option<usize>, preview: usize) -> Result<()> {
    let network = Network::load_json(model)
        .with_context(|| format!("loading model {}", model.display()))?;
    let topology = network.topology().iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" -> ");
    info!("Loaded network with layers: {}", topology);

    let test = MnistLoader::new(data_dir).load_test(test_limit).context("loading test data")?;
    info!("Loaded {} test examples", test.len());

    let accuracy = network.evaluate(&test.inputs, &test.targets)?;
    info!("Test accuracy: {:.2}%", accuracy);

    print_preview(&network, &test, preview)
}

fn print_preview(network: &Network, test: &Dataset, count: usize) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    if test.is_empty() {
        warn!("No test examples to preview");
        return Ok(());
    }

    println!("\nShowing predictions for {} test examples:", count.min(test.len()));
    for (i, (input, target)) in test.inputs.iter().zip(&test.targets).take(count).enumerate() {
        let predicted = network.predict(input)?;
        let actual = argmax(target).context("empty target vector")?;
        println!("Example {}: Predicted {}, Actual {}", i + 1, predicted, actual);
    }
    Ok(())
}
