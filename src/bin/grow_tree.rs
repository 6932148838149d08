use decision_splitter::data::dataset::Dataset;
use decision_splitter::trees::{SplitterNode, SplitterParams, TracingObserver};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::env;
use std::error::Error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: grow-tree [CSV_PATH TARGET [MAX_DEPTH [MIN_SAMPLES_SPLIT]]]";

/// Forty rows of `x` in 1..=40 with a noisy `z`, and `target` stepping from 0 to 1 after x = 20.
fn step_dataset(seed: u64) -> Result<Dataset<f64>, Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows: Vec<Vec<f64>> = (1..=40)
        .map(|x| {
            let z: f64 = rng.gen_range(0.0..1.0);
            vec![x as f64, z, if x > 20 { 1.0 } else { 0.0 }]
        })
        .collect();

    Ok(Dataset::from_rows(vec!["x", "z", "target"], &rows)?)
}

fn parse_params(args: &[String]) -> Result<SplitterParams, Box<dyn Error>> {
    let mut params = SplitterParams::new();
    if let Some(max_depth) = args.get(2) {
        params.set_max_depth(max_depth.parse()?);
    }
    if let Some(min_samples_split) = args.get(3) {
        params.set_min_samples_split(min_samples_split.parse()?)?;
    }
    Ok(params)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (dataset, target, params) = match args.as_slice() {
        [] => {
            let mut params = SplitterParams::new();
            params.set_max_depth(2);
            params.set_min_samples_split(10)?;
            (step_dataset(42)?, "target".to_string(), params)
        }
        [path, target, ..] if args.len() <= 4 => {
            let dataset = Dataset::from_path(path)?;
            tracing::info!(path = %path, rows = dataset.nrows(), "Loaded dataset");
            (dataset, target.clone(), parse_params(&args)?)
        }
        _ => return Err(USAGE.into()),
    };

    let mut observer = TracingObserver;
    let mut root = SplitterNode::root(dataset, &target, &params, &mut observer)?;
    root.split(&mut observer);

    print!("{root}");
    Ok(())
}
