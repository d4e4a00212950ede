#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use anyhow::Result;
use structopt::StructOpt;

use analysis::{AnalysisConfig, Results};
use pathest::Trajectory;

#[derive(StructOpt)]
#[structopt(about = "Estimate a trajectory from noisy position reports")]
struct Args {
    /// JSON file listing the smoothing passes to run
    config: String,
    /// Position reports, as a JSON report file or a .csv with x,y,timestamp columns
    input: String,
    /// An existing directory to write estimates and report.txt into
    output_dir: String,
    /// Ground truth for the input, used to score every estimate
    reference: Option<String>,
    /// Also print the predicted position at this time, for the input and every pass
    #[structopt(long = "at")]
    at: Vec<f64>,
}

impl Args {
    fn load_input(&self) -> Result<Trajectory> {
        let input = analysis::load_file(&self.input)
            .map_err(|err| anyhow!("Failed to read input data from {}: {}", self.input, err))?;
        analysis::validate(&input)?;
        info!("Loaded {} samples from {}", input.len(), self.input);
        Ok(input)
    }

    // A bad reference only costs the scores, so it isn't fatal
    fn add_reference(&self, results: &mut Results) {
        let path = match self.reference {
            Some(ref path) => path,
            None => return,
        };
        if let Err(err) = analysis::load_file(path).and_then(|data| results.add_reference(data)) {
            warn!("Unable to use reference data from {}: {}", path, err);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::from_args();
    let config = AnalysisConfig::load(&args.config)?;
    let input = args.load_input()?;
    let mut results = Results::new(&args.output_dir, &input)?;
    args.add_reference(&mut results);

    results.write("input", "Input data", &input)?;
    analysis::run_analysis(&config, &input, &results)?;

    for time in &args.at {
        for (name, answer) in analysis::query(&config, &input, *time) {
            match answer {
                Ok((x, y)) => println!("{name} at {time}: ({x}, {y})"),
                Err(err) => println!("{name} at {time}: {err}"),
            }
        }
    }
    Ok(())
}
