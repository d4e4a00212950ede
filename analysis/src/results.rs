use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use pathest::Trajectory;

use crate::metrics;
use crate::plot::{self, PlotBounds};

const REPORT: &str = "report.txt";
// Positions are in kilometres and timestamps in minutes
const MINUTES_PER_HOUR: f64 = 60.0;

/// Writes estimates into an output directory: one JSON report file and one SVG plot per estimate,
/// plus a shared `report.txt` summarizing each one.
pub struct Results {
    out_dir: PathBuf,
    input_len: usize,
    bounds: PlotBounds,
    reference: Option<Trajectory>,
}

impl Results {
    /// Starts a fresh `report.txt`. The output directory must already exist. Every plot uses the
    /// extent of `input`, so it can't be empty.
    pub fn new<P: AsRef<Path>>(out_dir: P, input: &Trajectory) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        if !out_dir.is_dir() {
            bail!("No such directory: {}", out_dir.display());
        }
        let results = Self {
            out_dir,
            input_len: input.len(),
            bounds: PlotBounds::from_trajectory(input)?,
            reference: None,
        };
        fs_err::write(results.report_path(), "Results\n-------\n")?;
        Ok(results)
    }

    /// Every later estimate is scored against this ground truth. It must pass the same checks as
    /// the input, and it's also written out as `reference`.
    pub fn add_reference(&mut self, reference: Trajectory) -> Result<()> {
        if self.reference.is_some() {
            bail!("Reference data was already added");
        }
        crate::validate(&reference)?;
        if reference.len() != self.input_len {
            bail!(
                "Reference has {} samples, but the input has {}",
                reference.len(),
                self.input_len
            );
        }
        self.write("reference", "Reference data", &reference)?;
        self.reference = Some(reference);
        Ok(())
    }

    pub fn write(&self, name: &str, title: &str, output: &Trajectory) -> Result<()> {
        let json_path = self.out_dir.join(format!("{name}.json"));
        fs_err::write(&json_path, crate::to_json(output)?)?;
        info!("Wrote data to {}", json_path.display());

        let svg_path = self.out_dir.join(format!("{name}.svg"));
        plot::write_svg(&svg_path, title, &self.bounds, output)?;
        info!("Plotted {}", svg_path.display());

        let mut f = fs_err::OpenOptions::new()
            .append(true)
            .open(self.report_path())?;
        writeln!(f, "\n{title}")?;
        if let Some(ref reference) = self.reference {
            writeln!(
                f,
                "MAE: {:.6}",
                metrics::mean_absolute_error(output, reference)?
            )?;
            writeln!(
                f,
                "RMSE: {:.6}",
                metrics::root_mean_square_error(output, reference)?
            )?;
            match metrics::mean_absolute_scaled_error(output, reference) {
                Ok(mase) => writeln!(f, "MASE: {mase:.6}")?,
                Err(err) => warn!("No MASE for {name}: {err}"),
            }
        }
        match output.average_speed() {
            Ok(speed) => writeln!(f, "Estimated speed: {:.6} KPH", MINUTES_PER_HOUR * speed)?,
            Err(err) => warn!("No average speed for {name}: {err}"),
        }
        Ok(())
    }

    fn report_path(&self) -> PathBuf {
        self.out_dir.join(REPORT)
    }
}
