use std::path::Path;

use anyhow::Result;
use pathest::{Sample, Trajectory};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TARGET: &str = "train";

/// Loads a `.csv` file with `x,y,timestamp` columns, or otherwise a JSON report file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Trajectory> {
    let path = path.as_ref();
    let file = std::io::BufReader::new(fs_err::File::open(path)?);
    if path.extension().map_or(false, |ext| ext == "csv") {
        load_csv(file)
    } else {
        load_json(file)
    }
}

/// Reads `{"target": "train", "reports": [{"x", "y", "timestamp"}, ...]}`. Reports missing any of
/// the three numbers are skipped.
pub fn load_json<R: std::io::Read>(reader: R) -> Result<Trajectory> {
    let json: Value = serde_json::from_reader(reader)?;
    let root = match json.as_object() {
        Some(root) => root,
        None => bail!("Unexpected JSON format: object not found"),
    };
    match root.get("target").and_then(Value::as_str) {
        Some(TARGET) => {}
        Some(other) => bail!("Unexpected JSON format: wrong \"target\" value {:?}", other),
        None => bail!("Unexpected JSON format: \"target\" property not found"),
    }
    let reports = match root.get("reports").and_then(Value::as_array) {
        Some(reports) => reports,
        None => bail!("Unexpected JSON format: \"reports\" property not found"),
    };

    let mut trajectory = Trajectory::new();
    for (idx, report) in reports.iter().enumerate() {
        let field = |key: &str| report.get(key).and_then(Value::as_f64);
        match (field("x"), field("y"), field("timestamp")) {
            (Some(x), Some(y), Some(t)) => trajectory.insert(Sample::new(x, y, t)),
            (None, _, _) => warn!("Report {idx}: \"x\" property not found"),
            (_, None, _) => warn!("Report {idx}: \"y\" property not found"),
            (_, _, None) => warn!("Report {idx}: \"timestamp\" property not found"),
        }
    }
    Ok(trajectory)
}

pub fn load_csv<R: std::io::Read>(reader: R) -> Result<Trajectory> {
    let mut samples = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Report = rec?;
        samples.push(Sample::new(rec.x, rec.y, rec.timestamp));
    }
    Ok(Trajectory::from_samples(samples))
}

/// Rejects data the estimators can't say anything useful about: nothing at all, or no variation
/// in time, x, or y.
pub fn validate(data: &Trajectory) -> Result<()> {
    if data.is_empty() {
        bail!("Invalid data: empty data set");
    }
    if data.min_t()? == data.max_t()? {
        bail!("Invalid data: identical timestamps");
    }
    if data.min_x()? == data.max_x()? {
        bail!("Invalid data: identical x values");
    }
    if data.min_y()? == data.max_y()? {
        bail!("Invalid data: identical y values");
    }
    Ok(())
}

pub fn to_json(data: &Trajectory) -> Result<String> {
    let file = ReportFile {
        target: TARGET,
        reports: data
            .iter()
            .map(|s| Report {
                x: s.x,
                y: s.y,
                timestamp: s.t,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

#[derive(Serialize)]
struct ReportFile {
    target: &'static str,
    reports: Vec<Report>,
}

#[derive(Serialize, Deserialize)]
struct Report {
    x: f64,
    y: f64,
    timestamp: f64,
}
