use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bicycle_model_rs::{ModelConfig, ModelInput};
use clap::Parser;
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::json;

#[derive(Parser, Debug)]
struct Args {
    /// Path to a recorded input log (.json or .json.gz)
    #[arg(long, conflicts_with = "log_dir")]
    log: Option<PathBuf>,

    /// Directory of logs to batch replay (processes inputs_*.json[.gz])
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Override the logged forward velocity [m/s]
    #[arg(long)]
    velocity: Option<f64>,
}

#[derive(Deserialize)]
struct LogFile {
    #[serde(default)]
    config: ModelConfig,
    inputs: Vec<ModelInput>,
}

fn load_log(path: &Path) -> anyhow::Result<LogFile> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let gz = GzDecoder::new(file);
        let reader = BufReader::new(gz);
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn run_once(path: &Path, args: &Args) -> anyhow::Result<serde_json::Value> {
    let log = load_log(path)?;
    let mut model = log.config.build()?;
    if let Some(v) = args.velocity {
        model.set_velocity(v)?;
    }

    let mut unconverged = 0u64;
    let mut max_solver_iterations = 0usize;
    let mut max_roll = 0.0_f64;
    let mut max_torque = 0.0_f64;
    let mut distance = 0.0_f64;
    let (mut last_x, mut last_y) = (model.pose().x, model.pose().y);

    for input in &log.inputs {
        let pose = *model.update(input);

        let solve = model.last_pitch_solve();
        if !solve.converged {
            unconverged += 1;
        }
        max_solver_iterations = max_solver_iterations.max(solve.iterations);
        max_roll = max_roll.max(pose.roll.abs());
        max_torque = max_torque.max(model.feedback_torque().abs());
        distance += (pose.x - last_x).hypot(pose.y - last_y);
        last_x = pose.x;
        last_y = pose.y;
    }

    Ok(json!({
        "log": path.display().to_string(),
        "velocity": model.velocity(),
        "dt": model.dt(),
        "cycles": log.inputs.len(),
        "final_pose": model.pose(),
        "distance": distance,
        "max_roll": max_roll,
        "max_feedback_torque": max_torque,
        "unconverged_pitch_solves": unconverged,
        "max_pitch_iterations": max_solver_iterations,
    }))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let mut results = Vec::new();

    if let Some(dir) = args.log_dir.as_ref() {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !(name.starts_with("inputs_") && (name.ends_with(".json") || name.ends_with(".json.gz"))) {
                continue;
            }
            match run_once(&path, &args) {
                Ok(res) => results.push(res),
                Err(e) => log::error!("Failed {}: {}", path.display(), e),
            }
        }
    } else if let Some(log) = args.log.as_ref() {
        results.push(run_once(log, &args)?);
    } else {
        anyhow::bail!("Provide --log or --log-dir");
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
