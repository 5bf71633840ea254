use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::f64::consts::PI;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use bicycle_model_rs::{
    encoder_rate, EncoderChannel, EncoderConfig, ModelConfig, ModelInput, RawEncoderSample,
};

#[derive(Parser, Debug)]
#[command(name = "bicycle_sim")]
#[command(about = "Drive the bicycle pose model with a synthetic steer profile", long_about = None)]
struct Args {
    /// Simulated duration in seconds
    #[arg(value_name = "SECONDS", default_value = "10")]
    duration: f64,

    /// JSON model config (velocity, dt, parameters); benchmark bicycle if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override forward velocity [m/s]
    #[arg(long)]
    velocity: Option<f64>,

    /// Steer amplitude [rad]
    #[arg(long, default_value = "0.05")]
    steer_amplitude: f64,

    /// Steer oscillation frequency [Hz]
    #[arg(long, default_value = "0.5")]
    steer_frequency: f64,

    /// Steer encoder resolution
    #[arg(long, default_value = "152000")]
    counts_per_rev: u32,

    /// Pose output (JSON lines); stdout if omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Quantize an angle the way the steer encoder driver reports it
fn angle_to_count(angle: f64, counts_per_rev: u32) -> u32 {
    let counts = (angle / (2.0 * PI) * f64::from(counts_per_rev)).round() as i64;
    counts.rem_euclid(i64::from(counts_per_rev)) as u32
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match args.config.as_ref() {
        Some(path) => ModelConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ModelConfig::default(),
    };
    if let Some(v) = args.velocity {
        config.velocity = v;
    }

    eprintln!("[{}] Bicycle model simulation starting", ts_now());
    eprintln!("  Duration: {} s", args.duration);
    eprintln!("  Velocity: {} m/s", config.velocity);
    eprintln!("  Cycle: {} s", config.dt);
    eprintln!(
        "  Steer: {} rad @ {} Hz",
        args.steer_amplitude, args.steer_frequency
    );

    let mut model = config.build()?;
    let mut steer_encoder = EncoderChannel::new(EncoderConfig::new(args.counts_per_rev)?);

    let mut out: Box<dyn Write> = match args.output.as_ref() {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let cycles = (args.duration / config.dt).round() as u64;
    let half_rev = i64::from(args.counts_per_rev / 2);
    let mut previous_count = 0_i64;
    let mut unconverged = 0_u64;
    let mut max_roll = 0.0_f64;
    let mut max_steer_rate = 0.0_f64;

    for i in 0..cycles {
        let t = i as f64 * config.dt;
        let steer = args.steer_amplitude * (2.0 * PI * args.steer_frequency * t).sin();
        let count = angle_to_count(steer, args.counts_per_rev);
        let mut delta = i64::from(count) - previous_count;
        if delta > half_rev {
            delta -= i64::from(args.counts_per_rev);
        } else if delta < -half_rev {
            delta += i64::from(args.counts_per_rev);
        }
        steer_encoder.record(RawEncoderSample {
            count,
            velocity_count: delta as i32,
        });
        previous_count = i64::from(count);

        // rad/cycle -> rad/s
        let steer_rate = encoder_rate::<f64, _>(&steer_encoder) / config.dt;
        max_steer_rate = max_steer_rate.max(steer_rate.abs());

        let pose = *model.update(&ModelInput::from_steer_encoder(&steer_encoder));
        if !model.last_pitch_solve().converged {
            unconverged += 1;
        }
        max_roll = max_roll.max(pose.roll.abs());

        serde_json::to_writer(&mut out, &pose)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    let pose = model.pose();
    log::info!(
        "{} cycles, final pose x={:.3} y={:.3} yaw={:.3} pitch={:.5}",
        cycles,
        pose.x,
        pose.y,
        pose.yaw,
        pose.pitch
    );
    eprintln!("[{}] Done", ts_now());
    eprintln!("  Max |roll|: {:.4} rad", max_roll);
    eprintln!("  Max |steer rate|: {:.4} rad/s", max_steer_rate);
    eprintln!("  Unconverged pitch solves: {}", unconverged);
    eprintln!("  Final feedback torque: {:.4} N·m", model.feedback_torque());

    Ok(())
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
