/// Replay recorded detections and report vehicle speeds
///
/// The input is a JSON array of frames, each with a capture timestamp in
/// seconds and the detector's boxes:
///
///   [{"timestamp": 0.0, "detections": [{"class_name": "car", "confidence": 0.9,
///     "top_left": [100, 90], "bottom_right": [180, 150]}]}, ...]
///
/// Usage:
///   speedwatch [--config <config.json>] [--speed-limit <kph>] <detections.json>
///
/// Examples:
///   speedwatch recordings/street.json
///   speedwatch --config config/two_lines.json --speed-limit 50 recordings/street.json
use anyhow::{bail, Context};
use speedwatch::{FrameDetections, LogSink, SpeedSession, WatchConfig};
use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<String> = None;
    let mut speed_limit: Option<u32> = None;
    let mut arg_idx = 1;

    while args.len() > arg_idx && args[arg_idx].starts_with("--") {
        match args[arg_idx].as_str() {
            "--config" => {
                arg_idx += 1;
                config_path = Some(args.get(arg_idx).context("--config needs a path")?.clone());
            }
            "--speed-limit" => {
                arg_idx += 1;
                let value = args.get(arg_idx).context("--speed-limit needs a value")?;
                speed_limit = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid speed limit: {}", value))?,
                );
            }
            other => bail!("Unknown option: {}", other),
        }
        arg_idx += 1;
    }

    let Some(input_path) = args.get(arg_idx) else {
        bail!("Usage: speedwatch [--config <config.json>] [--speed-limit <kph>] <detections.json>");
    };

    let mut config = match &config_path {
        Some(path) => WatchConfig::load(path)?,
        None => WatchConfig::default(),
    };
    if let Some(limit) = speed_limit {
        config.speed_limit_kph = limit;
    }

    let text = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read {}", input_path))?;
    let frames: Vec<FrameDetections> =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", input_path))?;
    log::info!("Replaying {} frames from {}", frames.len(), input_path);

    let mut session = SpeedSession::new(config, LogSink)?;
    let mut readings = 0usize;
    let mut violations = 0usize;
    let mut skipped = 0usize;

    for frame in &frames {
        let report = session.process_frame(frame);
        for reading in &report.readings {
            log::info!(
                "t={:.3}s object {} ({}) {} km/h",
                reading.timestamp,
                reading.object_id,
                reading.class_name,
                reading.speed_kph
            );
        }
        readings += report.readings.len();
        violations += report.violations.len();
        skipped += report.skipped;
    }

    println!("speedwatch {}", speedwatch::version());
    println!("  strategy:     {}", speedtrack::SpeedModel::name(session.estimator()));
    println!("  frames:       {}", session.frame_index());
    println!("  objects:      {}", session.tracker().known_count());
    println!("  in transit:   {}", session.in_transit_count());
    println!("  completed:    {}", session.completed_count());
    println!("  readings:     {}", readings);
    println!("  violations:   {}", violations);
    println!("  skipped:      {}", skipped);
    println!("  average fps:  {:.1}", session.fps());

    Ok(())
}
