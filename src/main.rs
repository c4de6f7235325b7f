// Demo: draws the classic PLplot line plots on one or more streams.
//
//   plstream-demo [PLplot options] [--streams N] [--points N]

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use plstream::config::Config;
use plstream::error::handle_recoverable;
use plstream::options::{self, ParseMode, ParseOutcome};
use plstream::{Library, PlStream, RecordingBackend};
use tracing::{info, warn};

/// Demo settings; PLplot's own flags are removed before these are parsed
#[derive(Parser, Debug)]
#[command(name = "plstream-demo")]
#[command(about = "Draw the PLplot example line plots on one or more streams")]
struct DemoArgs {
    /// Number of streams to open
    #[arg(long)]
    streams: Option<usize>,

    /// Samples per curve (at least 2)
    #[arg(long)]
    points: Option<usize>,
}

fn main() {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("⚠️ Failed to load config, using defaults: {:#}", e);
        Config::default()
    });

    // Initialize logging
    {
        use tracing_subscriber::{fmt, EnvFilter};
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.logging.filter.as_deref().unwrap_or("info")))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt().with_env_filter(filter).try_init();
    }

    if let Err(e) = run(config) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "plstream-demo".into());

    let parsed = match options::parse_args(args, ParseMode::PARTIAL) {
        Ok(parsed) => parsed,
        Err(e) => {
            if let Some(usage) = e.usage_text() {
                eprint!("{}", usage);
            }
            return Err(e.into_inner().into());
        }
    };

    let library = match plstream::initialize() {
        Ok(library) => library,
        Err(e) => {
            warn!("{}; drawing into a recording backend instead", e);
            Library::with_backend(Arc::new(RecordingBackend::new()))
        }
    };
    info!(
        "Backend version {}",
        handle_recoverable(library.version(), "unknown".to_string())
    );

    match parsed.outcome {
        ParseOutcome::Help => {
            print!("{}", options::usage(&program, None));
            print!("{}", options::help(parsed.show_all));
            return Ok(());
        }
        ParseOutcome::Version => {
            println!("PLplot library version: {}", library.version()?);
            return Ok(());
        }
        ParseOutcome::Complete => {}
    }

    let demo_args = DemoArgs::try_parse_from(parsed.remaining.iter()).unwrap_or_else(|e| e.exit());
    let mut demo = config.demo.clone();
    if let Some(streams) = demo_args.streams {
        demo.streams = streams;
    }
    if let Some(points) = demo_args.points {
        demo.points = points;
    }
    if demo.points < 2 {
        bail!("--points must be at least 2");
    }

    let stream_options = config.stream.merged_with(&parsed.options);
    info!(
        "Drawing on {} stream(s), {} points per curve",
        demo.streams, demo.points
    );

    let mut streams = Vec::new();
    for _ in 0..demo.streams {
        let pls = library.new_stream()?;
        pls.apply_options(&stream_options)?;
        pls.set_subpages(2, 1)?;
        pls.init()?;
        pls.load_font(1)?;
        streams.push(pls);
    }

    for (index, pls) in streams.iter().enumerate() {
        let x_offset = index as f64;
        draw_parabola(pls, demo.points, x_offset)
            .with_context(|| format!("stream {}", pls.stream_id()))?;
        draw_sinc(pls, demo.points)
            .with_context(|| format!("stream {}", pls.stream_id()))?;
    }

    for pls in streams {
        let id = pls.stream_id();
        pls.end()?;
        info!("✅ Stream {} finished", id);
    }
    Ok(())
}

/// y = x^2 with every tenth sample marked
fn draw_parabola(pls: &PlStream, points: usize, x_offset: f64) -> Result<()> {
    let x: Vec<f64> = (0..points)
        .map(|i| x_offset + (i + 1) as f64 / points as f64)
        .collect();
    let y: Vec<f64> = x.iter().map(|x| x * x).collect();
    let marks_x: Vec<f64> = x.iter().step_by(10).copied().collect();
    let marks_y: Vec<f64> = y.iter().step_by(10).copied().collect();

    let (x_min, x_max) = (x[0], x[points - 1]);
    let (y_min, y_max) = (0.0, y[points - 1]);

    pls.set_color(1)?;
    pls.set_environment(x_min, x_max, y_min, y_max, 0, 0)?;
    pls.set_color(2)?;
    pls.set_labels("(x)", "(y)", "#frPLplot Example 1 - y=x#u2")?;

    pls.set_color(4)?;
    pls.draw_points(marks_x.len(), &marks_x, &marks_y, 9)?;

    pls.set_color(3)?;
    pls.draw_polyline(points, &x, &y)?;
    Ok(())
}

/// sin(x)/x over a dashed zero line
fn draw_sinc(pls: &PlStream, points: usize) -> Result<()> {
    let x: Vec<f64> = (0..points)
        .map(|i| (i as f64 - (points / 2) as f64) / (points / 20).max(1) as f64)
        .collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&x| if x == 0.0 { 1.0 } else { x.sin() / x })
        .collect();

    pls.advance_page(0)?;
    pls.advance_to_start_of_page()?;
    pls.set_axis_label_digits(4, 0)?;
    pls.set_window(x[0], x[points - 1], -0.4, 2.0)?;
    pls.set_color(1)?;
    pls.draw_box("bcnst", 0.0, 0, "bcnstv", 0.0, 0)?;

    // Dashed axis through the origin
    pls.set_symbol_style(1, 1500, 1500)?;
    pls.set_color(2)?;
    pls.draw_line_segment(x[0], 0.0, x[points - 1], 0.0)?;
    pls.set_symbol_style(0, 0, 0)?;

    pls.set_color(3)?;
    pls.set_labels("(x)", "sin(x)/x", "#frPLplot Example 1 - Sinc Function")?;
    pls.set_color(4)?;
    pls.draw_polyline(points, &x, &y)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_args_from_leftovers() {
        let parsed = options::parse_args(
            ["plstream-demo", "-dev", "svg", "--streams", "3", "--points", "120"],
            ParseMode::PARTIAL,
        )
        .unwrap();
        let args = DemoArgs::try_parse_from(parsed.remaining.iter()).unwrap();
        assert_eq!(args.streams, Some(3));
        assert_eq!(args.points, Some(120));
        assert_eq!(parsed.options.device.as_deref(), Some("svg"));
    }

    #[test]
    fn test_demo_args_reject_unknown() {
        assert!(DemoArgs::try_parse_from(["plstream-demo", "--bogus"]).is_err());
        assert!(DemoArgs::try_parse_from(["plstream-demo", "--streams", "many"]).is_err());
    }
}
