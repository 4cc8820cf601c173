use crate::cli::args::Cli;
use crate::core::histogram::{Histogram, MAX_BINS, NoHistogram};
use crate::core::table::{Cell, Table};
use crate::core::trials::{self, Trial};
use crate::report::show::Viewer;
use crate::report::svg;
use anyhow::{Result, bail};
use clap::Parser;
use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

/// How long figures stay on disk after the last one in a non-interactive run.
const VIEWER_LINGER: Duration = Duration::from_secs(3);

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

/// What to do with one trial.
#[derive(Debug)]
pub enum Prepared {
    Skip(String),
    Figure { hist: Histogram, svg: String },
}

fn run(cli: Cli) -> Result<()> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    stage(stats, "preflight", || {
        if !cli.input.is_file() {
            bail!("input file not found: {}", cli.input.display());
        }
        Ok(())
    })?;
    let input_size = fs::metadata(&cli.input).map(|m| m.len()).unwrap_or(0);

    let t_read = Instant::now();
    let table = Table::load(&cli.input)?;
    stage_done(stats, "read", t_read);
    if stats {
        eprintln!(
            "GEIGER_STATS input={} bytes={} rows={} columns={}",
            cli.input.display(),
            input_size,
            table.rows(),
            table.headers().len()
        );
    }

    let t_parse = Instant::now();
    let trials = trials::group_columns(table.headers());
    stage_done(stats, "parse-columns", t_parse);
    if stats {
        eprintln!("GEIGER_STATS trials={}", trials.len());
    }

    let mut viewer = if cli.no_show {
        None
    } else {
        let viewer = Viewer::new(cli.viewer.clone(), io::stdin().is_terminal())?;
        Some(viewer.linger(VIEWER_LINGER))
    };

    for trial in &trials {
        let t_render = Instant::now();
        let prepared = prepare(&table, trial, stats)?;
        stage_done(stats, &format!("render[{}]", trial.id), t_render);

        match prepared {
            Prepared::Skip(reason) => println!("Skipping {} ({})", trial.id, reason),
            Prepared::Figure { hist, svg } => match viewer.as_mut() {
                Some(viewer) => {
                    let t_show = Instant::now();
                    viewer.show(&trial.id, &svg)?;
                    stage_done(stats, &format!("show[{}]", trial.id), t_show);
                }
                None => println!(
                    "{}: {} samples, max {}, {} bins",
                    trial.id,
                    hist.samples,
                    hist.max,
                    hist.edges.bins()
                ),
            },
        }
    }

    if stats {
        eprintln!("GEIGER_STATS total={}", fmt_dur(t0.elapsed()));
    }
    Ok(())
}

/// Cleans the trial's counts column, bins it and renders the figure.
///
/// The time column, when present, is only inspected for the stats log.
pub fn prepare(table: &Table, trial: &Trial, stats: bool) -> Result<Prepared> {
    let Some(counts) = trial.counts else {
        return Ok(Prepared::Skip("missing counts column".to_string()));
    };
    if let Some(time) = trial.time
        && stats
    {
        let present = table
            .column(time.0)
            .iter()
            .filter(|c| **c != Cell::Missing)
            .count();
        eprintln!("GEIGER_STATS trial={} time_samples={}", trial.id, present);
    }

    let samples = table.numeric(counts.0)?;
    let hist = match Histogram::from_samples(&samples) {
        Ok(hist) => hist,
        Err(NoHistogram::NoSamples) => {
            return Ok(Prepared::Skip("no counts samples".to_string()));
        }
        Err(NoHistogram::NoBins) => {
            return Ok(Prepared::Skip("no non-negative counts".to_string()));
        }
        Err(NoHistogram::TooWide) => bail!(
            "column '{}': maximum count {} needs more than {} bins",
            table.headers()[counts.0],
            samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            MAX_BINS
        ),
    };
    let svg = svg::render(&trial.id, &hist)?;
    Ok(Prepared::Figure { hist, svg })
}

fn stats_enabled() -> bool {
    matches!(env::var("GEIGER_STATS").as_deref(), Ok("1"))
}

fn stage<F>(stats: bool, name: &str, f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let t = Instant::now();
    let res = f();
    if stats {
        eprintln!("GEIGER_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
    res
}

fn stage_done(stats: bool, name: &str, t: Instant) {
    if stats {
        eprintln!("GEIGER_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
