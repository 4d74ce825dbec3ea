//! # Flowgen
//!
//! Generates command files for the exchange, one wire-format command per
//! line. Two modes:
//!
//! - `noise`: random Add/Modify/Delete flow around a configurable mid,
//!   with normally distributed price drift and order sizes. Roughly one in
//!   six Delete/Modify commands targets an id that was never issued, which
//!   exercises the engine's silent no-op path.
//! - `layered`: a dense two-sided book, one tick per level, asks stacked
//!   above the mid and bids below.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::rngs::ThreadRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flowgen")]
#[command(about = "Command-file generator for the exchange", long_about = None)]
struct Cli {
    /// Output file
    #[arg(short, long)]
    out: PathBuf,

    /// Generation mode
    #[arg(long, value_enum, default_value = "noise")]
    mode: Mode,

    /// Number of commands (noise mode)
    #[arg(long, default_value_t = 300)]
    count: usize,

    /// Price the generated flow centers on
    #[arg(long, default_value_t = 100)]
    mid: i64,

    /// Average order size
    #[arg(long, default_value_t = 50)]
    average_trade_size: u64,

    /// Price levels per side (layered mode)
    #[arg(long, default_value_t = 100)]
    levels: i64,

    /// Orders per price level (layered mode)
    #[arg(long, default_value_t = 2000)]
    orders_per_level: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Noise,
    Layered,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let lines = match cli.mode {
        Mode::Noise => noise_flow(&cli, &mut rand::rng()),
        Mode::Layered => layered_book(&cli, &mut rand::rng()),
    };

    let file = File::create(&cli.out)
        .with_context(|| format!("creating output file {}", cli.out.display()))?;
    let mut writer = BufWriter::new(file);
    for line in &lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;

    println!("Wrote {} commands to {}", lines.len(), cli.out.display());
    Ok(())
}

/// Order size: half the average plus normally distributed spread, at
/// least 1.
fn sample_size(average: u64, rng: &mut ThreadRng) -> u64 {
    let spread = Normal::<f64>::new(0.0, 10.0).expect("sigma > 0");
    let noise = spread.sample(rng).round().abs() as u64;
    (average / 2 + noise).max(1)
}

/// Random Add/Modify/Delete flow around the mid. Buys quote below the mid
/// and sells above it, each offset by |N(0, mid/25)| ticks, so most orders
/// rest and the occasional one crosses.
fn noise_flow(cli: &Cli, rng: &mut ThreadRng) -> Vec<String> {
    let drift = Normal::new(0.0, cli.mid as f64 / 25.0).expect("sigma > 0");

    let mut lines = Vec::with_capacity(cli.count);
    let mut issued: u64 = 0;
    for _ in 0..cli.count {
        let buy = rng.random_bool(0.5);
        let coefficient = if buy { -1.0 } else { 1.0 };
        let price = (cli.mid as f64 + coefficient * drift.sample(rng).abs().round()) as i64;
        let price = price.max(1);
        let quantity = sample_size(cli.average_trade_size, rng);

        match rng.random_range(0..3u8) {
            0 => {
                let side = if buy { 'B' } else { 'S' };
                lines.push(format!("A-{side}-{quantity}-{price}"));
                issued += 1;
            }
            1 => lines.push(format!("M-{}-{quantity}", guess_id(issued, rng))),
            _ => lines.push(format!("D-{}", guess_id(issued, rng))),
        }
    }
    lines
}

/// Picks a target id from a span 1.2x the number of ids issued so far, so
/// some Delete/Modify commands reference orders that never existed.
fn guess_id(issued: u64, rng: &mut ThreadRng) -> u64 {
    let span = ((issued as f64 * 1.2).round() as u64).max(1);
    rng.random_range(1..=span)
}

/// Dense two-sided book: asks one tick apart walking down to just above
/// the mid, then bids walking down from the mid.
fn layered_book(cli: &Cli, rng: &mut ThreadRng) -> Vec<String> {
    let mut lines = Vec::with_capacity(2 * cli.levels as usize * cli.orders_per_level);
    for level in 0..cli.levels {
        let price = cli.mid + cli.levels - level;
        for _ in 0..cli.orders_per_level {
            let quantity = sample_size(cli.average_trade_size, rng);
            lines.push(format!("A-S-{quantity}-{price}"));
        }
    }
    for level in 0..cli.levels {
        let price = (cli.mid - level).max(1);
        for _ in 0..cli.orders_per_level {
            let quantity = sample_size(cli.average_trade_size, rng);
            lines.push(format!("A-B-{quantity}-{price}"));
        }
    }
    lines
}
