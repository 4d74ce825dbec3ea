//! # Exchange CLI
//!
//! Console driver for the matching engine: replays command files and runs
//! an interactive session over the line-oriented wire format
//! (`A-B-<qty>-<price>`, `D-<id>`, `M-<id>-<qty>`).

use anyhow::Context;
use clap::Parser;
use exchange_core::{
    BookConfig, Command, CommandResult, IdMode, Limits, OrderBook, Side, DEFAULT_DEPTH_LEVELS,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "exchange-cli")]
#[command(about = "A single-instrument limit order book exchange simulator", long_about = None)]
struct Cli {
    /// Command file to replay, one command per line
    #[arg(long)]
    file: Option<PathBuf>,

    /// Tick size; valid prices are multiples of it
    #[arg(long, default_value_t = 1)]
    price_increment: i64,

    /// Minimum change of order quantity
    #[arg(long, default_value_t = 1)]
    quantity_increment: u64,

    /// Minimum price
    #[arg(long)]
    min_price: Option<i64>,

    /// Maximum price
    #[arg(long)]
    max_price: Option<i64>,

    /// Minimum order quantity (only checked with --sanity-checks)
    #[arg(long)]
    min_quantity: Option<u64>,

    /// Maximum order quantity (only checked with --sanity-checks)
    #[arg(long)]
    max_quantity: Option<u64>,

    /// Reject off-tick and out-of-bounds commands before the book sees them
    #[arg(long)]
    sanity_checks: bool,

    /// Draw order ids at random instead of sequentially from 1
    #[arg(long)]
    random_order_id: bool,

    /// Read commands from the console (runs after any file replay; default
    /// when no file is given)
    #[arg(long)]
    interactive: bool,

    /// Log engine activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// One exchange run: a book, optional inbound sanity checks, and whether to
/// narrate on stdout.
struct Session {
    book: OrderBook,
    limits: Option<Limits>,
    interactive: bool,
}

impl Session {
    fn new(cli: &Cli) -> Self {
        let config = BookConfig {
            price_increment: cli.price_increment,
            quantity_increment: cli.quantity_increment,
            min_price: cli.min_price.unwrap_or(0),
            max_price: cli.max_price.unwrap_or(i64::MAX),
            id_mode: if cli.random_order_id {
                IdMode::Random
            } else {
                IdMode::Sequential
            },
        };
        let limits = cli.sanity_checks.then(|| {
            let mut limits = Limits::for_book(&config);
            if let Some(quantity) = cli.min_quantity {
                limits.min_quantity = quantity;
            }
            if let Some(quantity) = cli.max_quantity {
                limits.max_quantity = quantity;
            }
            limits
        });
        // File replay is always silent; the console loop switches this on.
        Session {
            book: OrderBook::new(config),
            limits,
            interactive: false,
        }
    }

    /// Decodes and executes one input line. Malformed or rejected lines are
    /// dropped: reported on stdout in interactive sessions, logged otherwise.
    fn submit(&mut self, line: &str) {
        let command = match Command::decode(line) {
            Ok(command) => command,
            Err(error) => {
                if self.interactive {
                    println!("Something wrong with message input: {error}");
                } else {
                    debug!(%error, line, "dropped malformed line");
                }
                return;
            }
        };
        if let Some(limits) = &self.limits {
            if let Err(error) = limits.check(&command) {
                if self.interactive {
                    println!("Rejected: {error}");
                } else {
                    debug!(%error, line, "rejected by sanity checks");
                }
                return;
            }
        }
        if self.interactive {
            println!("{}", command.encode());
        }
        let result = self.book.process(command);
        if self.interactive {
            report(&command, &result);
            print!("{}", render_book(&self.book));
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    println!("Opening exchange");

    let mut session = Session::new(&cli);

    if let Some(path) = &cli.file {
        let file = File::open(path)
            .with_context(|| format!("opening command file {}", path.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line.context("reading command file")?;
            if !line.trim().is_empty() {
                session.submit(&line);
            }
        }
        print_equilibrium(&session.book);
    }

    if cli.interactive || cli.file.is_none() {
        session.interactive = true;
        run_console(&mut session)?;
    }

    println!("Closing exchange");
    Ok(())
}

/// Interactive loop: wire-format lines plus `book`, `mid` and `quit`.
fn run_console(session: &mut Session) -> anyhow::Result<()> {
    println!("Enter commands (A-B-<qty>-<price>, D-<id>, M-<id>-<qty>; 'book', 'mid', 'quit'):");
    print!("{}", render_book(&session.book));

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break; // EOF
        }
        match input.trim() {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "book" | "b" => print!("{}", render_book(&session.book)),
            "mid" => print_equilibrium(&session.book),
            line => session.submit(line),
        }
    }
    Ok(())
}

/// Narrates the outcome of one executed command.
fn report(command: &Command, result: &CommandResult) {
    for fill in &result.fills {
        println!("Fill: {fill}");
    }
    match command {
        Command::Add { .. } => match result.resting_order_id {
            Some(id) => println!("Order added {id}"),
            None if result.accepted => println!("Order fully filled"),
            None => println!("Order refused"),
        },
        Command::Delete { order_id } => {
            if result.accepted {
                println!("Order deleted {order_id}");
            } else {
                println!("Unknown order id {order_id}");
            }
        }
        Command::Modify { order_id, .. } => {
            if let Some(id) = result.removed_order_id {
                println!("Order deleted {id}");
            } else if result.accepted {
                println!("Order modified {order_id}");
            } else {
                println!("Unknown order id {order_id}");
            }
        }
    }
}

/// Ten-level ladder for each side, quantities and prices on matching rows,
/// gaps shown as zero. Mirrors the historical console rendering.
fn render_book(book: &OrderBook) -> String {
    let mut out = String::new();

    let asks = book.depth(Side::Sell, DEFAULT_DEPTH_LEVELS);
    if asks.is_empty() {
        out.push_str("\n ---------- Empty Asks ---------- \n");
    } else {
        let (prices, quantities): (Vec<_>, Vec<_>) = asks.into_iter().unzip();
        out.push_str(&format!("Ask quantities : {quantities:?}\n"));
        out.push_str(&format!("Ask prices     : {prices:?}\n"));
    }

    let bids = book.depth(Side::Buy, DEFAULT_DEPTH_LEVELS);
    if bids.is_empty() {
        out.push_str("\n ---------- Empty Bids ---------- \n");
    } else {
        let (prices, quantities): (Vec<_>, Vec<_>) = bids.into_iter().unzip();
        out.push_str(&format!("Bid quantities : {quantities:?}\n"));
        out.push_str(&format!("Bid prices     : {prices:?}\n"));
    }

    out
}

/// Prints the equilibrium mid with the half time the historical driver
/// used: a fifth of a tick.
fn print_equilibrium(book: &OrderBook) {
    let half_time_ticks = book.config().price_increment as f64 / 5.0;
    match book.equilibrium_mid(half_time_ticks) {
        Some(mid) => println!("Equilibrium mid: {mid:.2}"),
        None => println!("One side of the book is empty - can't compute mid"),
    }
}
