use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use itertools::Itertools;
use std::io::{self, BufWriter, Write};
use std::ops::ControlFlow;
use std::time::Instant;

use squarechain::{Engine, Summary};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    /// 34 values.
    Small,
    /// 43 values.
    Large,
}

impl Preset {
    fn n(self) -> usize {
        match self {
            Preset::Small => squarechain::SMALL,
            Preset::Large => squarechain::LARGE,
        }
    }
}

/// Prints every ordering of 1..=N whose neighbours sum to perfect squares.
#[derive(Parser, Debug)]
struct Args {
    /// Chain length preset.
    #[clap(long, value_enum, default_value_t = Preset::Small)]
    preset: Preset,
    /// Chain length, overriding the preset.
    #[clap(long, short = 'n')]
    n: Option<usize>,
    /// Stop after this many chains.
    #[clap(long)]
    limit: Option<u64>,
    /// Stop after placing this many values.
    #[clap(long)]
    max_nodes: Option<u64>,
    /// Only chains starting with this value.
    #[clap(long, conflicts_with = "iterative")]
    start: Option<u32>,
    /// Print only the number of chains.
    #[clap(long)]
    count: bool,
    /// Search with an explicit stack instead of recursion.
    #[clap(long)]
    iterative: bool,
}

impl Args {
    fn len(&self) -> usize {
        self.n.unwrap_or_else(|| self.preset.n())
    }
}

/// Solution sink writing one line per chain.
struct Printer<W> {
    out: W,
    count_only: bool,
    limit: Option<u64>,
    emitted: u64,
    failure: Option<io::Error>,
}

impl<W: Write> Printer<W> {
    fn new(out: W, args: &Args) -> Self {
        Printer {
            out,
            count_only: args.count,
            limit: args.limit,
            emitted: 0,
            failure: None,
        }
    }

    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.emitted >= limit)
    }

    fn accept(&mut self, chain: &[u32]) -> ControlFlow<()> {
        if self.is_full() {
            return ControlFlow::Break(());
        }
        if !self.count_only {
            if let Err(e) = writeln!(self.out, "{}", chain.iter().join(" ")) {
                self.failure = Some(e);
                return ControlFlow::Break(());
            }
        }
        self.emitted += 1;
        if self.is_full() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Reports a write failure, writes the count if asked, and flushes.
    fn finish(mut self) -> Result<u64> {
        if let Some(e) = self.failure.take() {
            return Err(e).context("failed to write chain");
        }
        if self.count_only {
            writeln!(self.out, "{}", self.emitted)?;
        }
        self.out.flush().context("failed to flush output")?;
        Ok(self.emitted)
    }
}

/// Runs the search described by `args`, writing chains to `out`.
fn execute(args: &Args, out: impl Write) -> Result<Summary> {
    let n = args.len();
    let mut engine = Engine::new(n).with_context(|| format!("invalid chain length {n}"))?;
    engine.set_node_limit(args.max_nodes);
    let squares = engine.squares();
    eprintln!(
        "n = {}, squares = {}, largest = {:?}",
        n,
        squares.len(),
        squares.usable().last()
    );

    let mut printer = Printer::new(out, args);
    // A zero limit is met before any chain is found.
    let summary = if printer.is_full() {
        Summary::default()
    } else {
        let mut sink = |chain: &[u32]| printer.accept(chain);
        if args.iterative {
            engine.try_walk(&mut sink)
        } else if let Some(start) = args.start {
            engine.try_run_from(start, &mut sink)?
        } else {
            engine.try_run(&mut sink)
        }
    };
    printer.finish()?;
    Ok(summary)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let stdout = io::stdout();
    let timer = Instant::now();
    let summary = execute(&args, BufWriter::new(stdout.lock()))?;
    eprintln!(
        "n = {}, chains = {}, nodes = {}, stopped = {}, truncated = {}, time = {:.3}s",
        args.len(),
        summary.solutions,
        summary.nodes,
        summary.stopped,
        summary.truncated,
        timer.elapsed().as_secs_f64()
    );
    Ok(())
}
