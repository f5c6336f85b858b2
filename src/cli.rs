use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Log more (-v for debug, -vv for every chart combination)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse sentences against a grammar
    Parse {
        /// File containing the grammar
        grammar: PathBuf,

        /// Sentences to parse, tokens separated by whitespace (default: one
        /// sentence per line of stdin)
        sentences: Vec<String>,

        /// Start symbol (default: first in the file)
        #[arg(short, long, value_name = "SYMBOL")]
        start: Option<String>,

        /// Print every derivation tree of accepted sentences
        #[arg(short, long)]
        trees: bool,

        /// Print the filled chart
        #[arg(short, long)]
        chart: bool,

        /// Threads used to fill the chart
        #[arg(short, long, value_name = "THREADS", default_value_t = 1)]
        workers: usize,
    },

    /// Print the grammar in Chomsky normal form
    Normalize {
        /// File containing the grammar
        grammar: PathBuf,
    },

    /// Generate random sentences from a grammar
    Generate {
        /// File containing the grammar
        grammar: PathBuf,

        /// Start symbol (default: first in the file)
        #[arg(short, long, value_name = "SYMBOL")]
        start: Option<String>,

        /// Amount to generate
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32,

        /// Give up on derivations nested deeper than this
        #[arg(short = 'd', long, value_name = "DEPTH", default_value_t = 32)]
        max_depth: usize,
    },
}
