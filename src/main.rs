mod cli;

use std::fmt::Display;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use wfst::chart::Chart;
use wfst::error_handling::{Error, Location};
use wfst::generator::{Generator, GeneratorConfig};
use wfst::grammar::{CnfGrammar, Grammar};
use wfst::{reader, ParseResult, ParsingConfig};

type CliResult = Result<(), ExitCode>;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail<E: Display>(errors: impl IntoIterator<Item = E>) -> ExitCode {
    for error in errors {
        eprintln!("{}", error);
    }
    ExitCode::FAILURE
}

fn load(path: &Path) -> Result<Grammar, ExitCode> {
    reader::read_file(path).map_err(fail)
}

fn normalize(grammar: &Grammar, path: &Path) -> Result<CnfGrammar, ExitCode> {
    grammar.rules.to_cnf().map_err(|error| {
        fail([Error {
            location: Location::new(path, 0),
            error,
        }])
    })
}

fn read_sentences(sentences: Vec<String>) -> Result<Vec<String>, ExitCode> {
    if !sentences.is_empty() {
        return Ok(sentences);
    }
    std::io::stdin()
        .lock()
        .lines()
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .collect::<Result<_, _>>()
        .map_err(|e| fail([e]))
}

fn parse(
    path: PathBuf,
    sentences: Vec<String>,
    start: Option<String>,
    trees: bool,
    show_chart: bool,
    workers: usize,
) -> CliResult {
    let grammar = load(&path)?;
    let cnf = normalize(&grammar, &path)?;
    let start = start.unwrap_or(grammar.start_symbol);
    let config = ParsingConfig {
        derivations: trees,
        workers,
    };

    for sentence in read_sentences(sentences)? {
        let tokens: Vec<&str> = sentence.split_whitespace().collect();
        let chart = Chart::build(&cnf, &tokens, &config);

        let result = ParseResult::from_chart(&chart, &start, config.derivations);
        let verdict = if result.is_accepted() { "accepted" } else { "rejected" };
        println!("{}\t{}", verdict, tokens.join(" "));

        if show_chart {
            print!("{}", chart);
        }
        if let Some(forest) = result.forest() {
            for tree in forest.trees() {
                println!("  {}", tree.unbinarize(&cnf));
            }
        }
    }
    Ok(())
}

fn generate(path: PathBuf, start: Option<String>, amount: u32, max_depth: usize) -> CliResult {
    let grammar = load(&path)?;
    let start = start.unwrap_or_else(|| grammar.start_symbol.clone());
    let config = GeneratorConfig { max_depth };
    let generator = Generator::new(&grammar.rules, Location::new(&path, 0), config);
    let mut rng = rand::thread_rng();

    for _ in 0..amount {
        let sentence = generator.generate(&start, &mut rng).map_err(|e| fail([e]))?;
        println!("{}", sentence.join(" "));
    }
    Ok(())
}

fn run(command: Command) -> CliResult {
    match command {
        Command::Parse {
            grammar,
            sentences,
            start,
            trees,
            chart,
            workers,
        } => parse(grammar, sentences, start, trees, chart, workers),
        Command::Normalize { grammar: path } => {
            let grammar = load(&path)?;
            print!("{}", normalize(&grammar, &path)?);
            Ok(())
        }
        Command::Generate {
            grammar,
            start,
            amount,
            max_depth,
        } => generate(grammar, start, amount, max_depth),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}
