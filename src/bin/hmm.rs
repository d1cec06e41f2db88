use std::env;
use std::io::{self, Write};
use std::process;

use hmm_learn::{read_corpus_path, BaumWelch, CsvStore, HmmError, Model, Result, Scale};
use tabwriter::TabWriter;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
    hmm learn    <corpus.csv> <model.csv> <N> <M0> <M1>
    hmm train    <corpus.csv> <model.csv> <N> <M0> <M1> [iterations] [tolerance]
    hmm decode   <corpus.csv> <model.csv> <N> <M0> <M1>
    hmm evaluate <corpus.csv> <model.csv> <N> <M0> <M1>
    hmm show     <model.csv> <N> <M0> <M1>";

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hmm_learn=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        process::exit(1);
    }
    if let Err(err) = run(&args[1], &args[2..]) {
        eprintln!("ERROR: {}", err);
        process::exit(1);
    }
}

fn run(command: &str, args: &[String]) -> Result<()> {
    match (command, args.len()) {
        ("learn", 5) => {
            let corpus = read_corpus_path(&args[0])?;
            let (n, m0, m1) = dimensions(&args[2..5])?;
            let mut model = Model::new(n, m0, m1)?;
            model.learn(&corpus)?;
            let mut store = CsvStore::open(&args[1])?;
            model.store(&mut store)?;
            println!("{}", model);
        }
        ("train", 5..=7) => {
            let corpus = read_corpus_path(&args[0])?;
            let (n, m0, m1) = dimensions(&args[2..5])?;
            let mut store = CsvStore::open(&args[1])?;
            let mut model = if store.is_empty() {
                Model::uniform(n, m0, m1)?
            } else {
                Model::load(&store, n, m0, m1)?
            };
            let mut trainer = BaumWelch::new();
            if let Some(iterations) = args.get(5) {
                trainer.max_iterations(parse(iterations, "iterations")?);
            }
            if let Some(tolerance) = args.get(6) {
                trainer.tolerance(parse(tolerance, "tolerance")?);
            }
            let report = trainer.train(&mut model, &corpus)?;
            model.store(&mut store)?;
            println!("Iterations: {}", report.iterations);
            println!("Average log-likelihood: {}", report.log_likelihood);
        }
        ("decode", 5) | ("evaluate", 5) => {
            let corpus = read_corpus_path(&args[0])?;
            let (n, m0, m1) = dimensions(&args[2..5])?;
            let model = Model::load(&CsvStore::open(&args[1])?, n, m0, m1)?;
            let mut tw = TabWriter::new(io::stdout()).padding(2);
            for (i, sequence) in corpus.iter().enumerate() {
                if command == "decode" {
                    let path = model.viterbi(sequence)?;
                    let states: Vec<String> = path.states.iter().map(|s| s.to_string()).collect();
                    writeln!(tw, "{}\t{:e}\t{}", i, path.probability, states.join(" "))?;
                } else {
                    writeln!(tw, "{}\t{}", i, model.evaluate(sequence, Scale::Log)?)?;
                }
            }
            tw.flush()?;
        }
        ("show", 4) => {
            let (n, m0, m1) = dimensions(&args[1..4])?;
            let model = Model::load(&CsvStore::open(&args[0])?, n, m0, m1)?;
            println!("{}", model);
        }
        _ => {
            return Err(HmmError::Parse(format!("unrecognized command line\n{}", USAGE)));
        }
    }
    Ok(())
}

fn dimensions(args: &[String]) -> Result<(usize, usize, usize)> {
    Ok((parse(&args[0], "N")?, parse(&args[1], "M0")?, parse(&args[2], "M1")?))
}

fn parse<T: std::str::FromStr>(value: &str, what: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|err| HmmError::Parse(format!("{} {:?}: {}", what, value, err)))
}
