//! Command-line front end for the steady-state GA.
//!
//! ```text
//! ssga-tsp --input_size 50 --pop_size 100 --num_gen 500
//! ssga-tsp --input_size distances.csv --seed 7 --noout
//! ```
//!
//! A numeric `--input_size` generates a random distance matrix of that size;
//! anything else is read as a CSV distance matrix.

use anyhow::{bail, Context, Result};
use ssga_tsp::random::create_rng;
use ssga_tsp::ssga::{SsgaConfig, SsgaResult, SsgaRunner};
use ssga_tsp::tsp::cities::{format_matrix, random_distance_matrix, read_distance_matrix_file};
use ssga_tsp::tsp::{DistanceMatrix, DistanceMetric};
use std::path::PathBuf;
use std::time::Instant;

const USAGE: &str = "\
Usage: ssga-tsp --input_size <N|FILE.csv> [OPTIONS]

Options:
  --input_size <N|FILE>      Number of random cities, or a CSV distance matrix
  --pop_size <N>             Population size [default: 50]
  --num_gen <N>              Number of generations [default: 100]
  --mutation_rate <R>        Initial mutation rate in (0, 1) [default: 0.1]
  --parents_percent <P>      Share of the population bred per generation [default: 20]
  --seed <N>                 Random seed
  --noout                    Only print the cost
  -h, --help                 Show this help";

/// Where the cities come from.
#[derive(Debug, Clone, PartialEq)]
enum CitySource {
    Random(usize),
    File(PathBuf),
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
struct Args {
    source: CitySource,
    pop_size: usize,
    num_gen: usize,
    mutation_rate: f64,
    parents_percent: u32,
    seed: Option<u64>,
    noout: bool,
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Run(Args),
    Help,
}

impl Command {
    fn parse_from<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let defaults = SsgaConfig::default();

        let mut source = None;
        let mut pop_size = defaults.pop_size;
        let mut num_gen = defaults.max_generations;
        let mut mutation_rate = defaults.mutation_rate;
        let mut parents_percent = defaults.parents_percent;
        let mut seed = None;
        let mut noout = false;

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "-h" | "--help" => return Ok(Command::Help),
                "--noout" => noout = true,
                "--input_size" => {
                    let value = value_of(&args, i, flag)?;
                    source = Some(match value.parse::<usize>() {
                        Ok(n) => CitySource::Random(n),
                        Err(_) => CitySource::File(PathBuf::from(value)),
                    });
                    i += 1;
                }
                "--pop_size" => {
                    pop_size = parse_value(&args, i, flag)?;
                    i += 1;
                }
                "--num_gen" => {
                    num_gen = parse_value(&args, i, flag)?;
                    i += 1;
                }
                "--mutation_rate" => {
                    mutation_rate = parse_value(&args, i, flag)?;
                    i += 1;
                }
                "--parents_percent" => {
                    parents_percent = parse_value(&args, i, flag)?;
                    i += 1;
                }
                "--seed" => {
                    seed = Some(parse_value(&args, i, flag)?);
                    i += 1;
                }
                unknown => bail!("unknown argument: {unknown}"),
            }
            i += 1;
        }

        let Some(source) = source else {
            return Ok(Command::Help);
        };
        Ok(Command::Run(Args {
            source,
            pop_size,
            num_gen,
            mutation_rate,
            parents_percent,
            seed,
            noout,
        }))
    }
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .with_context(|| format!("{flag} requires a value"))
}

fn parse_value<T>(args: &[String], i: usize, flag: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value_of(args, i, flag)?;
    raw.parse()
        .with_context(|| format!("invalid value for {flag}: {raw}"))
}

fn load_cities(source: &CitySource, seed: u64) -> Result<DistanceMatrix> {
    match source {
        CitySource::Random(n) => {
            let mut rng = create_rng(seed.wrapping_add(1));
            Ok(random_distance_matrix(*n, &mut rng)?)
        }
        CitySource::File(path) => read_distance_matrix_file(path)
            .with_context(|| format!("failed to load distance matrix from {}", path.display())),
    }
}

/// The loaded matrix as printed before the run, or `None` with `--noout`.
fn matrix_listing(metric: &DistanceMatrix, args: &Args) -> Option<String> {
    (!args.noout).then(|| format_matrix(metric))
}

fn report(result: &SsgaResult, args: &Args) {
    println!("Cost: {}", result.rounded_cost());
    if args.noout {
        return;
    }
    let path: Vec<String> = result.best.cities().iter().map(usize::to_string).collect();
    println!("Path: [{}]", path.join(", "));
    println!(
        "Replaced: {}  Rejected: {}  Generations: {}",
        result.replaced, result.rejected, result.generations
    );
    println!("Generation  Best length  Diversity  Mutation rate");
    for (g, ((best, diversity), rate)) in result
        .history
        .iter()
        .zip(&result.diversity_history)
        .zip(&result.rate_history)
        .enumerate()
    {
        println!("{:>10}  {best:>11.2}  {diversity:>9.3}  {rate:>13.4}", g + 1);
    }
}

fn run(args: Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let start = Instant::now();

    let metric = load_cities(&args.source, seed)?;
    println!("Data Generation Time: {:.3?}", start.elapsed());
    if let Some(listing) = matrix_listing(&metric, &args) {
        print!("{listing}");
    }

    let config = SsgaConfig::default()
        .with_input_size(metric.point_count())
        .with_pop_size(args.pop_size)
        .with_max_generations(args.num_gen)
        .with_mutation_rate(args.mutation_rate)
        .with_parents_percent(args.parents_percent)
        .with_seed(seed)
        .with_parallel(cfg!(feature = "parallel"))
        .with_noout(args.noout);

    let tsp_start = Instant::now();
    let result = SsgaRunner::from_config(&metric, config)?.run()?;
    println!("TSP Time: {:.3?}", tsp_start.elapsed());

    report(&result, &args);
    println!("Total Time: {:.3?}", start.elapsed());
    Ok(())
}

fn main() -> Result<()> {
    let command = Command::parse_from(std::env::args())?;
    let args = match command {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Run(args) => args,
    };

    let level = if args.noout {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        Command::parse_from(std::iter::once("ssga-tsp").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_arguments_shows_help() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(parse(&["--help"]).unwrap(), Command::Help);
        assert_eq!(parse(&["--pop_size", "10"]).unwrap(), Command::Help);
    }

    #[test]
    fn test_defaults_follow_config() {
        let Command::Run(args) = parse(&["--input_size", "30"]).unwrap() else {
            panic!("expected run command");
        };
        let defaults = SsgaConfig::default();
        assert_eq!(args.source, CitySource::Random(30));
        assert_eq!(args.pop_size, defaults.pop_size);
        assert_eq!(args.num_gen, defaults.max_generations);
        assert_eq!(args.parents_percent, defaults.parents_percent);
        assert!(args.seed.is_none());
        assert!(!args.noout);
    }

    #[test]
    fn test_all_options() {
        let Command::Run(args) = parse(&[
            "--input_size",
            "cities.csv",
            "--pop_size",
            "80",
            "--num_gen",
            "250",
            "--mutation_rate",
            "0.05",
            "--parents_percent",
            "10",
            "--seed",
            "42",
            "--noout",
        ])
        .unwrap() else {
            panic!("expected run command");
        };
        assert_eq!(args.source, CitySource::File(PathBuf::from("cities.csv")));
        assert_eq!(args.pop_size, 80);
        assert_eq!(args.num_gen, 250);
        assert!((args.mutation_rate - 0.05).abs() < 1e-12);
        assert_eq!(args.parents_percent, 10);
        assert_eq!(args.seed, Some(42));
        assert!(args.noout);
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(parse(&["--input_size", "5", "--pop_size", "many"]).is_err());
        assert!(parse(&["--input_size", "5", "--seed"]).is_err());
        assert!(parse(&["--input_size", "5", "--verbose"]).is_err());
    }

    #[test]
    fn test_matrix_listing_follows_noout() {
        let metric = DistanceMatrix::new(vec![
            vec![0.0, 7.0, 15.0],
            vec![7.0, 0.0, 3.0],
            vec![15.0, 3.0, 0.0],
        ])
        .unwrap();
        let Command::Run(mut args) = parse(&["--input_size", "3"]).unwrap() else {
            panic!("expected run command");
        };

        let listing = matrix_listing(&metric, &args).unwrap();
        assert_eq!(listing, "  0   7  15\n  7   0   3\n 15   3   0\n");

        args.noout = true;
        assert!(matrix_listing(&metric, &args).is_none());
    }

    #[test]
    fn test_random_source_has_requested_size() {
        let metric = load_cities(&CitySource::Random(12), 3).unwrap();
        assert_eq!(metric.point_count(), 12);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = CitySource::File(PathBuf::from("/nonexistent/ssga-tsp.csv"));
        assert!(load_cities(&source, 0).is_err());
    }
}
