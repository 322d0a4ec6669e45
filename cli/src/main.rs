use std::{error::Error, io::Write, process::ExitCode, str::FromStr};

use clap::Parser;
use log::LevelFilter;
use rand::SeedableRng;
use strum::IntoEnumIterator;

use markedcube::prelude::*;

/// Apply and compare Rubik's cube turn sequences on a marked cube
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Use a sequence to apply on the solved cube
	#[arg(short, long, default_value_t = String::new())]
	sequence: String,

	/// Set the cube from a string (the same format as when you output the cube via the "-c"-flag)
	#[arg(long, default_value_t = String::new())]
	set: String,

	/// How the stickers of the solved cube are labeled
	#[arg(short, long, default_value_t = StickerMode::default())]
	mode: StickerMode,

	/// Print all sticker modes and quit
	#[arg(long, default_value_t = false)]
	list_modes: bool,

	/// Compare the states reached by two sequences
	#[arg(
		long,
		num_args = 2,
		value_names = ["A", "B"],
		conflicts_with_all = ["builtin", "suite", "orders"]
	)]
	compare: Vec<String>,

	/// Run the built-in scenarios
	#[arg(long, default_value_t = false)]
	builtin: bool,

	/// Run the scenarios of a JSON suite file
	#[arg(long)]
	suite: Option<String>,

	/// Check the orders of a tab separated "order<TAB>sequence" file
	#[arg(long)]
	orders: Option<String>,

	/// Run the scenarios on all cores
	#[arg(short, long, default_value_t = false)]
	parallel: bool,

	/// Print the report as JSON
	#[arg(long, default_value_t = false)]
	json: bool,

	/// How many mismatching stickers to list per failed scenario
	#[arg(long, default_value_t = DEFAULT_MISMATCH_LIMIT)]
	mismatches: usize,

	/// Scramble the cube with this many random turns before applying the sequence
	#[arg(short, long)]
	random: Option<usize>,

	/// Seed for the scramble
	#[arg(long)]
	seed: Option<u64>,

	/// Output the cube as a string rather than colored
	#[arg(short, long, default_value_t = false)]
	char_print: bool,

	/// Print the output to a file rather to the stdout
	#[arg(short, long, default_value_t = String::new())]
	output: String,

	/// More logging, repeat for even more
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

/// Collect the scenarios asked for on the command line.
fn load_scenarios(args: &Args) -> Result<Vec<Scenario>, Box<dyn Error>> {
	let mut scenarios = Vec::new();

	if args.builtin {
		scenarios.extend(builtin_suite());
	}

	if let Some(path) = &args.suite {
		let text = std::fs::read_to_string(path)?;
		let suite: Vec<Scenario> = serde_json::from_str(&text)?;
		log::info!("loaded {} scenarios from {}", suite.len(), path);
		scenarios.extend(suite);
	}

	if let Some(path) = &args.orders {
		let text = std::fs::read_to_string(path)?;
		let suite: Vec<Scenario> = order_scenarios(&text)
			.into_iter()
			.map(|s| s.with_mode(args.mode))
			.collect();
		log::info!("loaded {} order checks from {}", suite.len(), path);
		scenarios.extend(suite);
	}

	Ok(scenarios)
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
	let args = Args::parse();

	env_logger::Builder::new()
		.filter_level(match args.verbose {
			0 => LevelFilter::Warn,
			1 => LevelFilter::Info,
			2 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		})
		.init();

	// Whether to redirect it to the stdout or a file
	let mut out: Box<dyn std::io::Write> = if args.output.is_empty() {
		Box::new(std::io::stdout())
	} else {
		Box::new(std::fs::File::create(&args.output)?)
	};

	// List the modes and exit
	if args.list_modes {
		for mode in StickerMode::iter() {
			writeln!(out, "{}", mode)?;
		}
		return Ok(ExitCode::SUCCESS);
	}

	// Run scenarios and report
	let scenarios = load_scenarios(&args)?;
	if !scenarios.is_empty() {
		let runner = ScenarioRunner::new().with_mismatch_limit(args.mismatches);
		let report = if args.parallel {
			runner.run_parallel(&scenarios)
		} else {
			runner.run(&scenarios)
		};

		if args.json {
			serde_json::to_writer_pretty(&mut out, &report)?;
			writeln!(out)?;
		} else {
			report.write_to(&mut out)?;
		}

		return Ok(if report.all_passed() {
			ExitCode::SUCCESS
		} else {
			ExitCode::FAILURE
		});
	}

	// Compare two sequences
	if let [a, b] = args.compare.as_slice() {
		let solved = FaceletCube::solved(args.mode);
		let ca = Sequence::from_str(a)?.execute(&solved);
		let cb = Sequence::from_str(b)?.execute(&solved);

		if equivalent(&ca, &cb) {
			writeln!(out, "equivalent")?;
			return Ok(ExitCode::SUCCESS);
		}

		writeln!(out, "different")?;
		for mismatch in diff(&ca, &cb, args.mismatches) {
			writeln!(out, "    {}", mismatch)?;
		}
		return Ok(ExitCode::FAILURE);
	}

	// Parses a cube out of the cube string
	let mut cube = if args.set.is_empty() {
		FaceletCube::solved(args.mode)
	} else {
		FaceletCube::from_str(&args.set)?
	};

	// Generate a random input cube
	if let Some(len) = args.random {
		let mut rng = match args.seed {
			Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
			None => rand::rngs::StdRng::from_entropy(),
		};
		let scramble = Sequence::random(len, &mut rng);
		log::info!("scramble: {}", scramble);
		cube = scramble.execute(&cube);
	}

	// Applies turns from args
	cube = Sequence::from_str(&args.sequence)?.execute(&cube);

	// Print the resulting cube (either as a string or with colors)
	if args.char_print {
		writeln!(out, "{}", cube)?;
	} else {
		write!(out, "{}", cube.net(args.output.is_empty()))?;
		writeln!(out)?;
	}

	Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compare_excludes_scenario_runs() {
		let args = Args::try_parse_from(["cube-verify", "--compare", "R U", "U R"]).unwrap();
		assert_eq!(args.compare, ["R U", "U R"]);

		for extra in [&["--builtin"][..], &["--suite", "s.json"], &["--orders", "o.tsv"]] {
			let mut argv = vec!["cube-verify", "--compare", "R", "R"];
			argv.extend_from_slice(extra);
			let err = Args::try_parse_from(argv).unwrap_err();
			assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
		}
	}
}
