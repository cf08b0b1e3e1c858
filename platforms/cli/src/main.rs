use anyhow::{bail, Context, Result};
use beaver::types::{DEFAULT_CHECK_INTERVAL, DEFAULT_REPORT_INTERVAL, DEFAULT_STATES};
use beaver::{
    render, search, Machine, Outcome, ProgramManager, RunConfig, SearchConfig, TableGenerator,
    TableLoader, TransitionTable,
};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Tape length used when neither the command line nor a built-in program sets one.
const CLI_TAPE_LENGTH: usize = 20000;
/// Cells per line when printing the tape.
const TAPE_COLUMNS: usize = 70;

/// A busy beaver Turing machine simulator.
#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
#[command(after_help = "EXAMPLES:
  beaver-cli run --table bb.in --output bb.out
  cat bb.in | beaver-cli run --silent
  beaver-cli run --program bb-4 --print-tape
  beaver-cli search --states 3 --candidates 10000 --seed 7")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a table, print it, run it to completion and report the 1s printed.
    Run(RunArgs),
    /// Run randomly generated tables and keep the one printing the most 1s.
    Search(SearchArgs),
    /// Run every `.tm` table in a directory.
    Batch(BatchArgs),
    /// List the built-in champion programs.
    List,
}

#[derive(Args)]
struct RunArgs {
    /// Transition table file (`.json` for JSON). Reads stdin when omitted and input is piped.
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Run a built-in program instead, see `list`.
    #[arg(short, long, conflicts_with = "table")]
    program: Option<String>,

    /// Run a random table with this many states instead.
    #[arg(long, conflicts_with_all = ["table", "program"])]
    random: Option<usize>,

    /// Seed for `--random`. Uses system entropy when omitted.
    #[arg(long, requires = "random")]
    seed: Option<u64>,

    /// Expected number of states; the table is rejected if it differs.
    #[arg(short = 'n', long)]
    states: Option<usize>,

    /// Number of tape cells.
    #[arg(short = 'l', long)]
    tape_length: Option<usize>,

    /// Steps between progress checks, 0 to disable.
    #[arg(long, default_value_t = DEFAULT_CHECK_INTERVAL)]
    check_interval: u64,

    /// Steps between progress reports, 0 to disable.
    #[arg(long, default_value_t = DEFAULT_REPORT_INTERVAL)]
    report_interval: u64,

    /// Do not report progress while running.
    #[arg(short, long)]
    silent: bool,

    /// Print the tape after the run.
    #[arg(long)]
    print_tape: bool,

    /// Print the run result as JSON.
    #[arg(long)]
    json: bool,

    /// Save the table to this file after the run.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct SearchArgs {
    /// Number of states of the generated tables.
    #[arg(short = 'n', long, default_value_t = DEFAULT_STATES)]
    states: usize,

    /// Number of tables to try.
    #[arg(short, long, default_value_t = 1000)]
    candidates: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(short = 'l', long, default_value_t = CLI_TAPE_LENGTH)]
    tape_length: usize,

    #[arg(long, default_value_t = DEFAULT_CHECK_INTERVAL)]
    check_interval: u64,

    /// Steps after which a candidate is abandoned.
    #[arg(long, default_value_t = 10_000_000)]
    max_steps: u64,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Save the champion table to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct BatchArgs {
    /// Directory containing `.tm` table files.
    directory: PathBuf,

    #[arg(short = 'l', long, default_value_t = CLI_TAPE_LENGTH)]
    tape_length: usize,

    #[arg(long, default_value_t = DEFAULT_CHECK_INTERVAL)]
    check_interval: u64,

    /// Steps after which a table is abandoned.
    #[arg(long, default_value_t = 10_000_000)]
    max_steps: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Search(args) => run_search(args),
        Commands::Batch(args) => run_batch(args),
        Commands::List => {
            list();
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let (table, tape_length) = load_table(&args)?;

    if let Some(states) = args.states {
        if table.nstates() != states {
            bail!(
                "expected a table with {} states, got {}",
                states,
                table.nstates()
            );
        }
    }

    if !args.json {
        print!("{}", render(&table));
    }

    let config = RunConfig::default()
        .with_check_interval(args.check_interval)
        .with_report_interval(args.report_interval)
        .silent(args.silent);
    let mut machine = Machine::new(table, tape_length)?;
    let result = machine.run_with(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    if args.print_tape {
        println!("{}", machine.tape().render(TAPE_COLUMNS));
    }

    let result = result
        .into_result()
        .with_context(|| format!("machine failed: {}", machine.snapshot()))?;

    if !args.json {
        println!("Number of 1s printed: {}", result.ones);
    }

    if let Some(output) = &args.output {
        TableLoader::save(machine.table(), output)
            .with_context(|| format!("failed to save table to {}", output.display()))?;
    }

    Ok(())
}

/// Loads the table to run together with the tape length to run it on.
///
/// It tries a file path, a built-in program, a random table, and finally stdin.
fn load_table(args: &RunArgs) -> Result<(TransitionTable, usize)> {
    let tape_length = args.tape_length.unwrap_or(CLI_TAPE_LENGTH);

    if let Some(path) = &args.table {
        let table = TableLoader::load(path)
            .with_context(|| format!("failed to load table from {}", path.display()))?;
        Ok((table, tape_length))
    } else if let Some(name) = &args.program {
        let program = ProgramManager::get_program_by_name(name)?;
        Ok((program.table, args.tape_length.unwrap_or(program.tape_length)))
    } else if let Some(states) = args.random {
        let mut generator = match args.seed {
            Some(seed) => TableGenerator::new(seed),
            None => TableGenerator::from_entropy(),
        };
        Ok((generator.generate(states)?, tape_length))
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read table from stdin")?;
        Ok((TableLoader::load_from_string(&buffer)?, tape_length))
    } else {
        bail!("no table given, use --table, --program, --random or pipe a table on stdin")
    }
}

fn run_search(args: SearchArgs) -> Result<()> {
    let config = SearchConfig {
        nstates: args.states,
        tape_length: args.tape_length,
        candidates: args.candidates,
        check_interval: args.check_interval,
        max_steps: args.max_steps,
        seed: args.seed,
    };

    let report = search(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} candidates: {} halted, {} overran the tape, {} stalled, {} still running",
            report.total(),
            report.halted,
            report.overran,
            report.stalled,
            report.exhausted
        );
    }

    let Some(champion) = &report.champion else {
        warn!("no candidate halted");
        return Ok(());
    };

    if !args.json {
        println!(
            "Champion (candidate {}): {} ones in {} steps",
            champion.candidate, champion.result.ones, champion.result.steps
        );
        print!("{}", render(&champion.table));
    }

    if let Some(output) = &args.output {
        TableLoader::save(&champion.table, output)
            .with_context(|| format!("failed to save table to {}", output.display()))?;
    }

    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<()> {
    let config = RunConfig::default()
        .with_check_interval(args.check_interval)
        .silent(true);

    for loaded in TableLoader::load_tables(&args.directory) {
        let (path, table) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "skipping table");
                continue;
            }
        };

        let mut machine = Machine::new(table, args.tape_length)?;
        match machine.run_for(&config, args.max_steps)? {
            Some(result) => match result.outcome {
                Outcome::Halted => println!(
                    "{}: halted after {} steps with {} ones",
                    path.display(),
                    result.steps,
                    result.ones
                ),
                Outcome::Failed(failure) => println!("{}: {}", path.display(), failure),
            },
            None => println!(
                "{}: still running after {} steps",
                path.display(),
                args.max_steps
            ),
        }
    }

    info!(directory = %args.directory.display(), "batch finished");
    Ok(())
}

fn list() {
    for program in ProgramManager::programs() {
        println!(
            "{:<6} {} states, {} ones in {} steps (tape {})",
            program.name,
            program.table.nstates(),
            program.ones,
            program.steps,
            program.tape_length
        );
    }
}
