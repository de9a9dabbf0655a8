//! Command-line interface for one-shot site assessments.
#![forbid(unsafe_code)]

use clap::Parser;

mod assess;
mod error;
mod session;

pub use error::CliError;

use assess::AssessArgs;

/// Run the Heliosite CLI with the current process arguments.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, wiring, or reporting fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    assess::run_assess(cli.args, &mut stdout)
}

#[derive(Debug, Parser)]
#[command(
    name = "heliosite",
    about = "Score a candidate solar-farm site from public geodata",
    version,
    allow_negative_numbers = true
)]
struct Cli {
    #[command(flatten)]
    args: AssessArgs,
}
