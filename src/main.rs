use clap::Parser;
use pm25_processor::cli::{run, Cli};
use pm25_processor::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
