use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use respell::LanguageModel;

#[derive(Parser, Debug)]
#[clap(
    name = "export",
    about = "Exports the raw counts of a trained model to a SQLite database."
)]
struct Args {
    /// Model file produced by the train or merge command.
    #[clap(short = 'i', long)]
    model: PathBuf,

    /// SQLite file to write; existing tables are dropped first.
    #[clap(short = 'o', long)]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut model = LanguageModel::new();
    model.load(&args.model)?;

    eprintln!("Exporting the model...: {}", args.output.display());
    model.export_sqlite(&args.output)?;

    Ok(())
}
