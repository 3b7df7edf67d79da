use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;
use respell::LanguageModel;

#[derive(Parser, Debug)]
#[clap(
    name = "score",
    about = "Scores standard-input lines against a trained model."
)]
struct Args {
    /// Model file produced by the train or merge command.
    #[clap(short = 'i', long)]
    model: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut model = LanguageModel::new();
    model.load(&args.model)?;

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        println!("{}", model.score(&line));
    }

    Ok(())
}
