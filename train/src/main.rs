use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use respell::LanguageModel;

#[derive(Parser, Debug)]
#[clap(name = "train", about = "Trains an n-gram language model.")]
struct Args {
    /// Tokenized training text, one or more sentences.
    #[clap(short = 'i', long)]
    text: PathBuf,

    /// Alphabet file: the characters words are made of.
    #[clap(short = 'a', long)]
    alphabet: PathBuf,

    /// A file to which the model is output.
    #[clap(short = 'o', long)]
    output: PathBuf,

    /// Previously dumped model to train on top of.
    #[clap(short = 'b', long)]
    base_model: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Training the language model...");
    let start = Instant::now();
    let mut model = LanguageModel::new();
    match &args.base_model {
        Some(base_model) => model.train_with_base(&args.text, &args.alphabet, base_model)?,
        None => model.train(&args.text, &args.alphabet)?,
    }
    eprintln!("{} seconds", start.elapsed().as_secs_f64());

    eprintln!("Writing the model...: {}", args.output.display());
    model.dump(&args.output)?;
    eprintln!("checksum: {:#018x}", model.checksum());

    Ok(())
}
