use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use respell::LanguageModel;

#[derive(Parser, Debug)]
#[clap(name = "merge", about = "Merges two trained language models.")]
struct Args {
    /// Base model file.
    #[clap(short = 'b', long)]
    base_model: PathBuf,

    /// Complementary model file whose counts are added to the base.
    #[clap(short = 'c', long)]
    complementary_model: PathBuf,

    /// A file to which the merged model is output.
    #[clap(short = 'o', long)]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Merging the language models...");
    let start = Instant::now();
    let mut model = LanguageModel::new();
    model.merge(&args.base_model, &args.complementary_model)?;
    eprintln!("{} seconds", start.elapsed().as_secs_f64());

    eprintln!("Writing the model...: {}", args.output.display());
    model.dump(&args.output)?;
    eprintln!("checksum: {:#018x}", model.checksum());

    Ok(())
}
