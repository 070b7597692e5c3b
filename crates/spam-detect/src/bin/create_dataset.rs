use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Parser;
use spam_data_clean::synthetic::{self, HAM_MESSAGES, SPAM_MESSAGES};
use tracing::info;

#[derive(Debug, Parser)]
#[clap(name = "create-dataset", about = "Write the demo corpus as a v1,v2 CSV")]
struct Opt {
    /// Where to write the CSV.
    #[clap(long, default_value = "spam.csv")]
    output: PathBuf,

    /// Shuffle seed. Random when omitted.
    #[clap(long)]
    seed: Option<u64>,
}

fn create_dataset(output: &Path, seed: u64) -> anyhow::Result<usize> {
    let file = File::create(output)?;
    let written = synthetic::write_csv(BufWriter::new(file), seed)?;
    info!(
        path = %output.display(),
        rows = written,
        ham = HAM_MESSAGES.len(),
        spam = SPAM_MESSAGES.len(),
        "Created dataset"
    );
    Ok(written)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let opt = Opt::parse();

    let seed = opt.seed.unwrap_or_else(rand::random);
    create_dataset(&opt.output, seed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use spam_data_clean::{Label, RawDataset};

    use super::*;

    #[test]
    fn written_dataset_loads_back() {
        let path = std::env::temp_dir().join(format!("spam-created-{}.csv", std::process::id()));
        let written = create_dataset(&path, 7).unwrap();
        let dataset = RawDataset::from_file(&path);
        std::fs::remove_file(&path).ok();

        let dataset = dataset.unwrap();
        assert_eq!(written, HAM_MESSAGES.len() + SPAM_MESSAGES.len());
        assert_eq!(dataset.len(), written);
        assert_eq!(dataset.count(Label::Ham), HAM_MESSAGES.len());
        assert_eq!(dataset.count(Label::Spam), SPAM_MESSAGES.len());
    }

    #[test]
    fn unwritable_output_is_an_error() {
        let path = std::env::temp_dir().join("no-such-dir").join("spam.csv");
        assert!(create_dataset(&path, 7).is_err());
    }
}
