use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use loterix_engine::DrawArchive;
use loterix_model::{ArtifactPaths, ModelMetadata, Network, load_model};

/// Reads and parses a draw archive CSV, attaching the path to any failure.
pub fn load_archive(path: &Path) -> anyhow::Result<DrawArchive> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read draw archive: {}", path.display()))?;
    let archive = DrawArchive::parse_csv(&text)
        .with_context(|| format!("failed to parse draw archive: {}", path.display()))?;
    Ok(archive)
}

/// Loads a model artifact pair from its common stem.
pub fn load_model_pair(stem: &Path) -> anyhow::Result<(Network, ModelMetadata)> {
    let paths = ArtifactPaths::from_stem(stem);
    load_model(&paths).with_context(|| format!("failed to load model {}", stem.display()))
}

/// Serializes `value` as pretty JSON to a file, or to stdout when no path is
/// given.
pub fn save_json<T>(value: &T, output: Option<&PathBuf>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)
                .with_context(|| format!("failed to write JSON to {}", path.display()))?;
            writeln!(writer)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, value)
                .context("failed to write JSON to stdout")?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
