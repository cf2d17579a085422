use crate::error::Result;
use std::fs;
use std::path::Path;

/// Seed URLs from a file, one per line.
///
/// Blank lines and lines starting with `#` are skipped. Entries are returned
/// raw; normalization happens when the run prepares its seeds.
pub fn read_seed_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let seeds = parse_seed_list(&contents);
    ::log::info!("Loaded {} seed line(s) from {}", seeds.len(), path.display());
    Ok(seeds)
}

pub fn parse_seed_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
