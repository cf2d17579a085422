use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Path, PathBuf};

/// Drop repeated items, keeping the first occurrence of each
pub fn dedupe_preserve_order<T>(items: impl IntoIterator<Item = T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// The same path with its extension replaced, e.g. `out.json` -> `out.csv`
pub fn sibling_path(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}
