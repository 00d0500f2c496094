use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File extensions the catalog picks up.
const MODEL_EXTENSIONS: &[&str] = &["glb", "gltf"];

/// A single model asset available for viewing.
#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
    /// Human-readable name derived from the file name
    pub display_name: String,
    /// Bare file name, used as the asset identifier
    pub file_name: String,
    /// Full path used for loading
    #[serde(skip)]
    pub path: PathBuf,
}

/// The set of model assets found in a directory, in file-name order.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<ModelEntry>,
}

impl Catalog {
    /// Scan a directory for model files (.glb/.gltf)
    pub fn scan(dir: &Path) -> io::Result<Self> {
        let mut entries = Vec::new();

        for dir_entry in fs::read_dir(dir)? {
            let path = dir_entry?.path();
            if !path.is_file() {
                continue;
            }

            let Some(extension) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            if !MODEL_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };

            entries.push(ModelEntry {
                display_name: display_name(file_name),
                file_name: file_name.to_string(),
                path: path.clone(),
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        Ok(Self { entries })
    }

    /// Build a catalog from already-constructed entries (catalog order preserved)
    pub fn from_entries(entries: Vec<ModelEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ModelEntry> {
        self.entries.get(index)
    }

    /// Case-insensitive substring filter against display name OR file name,
    /// preserving catalog order. An empty filter matches everything.
    /// Returns each match with its index into the full catalog.
    pub fn filter_indexed(&self, text: &str) -> Vec<(usize, &ModelEntry)> {
        let needle = text.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                needle.is_empty()
                    || entry.display_name.to_lowercase().contains(&needle)
                    || entry.file_name.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Filtered view without indices
    pub fn filter(&self, text: &str) -> Vec<&ModelEntry> {
        self.filter_indexed(text)
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }
}

/// Derive a display name from a model file name: strip the extension,
/// replace separators with spaces, and uppercase the first letter of each
/// word. The case of the remaining letters is preserved.
pub fn display_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);

    stem.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file_name: &str) -> ModelEntry {
        ModelEntry {
            display_name: display_name(file_name),
            file_name: file_name.to_string(),
            path: PathBuf::from(file_name),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::from_entries(vec![
            entry("ancient-temple.glb"),
            entry("ROBOT_arm.gltf"),
            entry("space_station.glb"),
            entry("teapot.glb"),
        ])
    }

    #[test]
    fn test_display_name_separators_and_capitals() {
        assert_eq!(display_name("ancient-temple.glb"), "Ancient Temple");
        assert_eq!(display_name("ROBOT_arm.gltf"), "ROBOT Arm");
        assert_eq!(display_name("teapot.glb"), "Teapot");
    }

    #[test]
    fn test_display_name_strips_only_final_extension() {
        assert_eq!(display_name("temple.v2.glb"), "Temple.v2");
        assert_eq!(display_name("no_extension"), "No Extension");
    }

    #[test]
    fn test_display_name_collapses_empty_words() {
        assert_eq!(display_name("a--b.glb"), "A B");
        assert_eq!(display_name("_leading.glb"), "Leading");
    }

    #[test]
    fn test_filter_matches_display_name_or_file_name() {
        let catalog = sample_catalog();

        // "temple" hits only the display name; "gltf" hits only the file name
        let by_name: Vec<_> = catalog.filter("temple").iter().map(|e| e.file_name.clone()).collect();
        assert_eq!(by_name, vec!["ancient-temple.glb"]);

        let by_file: Vec<_> = catalog.filter("gltf").iter().map(|e| e.file_name.clone()).collect();
        assert_eq!(by_file, vec!["ROBOT_arm.gltf"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let catalog = sample_catalog();
        assert_eq!(catalog.filter("ROBOT").len(), 1);
        assert_eq!(catalog.filter("robot").len(), 1);
        assert_eq!(catalog.filter("RoBoT").len(), 1);
    }

    #[test]
    fn test_filter_preserves_catalog_order() {
        let catalog = sample_catalog();
        let all: Vec<_> = catalog.filter("").iter().map(|e| e.file_name.clone()).collect();
        assert_eq!(
            all,
            vec![
                "ancient-temple.glb",
                "ROBOT_arm.gltf",
                "space_station.glb",
                "teapot.glb"
            ]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let catalog = sample_catalog();
        let once: Vec<ModelEntry> = catalog.filter("a").into_iter().cloned().collect();
        let refiltered = Catalog::from_entries(once.clone());
        let twice: Vec<ModelEntry> = refiltered.filter("a").into_iter().cloned().collect();
        assert_eq!(
            once.iter().map(|e| &e.file_name).collect::<Vec<_>>(),
            twice.iter().map(|e| &e.file_name).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_filter_no_results_on_nonempty_catalog() {
        let catalog = sample_catalog();
        assert!(catalog.filter("zzzz").is_empty());
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_filter_indexed_reports_catalog_indices() {
        let catalog = sample_catalog();
        let hits = catalog.filter_indexed("glb");
        let indices: Vec<usize> = hits.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }
}
