//! Data-file loading: format detection (RON/JSON/TOML), file discovery,
//! and conversion of raw schema rows into technology declarations.

use std::path::{Path, PathBuf};

use armada_core::id::{CapabilityId, SpecId};
use armada_core::spec::SpecError;
use armada_tech::{TechDeclaration, TreePosition, Unlock};
use serde::de::DeserializeOwned;

use crate::schema::{TechData, UnlockData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An unlock entry names an invalid key (e.g. a sentinel component).
    #[error("invalid unlock in {file} for technology '{tech}': {source}")]
    InvalidUnlock {
        file: PathBuf,
        tech: String,
        source: SpecError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without
/// extension). Returns `Ok(None)` if no file is found, or
/// `Err(ConflictingFormats)` if multiple formats exist for the same base
/// name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from
/// extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at
/// the given `toml_key` from a top-level table. For RON and JSON,
/// deserializes directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Technology loading
// ===========================================================================

/// Base name of the technology data file (`technologies.{ron,toml,json}`).
pub const TECHNOLOGIES_FILE: &str = "technologies";

fn into_declaration(data: TechData, file: &Path) -> Result<TechDeclaration, DataLoadError> {
    let mut unlocks = Vec::with_capacity(data.unlocks.len());
    for unlock in data.unlocks {
        let unlock = match unlock {
            UnlockData::Equipment { category, level } => SpecId::new(category, level)
                .map(Unlock::Equipment),
            UnlockData::Capability { capability, level } => CapabilityId::new(capability, level)
                .map(Unlock::Capability),
        }
        .map_err(|source| DataLoadError::InvalidUnlock {
            file: file.to_path_buf(),
            tech: data.name.clone(),
            source,
        })?;
        unlocks.push(unlock);
    }
    Ok(TechDeclaration {
        name: data.name,
        description: data.description,
        image: data.image,
        research_cost: data.research_cost,
        prerequisites: data.prerequisites,
        unlocks,
        position: TreePosition {
            row: data.row,
            column: data.column,
        },
        future_tech: data.future_tech,
    })
}

/// Load every technology declaration from `technologies.{ron,toml,json}`
/// in the given directory. Name resolution and cycle detection happen
/// later, in the graph builder.
pub fn load_tech_declarations(dir: &Path) -> Result<Vec<TechDeclaration>, DataLoadError> {
    let path = require_data_file(dir, TECHNOLOGIES_FILE)?;
    let rows: Vec<TechData> = deserialize_list(&path, TECHNOLOGIES_FILE)?;
    rows.into_iter()
        .map(|row| into_declaration(row, &path))
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "armada_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const RON_TECHS: &str = r#"[
    (name: "Magnetics", research_cost: 100),
    (
        name: "Coilguns",
        research_cost: 250,
        prerequisites: ["Magnetics"],
        unlocks: [equipment(category: projectile_weapon, level: one)],
    ),
]"#;

    const JSON_TECHS: &str = r#"[
    {"name": "Magnetics", "research_cost": 100},
    {
        "name": "Coilguns",
        "research_cost": 250,
        "prerequisites": ["Magnetics"],
        "unlocks": [{"equipment": {"category": "projectile_weapon", "level": "one"}}]
    }
]"#;

    const TOML_TECHS: &str = r#"
[[technologies]]
name = "Magnetics"
research_cost = 100

[[technologies]]
name = "Coilguns"
research_cost = 250
prerequisites = ["Magnetics"]
unlocks = [{ equipment = { category = "projectile_weapon", level = "one" } }]
"#;

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("t.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("t.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("t.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        assert!(matches!(
            detect_format(Path::new("t.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("t")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // find_data_file / require_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found() {
        let dir = make_test_dir("find");
        fs::write(dir.join("technologies.ron"), "[]").unwrap();
        let result = find_data_file(&dir, "technologies").unwrap();
        assert_eq!(result, Some(dir.join("technologies.ron")));
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_missing() {
        let dir = make_test_dir("find_missing");
        assert_eq!(find_data_file(&dir, "technologies").unwrap(), None);
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("technologies.ron"), "[]").unwrap();
        fs::write(dir.join("technologies.json"), "[]").unwrap();
        assert!(matches!(
            find_data_file(&dir, "technologies"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require_missing");
        assert!(matches!(
            require_data_file(&dir, "technologies"),
            Err(DataLoadError::MissingRequired { .. })
        ));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_tech_declarations, one test per format
    // -----------------------------------------------------------------------

    fn assert_loaded(decls: &[TechDeclaration]) {
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "Magnetics");
        assert_eq!(decls[1].name, "Coilguns");
        assert_eq!(decls[1].prerequisites, vec!["Magnetics".to_string()]);
        assert_eq!(decls[1].unlocks.len(), 1);
    }

    #[test]
    fn load_from_ron() {
        let dir = make_test_dir("load_ron");
        fs::write(dir.join("technologies.ron"), RON_TECHS).unwrap();
        let decls = load_tech_declarations(&dir).unwrap();
        assert_loaded(&decls);
        cleanup(&dir);
    }

    #[test]
    fn load_from_json() {
        let dir = make_test_dir("load_json");
        fs::write(dir.join("technologies.json"), JSON_TECHS).unwrap();
        let decls = load_tech_declarations(&dir).unwrap();
        assert_loaded(&decls);
        cleanup(&dir);
    }

    #[test]
    fn load_from_toml() {
        let dir = make_test_dir("load_toml");
        fs::write(dir.join("technologies.toml"), TOML_TECHS).unwrap();
        let decls = load_tech_declarations(&dir).unwrap();
        assert_loaded(&decls);
        cleanup(&dir);
    }

    #[test]
    fn toml_wrapper_deserializes_whole_file() {
        let dir = make_test_dir("toml_wrapper");
        let path = dir.join("technologies.toml");
        fs::write(&path, TOML_TECHS).unwrap();
        let wrapper: crate::schema::TomlTechs = deserialize_file(&path).unwrap();
        assert_eq!(wrapper.technologies.len(), 2);
        assert_eq!(wrapper.technologies[0].name, "Magnetics");
        cleanup(&dir);
    }

    #[test]
    fn parse_error_reports_the_file() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("technologies.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();
        match load_tech_declarations(&dir) {
            Err(DataLoadError::Parse { file, .. }) => assert_eq!(file, path),
            other => panic!("expected parse error, got {other:?}"),
        }
        cleanup(&dir);
    }

    #[test]
    fn sentinel_unlock_components_are_rejected() {
        let dir = make_test_dir("bad_unlock");
        fs::write(
            dir.join("technologies.json"),
            r#"[{
                "name": "Broken",
                "research_cost": 100,
                "unlocks": [{"equipment": {"category": "none", "level": "one"}}]
            }]"#,
        )
        .unwrap();
        match load_tech_declarations(&dir) {
            Err(DataLoadError::InvalidUnlock { tech, .. }) => assert_eq!(tech, "Broken"),
            other => panic!("expected invalid unlock, got {other:?}"),
        }
        cleanup(&dir);
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let dir = make_test_dir("defaults");
        fs::write(
            dir.join("technologies.json"),
            r#"[{"name": "Magnetics", "research_cost": 100}]"#,
        )
        .unwrap();
        let decls = load_tech_declarations(&dir).unwrap();
        assert!(decls[0].prerequisites.is_empty());
        assert!(decls[0].unlocks.is_empty());
        assert!(!decls[0].future_tech);
        cleanup(&dir);
    }
}
