// Loaders for run inputs: ground truth, class hierarchy and pipeline config
use crate::format::{read_matchings, FIELD_SEPARATOR};
use semprop_core::{Error, OntologyClass, PipelineConfig, Result};
use semprop_engine::{GroundTruth, StaticHierarchy};
use std::fs;
use std::path::Path;
use tracing::info;

/// Load a ground truth file. Any malformed line rejects the whole file.
pub fn load_ground_truth<P: AsRef<Path>>(path: P) -> Result<GroundTruth> {
    let path = path.as_ref();
    let ground_truth: GroundTruth = read_matchings(path)?.into_iter().collect();
    info!(path = %path.display(), matchings = ground_truth.len(), "loaded ground truth");
    Ok(ground_truth)
}

/// Parse a class hierarchy document.
///
/// One edge per line: `ontology %%% child %%% parent`. Blank lines and lines
/// starting with `#` are skipped.
pub fn parse_hierarchy(source_name: &str, content: &str) -> Result<StaticHierarchy> {
    let mut hierarchy = StaticHierarchy::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split(FIELD_SEPARATOR).map(str::trim).collect();
        match fields.as_slice() {
            [onto, child, parent] if [onto, child, parent].iter().all(|f| !f.is_empty()) => {
                hierarchy.insert(
                    OntologyClass::new(*onto, *child),
                    OntologyClass::new(*onto, *parent),
                );
            }
            _ => {
                return Err(Error::DataFormat {
                    source_name: source_name.to_string(),
                    line: i + 1,
                    reason: "expected 'ontology %%% child %%% parent'".to_string(),
                })
            }
        }
    }
    Ok(hierarchy)
}

pub fn load_hierarchy<P: AsRef<Path>>(path: P) -> Result<StaticHierarchy> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let hierarchy = parse_hierarchy(&path.display().to_string(), &content)?;
    info!(path = %path.display(), edges = hierarchy.len(), "loaded class hierarchy");
    Ok(hierarchy)
}

/// Load and validate a JSON pipeline config. Absent keys take defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path.as_ref())?;
    let mut config: PipelineConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
