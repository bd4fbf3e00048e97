//! On-disk descriptor shapes and their normalization.
//!
//! Three schema revisions exist in the wild:
//! - `v1` stores absolute third-party paths (deprecated, still accepted)
//! - `v2` derives third-party paths from the module location
//! - `v3` adds module include paths and `[[when]]` conditional blocks
//!
//! Each file is parsed into a `DescriptorShape` and normalized into a
//! `ModuleDescriptor` here, so nothing downstream branches on the revision.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::module::{
    ConditionalRules, DescriptorError, ModuleDescriptor, RuleSet, SchemaVersion, TargetFilter,
};
use crate::core::target::{Configuration, Platform};
use crate::core::third_party::{ThirdPartyLibrary, ThirdPartyRoot};

/// Keys only the legacy revision understands.
const V1_ONLY_KEYS: &[&str] = &["third_party_path"];

/// Keys only the extended revision understands.
const V3_ONLY_KEYS: &[&str] = &["public_include_paths", "private_include_paths", "when"];

const V2_FORBIDDEN_KEYS: &[&str] = &[
    "third_party_path",
    "public_include_paths",
    "private_include_paths",
    "when",
];

/// Fields shared by every revision.
#[derive(Debug, Clone, Deserialize)]
pub struct CommonFields {
    pub name: String,
    #[serde(default)]
    pub public_dependencies: Vec<String>,
    #[serde(default)]
    pub private_dependencies: Vec<String>,
    #[serde(default)]
    pub private_include_path_modules: Vec<String>,
    #[serde(default)]
    pub public_additional_libraries: Vec<PathBuf>,
}

/// A `[[third_party]]` entry as written.
#[derive(Debug, Clone, Deserialize)]
pub struct RawThirdParty {
    pub name: String,
    #[serde(default = "default_include_dir")]
    pub include: PathBuf,
    #[serde(default = "default_lib_dir")]
    pub lib: PathBuf,
    pub binary: String,
    #[serde(default)]
    pub debug_binary: Option<String>,
    /// Stored root, legacy only
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_include_dir() -> PathBuf {
    PathBuf::from("include")
}

fn default_lib_dir() -> PathBuf {
    PathBuf::from("lib")
}

impl RawThirdParty {
    fn into_library(self, root: ThirdPartyRoot) -> ThirdPartyLibrary {
        ThirdPartyLibrary {
            name: self.name,
            root,
            include_dir: self.include,
            lib_dir: self.lib,
            binary: self.binary,
            debug_binary: self.debug_binary,
        }
    }
}

/// Schema `v1`.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyShape {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(default)]
    pub third_party_path: Option<PathBuf>,
    #[serde(default)]
    pub third_party: Vec<RawThirdParty>,
}

/// Schema `v2`.
#[derive(Debug, Clone, Deserialize)]
pub struct DerivedShape {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(default)]
    pub third_party: Vec<RawThirdParty>,
}

/// A `[[when]]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConditional {
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub configuration: Option<Configuration>,
    #[serde(default)]
    pub public_dependencies: Vec<String>,
    #[serde(default)]
    pub private_dependencies: Vec<String>,
    #[serde(default)]
    pub public_include_paths: Vec<PathBuf>,
    #[serde(default)]
    pub private_include_paths: Vec<PathBuf>,
    #[serde(default)]
    pub public_additional_libraries: Vec<PathBuf>,
    #[serde(default)]
    pub third_party: Vec<RawThirdParty>,
}

/// Schema `v3`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtendedShape {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(default)]
    pub third_party: Vec<RawThirdParty>,
    #[serde(default)]
    pub public_include_paths: Vec<PathBuf>,
    #[serde(default)]
    pub private_include_paths: Vec<PathBuf>,
    #[serde(default, rename = "when")]
    pub conditionals: Vec<RawConditional>,
}

/// A parsed descriptor, tagged by revision.
#[derive(Debug, Clone)]
pub enum DescriptorShape {
    V1(LegacyShape),
    V2(DerivedShape),
    V3(ExtendedShape),
}

impl DescriptorShape {
    /// Parse descriptor text. `path` is used for error messages only.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, DescriptorError> {
        let parse_err = |message: String| DescriptorError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let table: toml::Table = toml::from_str(contents).map_err(|e| parse_err(e.to_string()))?;
        let schema = match table.get("schema") {
            Some(value) => schema_from_value(value).ok_or_else(|| {
                parse_err(format!("unknown schema `{}`; expected v1, v2, or v3", value))
            })?,
            None => infer_schema(&table),
        };

        let name = table
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let forbidden: &[&'static str] = match schema {
            SchemaVersion::V1 => V3_ONLY_KEYS,
            SchemaVersion::V2 => V2_FORBIDDEN_KEYS,
            SchemaVersion::V3 => V1_ONLY_KEYS,
        };
        if let Some(&field) = forbidden.iter().find(|k| table.contains_key(**k)) {
            return Err(DescriptorError::UnsupportedField {
                module: name,
                schema,
                field,
            });
        }

        let value = toml::Value::Table(table);
        let shape = match schema {
            SchemaVersion::V1 => value.try_into().map(DescriptorShape::V1),
            SchemaVersion::V2 => value.try_into().map(DescriptorShape::V2),
            SchemaVersion::V3 => value.try_into().map(DescriptorShape::V3),
        };
        shape.map_err(|e| parse_err(e.to_string()))
    }

    pub fn schema(&self) -> SchemaVersion {
        match self {
            DescriptorShape::V1(_) => SchemaVersion::V1,
            DescriptorShape::V2(_) => SchemaVersion::V2,
            DescriptorShape::V3(_) => SchemaVersion::V3,
        }
    }

    fn name(&self) -> &str {
        match self {
            DescriptorShape::V1(s) => &s.common.name,
            DescriptorShape::V2(s) => &s.common.name,
            DescriptorShape::V3(s) => &s.common.name,
        }
    }
}

fn schema_from_value(value: &toml::Value) -> Option<SchemaVersion> {
    match value {
        toml::Value::Integer(1) => Some(SchemaVersion::V1),
        toml::Value::Integer(2) => Some(SchemaVersion::V2),
        toml::Value::Integer(3) => Some(SchemaVersion::V3),
        toml::Value::String(s) => match s.to_lowercase().trim_start_matches('v') {
            "1" => Some(SchemaVersion::V1),
            "2" => Some(SchemaVersion::V2),
            "3" => Some(SchemaVersion::V3),
            _ => None,
        },
        _ => None,
    }
}

/// Guess the revision of a descriptor with no `schema` key.
fn infer_schema(table: &toml::Table) -> SchemaVersion {
    let has_stored_path = table.contains_key("third_party_path")
        || table
            .get("third_party")
            .and_then(|v| v.as_array())
            .is_some_and(|libs| {
                libs.iter()
                    .any(|lib| lib.as_table().is_some_and(|t| t.contains_key("path")))
            });

    if has_stored_path {
        SchemaVersion::V1
    } else if V3_ONLY_KEYS.iter().any(|k| table.contains_key(*k)) {
        SchemaVersion::V3
    } else {
        SchemaVersion::V2
    }
}

fn common_rules(common: CommonFields) -> RuleSet {
    RuleSet {
        public_dependencies: common.public_dependencies,
        private_dependencies: common.private_dependencies,
        private_include_path_modules: common.private_include_path_modules,
        additional_libraries: common.public_additional_libraries,
        ..Default::default()
    }
}

fn derived_libraries(
    module: &str,
    schema: SchemaVersion,
    libs: Vec<RawThirdParty>,
) -> Result<Vec<ThirdPartyLibrary>, DescriptorError> {
    libs.into_iter()
        .map(|lib| {
            if lib.path.is_some() {
                return Err(DescriptorError::UnsupportedField {
                    module: module.to_string(),
                    schema,
                    field: "third_party.path",
                });
            }
            Ok(lib.into_library(ThirdPartyRoot::Derived))
        })
        .collect()
}

impl ModuleDescriptor {
    /// Normalize a parsed descriptor for a module located in `location`.
    ///
    /// This is the single construction entry point for on-disk descriptors.
    pub fn from_shape(
        shape: DescriptorShape,
        location: impl Into<PathBuf>,
    ) -> Result<Self, DescriptorError> {
        let schema = shape.schema();
        let name = shape.name().to_string();

        let (base, conditionals) = match shape {
            DescriptorShape::V1(shape) => {
                let shared_root = shape.third_party_path;
                let mut base = common_rules(shape.common);
                for lib in shape.third_party {
                    let root = match lib.path.clone().or_else(|| shared_root.clone()) {
                        Some(root) => root,
                        None => {
                            return Err(DescriptorError::MissingLegacyPath {
                                module: name,
                                library: lib.name,
                            })
                        }
                    };
                    base.third_party.push(lib.into_library(ThirdPartyRoot::Legacy(root)));
                }
                (base, Vec::new())
            }
            DescriptorShape::V2(shape) => {
                let mut base = common_rules(shape.common);
                base.third_party = derived_libraries(&name, schema, shape.third_party)?;
                (base, Vec::new())
            }
            DescriptorShape::V3(shape) => {
                let mut base = common_rules(shape.common);
                base.third_party = derived_libraries(&name, schema, shape.third_party)?;
                base.public_include_paths = shape.public_include_paths;
                base.private_include_paths = shape.private_include_paths;

                let conditionals = shape
                    .conditionals
                    .into_iter()
                    .map(|cond| {
                        Ok(ConditionalRules {
                            filter: TargetFilter {
                                platform: cond.platform,
                                configuration: cond.configuration,
                            },
                            rules: RuleSet {
                                public_dependencies: cond.public_dependencies,
                                private_dependencies: cond.private_dependencies,
                                public_include_paths: cond.public_include_paths,
                                private_include_paths: cond.private_include_paths,
                                private_include_path_modules: Vec::new(),
                                additional_libraries: cond.public_additional_libraries,
                                third_party: derived_libraries(&name, schema, cond.third_party)?,
                            },
                        })
                    })
                    .collect::<Result<Vec<_>, DescriptorError>>()?;
                (base, conditionals)
            }
        };

        ModuleDescriptor::from_parts(name, location, schema, base, conditionals)
    }
}

/// Parse descriptor text found at `path`.
///
/// The module location is the directory containing the descriptor.
pub fn parse_descriptor(contents: &str, path: &Path) -> Result<ModuleDescriptor, DescriptorError> {
    let shape = DescriptorShape::parse(contents, path)?;
    let location = path.parent().unwrap_or(Path::new("")).to_path_buf();
    ModuleDescriptor::from_shape(shape, location)
}

/// Read and parse a descriptor file.
pub fn load_descriptor(path: &Path) -> Result<ModuleDescriptor, DescriptorError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_descriptor(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::TargetInfo;

    const LEGACY: &str = r#"
name = "GameAlpha"
public_dependencies = ["Core", "CoreUObject", "Engine", "InputCore"]
private_dependencies = ["CustomMeshComponent"]
private_include_path_modules = ["CustomMeshComponent"]
third_party_path = "/work/GameAlpha/Source/ThirdParty/LibNoise"

[[third_party]]
name = "LibNoise"
include = "src"
lib = "lib"
binary = "libnoise.lib"
"#;

    const DERIVED: &str = r#"
name = "GameAlpha"
public_dependencies = ["Core", "CoreUObject", "Engine", "InputCore"]
private_dependencies = ["CustomMeshComponent"]
private_include_path_modules = ["CustomMeshComponent"]

[[third_party]]
name = "LibNoise"
include = "src"
binary = "libnoise.lib"
"#;

    const EXTENDED: &str = r#"
schema = "v3"
name = "GameAlpha"
public_dependencies = ["Core", "Engine"]
public_include_paths = ["Public", "Grid"]
private_include_paths = ["Private"]

[[third_party]]
name = "LibNoise"
include = "src"
binary = "noise"

[[when]]
platform = "win64"
private_dependencies = ["D3D12RHI"]
"#;

    fn descriptor_path() -> PathBuf {
        PathBuf::from("/work/GameAlpha/Source/GameAlpha/GameAlpha.module.toml")
    }

    #[test]
    fn test_legacy_shape_is_inferred() {
        let descriptor = parse_descriptor(LEGACY, &descriptor_path()).unwrap();
        assert_eq!(descriptor.schema(), SchemaVersion::V1);
        assert_eq!(descriptor.location(), Path::new("/work/GameAlpha/Source/GameAlpha"));

        let lib = &descriptor.base().third_party[0];
        assert_eq!(
            lib.root,
            ThirdPartyRoot::Legacy(PathBuf::from("/work/GameAlpha/Source/ThirdParty/LibNoise"))
        );
        assert_eq!(lib.include_dir, PathBuf::from("src"));
    }

    #[test]
    fn test_derived_shape_is_inferred() {
        let descriptor = parse_descriptor(DERIVED, &descriptor_path()).unwrap();
        assert_eq!(descriptor.schema(), SchemaVersion::V2);
        assert_eq!(descriptor.base().third_party[0].root, ThirdPartyRoot::Derived);
        assert_eq!(descriptor.base().third_party[0].lib_dir, PathBuf::from("lib"));
        assert_eq!(
            descriptor.base().private_include_path_modules,
            vec!["CustomMeshComponent".to_string()]
        );
    }

    #[test]
    fn test_shapes_normalize_to_same_dependencies() {
        let legacy = parse_descriptor(LEGACY, &descriptor_path()).unwrap();
        let derived = parse_descriptor(DERIVED, &descriptor_path()).unwrap();
        assert_eq!(
            legacy.base().public_dependencies,
            derived.base().public_dependencies
        );
        assert_eq!(
            legacy.base().private_dependencies,
            derived.base().private_dependencies
        );
    }

    #[test]
    fn test_extended_shape_with_conditionals() {
        let descriptor = parse_descriptor(EXTENDED, &descriptor_path()).unwrap();
        assert_eq!(descriptor.schema(), SchemaVersion::V3);
        assert_eq!(descriptor.conditionals().len(), 1);

        let win: TargetInfo = "win64-development".parse().unwrap();
        let rules = descriptor.rules_for(&win);
        assert_eq!(rules.private_dependencies(), ["D3D12RHI"]);
        assert_eq!(
            rules.public_include_paths(),
            [PathBuf::from("Public"), PathBuf::from("Grid")]
        );
    }

    #[test]
    fn test_integer_schema_key() {
        let text = format!("schema = 2\n{}", DERIVED);
        let descriptor = parse_descriptor(&text, &descriptor_path()).unwrap();
        assert_eq!(descriptor.schema(), SchemaVersion::V2);
    }

    #[test]
    fn test_stored_path_rejected_in_derived_schema() {
        let text = format!("schema = \"v2\"\n{}", LEGACY);
        let err = parse_descriptor(&text, &descriptor_path()).unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::UnsupportedField { field: "third_party_path", .. }
        ));
    }

    #[test]
    fn test_legacy_library_without_path_rejected() {
        let text = r#"
schema = 1
name = "GameAlpha"

[[third_party]]
name = "LibNoise"
binary = "libnoise.lib"
"#;
        let err = parse_descriptor(text, &descriptor_path()).unwrap_err();
        assert!(matches!(err, DescriptorError::MissingLegacyPath { .. }));
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let text = format!("schema = \"v9\"\n{}", DERIVED);
        let err = parse_descriptor(&text, &descriptor_path()).unwrap_err();
        assert!(matches!(err, DescriptorError::Parse { .. }));
    }

    #[test]
    fn test_load_descriptor_missing_file() {
        let err = load_descriptor(Path::new("/nonexistent/Nope.module.toml")).unwrap_err();
        assert!(matches!(err, DescriptorError::Io { .. }));
    }
}
