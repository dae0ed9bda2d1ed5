//! Loading of compiled contract artifacts as written by hardhat
//! (`hh-sol-artifact-1`) and resolution of contract names to factories that
//! produce deployment bytecode.

use {
    alloy::{
        json_abi::JsonAbi,
        primitives::{Bytes, hex::FromHexError},
    },
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        fs,
        path::{Path, PathBuf},
        str::FromStr,
    },
};

const ARTIFACT_FORMAT_PREFIX: &str = "hh-sol-artifact";
const BUILD_INFO_DIR: &str = "build-info";
const DEBUG_FILE_SUFFIX: &str = ".dbg.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifacts from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact for contract {name} not found")]
    ContractNotFound { name: String },
    #[error(
        "multiple artifacts for contract {name}, use one of the fully qualified names: {}",
        candidates.join(", ")
    )]
    AmbiguousContractName {
        name: String,
        candidates: Vec<String>,
    },
    #[error("{name} is abstract or an interface and can't be deployed")]
    NotDeployable { name: String },
    #[error("{name} must be linked against {} before it can be deployed", libraries.join(", "))]
    UnlinkedLibraries {
        name: String,
        libraries: Vec<String>,
    },
    #[error("the constructor of {name} expects {inputs} argument(s) but none are passed")]
    ConstructorArguments { name: String, inputs: usize },
    #[error("{name} has malformed bytecode")]
    InvalidBytecode {
        name: String,
        #[source]
        source: FromHexError,
    },
}

/// A single compiled contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "_format")]
    pub format: String,
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    /// Creation bytecode. Kept as text because unlinked bytecode contains
    /// library placeholders that are not valid hex.
    pub bytecode: String,
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl Artifact {
    /// `path/To.sol:Name`, unique across a compilation.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }
}

/// All artifacts of a compilation.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    artifacts: Vec<Artifact>,
}

impl Artifacts {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self { artifacts }
    }

    /// Recursively reads every artifact below `dir`. Debug files and build
    /// info are skipped, as are JSON files that are not contract artifacts.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let mut artifacts = Vec::new();
        collect(dir, &mut artifacts)?;
        tracing::debug!(dir = %dir.display(), count = artifacts.len(), "loaded contract artifacts");
        Ok(Self::new(artifacts))
    }

    /// Resolves a contract either by its bare name or by its fully qualified
    /// name.
    pub fn find(&self, name: &str) -> Result<&Artifact, ArtifactError> {
        let matches: Vec<_> = if name.contains(':') {
            self.artifacts
                .iter()
                .filter(|artifact| artifact.fully_qualified_name() == name)
                .collect()
        } else {
            self.artifacts
                .iter()
                .filter(|artifact| artifact.contract_name == name)
                .collect()
        };

        match matches.as_slice() {
            [] => Err(ArtifactError::ContractNotFound {
                name: name.to_string(),
            }),
            [artifact] => Ok(*artifact),
            _ => {
                let mut candidates: Vec<_> = matches
                    .iter()
                    .map(|artifact| artifact.fully_qualified_name())
                    .collect();
                candidates.sort();
                Err(ArtifactError::AmbiguousContractName {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }

    pub fn contract_factory(&self, name: &str) -> Result<ContractFactory, ArtifactError> {
        ContractFactory::new(self.find(name)?)
    }
}

fn collect(dir: &Path, artifacts: &mut Vec<Artifact>) -> Result<(), ArtifactError> {
    let io_error = |source: std::io::Error| ArtifactError::Io {
        path: dir.to_owned(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == BUILD_INFO_DIR) {
                continue;
            }
            collect(&path, artifacts)?;
        } else if is_artifact_file(&path) {
            let data = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
                path: path.clone(),
                source,
            })?;
            match serde_json::from_str::<Artifact>(&data) {
                Ok(artifact) if artifact.format.starts_with(ARTIFACT_FORMAT_PREFIX) => {
                    artifacts.push(artifact)
                }
                Ok(artifact) => {
                    tracing::debug!(path = %path.display(), format = %artifact.format, "skipping artifact with unknown format")
                }
                Err(err) => {
                    tracing::debug!(path = %path.display(), ?err, "skipping file that is not a contract artifact")
                }
            }
        }
    }
    Ok(())
}

fn is_artifact_file(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == "json")
        && !path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(DEBUG_FILE_SUFFIX))
}

/// Bound to one deployable artifact. Produces the creation code of a
/// deployment without constructor arguments.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    contract_name: String,
    fully_qualified_name: String,
    abi: JsonAbi,
    creation_code: Bytes,
}

impl ContractFactory {
    pub fn new(artifact: &Artifact) -> Result<Self, ArtifactError> {
        let name = &artifact.contract_name;

        if !artifact.link_references.is_empty() {
            let libraries = artifact
                .link_references
                .iter()
                .flat_map(|(source, libraries)| {
                    libraries.keys().map(move |library| format!("{source}:{library}"))
                })
                .collect();
            return Err(ArtifactError::UnlinkedLibraries {
                name: name.clone(),
                libraries,
            });
        }

        let creation_code =
            Bytes::from_str(&artifact.bytecode).map_err(|source| ArtifactError::InvalidBytecode {
                name: name.clone(),
                source,
            })?;
        if creation_code.is_empty() {
            return Err(ArtifactError::NotDeployable { name: name.clone() });
        }

        let inputs = artifact
            .abi
            .constructor
            .as_ref()
            .map_or(0, |constructor| constructor.inputs.len());
        if inputs > 0 {
            return Err(ArtifactError::ConstructorArguments {
                name: name.clone(),
                inputs,
            });
        }

        Ok(Self {
            contract_name: name.clone(),
            fully_qualified_name: artifact.fully_qualified_name(),
            abi: artifact.abi.clone(),
            creation_code,
        })
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn fully_qualified_name(&self) -> &str {
        &self.fully_qualified_name
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Consumes the factory, a factory initiates exactly one deployment.
    pub fn into_creation_code(self) -> Bytes {
        self.creation_code
    }
}
