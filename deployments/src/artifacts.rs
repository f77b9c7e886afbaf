//! Reading compiled contract artifacts and linking their library placeholders

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use alloy::json_abi::JsonAbi;
use alloy_primitives::{hex, Address, Bytes};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ARTIFACT_EXTENSION, HEX_PREFIX, NUM_BYTES_ADDRESS},
    errors::DeployError,
    types::Libraries,
};

/// The placeholders of each library, grouped by the source file that
/// declares the library
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

/// The position of a library placeholder, in bytes of the decoded bytecode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOffset {
    /// The offset of the first byte of the placeholder
    pub start: usize,
    /// The length of the placeholder
    pub length: usize,
}

/// A compiled contract, as written by the build into the artifacts directory
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// The name of the contract
    pub contract_name: String,
    /// The contract interface
    pub abi: JsonAbi,
    /// The hex-encoded creation bytecode, possibly containing library placeholders
    pub bytecode: String,
    /// The library placeholders within `bytecode`
    #[serde(default)]
    pub link_references: LinkReferences,
}

impl Artifact {
    /// Parse an artifact from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, DeployError> {
        serde_json::from_str(json).map_err(|e| DeployError::ArtifactParsing(e.to_string()))
    }

    /// The names of the libraries the bytecode must be linked against
    pub fn library_names(&self) -> Vec<String> {
        self.link_references
            .values()
            .flat_map(|libraries| libraries.keys())
            .unique()
            .cloned()
            .collect()
    }

    /// Whether the bytecode references any library
    pub fn needs_linking(&self) -> bool {
        self.link_references.values().any(|libraries| !libraries.is_empty())
    }

    /// The creation bytecode linked against the given libraries
    pub fn linked_bytecode(&self, libraries: &Libraries) -> Result<Bytes, DeployError> {
        decode_bytecode(&link_bytecode(self, libraries)?)
    }
}

/// Splice library addresses into every placeholder of the artifact's bytecode.
///
/// Libraries absent from `libraries` are left as placeholders. Bytecode
/// without link references is returned unchanged.
pub fn link_bytecode(artifact: &Artifact, libraries: &Libraries) -> Result<String, DeployError> {
    let mut bytecode = artifact.bytecode.clone();
    let prefix_len = if bytecode.starts_with(HEX_PREFIX) {
        HEX_PREFIX.len()
    } else {
        0
    };

    for (lib_name, offsets) in artifact.link_references.values().flatten() {
        let Some(address) = libraries.get(lib_name) else {
            continue;
        };
        let address_hex = address_placeholder_fill(*address);

        for offset in offsets {
            if offset.length != NUM_BYTES_ADDRESS {
                return Err(DeployError::Linking(format!(
                    "placeholder for {} in {} is {} bytes long",
                    lib_name, artifact.contract_name, offset.length
                )));
            }

            let range = offset
                .start
                .checked_mul(2)
                .and_then(|start| start.checked_add(prefix_len))
                .and_then(|start| Some(start..start.checked_add(offset.length * 2)?))
                .filter(|range| bytecode.get(range.clone()).is_some());
            let Some(range) = range else {
                return Err(DeployError::Linking(format!(
                    "placeholder for {} lies outside the bytecode of {}",
                    lib_name, artifact.contract_name
                )));
            };
            bytecode.replace_range(range, &address_hex);
        }
    }

    Ok(bytecode)
}

/// Decode hex bytecode, reporting the first unresolved library placeholder
pub fn decode_bytecode(bytecode: &str) -> Result<Bytes, DeployError> {
    if let Some(position) = bytecode.find("__") {
        let placeholder: String = bytecode[position..].chars().take(40).collect();
        return Err(DeployError::Linking(format!(
            "unresolved library placeholder {}",
            placeholder
        )));
    }

    hex::decode(bytecode)
        .map(Bytes::from)
        .map_err(|e| DeployError::ArtifactParsing(e.to_string()))
}

/// Format an address as it appears in linked bytecode
pub fn address_placeholder_fill(address: Address) -> String {
    hex::encode(address.as_slice())
}

// ---------------------
// | Artifact Provider |
// ---------------------

/// A source of compiled contract artifacts
pub trait ArtifactProvider {
    /// Load the artifact of the named contract
    fn load_artifact(&self, name: &str) -> Result<Artifact, DeployError>;
}

/// Artifacts read from a build output directory.
///
/// The directory is searched recursively for `<name>.json`, which matches the
/// `build/contracts/<source>.sol/<name>.json` layout of a hardhat build.
#[derive(Clone, Debug)]
pub struct BuildDirArtifacts {
    /// The root of the build output
    build_dir: PathBuf,
}

impl BuildDirArtifacts {
    /// Read artifacts from the given build directory
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }
}

impl ArtifactProvider for BuildDirArtifacts {
    fn load_artifact(&self, name: &str) -> Result<Artifact, DeployError> {
        let file_name = format!("{}.{}", name, ARTIFACT_EXTENSION);
        let path = find_file(&self.build_dir, &file_name)
            .map_err(|e| DeployError::ArtifactNotFound(format!("{}: {}", name, e)))?
            .ok_or_else(|| {
                DeployError::ArtifactNotFound(format!(
                    "{} in {}",
                    name,
                    self.build_dir.display()
                ))
            })?;

        let json = fs::read_to_string(&path)
            .map_err(|e| DeployError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
        Artifact::from_json(&json)
    }
}

/// Depth-first search for a file name below `dir`
fn find_file(dir: &Path, file_name: &str) -> io::Result<Option<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().is_some_and(|f| f == file_name) {
            return Ok(Some(path));
        }
    }

    for subdir in subdirs {
        if let Some(path) = find_file(&subdir, file_name)? {
            return Ok(Some(path));
        }
    }
    Ok(None)
}
