//! Compiled contract artifacts and the networks they get deployed to.
pub mod artifacts;
pub mod networks;

pub use artifacts::{Artifact, ArtifactError, Artifacts, ContractFactory};
