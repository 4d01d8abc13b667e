//! Opaque, analysis-specific payloads exchanged with the executor.
//!
//! [`Input`], [`Output`] and [`JobMeta`] wrap a JSON document together
//! with the [`AnalysisKind`] it belongs to. The binding core never looks
//! inside them; only the executor and the final consumer do.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analysis::AnalysisKind;

/// Content digest of a payload, scoped to its analysis kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash {
    bytes: [u8; 16],
}

impl Hash {
    pub fn compute(analysis: AnalysisKind, json: &serde_json::Value) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(analysis.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(json.to_string().as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self { bytes }
    }

    pub fn hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Shape on the wire: the hash is always recomputed locally.
#[derive(Deserialize)]
struct Payload {
    analysis: AnalysisKind,
    json: serde_json::Value,
}

/// The value a job is run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Payload")]
pub struct Input {
    analysis: AnalysisKind,
    json: Arc<serde_json::Value>,
    #[serde(skip_serializing)]
    hash: Hash,
}

/// The value a successful job produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Payload")]
pub struct Output {
    analysis: AnalysisKind,
    json: Arc<serde_json::Value>,
    #[serde(skip_serializing)]
    hash: Hash,
}

/// Job-scoped metadata returned alongside a job id at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMeta {
    analysis: AnalysisKind,
    json: Arc<serde_json::Value>,
}

impl From<Payload> for Input {
    fn from(p: Payload) -> Self {
        Self::from_json(p.analysis, p.json)
    }
}

impl From<Payload> for Output {
    fn from(p: Payload) -> Self {
        Self::from_json(p.analysis, p.json)
    }
}

impl Input {
    pub fn new<T: Serialize>(analysis: AnalysisKind, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::from_json(analysis, serde_json::to_value(data)?))
    }

    pub fn from_json(analysis: AnalysisKind, json: serde_json::Value) -> Self {
        let hash = Hash::compute(analysis, &json);
        Self {
            analysis,
            json: Arc::new(json),
            hash,
        }
    }

    pub fn analysis(&self) -> AnalysisKind {
        self.analysis
    }

    pub fn json(&self) -> Arc<serde_json::Value> {
        Arc::clone(&self.json)
    }

    pub fn data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value((*self.json).clone())
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }
}

impl Output {
    pub fn new<T: Serialize>(analysis: AnalysisKind, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::from_json(analysis, serde_json::to_value(data)?))
    }

    pub fn from_json(analysis: AnalysisKind, json: serde_json::Value) -> Self {
        let hash = Hash::compute(analysis, &json);
        Self {
            analysis,
            json: Arc::new(json),
            hash,
        }
    }

    pub fn analysis(&self) -> AnalysisKind {
        self.analysis
    }

    pub fn json(&self) -> Arc<serde_json::Value> {
        Arc::clone(&self.json)
    }

    pub fn data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value((*self.json).clone())
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }
}

impl JobMeta {
    pub fn from_json(analysis: AnalysisKind, json: serde_json::Value) -> Self {
        Self {
            analysis,
            json: Arc::new(json),
        }
    }

    pub fn analysis(&self) -> AnalysisKind {
        self.analysis
    }

    pub fn json(&self) -> Arc<serde_json::Value> {
        Arc::clone(&self.json)
    }

    pub fn data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value((*self.json).clone())
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.json.fmt(f)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.json.fmt(f)
    }
}

impl fmt::Display for JobMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.json.fmt(f)
    }
}
