//! State kept alive across a code reload.
//!
//! The blob handed to the host is a tagged JSON record. Each schema revision
//! gets its own tag; older records are migrated field by field into the
//! current layout, with fields that did not exist yet taking their defaults.
//! A record from a newer revision cannot be read back and is rejected.

use quadgrid_core::QuadCorners;
use serde::{Deserialize, Serialize};

use crate::{DragState, ViewState};

/// Schema revision written by this build.
pub const CURRENT_SCHEMA: u32 = 2;

#[derive(thiserror::Error, Debug)]
pub enum StateBlobError {
    #[error("state blob is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("state blob has no schema tag")]
    MissingSchema,

    #[error("unrecognized state schema tag {0:?}")]
    UnknownSchema(String),

    #[error("state schema v{found} is newer than supported v{supported}")]
    NewerSchema { found: u32, supported: u32 },

    #[error("state blob does not match schema v{schema}: {source}")]
    Layout {
        schema: u32,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state blob: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Calibration and view state that survives reloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RetainedState {
    pub corners: QuadCorners,
    pub view: ViewState,
    pub drag: DragState,
}

/// First revision: corners only.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RetainedStateV1 {
    corners: QuadCorners,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "schema")]
enum Versioned {
    #[serde(rename = "v1")]
    V1(RetainedStateV1),
    #[serde(rename = "v2")]
    V2(RetainedState),
}

impl Versioned {
    fn schema(&self) -> u32 {
        match self {
            Versioned::V1(_) => 1,
            Versioned::V2(_) => 2,
        }
    }

    fn into_current(self) -> RetainedState {
        match self {
            Versioned::V1(v1) => RetainedState {
                corners: v1.corners,
                ..RetainedState::default()
            },
            Versioned::V2(v2) => v2,
        }
    }
}

/// Opaque handle the host keeps while the code is swapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBlob {
    bytes: Vec<u8>,
}

impl StateBlob {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl RetainedState {
    /// Encode with the current schema tag.
    pub fn to_blob(&self) -> Result<StateBlob, StateBlobError> {
        let bytes = serde_json::to_vec(&Versioned::V2(*self)).map_err(StateBlobError::Encode)?;
        Ok(StateBlob { bytes })
    }

    /// Decode a blob of this or any older schema.
    pub fn from_blob(blob: &StateBlob) -> Result<Self, StateBlobError> {
        let value: serde_json::Value =
            serde_json::from_slice(&blob.bytes).map_err(StateBlobError::Malformed)?;
        let tag = value
            .get("schema")
            .and_then(|t| t.as_str())
            .ok_or(StateBlobError::MissingSchema)?;
        let schema = parse_schema_tag(tag)?;
        if schema > CURRENT_SCHEMA {
            return Err(StateBlobError::NewerSchema {
                found: schema,
                supported: CURRENT_SCHEMA,
            });
        }

        let versioned: Versioned = serde_json::from_value(value)
            .map_err(|source| StateBlobError::Layout { schema, source })?;
        if versioned.schema() < CURRENT_SCHEMA {
            log::info!(
                "Migrating retained state schema v{} -> v{}",
                versioned.schema(),
                CURRENT_SCHEMA
            );
        }
        Ok(versioned.into_current())
    }
}

fn parse_schema_tag(tag: &str) -> Result<u32, StateBlobError> {
    tag.strip_prefix('v')
        .and_then(|n| n.parse::<u32>().ok())
        .filter(|&n| n > 0)
        .ok_or_else(|| StateBlobError::UnknownSchema(tag.to_string()))
}
