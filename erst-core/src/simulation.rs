//! Simulator wire types
//!
//! The simulator is a separate process that reads one JSON request on stdin
//! and prints one JSON response on stdout. All XDR payloads are base64 text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request handed to the simulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub envelope_xdr: String,
    pub result_meta_xdr: String,
    /// Ledger key XDR -> ledger entry XDR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_entries: Option<HashMap<String, String>>,
}

/// Response printed by the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub status: String,
    pub error: Option<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl SimulationResponse {
    pub const STATUS_SUCCESS: &'static str = "success";
    pub const STATUS_ERROR: &'static str = "error";

    /// Whether the simulator reported success
    pub fn is_success(&self) -> bool {
        self.status == Self::STATUS_SUCCESS
    }
}
