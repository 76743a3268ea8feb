//! # Study Data Structures
//!
//! The `Study` struct groups the circuits of one installation with the
//! engineer's metadata and the code profile they are all checked under.
//! Studies serialize to human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Study
//! ├── meta: StudyMetadata (version, engineer, job info, timestamps)
//! ├── profile: CodeProfile (policy options, defaults when omitted)
//! └── circuits: HashMap<Uuid, CalculationInput>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use circuit_core::calculations::CalculationInput;
//! use circuit_core::study::Study;
//!
//! let mut study = Study::new("Jane Engineer", "25-042", "ACME Corp")
//!     .with_title("Guard House");
//! study.add_circuit(CalculationInput::example());
//!
//! let json = study.to_json().unwrap();
//! let loaded = Study::from_json(&json).unwrap();
//! assert_eq!(loaded.circuit_count(), 1);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculations::{evaluate, CalculationInput, Evaluation};
use crate::errors::CalcResult;
use crate::nec_factors::CodeProfile;

/// Current schema version for study files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root study container.
///
/// Circuits are stored in a flat UUID-keyed map; [`Study::circuits_sorted`]
/// gives the stable order reports use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Study {
    /// Study metadata (version, engineer, job info)
    pub meta: StudyMetadata,

    /// Policy options for every circuit in the study
    #[serde(default)]
    pub profile: CodeProfile,

    /// All circuits, keyed by UUID
    #[serde(default)]
    pub circuits: HashMap<Uuid, CalculationInput>,
}

impl Study {
    /// Create a new empty study.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Name of the responsible engineer
    /// * `job_id` - Job/project number (e.g., "25-001")
    /// * `client` - Client name
    ///
    /// # Example
    ///
    /// ```rust
    /// use circuit_core::study::Study;
    ///
    /// let study = Study::new("John Doe", "25-001", "Client Corp");
    /// assert_eq!(study.meta.engineer, "John Doe");
    /// ```
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Study {
            meta: StudyMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                project_title: String::new(),
                created: now,
                modified: now,
            },
            profile: CodeProfile::default(),
            circuits: HashMap::new(),
        }
    }

    /// Set the project title shown in report headers
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.project_title = title.into();
        self
    }

    /// Set the code profile
    pub fn with_profile(mut self, profile: CodeProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Add a circuit to the study.
    ///
    /// Returns the UUID assigned to the circuit.
    pub fn add_circuit(&mut self, circuit: CalculationInput) -> Uuid {
        let id = Uuid::new_v4();
        self.circuits.insert(id, circuit);
        self.touch();
        id
    }

    /// Remove a circuit by UUID.
    pub fn remove_circuit(&mut self, id: &Uuid) -> Option<CalculationInput> {
        let circuit = self.circuits.remove(id);
        if circuit.is_some() {
            self.touch();
        }
        circuit
    }

    /// Get a circuit by UUID.
    pub fn get_circuit(&self, id: &Uuid) -> Option<&CalculationInput> {
        self.circuits.get(id)
    }

    /// Get a mutable reference to a circuit by UUID.
    ///
    /// Marks the study as modified when the circuit exists.
    pub fn get_circuit_mut(&mut self, id: &Uuid) -> Option<&mut CalculationInput> {
        if self.circuits.contains_key(id) {
            self.meta.modified = Utc::now();
            self.circuits.get_mut(id)
        } else {
            None
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn circuit_count(&self) -> usize {
        self.circuits.len()
    }

    /// Circuits ordered by label, then UUID, for deterministic reports
    pub fn circuits_sorted(&self) -> Vec<(&Uuid, &CalculationInput)> {
        let mut circuits: Vec<_> = self.circuits.iter().collect();
        circuits.sort_by(|a, b| a.1.label.cmp(&b.1.label).then(a.0.cmp(b.0)));
        circuits
    }

    /// Evaluate every circuit under the study profile, in report order.
    ///
    /// Stops at the first circuit whose input is rejected.
    pub fn evaluate_all(&self) -> CalcResult<Vec<(Uuid, Evaluation)>> {
        self.circuits_sorted()
            .into_iter()
            .map(|(id, circuit)| {
                debug!(%id, label = %circuit.label, "evaluating circuit");
                evaluate(circuit, &self.profile).map(|evaluation| (*id, evaluation))
            })
            .collect()
    }

    /// Parse a study from JSON
    pub fn from_json(json: &str) -> CalcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for Study {
    fn default() -> Self {
        Study::new("", "", "")
    }
}

/// Study metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// Project title (e.g., "Guard House / North Plant")
    #[serde(default)]
    pub project_title: String,

    /// When the study was created
    pub created: DateTime<Utc>,

    /// When the study was last modified
    pub modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec_factors::{DropVerdictPolicy, KFactorMode};

    #[test]
    fn test_study_creation() {
        let study = Study::new("Test Engineer", "25-001", "Test Client").with_title("Guard House");
        assert_eq!(study.meta.engineer, "Test Engineer");
        assert_eq!(study.meta.job_id, "25-001");
        assert_eq!(study.meta.client, "Test Client");
        assert_eq!(study.meta.project_title, "Guard House");
        assert_eq!(study.meta.version, SCHEMA_VERSION);
        assert_eq!(study.profile, CodeProfile::default());
        assert_eq!(study.circuit_count(), 0);
    }

    #[test]
    fn test_study_serialization() {
        let mut study = Study::new("Engineer", "25-001", "Client")
            .with_profile(CodeProfile::new().with_k_factor(KFactorMode::Nec));
        let id = study.add_circuit(CalculationInput::example());

        let json = study.to_json().unwrap();
        let loaded = Study::from_json(&json).unwrap();

        assert_eq!(loaded.meta, study.meta);
        assert_eq!(loaded.profile.k_factor, KFactorMode::Nec);
        assert_eq!(loaded.get_circuit(&id), Some(&CalculationInput::example()));
    }

    #[test]
    fn test_add_remove_circuit() {
        let mut study = Study::default();
        let id = study.add_circuit(CalculationInput::example());
        assert_eq!(study.circuit_count(), 1);

        study.get_circuit_mut(&id).unwrap().label = "C-9".to_string();
        assert_eq!(study.get_circuit(&id).unwrap().label, "C-9");

        assert!(study.remove_circuit(&id).is_some());
        assert!(study.remove_circuit(&id).is_none());
        assert_eq!(study.circuit_count(), 0);
    }

    #[test]
    fn test_missing_profile_uses_defaults() {
        let json = r#"{
            "meta": {
                "version": "0.1.0",
                "engineer": "E",
                "job_id": "J",
                "client": "C",
                "created": "2025-01-01T00:00:00Z",
                "modified": "2025-01-01T00:00:00Z"
            }
        }"#;
        let study = Study::from_json(json).unwrap();
        assert_eq!(study.profile, CodeProfile::default());
        assert_eq!(study.meta.project_title, "");
        assert!(study.circuits.is_empty());
    }

    #[test]
    fn test_partial_profile() {
        let json = r#"{
            "meta": {
                "version": "0.1.0",
                "engineer": "E",
                "job_id": "J",
                "client": "C",
                "created": "2025-01-01T00:00:00Z",
                "modified": "2025-01-01T00:00:00Z"
            },
            "profile": { "drop_verdict": "Strict" }
        }"#;
        let study = Study::from_json(json).unwrap();
        assert_eq!(study.profile.drop_verdict, DropVerdictPolicy::Strict);
        assert_eq!(study.profile.thermal_constant, 105.0);
    }

    #[test]
    fn test_evaluate_all_sorted_by_label() {
        let mut study = Study::default();
        for label in ["C-3", "C-1", "C-2"] {
            let mut circuit = CalculationInput::example();
            circuit.label = label.to_string();
            study.add_circuit(circuit);
        }

        let evaluations = study.evaluate_all().unwrap();
        let labels: Vec<&str> = evaluations.iter().map(|(_, e)| e.input.label.as_str()).collect();
        assert_eq!(labels, vec!["C-1", "C-2", "C-3"]);
    }

    #[test]
    fn test_evaluate_all_propagates_errors() {
        let mut study = Study::default();
        let mut circuit = CalculationInput::example();
        circuit.service_voltage_v = 110.0;
        study.add_circuit(circuit);

        assert!(study.evaluate_all().is_err());
    }

    #[test]
    fn test_invalid_json() {
        let err = Study::from_json("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
