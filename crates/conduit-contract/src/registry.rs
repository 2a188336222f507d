// crates/conduit-contract/src/registry.rs
// ============================================================================
// Module: Schema Registry
// Description: Loads, caches, and validates Capability input/output schemas.
// Purpose: Give the Task Extractor a capability lookup and the Agent Invoker /
//          Gate Runner a single validate-by-identifier call.
// Dependencies: jsonschema, serde_json, conduit-core
// ============================================================================

//! ## Overview
//! Capabilities are immutable for the life of a Run (data model invariant),
//! so compiled schema validators are built once, at registration, and reused
//! for every task bound to that capability. A validator is kept for both the
//! input and output schema since the two are checked at different points in
//! the pipeline (§4.5 input validation, §4.6 gate 1 output validation).

use std::collections::BTreeMap;

use conduit_core::Capability;
use conduit_core::ids::CapabilityId;
use jsonschema::Validator;
use serde_json::Value;

/// Errors raised while registering or querying capabilities.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A capability with this identifier is already registered.
    #[error("capability already registered: {0}")]
    AlreadyRegistered(CapabilityId),
    /// No capability is registered under this identifier.
    #[error("unknown capability: {0}")]
    Unknown(CapabilityId),
    /// The capability's declared schema failed to compile.
    #[error("invalid schema for capability `{capability_id}`: {message}")]
    InvalidSchema {
        /// Capability whose schema failed to compile.
        capability_id: CapabilityId,
        /// Compiler error message.
        message: String,
    },
}

struct CompiledCapability {
    capability: Capability,
    input_validator: Validator,
    output_validator: Validator,
}

/// Caches capabilities and their compiled schema validators by identifier.
///
/// # Invariants
/// - Capability identifiers are unique within the registry.
/// - Once registered, a capability's schemas are never recompiled; the
///   registry must be rebuilt (a new `SchemaRegistry`) to pick up a change.
#[derive(Default)]
pub struct SchemaRegistry {
    capabilities: BTreeMap<CapabilityId, CompiledCapability>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { capabilities: BTreeMap::new() }
    }

    /// Registers a capability, compiling its input and output schemas.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if the identifier is
    /// already present, or [`RegistryError::InvalidSchema`] if either schema
    /// fails to compile.
    pub fn register(&mut self, capability: Capability) -> Result<(), RegistryError> {
        if self.capabilities.contains_key(&capability.id) {
            return Err(RegistryError::AlreadyRegistered(capability.id.clone()));
        }
        let input_validator =
            compile(&capability.id, &capability.input_schema)?;
        let output_validator =
            compile(&capability.id, &capability.output_schema)?;
        self.capabilities
            .insert(capability.id.clone(), CompiledCapability { capability, input_validator, output_validator });
        Ok(())
    }

    /// Returns the capability declaration for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unknown`] if no capability is registered under `id`.
    pub fn get(&self, id: &CapabilityId) -> Result<&Capability, RegistryError> {
        self.capabilities
            .get(id)
            .map(|entry| &entry.capability)
            .ok_or_else(|| RegistryError::Unknown(id.clone()))
    }

    /// Returns true when a capability is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &CapabilityId) -> bool {
        self.capabilities.contains_key(id)
    }

    /// Validates `value` against the capability's input schema, returning the
    /// validator's error messages (empty on success).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unknown`] if `id` is not registered.
    pub fn validate_input(&self, id: &CapabilityId, value: &Value) -> Result<Vec<String>, RegistryError> {
        let entry = self.capabilities.get(id).ok_or_else(|| RegistryError::Unknown(id.clone()))?;
        Ok(collect_errors(&entry.input_validator, value))
    }

    /// Validates `value` against the capability's output schema, returning
    /// the validator's error messages (empty on success).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unknown`] if `id` is not registered.
    pub fn validate_output(&self, id: &CapabilityId, value: &Value) -> Result<Vec<String>, RegistryError> {
        let entry = self.capabilities.get(id).ok_or_else(|| RegistryError::Unknown(id.clone()))?;
        Ok(collect_errors(&entry.output_validator, value))
    }
}

fn compile(capability_id: &CapabilityId, schema: &Value) -> Result<Validator, RegistryError> {
    jsonschema::validator_for(schema).map_err(|err| RegistryError::InvalidSchema {
        capability_id: capability_id.clone(),
        message: err.to_string(),
    })
}

fn collect_errors(validator: &Validator, value: &Value) -> Vec<String> {
    validator.iter_errors(value).map(|err| err.to_string()).collect()
}
