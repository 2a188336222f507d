// crates/conduit-contract/src/lib.rs
// ============================================================================
// Module: Conduit Contract
// Description: The Schema Registry and capability contract document types.
// Purpose: Cache compiled JSON Schemas per Capability and validate values against them.
// Dependencies: conduit-core, jsonschema, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate owns the one piece of the data model §9's design notes call
//! out explicitly: "schema-driven validation where the schema is a data
//! value ... and is cached by Capability identifier." `conduit-core` carries
//! the schema as an opaque `serde_json::Value` on [`conduit_core::Capability`];
//! this crate compiles and caches it with `jsonschema` and exposes the
//! validate-by-identifier call the Agent Invoker and Gate Runner both need.

#![deny(missing_docs)]

pub mod document;
pub mod registry;

pub use document::CapabilityContract;
pub use document::CheckContract;
pub use document::DeterminismClass;
pub use registry::RegistryError;
pub use registry::SchemaRegistry;
