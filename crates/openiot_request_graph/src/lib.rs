// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed node graph model for `OpenIoT` request definition.
//!
//! An operator composes an IoT application as a graph of sensor sources,
//! filters, comparators, aggregators and presentation sinks. This crate
//! provides:
//! - Typed endpoints with direction, capacity and scope compatibility
//! - A graph model that checks every connection as it is made
//! - Whole-graph validation (cycles, required endpoints, orphans)
//! - Deterministic specification generation
//! - The node palette, sensor catalog and per-session design state
//!
//! ## Architecture
//!
//! The model is edited incrementally and is allowed to be globally invalid
//! between edits. [`Validator`] is run on demand, and [`Generator`] runs it
//! again before emitting anything.

pub mod builtin;
pub mod catalog;
pub mod document;
pub mod edge;
pub mod endpoint;
pub mod error;
pub mod generate;
pub mod graph;
pub mod node;
pub mod registry;
pub mod scope;
pub mod session;
pub mod traversal;
pub mod validation;

pub use document::GraphDocument;
pub use edge::Edge;
pub use endpoint::{Capacity, Endpoint, EndpointDirection, EndpointId};
pub use error::{GraphError, Reference};
pub use generate::{generate, GenerateError, Generator, Specification};
pub use graph::GraphModel;
pub use node::{GraphNode, NodeId, PropertyValue};
pub use registry::{NodeRegistry, NodeTemplate};
pub use session::DesignSession;
pub use validation::{Diagnostic, DiagnosticCode, Severity, ValidationReport, Validator};
