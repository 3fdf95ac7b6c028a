//! forma-model: the descriptor-validated blueprint entity model.
//!
//! A blueprint is a tree: `Blueprint` owns profiles, a `Profile` owns
//! deployments, a `Deployment` owns exactly one substrate and an ordered list
//! of services. Every slot assignment is validated against the owning kind's
//! descriptor schema at the moment of assignment - fail fast, never coerce.
//!
//! Entity construction goes through an explicit builder; attaching an
//! [`ExportSink`] to the builder is the opt-in channel for normalized
//! setup-source export (there is no implicit side effect at definition time).

pub mod builder;
pub mod descriptor;
pub mod entity;

pub use builder::{build_entity, CollectSink, EntityBuilder, ExportSink, WriteSink};
pub use descriptor::{Descriptor, SlotType};
pub use entity::{Blueprint, Deployment, Entity, EntityKind, Profile, Service, SlotValue, Substrate};
pub use forma_error::{Error, ErrorKind, Result};
