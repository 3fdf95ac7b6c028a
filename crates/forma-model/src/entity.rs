//! Blueprint-domain entities.
//!
//! Dynamic core (`Entity` with schema-validated slots) plus typed wrappers
//! for each kind. The wrappers route every assignment through `Entity::set`,
//! so descriptor validation is exercised even when the Rust types already
//! line up. Ownership is tree-shaped: children are moved in, never shared.

use std::collections::BTreeMap;

use forma_error::{Error, Result};
use strum_macros::Display;

use crate::descriptor::{Descriptor, SlotType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Substrate,
    Service,
    Deployment,
    Profile,
    Blueprint,
}

const SUBSTRATE_SCHEMA: &[Descriptor] = &[Descriptor::new("payload", SlotType::Text)];

const SERVICE_SCHEMA: &[Descriptor] = &[Descriptor::new("payload", SlotType::Text)];

const DEPLOYMENT_SCHEMA: &[Descriptor] = &[
    Descriptor::new("services", SlotType::List(EntityKind::Service)),
    Descriptor::new("substrate", SlotType::Entity(EntityKind::Substrate)),
];

const PROFILE_SCHEMA: &[Descriptor] =
    &[Descriptor::new("deployments", SlotType::List(EntityKind::Deployment))];

const BLUEPRINT_SCHEMA: &[Descriptor] =
    &[Descriptor::new("profiles", SlotType::List(EntityKind::Profile))];

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Substrate => "substrate",
            EntityKind::Service => "service",
            EntityKind::Deployment => "deployment",
            EntityKind::Profile => "profile",
            EntityKind::Blueprint => "blueprint",
        }
    }

    /// The descriptor schema for this kind. Bound once, immutable.
    pub fn schema(&self) -> &'static [Descriptor] {
        match self {
            EntityKind::Substrate => SUBSTRATE_SCHEMA,
            EntityKind::Service => SERVICE_SCHEMA,
            EntityKind::Deployment => DEPLOYMENT_SCHEMA,
            EntityKind::Profile => PROFILE_SCHEMA,
            EntityKind::Blueprint => BLUEPRINT_SCHEMA,
        }
    }
}

/// A value stored in an entity slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Text(String),
    Entity(Entity),
    List(Vec<SlotValue>),
}

impl SlotValue {
    /// Human-readable description used in mismatch errors.
    pub fn describe(&self) -> String {
        match self {
            SlotValue::Text(_) => "text".to_string(),
            SlotValue::Entity(e) => format!("a {} entity", e.kind().as_str()),
            SlotValue::List(_) => "a list".to_string(),
        }
    }

    /// Wrap entities into a list slot value.
    pub fn entities(items: Vec<Entity>) -> Self {
        SlotValue::List(items.into_iter().map(SlotValue::Entity).collect())
    }
}

impl From<&str> for SlotValue {
    fn from(value: &str) -> Self {
        SlotValue::Text(value.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(value: String) -> Self {
        SlotValue::Text(value)
    }
}

impl From<Entity> for SlotValue {
    fn from(value: Entity) -> Self {
        SlotValue::Entity(value)
    }
}

/// A descriptor-backed entity: kind, name, and validated slots.
///
/// Entities are introspected read-only after construction; the normalizer
/// never mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    name: String,
    slots: BTreeMap<&'static str, SlotValue>,
}

impl Entity {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            slots: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assign a slot, validating against the kind's schema. Fails
    /// immediately on unknown fields and on type mismatches.
    pub fn set(&mut self, field: &str, value: SlotValue) -> Result<()> {
        let descriptor = self
            .kind
            .schema()
            .iter()
            .find(|d| d.field == field)
            .ok_or_else(|| {
                Error::unknown_field(self.kind.as_str(), field).with_operation("entity::set")
            })?;
        descriptor.check(&value)?;
        self.slots.insert(descriptor.field, value);
        Ok(())
    }

    /// Read a slot back.
    pub fn get(&self, field: &str) -> Option<&SlotValue> {
        self.slots.get(field)
    }

    /// Error unless every field in the schema has been assigned.
    pub fn require_complete(&self) -> Result<()> {
        for descriptor in self.kind.schema() {
            if !self.slots.contains_key(descriptor.field) {
                return Err(Error::missing_field(self.kind.as_str(), descriptor.field)
                    .with_operation("entity::require_complete"));
            }
        }
        Ok(())
    }
}

/// Leaf entity: a provisioning target with an opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Substrate(Entity);

impl Substrate {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Result<Self> {
        let mut entity = Entity::new(EntityKind::Substrate, name);
        entity.set("payload", SlotValue::Text(payload.into()))?;
        Ok(Self(entity))
    }

    pub fn entity(&self) -> &Entity {
        &self.0
    }

    pub fn into_entity(self) -> Entity {
        self.0
    }
}

/// Leaf entity: a deployable unit with an opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Service(Entity);

impl Service {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Result<Self> {
        let mut entity = Entity::new(EntityKind::Service, name);
        entity.set("payload", SlotValue::Text(payload.into()))?;
        Ok(Self(entity))
    }

    pub fn entity(&self) -> &Entity {
        &self.0
    }

    pub fn into_entity(self) -> Entity {
        self.0
    }
}

/// Owns exactly one substrate and an ordered list of services.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment(Entity);

impl Deployment {
    pub fn new(
        name: impl Into<String>,
        substrate: Substrate,
        services: Vec<Service>,
    ) -> Result<Self> {
        let mut entity = Entity::new(EntityKind::Deployment, name);
        entity.set("substrate", SlotValue::Entity(substrate.into_entity()))?;
        entity.set(
            "services",
            SlotValue::entities(services.into_iter().map(Service::into_entity).collect()),
        )?;
        Ok(Self(entity))
    }

    pub fn entity(&self) -> &Entity {
        &self.0
    }

    pub fn into_entity(self) -> Entity {
        self.0
    }
}

/// Owns an ordered list of deployments.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile(Entity);

impl Profile {
    pub fn new(name: impl Into<String>, deployments: Vec<Deployment>) -> Result<Self> {
        let mut entity = Entity::new(EntityKind::Profile, name);
        entity.set(
            "deployments",
            SlotValue::entities(
                deployments
                    .into_iter()
                    .map(Deployment::into_entity)
                    .collect(),
            ),
        )?;
        Ok(Self(entity))
    }

    pub fn entity(&self) -> &Entity {
        &self.0
    }

    pub fn into_entity(self) -> Entity {
        self.0
    }
}

/// Root of the blueprint tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint(Entity);

impl Blueprint {
    pub fn new(name: impl Into<String>, profiles: Vec<Profile>) -> Result<Self> {
        let mut entity = Entity::new(EntityKind::Blueprint, name);
        entity.set(
            "profiles",
            SlotValue::entities(profiles.into_iter().map(Profile::into_entity).collect()),
        )?;
        Ok(Self(entity))
    }

    pub fn entity(&self) -> &Entity {
        &self.0
    }

    pub fn into_entity(self) -> Entity {
        self.0
    }
}
