//! Typed attribute descriptors.
//!
//! A descriptor binds a field name to a slot type once, when the owning
//! kind's schema is defined; the binding is immutable thereafter. Assignment
//! checks run synchronously and a mismatch is an error naming the offending
//! value and the expected type - values are never silently coerced.

use forma_error::{Error, Result};

use crate::entity::{EntityKind, SlotValue};

/// The declared type of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotType {
    /// Opaque text payload.
    Text,
    /// Exactly one child entity of the given kind.
    Entity(EntityKind),
    /// An ordered list whose every element is an entity of the given kind.
    List(EntityKind),
}

impl SlotType {
    /// Human-readable description used in mismatch errors.
    pub fn describe(&self) -> String {
        match self {
            SlotType::Text => "text".to_string(),
            SlotType::Entity(kind) => format!("a {} entity", kind.as_str()),
            SlotType::List(kind) => format!("a list of {} entities", kind.as_str()),
        }
    }
}

/// A typed slot binding: field name plus declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub field: &'static str,
    pub ty: SlotType,
}

impl Descriptor {
    pub const fn new(field: &'static str, ty: SlotType) -> Self {
        Self { field, ty }
    }

    /// Validate a candidate value against the declared type.
    pub fn check(&self, value: &SlotValue) -> Result<()> {
        match (&self.ty, value) {
            (SlotType::Text, SlotValue::Text(_)) => Ok(()),
            (SlotType::Entity(kind), SlotValue::Entity(entity)) if entity.kind() == *kind => Ok(()),
            (SlotType::List(kind), SlotValue::List(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let ok = matches!(item, SlotValue::Entity(e) if e.kind() == *kind);
                    if !ok {
                        return Err(Error::type_mismatch(
                            self.field,
                            &self.ty.describe(),
                            &format!("{} at index {}", item.describe(), index),
                        )
                        .with_operation("descriptor::check"));
                    }
                }
                Ok(())
            }
            _ => Err(Error::type_mismatch(
                self.field,
                &self.ty.describe(),
                &value.describe(),
            )
            .with_operation("descriptor::check")),
        }
    }
}
