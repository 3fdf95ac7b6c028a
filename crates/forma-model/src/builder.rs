//! Explicit entity build step with opt-in setup-source export.
//!
//! Export is a caller-controlled step, never a definition-time hook: attach
//! setup-source fragments and an [`ExportSink`] to the builder, and `build()`
//! normalizes each fragment and delivers the pretty-printed document to the
//! sink. No sink, no side channel.

use std::io::Write;

use forma_core::{dedent, Normalizer, ParsedSource};
use forma_error::Result;
use tracing::debug;

use crate::entity::{Entity, EntityKind, SlotValue};

/// Receiver for exported normalized documents.
pub trait ExportSink {
    /// Deliver one normalized document, identified by entity and member name.
    fn export(&mut self, entity: &str, member: &str, json: &str) -> Result<()>;
}

/// Accumulates exported documents in memory. Mostly for tests and tooling.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub docs: Vec<(String, String, String)>,
}

impl ExportSink for CollectSink {
    fn export(&mut self, entity: &str, member: &str, json: &str) -> Result<()> {
        self.docs
            .push((entity.to_string(), member.to_string(), json.to_string()));
        Ok(())
    }
}

/// Streams exported documents to any writer, one per line header.
pub struct WriteSink<W: Write> {
    writer: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExportSink for WriteSink<W> {
    fn export(&mut self, entity: &str, member: &str, json: &str) -> Result<()> {
        writeln!(self.writer, "// {}::{}", entity, member)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }
}

/// A constructor-style source fragment attached to an entity member.
#[derive(Debug, Clone)]
pub struct SetupSource {
    pub member: String,
    pub source: String,
}

/// Assembles one entity slot by slot, validating each assignment as it is
/// made.
pub struct EntityBuilder<'s> {
    entity: Entity,
    setups: Vec<SetupSource>,
    sink: Option<&'s mut dyn ExportSink>,
}

/// Start building an entity of the given kind.
pub fn build_entity(kind: EntityKind, name: impl Into<String>) -> EntityBuilder<'static> {
    EntityBuilder {
        entity: Entity::new(kind, name),
        setups: Vec::new(),
        sink: None,
    }
}

impl<'s> EntityBuilder<'s> {
    /// Assign a slot. Validation is immediate - a mismatch fails the whole
    /// build right here, not at `build()`.
    pub fn slot(mut self, field: &str, value: impl Into<SlotValue>) -> Result<Self> {
        self.entity.set(field, value.into())?;
        Ok(self)
    }

    /// Attach a constructor-style source fragment to a member name.
    pub fn setup(mut self, member: impl Into<String>, source: impl Into<String>) -> Self {
        self.setups.push(SetupSource {
            member: member.into(),
            source: source.into(),
        });
        self
    }

    /// Install the export channel for attached setup sources.
    pub fn sink<'n>(self, sink: &'n mut dyn ExportSink) -> EntityBuilder<'n> {
        EntityBuilder {
            entity: self.entity,
            setups: self.setups,
            sink: Some(sink),
        }
    }

    /// Finish the entity. Requires every schema field to be assigned; with a
    /// sink installed, each setup fragment is dedented, parsed, normalized,
    /// and exported. Export failures propagate - they are not swallowed.
    pub fn build(mut self) -> Result<Entity> {
        self.entity.require_complete()?;

        if let Some(sink) = self.sink.take() {
            for setup in &self.setups {
                let flush = dedent(&setup.source);
                let parsed = ParsedSource::parse(flush)?;
                let doc = Normalizer::new(&parsed).normalize()?;
                let json = doc.to_json(true)?;
                sink.export(self.entity.name(), &setup.member, &json)?;
            }
        }

        debug!(
            kind = self.entity.kind().as_str(),
            name = self.entity.name(),
            setups = self.setups.len(),
            "entity built"
        );
        Ok(self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_sink_has_no_side_channel() {
        let entity = build_entity(EntityKind::Service, "web")
            .slot("payload", "image: nginx")
            .unwrap()
            .setup("__init__", "def __init__(self): self.x = 1\n")
            .build()
            .unwrap();
        assert_eq!(entity.name(), "web");
    }

    #[test]
    fn test_build_exports_to_sink() {
        let mut sink = CollectSink::default();
        let entity = build_entity(EntityKind::Service, "web")
            .slot("payload", "image: nginx")
            .unwrap()
            .setup(
                "__init__",
                "    def __init__(self):\n        self.x = 1  # set x\n",
            )
            .sink(&mut sink)
            .build()
            .unwrap();

        assert_eq!(entity.kind(), EntityKind::Service);
        assert_eq!(sink.docs.len(), 1);
        let (entity_name, member, json) = &sink.docs[0];
        assert_eq!(entity_name, "web");
        assert_eq!(member, "__init__");
        assert!(json.contains("\"function_definition\""));
        assert!(json.contains("# set x"));
    }

    #[test]
    fn test_incomplete_entity_fails_build() {
        let err = build_entity(EntityKind::Deployment, "d").build().unwrap_err();
        assert_eq!(err.kind(), forma_error::ErrorKind::MissingField);
    }

    #[test]
    fn test_bad_slot_fails_immediately() {
        let result = build_entity(EntityKind::Deployment, "d").slot("substrate", "not an entity");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_setup_source_fails_build() {
        let mut sink = CollectSink::default();
        let err = build_entity(EntityKind::Service, "web")
            .slot("payload", "x")
            .unwrap()
            .setup("__init__", "def broken(:\n")
            .sink(&mut sink)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), forma_error::ErrorKind::SyntaxError);
    }
}
