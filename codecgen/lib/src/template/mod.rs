//! Template engine seam and the built-in Java/C++ templates.
//!
//! The emitter never builds code itself. It asks a [`TemplateEngine`] to
//! render a [`TemplateId`] for a [`RenderContext`] and gets back a
//! [`RenderOutcome`]. A type the target language cannot map comes back as
//! [`RenderOutcome::UnsupportedType`] rather than an error.
//!
//! [`BuiltinTemplates`] renders through a [`CodeWriter`](crate::code_writer::CodeWriter).
//! Each rendering first resolves every field of a message into a
//! [`PlannedField`] (hook plus parameter name), split into the fixed-offset
//! section and the framed section. Any failed lookup aborts the artifact.

mod cpp;
mod java;

use std::collections::BTreeSet;

use strum::Display;
use tracing::trace;

use crate::classify::TypeRegistry;
use crate::error::CodecGenError;
use crate::lang::{Hook, Language, LanguageSupport, OpKind, TypeEnv, UnsupportedType};
use crate::model::{CustomType, Field, Message, Method};

/// Placeholder replaced by the content fingerprint when a file is written.
pub const CODEC_HASH_PLACEHOLDER: &str = "!codec_hash!";

/// The templates an engine can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TemplateId {
    /// A complete per-method codec file.
    MethodCodec,
    /// Declarations appended to a consolidated header.
    MethodCodecHeader,
    /// Definitions appended to a consolidated source file.
    MethodCodecSource,
    /// A complete custom-type codec file.
    CustomCodec,
    CustomCodecHeader,
    CustomCodecSource,
}

/// What a template renders.
#[derive(Debug, Clone, Copy)]
pub enum RenderContext<'a> {
    Method {
        service_name: &'a str,
        method: &'a Method,
    },
    Custom {
        codec: &'a CustomType,
    },
}

/// The result of rendering one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(String),
    /// The canonical name of the first type without a mapping.
    UnsupportedType(String),
}

impl From<Result<String, UnsupportedType>> for RenderOutcome {
    fn from(result: Result<String, UnsupportedType>) -> Self {
        match result {
            Ok(text) => RenderOutcome::Rendered(text),
            Err(UnsupportedType(type_name)) => RenderOutcome::UnsupportedType(type_name),
        }
    }
}

/// Renders codec artifacts.
pub trait TemplateEngine {
    /// ## Errors
    ///
    /// Returns [`CodecGenError::Render`] when the engine has no such template
    /// for the context. A missing type mapping is not an error.
    fn render(
        &self,
        template: TemplateId,
        context: &RenderContext<'_>,
    ) -> Result<RenderOutcome, CodecGenError>;
}

/// One field resolved against a mapping set.
#[derive(Debug, Clone)]
pub(crate) struct PlannedField<'a> {
    pub field: &'a Field,
    pub param: String,
    pub hook: Hook,
}

impl PlannedField<'_> {
    pub fn size(&self) -> usize {
        match self.hook.op.kind {
            OpKind::Fixed { size } => size,
            OpKind::Frames => 0,
        }
    }
}

/// A message's fields resolved for one direction.
#[derive(Debug, Clone)]
pub(crate) struct MessagePlan<'a> {
    /// Every field in declaration order.
    pub fields: Vec<PlannedField<'a>>,
    /// Indexes into `fields` of the fixed-offset section.
    pub fixed: Vec<usize>,
    /// Indexes into `fields` of the framed section.
    pub variable: Vec<usize>,
}

impl<'a> MessagePlan<'a> {
    pub fn fixed(&self) -> impl Iterator<Item = &PlannedField<'a>> {
        self.fixed.iter().map(|&i| &self.fields[i])
    }

    pub fn variable(&self) -> impl Iterator<Item = &PlannedField<'a>> {
        self.variable.iter().map(|&i| &self.fields[i])
    }

    pub fn initial_frame_size(&self) -> usize {
        self.fixed().map(PlannedField::size).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Encode,
    Decode,
}

/// Everything a language template reads besides the artifact itself.
pub(crate) struct Scope<'a> {
    pub support: &'a dyn LanguageSupport,
    pub env: TypeEnv<'a>,
    pub namespace: &'a str,
}

impl Scope<'_> {
    /// Resolves every field of a message.
    ///
    /// A fixed-length field must map to a fixed-offset operation and any
    /// other field to a framed one. A mismatch counts as a missing mapping.
    pub fn plan<'f>(
        &self,
        fields: &'f [Field],
        direction: Direction,
    ) -> Result<MessagePlan<'f>, UnsupportedType> {
        let (fixed, _) = self.env.registry.split_fixed_and_variable(fields);
        let mut plan = MessagePlan {
            fields: Vec::with_capacity(fields.len()),
            fixed: Vec::new(),
            variable: Vec::new(),
        };

        for (index, field) in fields.iter().enumerate() {
            let hook = match direction {
                Direction::Encode => self.support.encode_hook(&field.ty, &self.env)?,
                Direction::Decode => self.support.decode_hook(&field.ty, &self.env)?,
            };
            let is_fixed = fixed.iter().any(|f| std::ptr::eq(*f, field));
            if is_fixed != hook.op.is_fixed() {
                return Err(UnsupportedType::of(&field.ty));
            }
            if is_fixed {
                plan.fixed.push(index);
            } else {
                plan.variable.push(index);
            }
            plan.fields.push(PlannedField {
                field,
                param: self.support.param_name(&field.name),
                hook,
            });
        }

        Ok(plan)
    }

    /// Plans a message in both directions.
    pub fn plan_both<'f>(
        &self,
        message: &'f Message,
    ) -> Result<(MessagePlan<'f>, MessagePlan<'f>), UnsupportedType> {
        Ok((
            self.plan(&message.fields, Direction::Encode)?,
            self.plan(&message.fields, Direction::Decode)?,
        ))
    }
}

/// Label of the `index`-th event: its declared name, or `Event{index}`.
pub(crate) fn event_label(index: usize, event: &Message) -> String {
    match &event.name {
        Some(name) => crate::naming::capital(name),
        None => format!("Event{index}"),
    }
}

/// The built-in templates for every language this crate ships.
pub struct BuiltinTemplates<'a> {
    support: &'a dyn LanguageSupport,
    registry: &'a TypeRegistry,
    custom_types: &'a BTreeSet<String>,
    namespace: String,
}

impl<'a> BuiltinTemplates<'a> {
    pub fn new(
        support: &'a dyn LanguageSupport,
        registry: &'a TypeRegistry,
        custom_types: &'a BTreeSet<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            support,
            registry,
            custom_types,
            namespace: namespace.into(),
        }
    }

    fn scope(&self) -> Scope<'_> {
        Scope {
            support: self.support,
            env: TypeEnv::new(self.registry, self.custom_types),
            namespace: &self.namespace,
        }
    }
}

impl TemplateEngine for BuiltinTemplates<'_> {
    fn render(
        &self,
        template: TemplateId,
        context: &RenderContext<'_>,
    ) -> Result<RenderOutcome, CodecGenError> {
        let scope = self.scope();
        let language = self.support.language();
        trace!(%language, %template, "rendering");

        let result = match (language, template, *context) {
            (
                Language::Java,
                TemplateId::MethodCodec,
                RenderContext::Method {
                    service_name,
                    method,
                },
            ) => java::method_codec(&scope, service_name, method),
            (Language::Java, TemplateId::CustomCodec, RenderContext::Custom { codec }) => {
                java::custom_codec(&scope, codec)
            }
            (
                Language::Cpp,
                TemplateId::MethodCodecHeader,
                RenderContext::Method {
                    service_name,
                    method,
                },
            ) => cpp::method_header(&scope, service_name, method),
            (
                Language::Cpp,
                TemplateId::MethodCodecSource,
                RenderContext::Method {
                    service_name,
                    method,
                },
            ) => cpp::method_source(&scope, service_name, method),
            (Language::Cpp, TemplateId::CustomCodecHeader, RenderContext::Custom { codec }) => {
                cpp::custom_header(&scope, codec)
            }
            (Language::Cpp, TemplateId::CustomCodecSource, RenderContext::Custom { codec }) => {
                cpp::custom_source(&scope, codec)
            }
            _ => {
                return Err(CodecGenError::Render {
                    artifact: template.to_string(),
                    message: format!("no {language} template for this context"),
                });
            }
        };

        Ok(result.into())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::classify::TypeRegistry;
    use crate::message_id::{MessageId, Role};
    use crate::model::{CustomType, Field, Message, Method};
    use crate::type_name::TypeName;

    pub fn field(name: &str, raw: &str) -> Field {
        Field {
            name: name.to_string(),
            ty: TypeName::parse(raw, &TypeRegistry::default()).unwrap(),
            nullable: false,
            since: None,
            doc: None,
        }
    }

    pub fn message(service: u8, method: u8, role: Role, fields: Vec<Field>) -> Message {
        Message {
            id: MessageId::derive(service, method, role),
            name: None,
            fields,
        }
    }

    /// `map.put(key: String, value: String, ttl: Int64) -> String`.
    pub fn map_put() -> Method {
        Method {
            id: 1,
            name: "put".to_string(),
            since: Some("2.0".to_string()),
            doc: Some("Puts an entry into this map.".to_string()),
            request: message(
                1,
                1,
                Role::Request,
                vec![
                    field("key", "String"),
                    field("value", "String"),
                    field("ttl", "Int64"),
                ],
            ),
            response: message(1, 1, Role::Response, vec![field("previous", "String")]),
            events: Vec::new(),
        }
    }

    pub fn address() -> CustomType {
        CustomType {
            name: "Address".to_string(),
            since: None,
            fields: vec![field("host", "String"), field("port", "Int32")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::lang::{CppSupport, JavaSupport};

    #[test]
    fn plan_splits_fields_and_keeps_declaration_order() {
        let registry = TypeRegistry::default();
        let custom = BTreeSet::new();
        let scope = Scope {
            support: &JavaSupport,
            env: TypeEnv::new(&registry, &custom),
            namespace: "x",
        };
        let method = map_put();
        let plan = scope.plan(&method.request.fields, Direction::Encode).unwrap();

        let params: Vec<_> = plan.fields.iter().map(|f| f.param.as_str()).collect();
        assert_eq!(params, ["key", "value", "ttl"]);
        assert_eq!(plan.fixed().count(), 1);
        assert_eq!(plan.variable().count(), 2);
        assert_eq!(plan.initial_frame_size(), 8);
    }

    #[test]
    fn enums_land_in_the_same_section_for_every_language() {
        let registry = TypeRegistry::default();
        let custom = BTreeSet::new();
        let fields = vec![field("name", "String"), field("kind", "Enum_Int32_EventKind")];

        let supports: [&dyn LanguageSupport; 2] = [&JavaSupport, &CppSupport];
        for support in supports {
            let scope = Scope {
                support,
                env: TypeEnv::new(&registry, &custom),
                namespace: "x",
            };
            let plan = scope.plan(&fields, Direction::Encode).unwrap();

            let fixed: Vec<_> = plan.fixed().map(|f| f.param.as_str()).collect();
            assert_eq!(fixed, ["kind"], "{}", support.language());
            assert_eq!(plan.initial_frame_size(), 4);
        }
    }

    #[test]
    fn hook_disagreeing_with_layout_is_unsupported() {
        let mut registry = TypeRegistry::default();
        registry.fixed_primitives.insert("Enum_String".to_string(), 1);
        let custom = BTreeSet::new();
        let scope = Scope {
            support: &JavaSupport,
            env: TypeEnv::new(&registry, &custom),
            namespace: "x",
        };
        let fields = vec![field("kind", "Enum_String")];

        let err = scope.plan(&fields, Direction::Encode).unwrap_err();
        assert_eq!(err, UnsupportedType("Enum_String".into()));
    }

    #[test]
    fn wrong_template_for_language_is_a_render_error() {
        let registry = TypeRegistry::default();
        let custom = BTreeSet::new();
        let engine = BuiltinTemplates::new(&CppSupport, &registry, &custom, "protocol::codec");
        let method = map_put();
        let context = RenderContext::Method {
            service_name: "map",
            method: &method,
        };

        let err = engine.render(TemplateId::MethodCodec, &context).unwrap_err();
        assert!(matches!(err, CodecGenError::Render { .. }));
    }

    #[test]
    fn missing_mapping_is_an_outcome() {
        let registry = TypeRegistry::default();
        let custom = BTreeSet::new();
        let engine = BuiltinTemplates::new(&CppSupport, &registry, &custom, "protocol::codec");
        let mut method = map_put();
        method.request.fields.push(field("values", "ListCN_String"));
        let context = RenderContext::Method {
            service_name: "map",
            method: &method,
        };

        let outcome = engine.render(TemplateId::MethodCodecSource, &context).unwrap();
        assert_eq!(outcome, RenderOutcome::UnsupportedType("ListCN_String".into()));
    }
}
