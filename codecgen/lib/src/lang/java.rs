//! Java mapping set.
//!
//! Fixed-width primitives, and enums over them, go through
//! `FixedSizeTypesCodec` at an offset in the initial frame. Everything else is
//! framed by a `*Codec` class.
//! Containers without a fixed-shape codec delegate to `ListMultiFrameCodec`,
//! `MapCodec` or `EntryListCodec` with method references to their element
//! codecs, so an element must itself be a plain framed codec.

use crate::classify::WireLayout;
use crate::lang::{
    CodecOp, CustomLayout, Hook, Language, LanguageSupport, OpKind, OutputLayout, TypeEnv,
    UnsupportedType,
};
use crate::type_name::TypeName;

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while",
];

/// Java spelling, boxed spelling and `FixedSizeTypesCodec` suffix per fixed primitive.
fn fixed_primitive(name: &str) -> Option<(&'static str, &'static str, &'static str)> {
    Some(match name {
        "Boolean" => ("boolean", "java.lang.Boolean", "Boolean"),
        "Byte" => ("byte", "java.lang.Byte", "Byte"),
        "Int16" => ("short", "java.lang.Short", "Short"),
        "Int32" => ("int", "java.lang.Integer", "Int"),
        "Int64" => ("long", "java.lang.Long", "Long"),
        "Float32" => ("float", "java.lang.Float", "Float"),
        "Float64" => ("double", "java.lang.Double", "Double"),
        "UUID" => ("java.util.UUID", "java.util.UUID", "UUID"),
        "LocalDate" => ("java.time.LocalDate", "java.time.LocalDate", "LocalDate"),
        "LocalTime" => ("java.time.LocalTime", "java.time.LocalTime", "LocalTime"),
        "LocalDateTime" => ("java.time.LocalDateTime", "java.time.LocalDateTime", "LocalDateTime"),
        "OffsetDateTime" => (
            "java.time.OffsetDateTime",
            "java.time.OffsetDateTime",
            "OffsetDateTime",
        ),
        _ => return None,
    })
}

fn framed_primitive(name: &str) -> Option<(&'static str, &'static str)> {
    Some(match name {
        "String" => ("java.lang.String", "StringCodec"),
        "ByteArray" => ("byte[]", "ByteArrayCodec"),
        "Data" => ("com.hazelcast.internal.serialization.Data", "DataCodec"),
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Encode,
    Decode,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Encode => "encode",
            Direction::Decode => "decode",
        }
    }
}

/// The Java mapping set.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaSupport;

impl JavaSupport {
    fn hook(
        &self,
        ty: &TypeName,
        env: &TypeEnv<'_>,
        direction: Direction,
    ) -> Result<Hook, UnsupportedType> {
        let verb = direction.verb();
        match ty {
            TypeName::Primitive(name) => {
                if let Some((spelling, _, suffix)) = fixed_primitive(name) {
                    let size = env
                        .registry
                        .fixed_size(name)
                        .ok_or_else(|| UnsupportedType::of(ty))?;
                    return Ok(Hook {
                        lang_type: spelling.to_string(),
                        op: CodecOp::fixed(format!("FixedSizeTypesCodec.{verb}{suffix}"), size),
                    });
                }
                let (spelling, codec) = framed_primitive(name).ok_or_else(|| UnsupportedType::of(ty))?;
                Ok(Hook {
                    lang_type: spelling.to_string(),
                    op: CodecOp::frames(format!("{codec}.{verb}")),
                })
            }
            TypeName::Custom(name) => {
                let class = self.transliterate(name);
                Ok(Hook {
                    op: CodecOp::frames(format!("{class}Codec.{verb}")),
                    lang_type: class,
                })
            }
            TypeName::Enum { base, name } => {
                let base_hook = self.hook(base, env, direction)?;
                let lang_type = match name {
                    Some(name) => self.transliterate(name),
                    None => base_hook.lang_type,
                };
                Ok(Hook {
                    lang_type,
                    op: base_hook.op,
                })
            }
            TypeName::List(item) | TypeName::ListNullable(item) => {
                let element = self.element_type(item, env, direction)?;
                let lang_type = match direction {
                    Direction::Encode => format!("java.util.Collection<{element}>"),
                    Direction::Decode => format!("java.util.List<{element}>"),
                };
                if env.registry.layout(ty) == WireLayout::Fixed {
                    return Ok(self.fixed_shape(ty, lang_type, verb));
                }
                let call = match ty {
                    TypeName::ListNullable(_) => match direction {
                        Direction::Encode => "ListMultiFrameCodec.encodeContainsNullable",
                        Direction::Decode => "ListMultiFrameCodec.decodeContainsNullable",
                    },
                    _ => match direction {
                        Direction::Encode => "ListMultiFrameCodec.encode",
                        Direction::Decode => "ListMultiFrameCodec.decode",
                    },
                };
                let item_ref = self.element_reference(item, env, direction)?;
                Ok(Hook {
                    lang_type,
                    op: CodecOp::frames(call).with_args([item_ref]),
                })
            }
            TypeName::Map { key, value } => {
                let k = self.element_type(key, env, direction)?;
                let v = self.element_type(value, env, direction)?;
                let lang_type = format!("java.util.Map<{k}, {v}>");
                if env.registry.layout(ty) == WireLayout::Fixed {
                    return Ok(self.fixed_shape(ty, lang_type, verb));
                }
                let refs = [
                    self.element_reference(key, env, direction)?,
                    self.element_reference(value, env, direction)?,
                ];
                Ok(Hook {
                    lang_type,
                    op: CodecOp::frames(format!("MapCodec.{verb}")).with_args(refs),
                })
            }
            TypeName::EntryList { key, value } => {
                let k = self.element_type(key, env, direction)?;
                let v = self.element_type(value, env, direction)?;
                let entry = format!("java.util.Map.Entry<{k}, {v}>");
                let lang_type = match direction {
                    Direction::Encode => format!("java.util.Collection<{entry}>"),
                    Direction::Decode => format!("java.util.List<{entry}>"),
                };
                if env.registry.layout(ty) == WireLayout::Fixed {
                    return Ok(self.fixed_shape(ty, lang_type, verb));
                }
                let refs = [
                    self.element_reference(key, env, direction)?,
                    self.element_reference(value, env, direction)?,
                ];
                Ok(Hook {
                    lang_type,
                    op: CodecOp::frames(format!("EntryListCodec.{verb}")).with_args(refs),
                })
            }
        }
    }

    /// A container with its own fixed-item codec, e.g. `ListInt64Codec`.
    fn fixed_shape(&self, ty: &TypeName, lang_type: String, verb: &str) -> Hook {
        let class = self.transliterate(&ty.canonical());
        Hook {
            lang_type,
            op: CodecOp::frames(format!("{class}Codec.{verb}")),
        }
    }

    /// Spelling of a type used as a generic argument.
    fn element_type(
        &self,
        ty: &TypeName,
        env: &TypeEnv<'_>,
        direction: Direction,
    ) -> Result<String, UnsupportedType> {
        if let TypeName::Primitive(name) = ty
            && let Some((_, boxed, _)) = fixed_primitive(name)
        {
            return Ok(boxed.to_string());
        }
        Ok(self.hook(ty, env, direction)?.lang_type)
    }

    /// A method reference to an element codec. Only plain framed codecs
    /// can be referenced.
    fn element_reference(
        &self,
        ty: &TypeName,
        env: &TypeEnv<'_>,
        direction: Direction,
    ) -> Result<String, UnsupportedType> {
        let hook = self.hook(ty, env, direction)?;
        match hook.op.kind {
            OpKind::Frames if hook.op.extra_args.is_empty() => Ok(method_reference(&hook.op.call)),
            _ => Err(UnsupportedType::of(ty)),
        }
    }
}

/// `StringCodec.encode` becomes `StringCodec::encode`.
fn method_reference(call: &str) -> String {
    match call.rsplit_once('.') {
        Some((class, method)) => format!("{class}::{method}"),
        None => call.to_string(),
    }
}

impl LanguageSupport for JavaSupport {
    fn language(&self) -> Language {
        Language::Java
    }

    fn encode_hook(&self, ty: &TypeName, env: &TypeEnv<'_>) -> Result<Hook, UnsupportedType> {
        self.hook(ty, env, Direction::Encode)
    }

    fn decode_hook(&self, ty: &TypeName, env: &TypeEnv<'_>) -> Result<Hook, UnsupportedType> {
        self.hook(ty, env, Direction::Decode)
    }

    fn escape_keyword(&self, name: &str) -> String {
        if KEYWORDS.contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }

    fn output_layout(&self) -> OutputLayout {
        OutputLayout::PerArtifact { extension: "java" }
    }

    fn custom_layout(&self) -> CustomLayout {
        CustomLayout::Single { extension: "java" }
    }
}
