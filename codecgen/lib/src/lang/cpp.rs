//! C++ mapping set.
//!
//! The C++ client message API is overload-based: every value is written with
//! `msg.set(value)` and read with `msg.get<T>()`, so a hook mostly decides
//! the C++ spelling of a type. The runtime has no nullable-element lists and
//! no raw `Data` frames, and it only knows the custom types generated in the
//! same run.

use crate::lang::{
    CodecOp, CustomLayout, Hook, Language, LanguageSupport, OutputLayout, TypeEnv, UnsupportedType,
};
use crate::type_name::TypeName;

const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "asm", "auto", "bool", "break", "case", "catch", "char", "class",
    "const", "constexpr", "continue", "decltype", "default", "delete", "do", "double", "else",
    "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if",
    "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "nullptr",
    "operator", "or", "private", "protected", "public", "register", "return", "short", "signed",
    "sizeof", "static", "struct", "switch", "template", "this", "throw", "true", "try", "typedef",
    "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "while", "xor",
];

fn primitive(name: &str) -> Option<&'static str> {
    Some(match name {
        "Boolean" => "bool",
        "Byte" => "byte",
        "Int16" => "int16_t",
        "Int32" => "int32_t",
        "Int64" => "int64_t",
        "Float32" => "float",
        "Float64" => "double",
        "UUID" => "boost::uuids::uuid",
        "LocalDate" => "local_date",
        "LocalTime" => "local_time",
        "LocalDateTime" => "local_date_time",
        "OffsetDateTime" => "offset_date_time",
        "String" => "std::string",
        "ByteArray" => "std::vector<byte>",
        _ => return None,
    })
}

/// The C++ mapping set.
#[derive(Debug, Clone, Copy, Default)]
pub struct CppSupport;

impl CppSupport {
    /// The value type used for both encoding and decoding.
    pub fn value_type(&self, ty: &TypeName, env: &TypeEnv<'_>) -> Result<String, UnsupportedType> {
        match ty {
            TypeName::Primitive(name) => primitive(name)
                .map(str::to_string)
                .ok_or_else(|| UnsupportedType::of(ty)),
            TypeName::Custom(name) if env.custom_types.contains(name) => Ok(self.transliterate(name)),
            TypeName::Custom(_) | TypeName::ListNullable(_) => Err(UnsupportedType::of(ty)),
            TypeName::List(item) => Ok(format!("std::vector<{}>", self.value_type(item, env)?)),
            TypeName::Map { key, value } => Ok(format!(
                "std::unordered_map<{}, {}>",
                self.value_type(key, env)?,
                self.value_type(value, env)?
            )),
            TypeName::EntryList { key, value } => Ok(format!(
                "std::vector<std::pair<{}, {}>>",
                self.value_type(key, env)?,
                self.value_type(value, env)?
            )),
            TypeName::Enum { base, .. } => self.value_type(base, env),
        }
    }

    fn op(&self, ty: &TypeName, env: &TypeEnv<'_>, call: String) -> CodecOp {
        match env.registry.fixed_width(ty) {
            Some(size) => CodecOp::fixed(call, size),
            None => CodecOp::frames(call),
        }
    }
}

impl LanguageSupport for CppSupport {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn encode_hook(&self, ty: &TypeName, env: &TypeEnv<'_>) -> Result<Hook, UnsupportedType> {
        let value = self.value_type(ty, env)?;
        let lang_type = if env.registry.fixed_width(ty).is_some() {
            value
        } else {
            format!("const {value} &")
        };
        Ok(Hook {
            lang_type,
            op: self.op(ty, env, "msg.set".to_string()),
        })
    }

    fn decode_hook(&self, ty: &TypeName, env: &TypeEnv<'_>) -> Result<Hook, UnsupportedType> {
        let value = self.value_type(ty, env)?;
        let call = format!("msg.get<{value}>");
        Ok(Hook {
            op: self.op(ty, env, call),
            lang_type: value,
        })
    }

    fn escape_keyword(&self, name: &str) -> String {
        if KEYWORDS.contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }

    fn output_layout(&self) -> OutputLayout {
        OutputLayout::Consolidated {
            header: "codecs.h",
            source: "codecs.cpp",
        }
    }

    fn custom_layout(&self) -> CustomLayout {
        CustomLayout::Pair {
            suffix: "_codec",
            header_ext: "h",
            source_ext: "cpp",
        }
    }
}
