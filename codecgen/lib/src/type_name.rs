//! The TypeName grammar.
//!
//! Field types in service documents are written in a compact textual grammar:
//!
//! ```text
//! Int32                      bare primitive
//! List_String                list
//! ListCN_Int64               list permitting null elements
//! Map_String_List_Int32      map, key is the first segment, value is the rest
//! EntryList_UUID_Int64       key/value pairs as parallel sequences
//! Enum_Int32_CacheEventType  enum over a base type, optionally named
//! Address                    anything else is an opaque custom type
//! ```
//!
//! The raw-string helpers ([`decompose_list`], [`decompose_map`], ...) are the
//! only place prefixes are matched. [`TypeName::parse`] builds on them to turn
//! a raw name into a tagged variant once, so later stages never re-parse
//! strings.
//!
//! ## Examples
//!
//! ```
//! use codecgen::classify::TypeRegistry;
//! use codecgen::type_name::TypeName;
//!
//! let registry = TypeRegistry::default();
//! let ty = TypeName::parse("Map_String_List_Int32", &registry).unwrap();
//!
//! assert!(matches!(ty, TypeName::Map { .. }));
//! assert_eq!(ty.to_string(), "Map_String_List_Int32");
//! ```

use std::fmt;

use thiserror::Error;

use crate::classify::TypeRegistry;

pub const LIST_PREFIX: &str = "List_";
pub const LIST_NULLABLE_PREFIX: &str = "ListCN_";
pub const MAP_PREFIX: &str = "Map_";
pub const ENTRY_LIST_PREFIX: &str = "EntryList_";
pub const ENUM_PREFIX: &str = "Enum_";

/// Separator between a prefix and its components.
pub const DELIMITER: char = '_';

/// A composite type name that does not fit its prefix's shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeNameError {
    #[error("type name is empty")]
    Empty,

    #[error("'{0}' is missing its item type")]
    MissingItem(String),

    #[error("'{0}' must have exactly a key and a value")]
    MissingKeyOrValue(String),

    #[error("'{0}' is missing its base type")]
    MissingBase(String),

    #[error("'{0}' ends with a delimiter but names no enum")]
    MissingEnumName(String),
}

/// A parsed TypeName.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// A name in the registry's primitive sets.
    Primitive(String),
    List(Box<TypeName>),
    ListNullable(Box<TypeName>),
    Map {
        key: Box<TypeName>,
        value: Box<TypeName>,
    },
    EntryList {
        key: Box<TypeName>,
        value: Box<TypeName>,
    },
    Enum {
        base: Box<TypeName>,
        name: Option<String>,
    },
    /// A user-declared composite, or any name the registry does not know.
    Custom(String),
}

impl TypeName {
    /// Parses a raw type name.
    ///
    /// Bare names become [`TypeName::Primitive`] when the registry lists them
    /// and [`TypeName::Custom`] otherwise. Nesting depth is unbounded.
    ///
    /// ## Errors
    ///
    /// Returns a [`TypeNameError`] when a prefixed name is missing one of
    /// its components.
    pub fn parse(raw: &str, registry: &TypeRegistry) -> Result<Self, TypeNameError> {
        if raw.is_empty() {
            return Err(TypeNameError::Empty);
        }

        if raw.starts_with(LIST_PREFIX) || raw.starts_with(LIST_NULLABLE_PREFIX) {
            let item = decompose_list(raw).ok_or_else(|| TypeNameError::MissingItem(raw.into()))?;
            let item = Box::new(Self::parse(item, registry)?);
            return Ok(if raw.starts_with(LIST_NULLABLE_PREFIX) {
                TypeName::ListNullable(item)
            } else {
                TypeName::List(item)
            });
        }

        if raw.starts_with(MAP_PREFIX) {
            let (key, value) =
                decompose_map(raw).ok_or_else(|| TypeNameError::MissingKeyOrValue(raw.into()))?;
            return Ok(TypeName::Map {
                key: Box::new(Self::parse(key, registry)?),
                value: Box::new(Self::parse(value, registry)?),
            });
        }

        if raw.starts_with(ENTRY_LIST_PREFIX) {
            let (key, value) = decompose_entry_list(raw)
                .ok_or_else(|| TypeNameError::MissingKeyOrValue(raw.into()))?;
            return Ok(TypeName::EntryList {
                key: Box::new(Self::parse(key, registry)?),
                value: Box::new(Self::parse(value, registry)?),
            });
        }

        if is_enum(raw) {
            let base = decompose_enum(raw).ok_or_else(|| TypeNameError::MissingBase(raw.into()))?;
            let name = match raw[ENUM_PREFIX.len() + base.len()..].strip_prefix(DELIMITER) {
                None => None,
                Some("") => return Err(TypeNameError::MissingEnumName(raw.into())),
                Some(rest) => Some(rest.to_string()),
            };
            return Ok(TypeName::Enum {
                base: Box::new(Self::parse(base, registry)?),
                name,
            });
        }

        if registry.is_primitive(raw) {
            Ok(TypeName::Primitive(raw.to_string()))
        } else {
            Ok(TypeName::Custom(raw.to_string()))
        }
    }

    /// The canonical spelling, identical to the string it was parsed from.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// True for list, map and entry-list shapes.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            TypeName::List(_)
                | TypeName::ListNullable(_)
                | TypeName::Map { .. }
                | TypeName::EntryList { .. }
        )
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Primitive(name) | TypeName::Custom(name) => f.write_str(name),
            TypeName::List(item) => write!(f, "{LIST_PREFIX}{item}"),
            TypeName::ListNullable(item) => write!(f, "{LIST_NULLABLE_PREFIX}{item}"),
            TypeName::Map { key, value } => write!(f, "{MAP_PREFIX}{key}{DELIMITER}{value}"),
            TypeName::EntryList { key, value } => {
                write!(f, "{ENTRY_LIST_PREFIX}{key}{DELIMITER}{value}")
            }
            TypeName::Enum { base, name } => {
                write!(f, "{ENUM_PREFIX}{base}")?;
                if let Some(name) = name {
                    write!(f, "{DELIMITER}{name}")?;
                }
                Ok(())
            }
        }
    }
}

/// True iff the name starts with `Enum_`.
pub fn is_enum(type_name: &str) -> bool {
    type_name.starts_with(ENUM_PREFIX)
}

/// The base type of an enum: the segment right after `Enum_`.
///
/// A trailing `_<EnumName>` is not part of the base.
///
/// ```
/// use codecgen::type_name::decompose_enum;
///
/// assert_eq!(decompose_enum("Enum_Int32"), Some("Int32"));
/// assert_eq!(decompose_enum("Enum_Int32_CacheEventType"), Some("Int32"));
/// assert_eq!(decompose_enum("Int32"), None);
/// ```
pub fn decompose_enum(type_name: &str) -> Option<&str> {
    let rest = type_name.strip_prefix(ENUM_PREFIX)?;
    let base = rest.split(DELIMITER).next().unwrap_or_default();
    (!base.is_empty()).then_some(base)
}

/// The item type of a `List_` or `ListCN_` name.
///
/// ```
/// use codecgen::type_name::decompose_list;
///
/// assert_eq!(decompose_list("List_String"), Some("String"));
/// assert_eq!(decompose_list("ListCN_Map_String_Int32"), Some("Map_String_Int32"));
/// assert_eq!(decompose_list("Listing"), None);
/// ```
pub fn decompose_list(type_name: &str) -> Option<&str> {
    let item = type_name
        .strip_prefix(LIST_PREFIX)
        .or_else(|| type_name.strip_prefix(LIST_NULLABLE_PREFIX))?;
    (!item.is_empty()).then_some(item)
}

/// The key and value types of a `Map_` name.
pub fn decompose_map(type_name: &str) -> Option<(&str, &str)> {
    split_key_value(type_name.strip_prefix(MAP_PREFIX)?)
}

/// The key and value types of an `EntryList_` name.
pub fn decompose_entry_list(type_name: &str) -> Option<(&str, &str)> {
    split_key_value(type_name.strip_prefix(ENTRY_LIST_PREFIX)?)
}

fn split_key_value(rest: &str) -> Option<(&str, &str)> {
    let (key, value) = rest.split_once(DELIMITER)?;
    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(raw: &str) -> TypeName {
        TypeName::parse(raw, &TypeRegistry::default()).unwrap()
    }

    fn prim(name: &str) -> Box<TypeName> {
        Box::new(TypeName::Primitive(name.to_string()))
    }

    #[test]
    fn bare_known_names_are_primitive() {
        assert_eq!(parse("Int32"), TypeName::Primitive("Int32".into()));
        assert_eq!(parse("String"), TypeName::Primitive("String".into()));
    }

    #[test]
    fn bare_unknown_names_are_custom() {
        assert_eq!(parse("Address"), TypeName::Custom("Address".into()));
        assert_eq!(parse("Sql_Row"), TypeName::Custom("Sql_Row".into()));
    }

    #[test]
    fn prefix_matching_is_case_sensitive() {
        assert_eq!(parse("list_String"), TypeName::Custom("list_String".into()));
        assert_eq!(parse("MAP_String_Int32"), TypeName::Custom("MAP_String_Int32".into()));
    }

    #[test]
    fn parses_lists() {
        assert_eq!(parse("List_String"), TypeName::List(prim("String")));
        assert_eq!(parse("ListCN_Int64"), TypeName::ListNullable(prim("Int64")));
    }

    #[test]
    fn map_value_keeps_the_remainder() {
        assert_eq!(
            parse("Map_String_List_Int32"),
            TypeName::Map {
                key: prim("String"),
                value: Box::new(TypeName::List(prim("Int32"))),
            }
        );
    }

    #[test]
    fn parses_nested_lists_without_depth_limit() {
        let mut ty = &parse("List_List_List_List_UUID");
        let mut depth = 0;
        while let TypeName::List(item) = ty {
            depth += 1;
            ty = item.as_ref();
        }
        assert_eq!(depth, 4);
        assert_eq!(*ty, TypeName::Primitive("UUID".into()));
    }

    #[test]
    fn parses_entry_lists() {
        assert_eq!(
            parse("EntryList_UUID_Int64"),
            TypeName::EntryList {
                key: prim("UUID"),
                value: prim("Int64"),
            }
        );
    }

    #[test]
    fn parses_enums_with_and_without_name() {
        assert_eq!(
            parse("Enum_Int32"),
            TypeName::Enum {
                base: prim("Int32"),
                name: None,
            }
        );
        assert_eq!(
            parse("Enum_Int32_CacheEventType"),
            TypeName::Enum {
                base: prim("Int32"),
                name: Some("CacheEventType".into()),
            }
        );
    }

    #[test]
    fn rejects_malformed_composites() {
        let registry = TypeRegistry::default();
        assert_eq!(TypeName::parse("", &registry), Err(TypeNameError::Empty));
        assert_eq!(
            TypeName::parse("List_", &registry),
            Err(TypeNameError::MissingItem("List_".into()))
        );
        assert_eq!(
            TypeName::parse("Map_String", &registry),
            Err(TypeNameError::MissingKeyOrValue("Map_String".into()))
        );
        assert_eq!(
            TypeName::parse("EntryList__Int32", &registry),
            Err(TypeNameError::MissingKeyOrValue("EntryList__Int32".into()))
        );
        assert_eq!(
            TypeName::parse("Enum_", &registry),
            Err(TypeNameError::MissingBase("Enum_".into()))
        );
        assert_eq!(
            TypeName::parse("Enum_Int32_", &registry),
            Err(TypeNameError::MissingEnumName("Enum_Int32_".into()))
        );
        assert!(TypeName::parse("List_Map_String", &registry).is_err());
    }

    #[test]
    fn decomposition_ignores_other_prefixes() {
        assert_eq!(decompose_map("EntryList_String_Int32"), None);
        assert_eq!(decompose_entry_list("Map_String_Int32"), None);
        assert_eq!(decompose_list("Map_String_Int32"), None);
        assert!(!is_enum("Enumeration"));
    }

    fn atom() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Int32".to_string()),
            Just("Int64".to_string()),
            Just("Boolean".to_string()),
            Just("String".to_string()),
            Just("UUID".to_string()),
            "[A-Z][a-zA-Z0-9]{0,12}",
        ]
    }

    proptest! {
        #[test]
        fn list_decomposition_round_trips(item in atom()) {
            let raw = format!("List_{item}");
            prop_assert_eq!(decompose_list(&raw), Some(item.as_str()));
        }

        #[test]
        fn map_decomposition_round_trips(key in atom(), value in atom()) {
            let raw = format!("Map_{key}_{value}");
            prop_assert_eq!(decompose_map(&raw), Some((key.as_str(), value.as_str())));
        }

        #[test]
        fn entry_list_decomposition_round_trips(key in atom(), value in atom()) {
            let raw = format!("EntryList_{key}_{value}");
            prop_assert_eq!(decompose_entry_list(&raw), Some((key.as_str(), value.as_str())));
        }

        #[test]
        fn display_reproduces_the_parsed_string(key in atom(), value in atom(), item in atom()) {
            let registry = TypeRegistry::default();
            for raw in [
                format!("List_{item}"),
                format!("ListCN_{item}"),
                format!("Map_{key}_List_{value}"),
                format!("EntryList_{key}_{value}"),
                format!("Enum_{item}"),
                format!("List_Map_{key}_{value}"),
            ] {
                let ty = TypeName::parse(&raw, &registry).unwrap();
                prop_assert_eq!(ty.to_string(), raw);
            }
        }
    }
}
