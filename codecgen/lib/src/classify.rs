//! Fixed- versus variable-length classification.
//!
//! A [`TypeRegistry`] holds the externally supplied sets the classifier
//! consults:
//!
//! - the fixed-length primitives and their byte widths
//! - the variable-length primitives (`String`, `ByteArray`, ...)
//! - one fixed-shape override set per container prefix
//!
//! A container prefix alone never makes a type variable-length. The override
//! set for that prefix is checked first, and membership wins.
//!
//! [`TypeRegistry::layout`] answers whether every encoded value of a type has
//! the same width. [`TypeRegistry::fixed_width`] builds on it to decide which
//! fields go into the fixed-offset section of a message: only scalars do.
//! A fixed-shape container has a constant item width but a variable item
//! count, so it is still framed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::Field;
use crate::type_name::{
    ENTRY_LIST_PREFIX, LIST_NULLABLE_PREFIX, LIST_PREFIX, MAP_PREFIX, TypeName,
};

/// How a type is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireLayout {
    /// Size is independent of the value. For containers, the size of each
    /// item is.
    Fixed,
    /// Size depends on the value.
    Variable,
}

/// The classification tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeRegistry {
    /// Fixed-length primitive names and their encoded size in bytes.
    pub fixed_primitives: BTreeMap<String, usize>,
    pub variable_primitives: BTreeSet<String>,
    /// `List_`/`ListCN_` shapes encoded with a fixed item size.
    pub fixed_lists: BTreeSet<String>,
    pub fixed_maps: BTreeSet<String>,
    pub fixed_entry_lists: BTreeSet<String>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let fixed_primitives = [
            ("Boolean", 1),
            ("Byte", 1),
            ("Int16", 2),
            ("Int32", 4),
            ("Int64", 8),
            ("Float32", 4),
            ("Float64", 8),
            ("UUID", 17),
            ("LocalDate", 6),
            ("LocalTime", 7),
            ("LocalDateTime", 13),
            ("OffsetDateTime", 17),
        ]
        .into_iter()
        .map(|(name, size)| (name.to_string(), size))
        .collect();

        Self {
            fixed_primitives,
            variable_primitives: to_set(&["String", "ByteArray", "Data"]),
            fixed_lists: to_set(&["List_Int32", "List_Int64", "List_UUID"]),
            fixed_maps: BTreeSet::new(),
            fixed_entry_lists: to_set(&[
                "EntryList_Int32_Int64",
                "EntryList_Int32_UUID",
                "EntryList_UUID_Int64",
                "EntryList_UUID_UUID",
            ]),
        }
    }
}

fn to_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl TypeRegistry {
    /// True iff the name is in the fixed-primitive set.
    pub fn is_fixed_length(&self, type_name: &str) -> bool {
        self.fixed_primitives.contains_key(type_name)
    }

    /// Encoded width of a fixed-length primitive.
    pub fn fixed_size(&self, type_name: &str) -> Option<usize> {
        self.fixed_primitives.get(type_name).copied()
    }

    /// True iff the name is listed in either primitive set.
    pub fn is_primitive(&self, type_name: &str) -> bool {
        self.is_fixed_length(type_name) || self.variable_primitives.contains(type_name)
    }

    pub fn is_variable_length_list(&self, type_name: &str) -> bool {
        type_name.starts_with(LIST_PREFIX) && !self.fixed_lists.contains(type_name)
    }

    /// `ListCN_` shapes share the list override set.
    pub fn is_variable_length_list_with_nullable(&self, type_name: &str) -> bool {
        type_name.starts_with(LIST_NULLABLE_PREFIX) && !self.fixed_lists.contains(type_name)
    }

    pub fn is_variable_length_map(&self, type_name: &str) -> bool {
        type_name.starts_with(MAP_PREFIX) && !self.fixed_maps.contains(type_name)
    }

    pub fn is_variable_length_entry_list(&self, type_name: &str) -> bool {
        type_name.starts_with(ENTRY_LIST_PREFIX) && !self.fixed_entry_lists.contains(type_name)
    }

    /// True when a container shape is in its prefix's override set.
    pub fn is_fixed_shape(&self, ty: &TypeName) -> bool {
        let canonical = ty.canonical();
        match ty {
            TypeName::List(_) | TypeName::ListNullable(_) => self.fixed_lists.contains(&canonical),
            TypeName::Map { .. } => self.fixed_maps.contains(&canonical),
            TypeName::EntryList { .. } => self.fixed_entry_lists.contains(&canonical),
            _ => false,
        }
    }

    /// Classifies a parsed type. Exactly one layout holds for every type.
    ///
    /// An enum takes the layout of its base unless its full name is listed
    /// as a fixed primitive.
    pub fn layout(&self, ty: &TypeName) -> WireLayout {
        let fixed = match ty {
            TypeName::Enum { base, .. } => {
                self.is_fixed_length(&ty.canonical()) || self.layout(base) == WireLayout::Fixed
            }
            _ => self.is_fixed_length(&ty.canonical()) || self.is_fixed_shape(ty),
        };
        if fixed {
            WireLayout::Fixed
        } else {
            WireLayout::Variable
        }
    }

    /// Width of a type in a message's fixed-offset section.
    ///
    /// `None` for variable-length types and for every container.
    pub fn fixed_width(&self, ty: &TypeName) -> Option<usize> {
        if ty.is_container() || self.layout(ty) == WireLayout::Variable {
            return None;
        }
        match ty {
            TypeName::Enum { base, .. } => self
                .fixed_size(&ty.canonical())
                .or_else(|| self.fixed_width(base)),
            _ => self.fixed_size(&ty.canonical()),
        }
    }

    /// Partitions fields into the fixed-width prefix and the variable tail.
    ///
    /// Relative order is kept within each partition.
    pub fn split_fixed_and_variable<'a>(
        &self,
        fields: &'a [Field],
    ) -> (Vec<&'a Field>, Vec<&'a Field>) {
        fields
            .iter()
            .partition(|field| self.fixed_width(&field.ty).is_some())
    }
}
