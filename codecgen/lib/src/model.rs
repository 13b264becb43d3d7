//! Service description model.
//!
//! There are two layers:
//!
//! - `*Def` records mirror a service document as written and are produced by
//!   deserializing a validated document.
//! - [`Service`], [`Method`], [`Message`], [`Field`] and [`CustomType`] are the
//!   enriched, immutable records built by [`crate::enrich::enrich`]. They carry
//!   derived message identifiers and parsed type names.

use serde::{Deserialize, Deserializer, Serialize};

use crate::message_id::MessageId;
use crate::type_name::TypeName;

/// A service as written in its document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDef {
    pub id: u8,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub methods: Vec<MethodDef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub custom_types: Vec<CustomTypeDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub id: u8,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub request: MessageDef,
    pub response: MessageDef,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<MessageDef>,
}

/// A request, response or event as written. It has no id yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "params", deserialize_with = "null_as_empty")]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(default, alias = "params", deserialize_with = "null_as_empty")]
    pub fields: Vec<FieldDef>,
}

/// Treats an explicit `null` sequence the same as a missing one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A service with every message identifier derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: u8,
    pub name: String,
    pub methods: Vec<Method>,
    pub custom_types: Vec<CustomType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub id: u8,
    pub name: String,
    pub since: Option<String>,
    pub doc: Option<String>,
    pub request: Message,
    pub response: Message,
    pub events: Vec<Message>,
}

impl Method {
    /// Every type referenced by the method's request, response and events.
    pub fn field_types(&self) -> impl Iterator<Item = &TypeName> {
        std::iter::once(&self.request)
            .chain(std::iter::once(&self.response))
            .chain(self.events.iter())
            .flat_map(|message| message.fields.iter().map(|field| &field.ty))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub name: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeName,
    pub nullable: bool,
    pub since: Option<String>,
    pub doc: Option<String>,
}

/// A user-declared composite. Custom types have no message identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomType {
    pub name: String,
    pub since: Option<String>,
    pub fields: Vec<Field>,
}
