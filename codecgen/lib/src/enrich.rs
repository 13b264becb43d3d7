//! Enrichment: raw service records into the immutable, identifier-carrying
//! model.
//!
//! [`enrich`] is a pure transform. It checks id uniqueness, parses every
//! field type once, derives the message identifiers, and sorts services by id
//! and methods by id so that output order never depends on the order the
//! documents were listed in.

use std::collections::BTreeMap;

use tracing::debug;

use crate::classify::TypeRegistry;
use crate::error::CodecGenError;
use crate::message_id::{MessageId, Role};
use crate::model::{
    CustomType, CustomTypeDef, Field, FieldDef, Message, MessageDef, Method, MethodDef, Service,
    ServiceDef,
};
use crate::type_name::TypeName;

/// Builds the enriched model from raw service records.
///
/// ## Errors
///
/// - [`CodecGenError::DuplicateServiceId`] / [`CodecGenError::DuplicateMethodId`]
///   when ids collide within their scope
/// - [`CodecGenError::TooManyEvents`] when a method declares more than 254
///   events
/// - [`CodecGenError::TypeName`] when a field type is malformed
pub fn enrich(defs: &[ServiceDef], registry: &TypeRegistry) -> Result<Vec<Service>, CodecGenError> {
    let mut seen: BTreeMap<u8, &str> = BTreeMap::new();
    for def in defs {
        if let Some(first) = seen.insert(def.id, &def.name) {
            return Err(CodecGenError::DuplicateServiceId {
                id: def.id,
                first: first.to_string(),
                second: def.name.clone(),
            });
        }
    }

    let mut services = defs
        .iter()
        .map(|def| enrich_service(def, registry))
        .collect::<Result<Vec<_>, _>>()?;
    services.sort_by_key(|service| service.id);
    Ok(services)
}

fn enrich_service(def: &ServiceDef, registry: &TypeRegistry) -> Result<Service, CodecGenError> {
    let mut seen: BTreeMap<u8, &str> = BTreeMap::new();
    for method in &def.methods {
        if let Some(first) = seen.insert(method.id, &method.name) {
            return Err(CodecGenError::DuplicateMethodId {
                service: def.name.clone(),
                id: method.id,
                first: first.to_string(),
                second: method.name.clone(),
            });
        }
    }

    let mut methods = def
        .methods
        .iter()
        .map(|method| enrich_method(def, method, registry))
        .collect::<Result<Vec<_>, _>>()?;
    methods.sort_by_key(|method| method.id);

    let custom_types = def
        .custom_types
        .iter()
        .map(|custom| enrich_custom_type(custom, registry))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        service = %def.name,
        methods = methods.len(),
        custom_types = custom_types.len(),
        "enriched service"
    );

    Ok(Service {
        id: def.id,
        name: def.name.clone(),
        methods,
        custom_types,
    })
}

fn enrich_method(
    service: &ServiceDef,
    def: &MethodDef,
    registry: &TypeRegistry,
) -> Result<Method, CodecGenError> {
    let context = format!("{}.{}", service.name, def.name);
    let message = |role: Role, message: &MessageDef| -> Result<Message, CodecGenError> {
        Ok(Message {
            id: MessageId::derive(service.id, def.id, role),
            name: message.name.clone(),
            fields: parse_fields(&message.fields, &context, registry)?,
        })
    };

    let events = def
        .events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let role = Role::event(index).ok_or_else(|| CodecGenError::TooManyEvents {
                method: context.clone(),
                count: def.events.len(),
            })?;
            message(role, event)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Method {
        id: def.id,
        name: def.name.clone(),
        since: def.since.clone(),
        doc: def.doc.clone(),
        request: message(Role::Request, &def.request)?,
        response: message(Role::Response, &def.response)?,
        events,
    })
}

fn enrich_custom_type(
    def: &CustomTypeDef,
    registry: &TypeRegistry,
) -> Result<CustomType, CodecGenError> {
    Ok(CustomType {
        name: def.name.clone(),
        since: def.since.clone(),
        fields: parse_fields(&def.fields, &def.name, registry)?,
    })
}

fn parse_fields(
    defs: &[FieldDef],
    context: &str,
    registry: &TypeRegistry,
) -> Result<Vec<Field>, CodecGenError> {
    defs.iter()
        .map(|def| {
            let ty = TypeName::parse(&def.type_name, registry).map_err(|source| {
                CodecGenError::TypeName {
                    context: format!("{context}.{}", def.name),
                    source,
                }
            })?;
            Ok(Field {
                name: def.name.clone(),
                ty,
                nullable: def.nullable,
                since: def.since.clone(),
                doc: def.doc.clone(),
            })
        })
        .collect()
}
