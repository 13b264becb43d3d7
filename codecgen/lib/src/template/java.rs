//! Java codec templates.

use crate::code_writer::CodeWriter;
use crate::lang::UnsupportedType;
use crate::model::{CustomType, Field, Method};
use crate::naming::{capital, to_upper_snake_case, uncapital};
use crate::template::{
    CODEC_HASH_PLACEHOLDER, Direction, MessagePlan, PlannedField, Scope, event_label,
};
use crate::type_name::TypeName;

const INDENT: &str = "    ";

const REQUEST_BASE_OFFSET: &str = "PARTITION_ID_FIELD_OFFSET + INT_SIZE_IN_BYTES";
const RESPONSE_BASE_OFFSET: &str = "RESPONSE_BACKUP_ACKS_FIELD_OFFSET + BYTE_SIZE_IN_BYTES";
const EVENT_BASE_OFFSET: &str = "PARTITION_ID_FIELD_OFFSET + INT_SIZE_IN_BYTES";

type Rendered = Result<(), UnsupportedType>;

pub(super) fn class_name(service_name: &str, method_name: &str) -> String {
    format!("{}{}Codec", capital(service_name), capital(method_name))
}

fn offset_const(prefix: &str, field: &Field) -> String {
    format!("{prefix}{}_FIELD_OFFSET", to_upper_snake_case(&field.name))
}

/// Enums travel as their id.
fn encode_value(field: &Field, expr: &str) -> String {
    match &field.ty {
        TypeName::Enum { name: Some(_), .. } => format!("{expr}.getId()"),
        _ => expr.to_string(),
    }
}

fn decode_value(field: &PlannedField<'_>, expr: String) -> String {
    match &field.field.ty {
        TypeName::Enum { name: Some(_), .. } => format!("{}.getById({expr})", field.hook.lang_type),
        _ => expr,
    }
}

fn header(w: &mut CodeWriter, scope: &Scope<'_>) {
    w.line(format!("package {};", scope.namespace));
    w.blank_line();
    w.line("import com.hazelcast.client.impl.protocol.ClientMessage;");
    w.line("import com.hazelcast.client.impl.protocol.Generated;");
    w.line("import com.hazelcast.client.impl.protocol.codec.builtin.*;");
    w.line("import com.hazelcast.client.impl.protocol.codec.custom.*;");
    w.line("import com.hazelcast.logging.Logger;");
    w.blank_line();
    w.line("import static com.hazelcast.client.impl.protocol.ClientMessage.*;");
    w.line("import static com.hazelcast.client.impl.protocol.codec.builtin.FixedSizeTypesCodec.*;");
    w.blank_line();
}

fn javadoc(w: &mut CodeWriter, doc: Option<&str>, since: Option<&str>) {
    if doc.is_none() && since.is_none() {
        return;
    }
    w.line("/**");
    if let Some(doc) = doc {
        w.comment(" * ", doc.trim());
    }
    if let Some(since) = since {
        w.line(format!(" * @since {since}"));
    }
    w.line(" */");
}

/// Offset constants for the fixed section, then the initial frame size.
fn offsets(w: &mut CodeWriter, prefix: &str, base: &str, plan: &MessagePlan<'_>) {
    let mut previous = base.to_string();
    for field in plan.fixed() {
        let name = offset_const(prefix, field.field);
        w.line(format!("private static final int {name} = {previous};"));
        previous = format!("{name} + {}", field.size());
    }
    w.line(format!(
        "private static final int {prefix}INITIAL_FRAME_SIZE = {previous};"
    ));
}

fn message_type(w: &mut CodeWriter, constant: &str, id: crate::message_id::MessageId) {
    w.line(format!("//hex: {id}"));
    w.line(format!(
        "public static final int {constant} = {};",
        id.value()
    ));
}

fn parameter_list(plan: &MessagePlan<'_>) -> String {
    plan.fields
        .iter()
        .map(|f| format!("{} {}", f.hook.lang_type, f.param))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes the fixed section into `initialFrame` and adds the framed fields.
fn encode_fields<'a>(
    w: &mut CodeWriter,
    prefix: &str,
    plan: &MessagePlan<'a>,
    value_of: &dyn Fn(&PlannedField<'a>) -> String,
) {
    for field in plan.fixed() {
        let offset = offset_const(prefix, field.field);
        let value = encode_value(field.field, &value_of(field));
        w.line(format!(
            "{};",
            field.hook.op.invoke(&["initialFrame.content", &offset, &value])
        ));
    }
    w.line("clientMessage.add(initialFrame);");
    for field in plan.variable() {
        let value = value_of(field);
        let call = field.hook.op.invoke(&["clientMessage", &value]);
        if field.field.nullable {
            w.line(format!("if ({value} == null) {{"));
            w.line(format!("{INDENT}clientMessage.add(NULL_FRAME.copy());"));
            w.line("} else {");
            w.line(format!("{INDENT}{call};"));
            w.line("}");
        } else {
            w.line(format!("{call};"));
        }
    }
}

/// Reads every field into `target(field) = ...` statements.
fn decode_fields<'a>(
    w: &mut CodeWriter,
    prefix: &str,
    plan: &MessagePlan<'a>,
    target: &dyn Fn(&PlannedField<'a>) -> String,
) {
    if plan.fixed.is_empty() {
        w.line("//empty initial frame");
        w.line("iterator.next();");
    } else {
        w.line("ClientMessage.Frame initialFrame = iterator.next();");
    }
    for field in plan.fixed() {
        let offset = offset_const(prefix, field.field);
        let read = decode_value(field, field.hook.op.invoke(&["initialFrame.content", &offset]));
        w.line(format!("{} = {read};", target(field)));
    }
    for field in plan.variable() {
        let read = field.hook.op.invoke(&["iterator"]);
        if field.field.nullable {
            w.line(format!(
                "{} = CodecUtil.nextFrameIsNullEndFrame(iterator) ? null : {read};",
                target(field)
            ));
        } else {
            w.line(format!("{} = {read};", target(field)));
        }
    }
}

fn parameters_class(w: &mut CodeWriter, class: &str, plan: &MessagePlan<'_>) -> Rendered {
    w.line("@edu.umd.cs.findbugs.annotations.SuppressFBWarnings({\"URF_UNREAD_PUBLIC_OR_PROTECTED_FIELD\"})");
    w.block(&format!("public static class {class}"), |w| {
        for (i, field) in plan.fields.iter().enumerate() {
            if i > 0 {
                w.blank_line();
            }
            javadoc(w, field.field.doc.as_deref(), field.field.since.as_deref());
            w.line(format!("public {} {};", field.hook.lang_type, field.param));
        }
        Ok(())
    })
}

/// A complete `{Service}{Method}Codec.java`.
pub(super) fn method_codec(
    scope: &Scope<'_>,
    service_name: &str,
    method: &Method,
) -> Result<String, UnsupportedType> {
    let (request_enc, request_dec) = scope.plan_both(&method.request)?;
    let (response_enc, response_dec) = scope.plan_both(&method.response)?;
    let mut events = Vec::with_capacity(method.events.len());
    for (index, event) in method.events.iter().enumerate() {
        let (enc, dec) = scope.plan_both(event)?;
        events.push((index, event, enc, dec));
    }

    let class = class_name(service_name, &method.name);
    let operation = format!("{}.{}", capital(service_name), capital(&method.name));
    let mut w = CodeWriter::new(INDENT);
    header(&mut w, scope);
    javadoc(&mut w, method.doc.as_deref(), method.since.as_deref());
    w.line(format!("@Generated(\"{CODEC_HASH_PLACEHOLDER}\")"));
    w.block::<UnsupportedType>(&format!("public final class {class}"), |w| {
        message_type(w, "REQUEST_MESSAGE_TYPE", method.request.id);
        message_type(w, "RESPONSE_MESSAGE_TYPE", method.response.id);
        offsets(w, "REQUEST_", REQUEST_BASE_OFFSET, &request_enc);
        offsets(w, "RESPONSE_", RESPONSE_BASE_OFFSET, &response_enc);
        for (index, event, enc, _) in &events {
            let prefix = format!("EVENT_{}_", to_upper_snake_case(&event_label(*index, event)));
            message_type(w, &format!("{prefix}MESSAGE_TYPE"), event.id);
            offsets(w, &prefix, EVENT_BASE_OFFSET, enc);
        }
        w.blank_line();
        w.block::<UnsupportedType>(&format!("private {class}()"), |_| Ok(()))?;
        w.blank_line();

        parameters_class(w, "RequestParameters", &request_dec)?;
        w.blank_line();
        w.block::<UnsupportedType>(
            &format!(
                "public static ClientMessage encodeRequest({})",
                parameter_list(&request_enc)
            ),
            |w| {
                w.line("ClientMessage clientMessage = ClientMessage.createForEncode();");
                w.line(format!("clientMessage.setOperationName(\"{operation}\");"));
                w.line("ClientMessage.Frame initialFrame = new ClientMessage.Frame(new byte[REQUEST_INITIAL_FRAME_SIZE], UNFRAGMENTED_MESSAGE);");
                w.line("encodeInt(initialFrame.content, TYPE_FIELD_OFFSET, REQUEST_MESSAGE_TYPE);");
                w.line("encodeInt(initialFrame.content, PARTITION_ID_FIELD_OFFSET, -1);");
                encode_fields(w, "REQUEST_", &request_enc, &|f| f.param.clone());
                w.line("return clientMessage;");
                Ok(())
            },
        )?;
        w.blank_line();
        w.block::<UnsupportedType>(
            &format!("public static {class}.RequestParameters decodeRequest(ClientMessage clientMessage)"),
            |w| {
                w.line("ClientMessage.ForwardFrameIterator iterator = clientMessage.frameIterator();");
                w.line("RequestParameters request = new RequestParameters();");
                decode_fields(w, "REQUEST_", &request_dec, &|f| format!("request.{}", f.param));
                w.line("return request;");
                Ok(())
            },
        )?;
        w.blank_line();

        parameters_class(w, "ResponseParameters", &response_dec)?;
        w.blank_line();
        w.block::<UnsupportedType>(
            &format!(
                "public static ClientMessage encodeResponse({})",
                parameter_list(&response_enc)
            ),
            |w| {
                w.line("ClientMessage clientMessage = ClientMessage.createForEncode();");
                w.line("ClientMessage.Frame initialFrame = new ClientMessage.Frame(new byte[RESPONSE_INITIAL_FRAME_SIZE], UNFRAGMENTED_MESSAGE);");
                w.line("encodeInt(initialFrame.content, TYPE_FIELD_OFFSET, RESPONSE_MESSAGE_TYPE);");
                encode_fields(w, "RESPONSE_", &response_enc, &|f| f.param.clone());
                w.line("return clientMessage;");
                Ok(())
            },
        )?;
        w.blank_line();
        w.block::<UnsupportedType>(
            &format!("public static {class}.ResponseParameters decodeResponse(ClientMessage clientMessage)"),
            |w| {
                w.line("ClientMessage.ForwardFrameIterator iterator = clientMessage.frameIterator();");
                w.line("ResponseParameters response = new ResponseParameters();");
                decode_fields(w, "RESPONSE_", &response_dec, &|f| format!("response.{}", f.param));
                w.line("return response;");
                Ok(())
            },
        )?;

        for (index, event, enc, _) in &events {
            let label = event_label(*index, event);
            let prefix = format!("EVENT_{}_", to_upper_snake_case(&label));
            w.blank_line();
            w.block::<UnsupportedType>(
                &format!(
                    "public static ClientMessage encode{label}Event({})",
                    parameter_list(enc)
                ),
                |w| {
                    w.line("ClientMessage clientMessage = ClientMessage.createForEncode();");
                    w.line(format!("ClientMessage.Frame initialFrame = new ClientMessage.Frame(new byte[{prefix}INITIAL_FRAME_SIZE], UNFRAGMENTED_MESSAGE);"));
                    w.line("initialFrame.flags |= ClientMessage.IS_EVENT_FLAG;");
                    w.line(format!("encodeInt(initialFrame.content, TYPE_FIELD_OFFSET, {prefix}MESSAGE_TYPE);"));
                    w.line("encodeInt(initialFrame.content, PARTITION_ID_FIELD_OFFSET, -1);");
                    encode_fields(w, &prefix, enc, &|f| f.param.clone());
                    w.line("return clientMessage;");
                    Ok(())
                },
            )?;
        }

        if !events.is_empty() {
            w.blank_line();
            event_handler(w, &events)?;
        }
        Ok(())
    })?;

    Ok(w.finish())
}

type PlannedEvent<'a> = (usize, &'a crate::model::Message, MessagePlan<'a>, MessagePlan<'a>);

fn event_handler(w: &mut CodeWriter, events: &[PlannedEvent<'_>]) -> Rendered {
    w.block("public abstract static class AbstractEventHandler", |w| {
        w.block::<UnsupportedType>("public void handle(ClientMessage clientMessage)", |w| {
            w.line("int messageType = clientMessage.getMessageType();");
            w.line("ClientMessage.ForwardFrameIterator iterator = clientMessage.frameIterator();");
            for (index, event, _, dec) in events {
                let label = event_label(*index, event);
                let prefix = format!("EVENT_{}_", to_upper_snake_case(&label));
                w.block(&format!("if (messageType == {prefix}MESSAGE_TYPE)"), |w| {
                    decode_fields(w, &prefix, dec, &|f| {
                        format!("{} {}", f.hook.lang_type, f.param)
                    });
                    let args: Vec<&str> = dec.fields.iter().map(|f| f.param.as_str()).collect();
                    w.line(format!("handle{label}Event({});", args.join(", ")));
                    w.line("return;");
                    Ok::<_, UnsupportedType>(())
                })?;
            }
            w.line("Logger.getLogger(super.getClass()).finest(\"Unknown message type received on event handler :\" + messageType);");
            Ok(())
        })?;
        for (index, event, _, dec) in events {
            let label = event_label(*index, event);
            w.blank_line();
            w.line(format!(
                "public abstract void handle{label}Event({});",
                parameter_list(dec)
            ));
        }
        Ok(())
    })
}

/// A complete `{Name}Codec.java` for a custom type.
pub(super) fn custom_codec(scope: &Scope<'_>, codec: &CustomType) -> Result<String, UnsupportedType> {
    let enc = scope.plan(&codec.fields, Direction::Encode)?;
    let dec = scope.plan(&codec.fields, Direction::Decode)?;
    let type_name = scope.support.transliterate(&codec.name);
    let class = format!("{type_name}Codec");
    let var = scope.support.escape_keyword(&uncapital(&type_name));

    let mut w = CodeWriter::new(INDENT);
    header(&mut w, scope);
    javadoc(&mut w, None, codec.since.as_deref());
    w.line(format!("@Generated(\"{CODEC_HASH_PLACEHOLDER}\")"));
    w.block::<UnsupportedType>(&format!("public final class {class}"), |w| {
        if !enc.fixed.is_empty() {
            offsets(w, "", "0", &enc);
            w.blank_line();
        }
        w.block(&format!("private {class}()"), |_| Ok::<_, UnsupportedType>(()))?;
        w.blank_line();

        w.block::<UnsupportedType>(
            &format!("public static void encode(ClientMessage clientMessage, {type_name} {var})"),
            |w| {
                w.line("clientMessage.add(BEGIN_FRAME.copy());");
                w.blank_line();
                let getter = |f: &PlannedField<'_>| format!("{var}.get{}()", capital(&f.field.name));
                if enc.fixed.is_empty() {
                    for field in enc.variable() {
                        let value = getter(field);
                        w.line(format!("{};", field.hook.op.invoke(&["clientMessage", &value])));
                    }
                } else {
                    w.line("ClientMessage.Frame initialFrame = new ClientMessage.Frame(new byte[INITIAL_FRAME_SIZE]);");
                    encode_fields(w, "", &enc, &getter);
                }
                w.blank_line();
                w.line("clientMessage.add(END_FRAME.copy());");
                Ok(())
            },
        )?;
        w.blank_line();

        w.block::<UnsupportedType>(
            &format!("public static {type_name} decode(ClientMessage.ForwardFrameIterator iterator)"),
            |w| {
                w.line("// begin frame");
                w.line("iterator.next();");
                w.blank_line();
                let local = |f: &PlannedField<'_>| format!("{} {}", f.hook.lang_type, f.param);
                if dec.fixed.is_empty() {
                    for field in dec.variable() {
                        w.line(format!("{} = {};", local(field), field.hook.op.invoke(&["iterator"])));
                    }
                } else {
                    decode_fields(w, "", &dec, &local);
                }
                w.blank_line();
                w.line("fastForwardToEndFrame(iterator);");
                w.blank_line();
                let args: Vec<&str> = dec.fields.iter().map(|f| f.param.as_str()).collect();
                w.line(format!("return new {type_name}({});", args.join(", ")));
                Ok(())
            },
        )
    })?;

    Ok(w.finish())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::classify::TypeRegistry;
    use crate::lang::{JavaSupport, TypeEnv};
    use crate::message_id::Role;
    use crate::template::test_support::*;

    fn render_method(method: &Method) -> Result<String, UnsupportedType> {
        let registry = TypeRegistry::default();
        let custom = BTreeSet::new();
        let scope = Scope {
            support: &JavaSupport,
            env: TypeEnv::new(&registry, &custom),
            namespace: "com.example.protocol.codec",
        };
        method_codec(&scope, "map", method)
    }

    #[test]
    fn method_codec_embeds_ids_and_placeholder() {
        let text = render_method(&map_put()).unwrap();

        assert!(text.starts_with("package com.example.protocol.codec;\n"));
        assert!(text.contains("@Generated(\"!codec_hash!\")"));
        assert!(text.contains("public final class MapPutCodec {"));
        assert!(text.contains("    //hex: 0x010100\n    public static final int REQUEST_MESSAGE_TYPE = 65792;"));
        assert!(text.contains("public static final int RESPONSE_MESSAGE_TYPE = 65793;"));
        assert!(text.contains(" * @since 2.0"));
    }

    #[test]
    fn fixed_fields_get_offsets_and_variable_fields_get_frames() {
        let text = render_method(&map_put()).unwrap();

        assert!(text.contains(
            "private static final int REQUEST_TTL_FIELD_OFFSET = PARTITION_ID_FIELD_OFFSET + INT_SIZE_IN_BYTES;"
        ));
        assert!(text.contains(
            "private static final int REQUEST_INITIAL_FRAME_SIZE = REQUEST_TTL_FIELD_OFFSET + 8;"
        ));
        assert!(text.contains(
            "public static ClientMessage encodeRequest(java.lang.String key, java.lang.String value, long ttl) {"
        ));
        assert!(text.contains(
            "FixedSizeTypesCodec.encodeLong(initialFrame.content, REQUEST_TTL_FIELD_OFFSET, ttl);"
        ));
        assert!(text.contains("StringCodec.encode(clientMessage, key);"));
        assert!(text.contains("request.key = StringCodec.decode(iterator);"));
        assert!(text.contains("clientMessage.setOperationName(\"Map.Put\");"));
    }

    #[test]
    fn events_get_constants_encoders_and_a_handler() {
        let mut method = map_put();
        method.events.push(message(
            1,
            1,
            Role::Event(0),
            vec![field("key", "String"), field("eventType", "Int32")],
        ));
        method.events[0].name = Some("entry".to_string());
        let text = render_method(&method).unwrap();

        assert!(text.contains("//hex: 0x010102"));
        assert!(text.contains("public static final int EVENT_ENTRY_MESSAGE_TYPE = 65794;"));
        assert!(text.contains("EVENT_ENTRY_EVENT_TYPE_FIELD_OFFSET"));
        assert!(text.contains("public static ClientMessage encodeEntryEvent(java.lang.String key, int eventType) {"));
        assert!(text.contains("public abstract static class AbstractEventHandler {"));
        assert!(text.contains("public abstract void handleEntryEvent(java.lang.String key, int eventType);"));
    }

    #[test]
    fn nullable_variable_fields_use_null_frames() {
        let mut method = map_put();
        method.request.fields[1].nullable = true;
        let text = render_method(&method).unwrap();

        assert!(text.contains("if (value == null) {"));
        assert!(text.contains("clientMessage.add(NULL_FRAME.copy());"));
        assert!(text.contains(
            "request.value = CodecUtil.nextFrameIsNullEndFrame(iterator) ? null : StringCodec.decode(iterator);"
        ));
    }

    #[test]
    fn unmappable_list_item_skips_the_codec() {
        let mut method = map_put();
        method.response.fields.push(field("sizes", "List_Int16"));

        assert_eq!(render_method(&method), Err(UnsupportedType("Int16".into())));
    }

    #[test]
    fn custom_codec_frames_its_fields() {
        let registry = TypeRegistry::default();
        let custom = BTreeSet::from(["Address".to_string()]);
        let scope = Scope {
            support: &JavaSupport,
            env: TypeEnv::new(&registry, &custom),
            namespace: "com.example.protocol.codec.custom",
        };
        let text = custom_codec(&scope, &address()).unwrap();

        assert!(text.contains("public final class AddressCodec {"));
        assert!(text.contains("private static final int PORT_FIELD_OFFSET = 0;"));
        assert!(text.contains("private static final int INITIAL_FRAME_SIZE = PORT_FIELD_OFFSET + 4;"));
        assert!(text.contains("public static void encode(ClientMessage clientMessage, Address address) {"));
        assert!(text.contains(
            "FixedSizeTypesCodec.encodeInt(initialFrame.content, PORT_FIELD_OFFSET, address.getPort());"
        ));
        assert!(text.contains("StringCodec.encode(clientMessage, address.getHost());"));
        assert!(text.contains("int port = FixedSizeTypesCodec.decodeInt(initialFrame.content, PORT_FIELD_OFFSET);"));
        assert!(text.contains("return new Address(host, port);"));
    }
}
