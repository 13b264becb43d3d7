//! C++ codec templates.
//!
//! Method codecs are fragments appended to the consolidated `codecs.h` and
//! `codecs.cpp`; the namespace and includes come from the boilerplate. Custom
//! type codecs are standalone header/source pairs.

use crate::code_writer::CodeWriter;
use crate::lang::UnsupportedType;
use crate::message_id::MessageId;
use crate::model::{CustomType, Message, Method};
use crate::naming::{to_snake_case, to_upper_snake_case};
use crate::template::{
    CODEC_HASH_PLACEHOLDER, Direction, MessagePlan, PlannedField, Scope, event_label,
};

const INDENT: &str = "    ";

fn struct_name(service_name: &str, method_name: &str) -> String {
    format!(
        "{}_{}_codec",
        to_snake_case(service_name),
        to_snake_case(method_name)
    )
}

/// `const std::string &` + `key` reads `const std::string &key`.
fn declare(lang_type: &str, name: &str) -> String {
    if lang_type.ends_with('&') || lang_type.ends_with('*') {
        format!("{lang_type}{name}")
    } else {
        format!("{lang_type} {name}")
    }
}

/// Nullable framed parameters are passed by pointer.
fn encode_param(encode: &PlannedField<'_>, decode: &PlannedField<'_>) -> String {
    if encode.field.nullable && !encode.hook.op.is_fixed() {
        declare(&format!("const {} *", decode.hook.lang_type), &encode.param)
    } else {
        declare(&encode.hook.lang_type, &encode.param)
    }
}

fn parameter_list(encode: &MessagePlan<'_>, decode: &MessagePlan<'_>) -> String {
    encode
        .fields
        .iter()
        .zip(&decode.fields)
        .map(|(e, d)| encode_param(e, d))
        .collect::<Vec<_>>()
        .join(", ")
}

fn doc_comment(w: &mut CodeWriter, doc: Option<&str>) {
    if let Some(doc) = doc {
        w.line("/**");
        w.comment(" * ", doc.trim());
        w.line(" */");
    }
}

fn message_type(w: &mut CodeWriter, constant: &str, id: MessageId) {
    w.line(format!("//hex: {id}"));
    w.line(format!(
        "static constexpr int32_t {constant} = {};",
        id.value()
    ));
}

fn event_constant(index: usize, event: &Message) -> String {
    format!(
        "EVENT_{}_MESSAGE_TYPE",
        to_upper_snake_case(&event_label(index, event))
    )
}

fn event_handler_name(index: usize, event: &Message) -> String {
    format!("handle_{}", to_snake_case(&event_label(index, event)))
}

/// `msg.set(...)` for every field, fixed section first. The last frame
/// closes the message.
fn encode_fields(w: &mut CodeWriter, plan: &MessagePlan<'_>) {
    for field in plan.fixed() {
        w.line(format!("{};", field.hook.op.invoke(&[&field.param])));
    }
    let last = plan.variable.len().saturating_sub(1);
    for (i, field) in plan.variable().enumerate() {
        let mut args = vec![field.param.as_str()];
        if i == last {
            args.push("true");
        }
        if field.field.nullable {
            w.line(format!("msg.set_nullable({});", args.join(", ")));
        } else {
            w.line(format!("{};", field.hook.op.invoke(&args)));
        }
    }
}

fn decode_fields(w: &mut CodeWriter, plan: &MessagePlan<'_>) {
    for field in plan.fixed() {
        w.line(format!("auto {} = {};", field.param, field.hook.op.invoke(&[])));
    }
    for field in plan.variable() {
        if field.field.nullable {
            w.line(format!(
                "auto {} = msg.get_nullable<{}>();",
                field.param, field.hook.lang_type
            ));
        } else {
            w.line(format!("auto {} = {};", field.param, field.hook.op.invoke(&[])));
        }
    }
}

struct PlannedMethod<'m> {
    request: (MessagePlan<'m>, MessagePlan<'m>),
    events: Vec<(usize, &'m Message, MessagePlan<'m>, MessagePlan<'m>)>,
}

/// The C++ client never decodes responses in generated code, so only the
/// request and events have to be mappable.
fn plan_method<'m>(scope: &Scope<'_>, method: &'m Method) -> Result<PlannedMethod<'m>, UnsupportedType> {
    let request = scope.plan_both(&method.request)?;
    let mut events = Vec::with_capacity(method.events.len());
    for (index, event) in method.events.iter().enumerate() {
        let (enc, dec) = scope.plan_both(event)?;
        events.push((index, event, enc, dec));
    }
    Ok(PlannedMethod { request, events })
}

/// Declarations for one method, appended to `codecs.h`.
pub(super) fn method_header(
    scope: &Scope<'_>,
    service_name: &str,
    method: &Method,
) -> Result<String, UnsupportedType> {
    let planned = plan_method(scope, method)?;
    let name = struct_name(service_name, &method.name);
    let (request_enc, request_dec) = &planned.request;

    let mut w = CodeWriter::new(INDENT);
    w.line(format!("// Generated(\"{CODEC_HASH_PLACEHOLDER}\")"));
    doc_comment(&mut w, method.doc.as_deref());
    w.block_with_close::<UnsupportedType>(&format!("struct HAZELCAST_API {name}"), "};", |w| {
        message_type(w, "REQUEST_MESSAGE_TYPE", method.request.id);
        message_type(w, "RESPONSE_MESSAGE_TYPE", method.response.id);
        for (index, event, _, _) in &planned.events {
            message_type(w, &event_constant(*index, event), event.id);
        }
        w.line(format!(
            "static constexpr size_t REQUEST_INITIAL_FRAME_SIZE = ClientMessage::REQUEST_HEADER_LEN + {};",
            request_enc.initial_frame_size()
        ));
        w.blank_line();
        w.line(format!(
            "static ClientMessage encode_request({});",
            parameter_list(request_enc, request_dec)
        ));

        if !planned.events.is_empty() {
            w.blank_line();
            w.block_with_close::<UnsupportedType>(
                "class HAZELCAST_API event_handler : public impl::BaseEventHandler",
                "};",
                |w| {
                    w.line("public:");
                    w.line("virtual ~event_handler() = default;");
                    w.blank_line();
                    w.line("void handle(ClientMessage &msg);");
                    for (index, event, enc, dec) in &planned.events {
                        w.blank_line();
                        w.line(format!(
                            "virtual void {}({}) = 0;",
                            event_handler_name(*index, event),
                            parameter_list(enc, dec)
                        ));
                    }
                    Ok(())
                },
            )?;
        }
        Ok(())
    })?;
    w.blank_line();

    Ok(w.finish())
}

/// Definitions for one method, appended to `codecs.cpp`.
pub(super) fn method_source(
    scope: &Scope<'_>,
    service_name: &str,
    method: &Method,
) -> Result<String, UnsupportedType> {
    let planned = plan_method(scope, method)?;
    let name = struct_name(service_name, &method.name);
    let (request_enc, request_dec) = &planned.request;
    let operation = format!("{}.{}", service_name, method.name);

    let mut w = CodeWriter::new(INDENT);
    w.block::<UnsupportedType>(
        &format!(
            "ClientMessage {name}::encode_request({})",
            parameter_list(request_enc, request_dec)
        ),
        |w| {
            w.line("ClientMessage msg(REQUEST_INITIAL_FRAME_SIZE);");
            w.line("msg.set_retryable(false);");
            w.line(format!("msg.set_operation_name(\"{operation}\");"));
            w.blank_line();
            w.line(format!("//hex: {}", method.request.id));
            w.line("msg.set_message_type(REQUEST_MESSAGE_TYPE);");
            w.line("msg.set_partition_id(-1);");
            w.blank_line();
            encode_fields(w, request_enc);
            w.line("return msg;");
            Ok(())
        },
    )?;
    w.blank_line();

    if !planned.events.is_empty() {
        w.block::<UnsupportedType>(&format!("void {name}::event_handler::handle(ClientMessage &msg)"), |w| {
            w.line("auto message_type = msg.get_message_type();");
            w.block("switch (message_type)", |w| {
                for (index, event, _, dec) in &planned.events {
                    w.block(&format!("case {}:", event_constant(*index, event)), |w| {
                        decode_fields(w, dec);
                        let args: Vec<&str> = dec.fields.iter().map(|f| f.param.as_str()).collect();
                        w.line(format!(
                            "{}({});",
                            event_handler_name(*index, event),
                            args.join(", ")
                        ));
                        w.line("return;");
                        Ok::<_, UnsupportedType>(())
                    })?;
                }
                w.line("default:");
                w.indented(|w| {
                    w.line("HZ_LOG(*get_logger(), warning, boost::str(boost::format(\"[event_handler::handle] Unknown message type (%1%) received on event handler.\") % message_type));");
                    Ok(())
                })
            })
        })?;
        w.blank_line();
    }

    Ok(w.finish())
}

fn guard(name: &str) -> String {
    format!("{}_CODEC_H", to_upper_snake_case(name))
}

/// `{name}_codec.h`.
pub(super) fn custom_header(scope: &Scope<'_>, codec: &CustomType) -> Result<String, UnsupportedType> {
    scope.plan(&codec.fields, Direction::Encode)?;
    let type_name = scope.support.transliterate(&codec.name);
    let var = scope.support.param_name(&type_name);
    let struct_name = format!("{}_codec", codec.name.to_lowercase());

    let mut w = CodeWriter::new(INDENT);
    w.line(format!("// Generated(\"{CODEC_HASH_PLACEHOLDER}\")"));
    w.line(format!("#ifndef {}", guard(&type_name)));
    w.line(format!("#define {}", guard(&type_name)));
    w.blank_line();
    w.line("#include \"hazelcast/client/protocol/ClientMessage.h\"");
    w.blank_line();
    w.block::<UnsupportedType>(&format!("namespace {}", scope.namespace), |w| {
        w.block_with_close(&format!("struct HAZELCAST_API {struct_name}"), "};", |w| {
            w.line(format!(
                "static void encode(ClientMessage &msg, const {type_name} &{var});"
            ));
            w.blank_line();
            w.line(format!("static {type_name} decode(ClientMessage &msg);"));
            Ok(())
        })
    })?;
    w.blank_line();
    w.line(format!("#endif // {}", guard(&type_name)));

    Ok(w.finish())
}

/// `{name}_codec.cpp`.
pub(super) fn custom_source(scope: &Scope<'_>, codec: &CustomType) -> Result<String, UnsupportedType> {
    let enc = scope.plan(&codec.fields, Direction::Encode)?;
    let dec = scope.plan(&codec.fields, Direction::Decode)?;
    let type_name = scope.support.transliterate(&codec.name);
    let var = scope.support.param_name(&type_name);
    let struct_name = format!("{}_codec", codec.name.to_lowercase());

    let mut w = CodeWriter::new(INDENT);
    w.line(format!("// Generated(\"{CODEC_HASH_PLACEHOLDER}\")"));
    w.line(format!("#include \"{struct_name}.h\""));
    w.blank_line();
    w.block::<UnsupportedType>(&format!("namespace {}", scope.namespace), |w| {
        w.block(
            &format!("void {struct_name}::encode(ClientMessage &msg, const {type_name} &{var})"),
            |w| {
                w.line("msg.add_begin_frame();");
                for field in enc.fixed().chain(enc.variable()) {
                    let value = format!("{var}.{}", field.param);
                    w.line(format!("{};", field.hook.op.invoke(&[&value])));
                }
                w.line("msg.add_end_frame();");
                Ok::<_, UnsupportedType>(())
            },
        )?;
        w.blank_line();
        w.block(&format!("{type_name} {struct_name}::decode(ClientMessage &msg)"), |w| {
            w.line("// begin frame");
            w.line("msg.skip_frame();");
            decode_fields(w, &dec);
            w.line("msg.fast_forward_to_end_frame();");
            let args: Vec<&str> = dec.fields.iter().map(|f| f.param.as_str()).collect();
            w.line(format!("return {type_name}{{{}}};", args.join(", ")));
            Ok(())
        })
    })?;

    Ok(w.finish())
}
