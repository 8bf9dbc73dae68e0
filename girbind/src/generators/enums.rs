//! Enum file generation — one `enums.ts` per namespace holding every
//! enumeration and bitfield plus the namespace's constants. All per-enum
//! imports elsewhere point at this file.

use tracing::debug;

use crate::model::{ConstantValue, Enumeration, Namespace};
use crate::naming;

use super::GeneratedFile;

/// Emit the namespace's `enums.ts`, or `None` when there is nothing to put
/// in it.
pub fn generate_enums_file(ns: &Namespace) -> Option<GeneratedFile> {
    if ns.enums.is_empty() && ns.bitfields.is_empty() && ns.constants.is_empty() {
        return None;
    }

    let mut blocks: Vec<String> = Vec::new();
    for en in ns.enums.values() {
        blocks.push(write_enum(en));
    }
    for bf in ns.bitfields.values() {
        blocks.push(write_enum(bf));
    }

    let mut constants: Vec<String> = Vec::new();
    for c in ns.constants.values() {
        let value = match &c.value {
            ConstantValue::Int(v) => v.to_string(),
            ConstantValue::Float(v) => v.to_string(),
            ConstantValue::Bool(v) => v.to_string(),
            ConstantValue::String(s) => format!("\"{}\"", escape_ts_string(s)),
        };
        constants.push(format!("export const {} = {value};", c.name));
    }
    if !constants.is_empty() {
        blocks.push(constants.join("\n"));
    }

    debug!(
        namespace = %ns.name,
        enums = ns.enums.len(),
        bitfields = ns.bitfields.len(),
        constants = ns.constants.len(),
        "generated enums file"
    );

    Some(GeneratedFile {
        file_name: "enums.ts".to_string(),
        source: blocks.join("\n\n") + "\n",
    })
}

fn write_enum(en: &Enumeration) -> String {
    let mut out = format!("export enum {} {{\n", en.name);
    for member in &en.members {
        out.push_str(&format!(
            "  {} = {},\n",
            naming::escape_reserved(&naming::to_camel_case(&member.name)),
            member.value
        ));
    }
    out.push('}');
    out
}

fn escape_ts_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
