//! XML schema loader (C2): turns an ordered list of ZCL profile files
//! into a `Schema`.
//!
//! Grounded on a plain pull-parser walk over `quick_xml::Reader`, the
//! shape this workspace's other XML-consuming crates use rather than a
//! DOM-building parser: the schema files are shallow and this avoids
//! pulling in a second parsing model just for two levels of nesting.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::codec::{tag, type_code};
use crate::error::ZclError;
use crate::schema::{Attribute, Cluster, CommandParam, CommandPrototype, Enum, Schema};
use crate::types::DataType;

/// Loads and merges `paths` in order into one `Schema`. Later files may
/// extend clusters defined by earlier ones (matched by `code`); within
/// a single cluster a same-named command or attribute is overwritten,
/// last-wins, with a logged warning (see `Cluster::insert_command`).
pub fn load_files(paths: &[impl AsRef<Path>]) -> Result<Schema, ZclError> {
    let mut schema = Schema::default();
    for path in paths {
        load_file(path.as_ref(), &mut schema)?;
    }
    Ok(schema)
}

fn load_file(path: &Path, schema: &mut Schema) -> Result<(), ZclError> {
    let path_str = path.display().to_string();
    let xml = std::fs::read_to_string(path).map_err(|e| ZclError::XmlParse {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(|e| ZclError::XmlParse {
            path: path_str.clone(),
            reason: e.to_string(),
        })? {
            Event::Eof => break,
            Event::Start(ref e) if e.name().as_ref() == b"cluster" => {
                let cluster = read_cluster(&mut reader, e, &path_str, false)?;
                schema.register_cluster(cluster);
            }
            Event::Start(ref e) if e.name().as_ref() == b"clusterExtension" => {
                let cluster = read_cluster(&mut reader, e, &path_str, true)?;
                schema.register_cluster(cluster);
            }
            Event::Start(ref e) if e.name().as_ref() == b"enum" => {
                let e = read_enum(&mut reader, e, &path_str)?;
                schema.register_enum(e);
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn attr_value(tag: &BytesStart, name: &str) -> Option<String> {
    tag.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn parse_int(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        raw.parse().ok()
    }
}

fn type_by_name(name: &str) -> DataType {
    let name = name.trim().to_uppercase();
    let code = match name.as_str() {
        "NO_DATA" => 0x00,
        "DATA8" => 0x08,
        "DATA16" => 0x09,
        "DATA24" => 0x0A,
        "DATA32" => 0x0B,
        "DATA40" => 0x0C,
        "DATA48" => 0x0D,
        "DATA56" => 0x0E,
        "DATA64" => 0x0F,
        "BOOLEAN" => 0x10,
        "BITMAP8" => 0x18,
        "BITMAP16" => 0x19,
        "BITMAP24" => 0x1A,
        "BITMAP32" => 0x1B,
        "BITMAP40" => 0x1C,
        "BITMAP48" => 0x1D,
        "BITMAP56" => 0x1E,
        "BITMAP64" => 0x1F,
        "INT8U" => 0x20,
        "INT16U" => 0x21,
        "INT24U" => 0x22,
        "INT32U" => 0x23,
        "INT40U" => 0x24,
        "INT48U" => 0x25,
        "INT56U" => 0x26,
        "INT64U" => 0x27,
        "INT8S" => 0x28,
        "INT16S" => 0x29,
        "INT24S" => 0x2A,
        "INT32S" => 0x2B,
        "INT40S" => 0x2C,
        "INT48S" => 0x2D,
        "INT56S" => 0x2E,
        "INT64S" => 0x2F,
        "ENUM8" => 0x30,
        "ENUM16" => 0x31,
        "FLOAT_SEMI" => 0x38,
        "FLOAT_SINGLE" => 0x39,
        "FLOAT_DOUBLE" => 0x3A,
        "OCTET_STRING" => 0x41,
        "CHAR_STRING" => 0x42,
        "LONG_OCTET_STRING" => 0x43,
        "LONG_CHAR_STRING" => 0x44,
        "ARRAY" => 0x48,
        "STRUCT" => 0x4C,
        "SET" => 0x50,
        "BAG" => 0x51,
        "TIME_OF_DAY" => 0xE0,
        "DATE" => 0xE1,
        "UTC_TIME" => 0xE2,
        "CLUSTER_ID" => 0xE8,
        "ATTRIBUTE_ID" => 0xE9,
        "BACNET_OID" => 0xEA,
        "IEEE_ADDRESS" => 0xF0,
        "SECURITY_KEY" => 0xF1,
        _ => {
            tracing::warn!(type_name = %name, "unrecognized ZCL type name in schema, assuming UNKNOWN");
            0xFF
        }
    };
    tag(code)
}

fn read_cluster(
    reader: &mut Reader<&[u8]>,
    open: &BytesStart,
    path: &str,
    extension: bool,
) -> Result<Cluster, ZclError> {
    let element = if extension { "clusterExtension" } else { "cluster" };
    let mut cluster = Cluster::default();
    if let Some(code) = attr_value(open, "code").and_then(|s| parse_int(&s)) {
        cluster.code = code as u16;
    } else if extension {
        return Err(ZclError::XmlMissingField {
            path: path.to_string(),
            element: "clusterExtension",
            field: "code",
        });
    }

    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ZclError::XmlParse { path: path.to_string(), reason: e.to_string() })?
        {
            Event::End(ref e) if e.name().as_ref() == element.as_bytes() => break,
            Event::Start(ref e) if e.name().as_ref() == b"name" => {
                cluster.name = read_text(reader, path)?;
            }
            Event::Start(ref e) if e.name().as_ref() == b"define" => {
                cluster.define = read_text(reader, path)?;
            }
            Event::Start(ref e) if e.name().as_ref() == b"code" => {
                let text = read_text(reader, path)?;
                if let Some(v) = parse_int(&text) {
                    cluster.code = v as u16;
                }
            }
            Event::Start(ref e) if e.name().as_ref() == b"attribute" => {
                let attr = read_attribute(reader, e, cluster.code, path)?;
                cluster.insert_attribute(attr);
            }
            Event::Empty(ref e) if e.name().as_ref() == b"attribute" => {
                let attr = read_attribute_empty(e, cluster.code, path)?;
                cluster.insert_attribute(attr);
            }
            Event::Start(ref e) if e.name().as_ref() == b"command" => {
                let cmd = read_command(reader, e, cluster.code, path)?;
                cluster.insert_command(cmd);
            }
            Event::Eof => {
                return Err(ZclError::XmlParse {
                    path: path.to_string(),
                    reason: format!("unexpected eof inside <{element}>"),
                });
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(cluster)
}

fn read_text(reader: &mut Reader<&[u8]>, path: &str) -> Result<String, ZclError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ZclError::XmlParse { path: path.to_string(), reason: e.to_string() })?
        {
            Event::Text(t) => {
                text.push_str(&t.unescape().map_err(|e| ZclError::XmlParse {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?);
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(ZclError::XmlParse {
                    path: path.to_string(),
                    reason: "unexpected eof reading element text".into(),
                });
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text.trim().to_string())
}

fn read_attribute(
    reader: &mut Reader<&[u8]>,
    open: &BytesStart,
    cluster_code: u16,
    path: &str,
) -> Result<Attribute, ZclError> {
    let name = read_text(reader, path)?;
    build_attribute(open, cluster_code, name, path)
}

fn read_attribute_empty(
    open: &BytesStart,
    cluster_code: u16,
    path: &str,
) -> Result<Attribute, ZclError> {
    build_attribute(open, cluster_code, String::new(), path)
}

fn build_attribute(
    open: &BytesStart,
    cluster_code: u16,
    name: String,
    path: &str,
) -> Result<Attribute, ZclError> {
    let code = attr_value(open, "code")
        .and_then(|s| parse_int(&s))
        .ok_or_else(|| ZclError::XmlMissingField {
            path: path.to_string(),
            element: "attribute",
            field: "code",
        })? as u16;
    let type_name = attr_value(open, "type").ok_or_else(|| ZclError::XmlMissingField {
        path: path.to_string(),
        element: "attribute",
        field: "type",
    })?;
    let ty = type_by_name(&type_name);
    Ok(Attribute {
        cluster_code,
        code,
        name,
        r#type: ty,
        type_code: type_code(ty),
        size: ty.fixed_width().map(|w| w as u8),
    })
}

fn read_command(
    reader: &mut Reader<&[u8]>,
    open: &BytesStart,
    cluster_code: u16,
    path: &str,
) -> Result<CommandPrototype, ZclError> {
    let name = attr_value(open, "name").ok_or_else(|| ZclError::XmlMissingField {
        path: path.to_string(),
        element: "command",
        field: "name",
    })?;
    let code = attr_value(open, "code")
        .and_then(|s| parse_int(&s))
        .ok_or_else(|| ZclError::XmlMissingField {
            path: path.to_string(),
            element: "command",
            field: "code",
        })? as u8;

    let mut params = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ZclError::XmlParse { path: path.to_string(), reason: e.to_string() })?
        {
            Event::End(ref e) if e.name().as_ref() == b"command" => break,
            Event::Empty(ref e) if e.name().as_ref() == b"arg" => {
                params.push(read_arg(e, path)?);
            }
            Event::Start(ref e) if e.name().as_ref() == b"arg" => {
                params.push(read_arg(e, path)?);
            }
            Event::Eof => {
                return Err(ZclError::XmlParse {
                    path: path.to_string(),
                    reason: "unexpected eof inside <command>".into(),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(CommandPrototype {
        cluster_code,
        code,
        name,
        params,
    })
}

fn read_arg(open: &BytesStart, path: &str) -> Result<CommandParam, ZclError> {
    let name = attr_value(open, "name").ok_or_else(|| ZclError::XmlMissingField {
        path: path.to_string(),
        element: "arg",
        field: "name",
    })?;
    let type_name = attr_value(open, "type").ok_or_else(|| ZclError::XmlMissingField {
        path: path.to_string(),
        element: "arg",
        field: "type",
    })?;
    Ok(CommandParam {
        name,
        r#type: type_by_name(&type_name),
    })
}

fn read_enum(reader: &mut Reader<&[u8]>, open: &BytesStart, path: &str) -> Result<Enum, ZclError> {
    let name = attr_value(open, "name").ok_or_else(|| ZclError::XmlMissingField {
        path: path.to_string(),
        element: "enum",
        field: "name",
    })?;
    let mut items = HashMap::new();
    let mut buf = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ZclError::XmlParse { path: path.to_string(), reason: e.to_string() })?
        {
            Event::End(ref e) if e.name().as_ref() == b"enum" => break,
            Event::Empty(ref e) if e.name().as_ref() == b"item" => {
                let item_name = attr_value(e, "name").ok_or_else(|| ZclError::XmlMissingField {
                    path: path.to_string(),
                    element: "item",
                    field: "name",
                })?;
                let value = attr_value(e, "value")
                    .and_then(|s| parse_int(&s))
                    .ok_or_else(|| ZclError::XmlMissingField {
                        path: path.to_string(),
                        element: "item",
                        field: "value",
                    })?;
                items.insert(crate::schema::normalise_name(&item_name), value as i64);
            }
            Event::Eof => {
                return Err(ZclError::XmlParse {
                    path: path.to_string(),
                    reason: "unexpected eof inside <enum>".into(),
                });
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(Enum { name, items })
}
