//! XFDF record-file parser.
//!
//! Parses one respondent's form export into name/value field pairs. An XFDF
//! document carries its fields as:
//!
//! ```text
//! <xfdf xmlns="http://ns.adobe.com/xfdf/">
//!   <fields>
//!     <field name="Q1-IT"><value>Oui</value></field>
//!     <field name="Q2-Name1"><value>----</value></field>
//!   </fields>
//! </xfdf>
//! ```
//!
//! Only elements bound to the XFDF namespace are considered. A `field`
//! without a nested `value` element yields the empty string. No survey
//! semantics here - mapping field names onto the questionnaire schema is the
//! flattener's job.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::io::BufRead;
use thiserror::Error;

/// Namespace URI all form fields live under.
pub const XFDF_NAMESPACE: &str = "http://ns.adobe.com/xfdf/";

/// XFDF parsing error with context.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct XfdfError {
    pub message: String,
}

impl XfdfError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One parsed form field: explicit name attribute, at most one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XfdfField {
    pub name: String,
    pub value: String,
}

/// Parse an XFDF document into its field/value pairs, in document order.
///
/// Nested `field` elements are flattened the same way the fields were
/// exported: each closing `field` emits one pair.
pub fn parse_xfdf<R: BufRead>(input: R) -> Result<Vec<XfdfField>, XfdfError> {
    let mut reader = NsReader::from_reader(input);
    let mut buf = Vec::new();
    let mut fields: Vec<XfdfField> = Vec::new();
    // Open field elements, innermost last; the Option fills while its value
    // element is being read.
    let mut open_fields: Vec<(String, Option<String>)> = Vec::new();
    let mut in_value = false;
    // Open elements of any kind; a document ending with a non-zero depth is
    // truncated, not well-formed.
    let mut depth: usize = 0;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XfdfError::new(format!("XML error at byte {}: {}", reader.buffer_position(), e)))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                let (ns, local) = reader.resolve_element(e.name());
                if is_xfdf(&ns) {
                    match local.as_ref() {
                        b"field" => {
                            let name = field_name(&e)?;
                            open_fields.push((name, None));
                        }
                        b"value" => {
                            if let Some(top) = open_fields.last_mut() {
                                top.1.get_or_insert_with(String::new);
                                in_value = true;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Empty(e) => {
                let (ns, local) = reader.resolve_element(e.name());
                if is_xfdf(&ns) {
                    match local.as_ref() {
                        // <field name="..."/> - a field with no value at all
                        b"field" => {
                            let name = field_name(&e)?;
                            fields.push(XfdfField {
                                name,
                                value: String::new(),
                            });
                        }
                        // <value/> - explicitly empty answer
                        b"value" => {
                            if let Some(top) = open_fields.last_mut() {
                                top.1.get_or_insert_with(String::new);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Text(t) if in_value => {
                let text = t
                    .unescape()
                    .map_err(|e| XfdfError::new(format!("Bad text content: {e}")))?;
                if let Some((_, Some(value))) = open_fields.last_mut() {
                    value.push_str(&text);
                }
            }
            Event::CData(t) if in_value => {
                if let Some((_, Some(value))) = open_fields.last_mut() {
                    value.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                let (ns, local) = reader.resolve_element(e.name());
                if is_xfdf(&ns) {
                    match local.as_ref() {
                        b"value" => in_value = false,
                        b"field" => {
                            if let Some((name, value)) = open_fields.pop() {
                                fields.push(XfdfField {
                                    name,
                                    value: value.unwrap_or_default(),
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Eof => {
                if depth > 0 {
                    return Err(XfdfError::new(format!(
                        "Unexpected end of document with {depth} unclosed element(s)"
                    )));
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(fields)
}

fn is_xfdf(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(n)) if *n == XFDF_NAMESPACE.as_bytes())
}

fn field_name(e: &BytesStart) -> Result<String, XfdfError> {
    let attr = e
        .try_get_attribute("name")
        .map_err(|e| XfdfError::new(format!("Bad field attributes: {e}")))?
        .ok_or_else(|| XfdfError::new("field element without a name attribute"))?;
    let name = attr
        .unescape_value()
        .map_err(|e| XfdfError::new(format!("Bad field name: {e}")))?;
    Ok(name.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(fields: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdf xmlns="http://ns.adobe.com/xfdf/" xml:space="preserve">
  <fields>{fields}</fields>
</xfdf>"#
        )
    }

    #[test]
    fn test_parse_simple_fields() {
        let xml = doc(
            r#"<field name="A-Name"><value>Alice</value></field>
               <field name="Q1-IT"><value>Oui</value></field>"#,
        );
        let fields = parse_xfdf(xml.as_bytes()).unwrap();
        assert_eq!(
            fields,
            vec![
                XfdfField {
                    name: "A-Name".into(),
                    value: "Alice".into()
                },
                XfdfField {
                    name: "Q1-IT".into(),
                    value: "Oui".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_value_element_is_empty_string() {
        let xml = doc(r#"<field name="Q1-IT"></field><field name="Q1-Editorial"/>"#);
        let fields = parse_xfdf(xml.as_bytes()).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].value, "");
        assert_eq!(fields[1].value, "");
    }

    #[test]
    fn test_empty_value_element() {
        let xml = doc(r#"<field name="Department"><value/></field>"#);
        let fields = parse_xfdf(xml.as_bytes()).unwrap();
        assert_eq!(fields[0].value, "");
    }

    #[test]
    fn test_value_with_entities() {
        let xml = doc(r#"<field name="Department"><value>Gestion &amp; projet</value></field>"#);
        let fields = parse_xfdf(xml.as_bytes()).unwrap();
        assert_eq!(fields[0].value, "Gestion & projet");
    }

    #[test]
    fn test_fields_outside_namespace_ignored() {
        let xml = r#"<?xml version="1.0"?>
<xfdf xmlns="http://ns.adobe.com/xfdf/" xmlns:x="http://example.com/other">
  <fields>
    <x:field name="Intruder"><x:value>nope</x:value></x:field>
    <field name="A-Name"><value>Alice</value></field>
  </fields>
</xfdf>"#;
        let fields = parse_xfdf(xml.as_bytes()).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "A-Name");
    }

    #[test]
    fn test_field_without_name_is_error() {
        let xml = doc(r#"<field><value>orphan</value></field>"#);
        let err = parse_xfdf(xml.as_bytes()).unwrap_err();
        assert!(err.message.contains("name attribute"));
    }

    #[test]
    fn test_truncated_document_is_error() {
        // Cut off before any close tag
        let err = parse_xfdf("<xfdf><unclosed>".as_bytes()).unwrap_err();
        assert!(err.message.contains("unclosed"));

        // Cut off mid-value
        let xml = r#"<xfdf xmlns="http://ns.adobe.com/xfdf/"><fields><field name="A-Name"><value>Al"#;
        assert!(parse_xfdf(xml.as_bytes()).is_err());
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let xml = r#"<xfdf xmlns="http://ns.adobe.com/xfdf/"><fields><field name="A"></wrong></fields></xfdf>"#;
        assert!(parse_xfdf(xml.as_bytes()).is_err());
    }

    #[test]
    fn test_no_fields_is_empty() {
        let fields = parse_xfdf(doc("").as_bytes()).unwrap();
        assert!(fields.is_empty());
    }
}
