//! The `<privileges>` XML document format.
//!
//! ```text
//! <privileges xmlns:foo="http://www.foo.com/1.0">
//!     <privilege name="foo:read"/>
//!     <privilege abstract="true" name="foo:base"/>
//!     <privilege name="foo:all">
//!         <contains name="foo:read"/>
//!     </privilege>
//! </privileges>
//! ```
//!
//! Namespace declarations are collected into one table for the whole
//! document, whichever element they appear on.

use std::collections::HashSet;
use std::io::Write;

use log::{debug, trace};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::privilege::types::error::{PrivilegeError, Result};
use crate::privilege::types::models::{PrivilegeDefinition, QualifiedName};
use crate::privilege::types::namespace::NamespaceTable;

const PRIVILEGES: &str = "privileges";
const PRIVILEGE: &str = "privilege";
const CONTAINS: &str = "contains";
const ATTR_NAME: &str = "name";
const ATTR_ABSTRACT: &str = "abstract";
const XMLNS: &[u8] = b"xmlns";
const XMLNS_PREFIX: &[u8] = b"xmlns:";

/// Where the parser currently is in the element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Privilege,
    Contains,
    Skipped,
}

/// A `<privilege>` element as written, before names are resolved.
#[derive(Debug)]
struct RawDefinition {
    name: String,
    is_abstract: bool,
    aggregates: Vec<String>,
}

/// Parses a complete document into definitions and the namespace table
/// declared by it.
///
/// The whole document is checked before anything is returned.
pub fn read_document(text: &str) -> Result<(Vec<PrivilegeDefinition>, NamespaceTable)> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut namespaces = NamespaceTable::with_defaults();
    let mut raw = Vec::new();
    let mut stack: Vec<Scope> = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let parent = stack.last().copied();
                let scope = open_element(&e, parent, seen_root, &mut namespaces, &mut raw)?;
                seen_root = true;
                stack.push(scope);
            }
            Event::Empty(e) => {
                let parent = stack.last().copied();
                open_element(&e, parent, seen_root, &mut namespaces, &mut raw)?;
                seen_root = true;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(t) if stack.is_empty() => {
                if t.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(PrivilegeError::Parse(
                        "Text content outside the root element".to_string(),
                    ));
                }
            }
            Event::Text(t) => {
                trace!("Skipping text content ({} bytes)", t.len());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(scope) = stack.last() {
        return Err(PrivilegeError::Parse(format!(
            "Unexpected end of document inside {:?} element",
            scope
        )));
    }
    if !seen_root {
        return Err(PrivilegeError::Parse("No root element found".to_string()));
    }

    debug!(
        "Scanned {} privilege elements, {} namespace bindings",
        raw.len(),
        namespaces.len()
    );

    let definitions = resolve_definitions(raw, &namespaces)?;
    Ok((definitions, namespaces))
}

/// Handles a start or empty element and returns the scope it opens.
fn open_element(
    e: &BytesStart<'_>,
    parent: Option<Scope>,
    seen_root: bool,
    namespaces: &mut NamespaceTable,
    raw: &mut Vec<RawDefinition>,
) -> Result<Scope> {
    let attrs = scan_attributes(e, namespaces)?;
    let local_name = e.local_name();
    let local_name = local_name.as_ref();

    match parent {
        None if seen_root => Err(PrivilegeError::Parse(
            "Document has more than one root element".to_string(),
        )),
        None if local_name == PRIVILEGES.as_bytes() => Ok(Scope::Root),
        None => Err(PrivilegeError::Parse(format!(
            "Root element must be <{}>, found <{}>",
            PRIVILEGES,
            String::from_utf8_lossy(local_name)
        ))),
        Some(Scope::Root) if local_name == PRIVILEGE.as_bytes() => {
            let name = required_attribute(&attrs, PRIVILEGE, ATTR_NAME)?;
            let is_abstract = find_attribute(&attrs, ATTR_ABSTRACT)
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
            trace!("Found privilege '{}' (abstract={})", name, is_abstract);
            raw.push(RawDefinition {
                name,
                is_abstract,
                aggregates: Vec::new(),
            });
            Ok(Scope::Privilege)
        }
        Some(Scope::Privilege) if local_name == CONTAINS.as_bytes() => {
            let name = required_attribute(&attrs, CONTAINS, ATTR_NAME)?;
            // A Privilege scope is only ever opened after pushing its definition.
            if let Some(current) = raw.last_mut() {
                trace!("Privilege '{}' contains '{}'", current.name, name);
                current.aggregates.push(name);
            }
            Ok(Scope::Contains)
        }
        Some(_) => {
            debug!(
                "Skipping unexpected element <{}>",
                String::from_utf8_lossy(e.name().as_ref())
            );
            Ok(Scope::Skipped)
        }
    }
}

/// Binds every `xmlns:prefix` declaration on the element and returns the
/// remaining attributes as `(key, value)` pairs.
fn scan_attributes(
    e: &BytesStart<'_>,
    namespaces: &mut NamespaceTable,
) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = attr.key.as_ref();
        let value = attr.unescape_value()?;

        if key == XMLNS {
            debug!("Ignoring default namespace declaration '{}'", value);
        } else if let Some(prefix) = key.strip_prefix(XMLNS_PREFIX) {
            let prefix = String::from_utf8_lossy(prefix);
            debug!("Binding namespace prefix '{}' -> '{}'", prefix, value);
            namespaces.bind(&prefix, &value)?;
        } else {
            attrs.push((String::from_utf8_lossy(key).into_owned(), value.into_owned()));
        }
    }
    Ok(attrs)
}

fn find_attribute<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn required_attribute(
    attrs: &[(String, String)],
    element: &'static str,
    attribute: &'static str,
) -> Result<String> {
    find_attribute(attrs, attribute)
        .map(str::to_owned)
        .ok_or(PrivilegeError::MissingAttribute { element, attribute })
}

/// Turns raw names into qualified names checked against the finished table,
/// rejecting repeated privilege names.
fn resolve_definitions(
    raw: Vec<RawDefinition>,
    namespaces: &NamespaceTable,
) -> Result<Vec<PrivilegeDefinition>> {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.into_iter()
        .map(|def| {
            let name = resolve_name(&def.name, namespaces)?;
            if !seen.insert(name.clone()) {
                return Err(PrivilegeError::DuplicateDefinition(name.to_string()));
            }
            let aggregates = def
                .aggregates
                .iter()
                .map(|aggregate| resolve_name(aggregate, namespaces))
                .collect::<Result<Vec<_>>>()?;
            Ok(PrivilegeDefinition::new(name, def.is_abstract, aggregates))
        })
        .collect()
}

fn resolve_name(text: &str, namespaces: &NamespaceTable) -> Result<QualifiedName> {
    let name = QualifiedName::parse(text)?;
    if !namespaces.contains_prefix(name.prefix()) {
        return Err(PrivilegeError::UnresolvedPrefix {
            name: text.to_string(),
            prefix: name.prefix().to_string(),
        });
    }
    Ok(name)
}

/// Serializes definitions as a complete document.
///
/// Every non-reserved binding of `namespaces` is declared on the root element,
/// sorted by prefix. An `indent` of zero writes everything on one line.
pub fn write_document<W: Write>(
    out: W,
    definitions: &[PrivilegeDefinition],
    namespaces: &NamespaceTable,
    indent: usize,
) -> Result<()> {
    let mut writer = if indent > 0 {
        Writer::new_with_indent(out, b' ', indent)
    } else {
        Writer::new(out)
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut declared: Vec<(&str, &str)> = namespaces
        .iter()
        .filter(|(prefix, _)| !NamespaceTable::is_reserved(prefix))
        .collect();
    declared.sort_unstable();

    let mut root = BytesStart::new(PRIVILEGES);
    for (prefix, uri) in declared {
        let key = format!("xmlns:{}", prefix);
        root.push_attribute((key.as_str(), uri));
    }
    writer.write_event(Event::Start(root))?;

    for definition in definitions {
        write_definition(&mut writer, definition)?;
    }

    writer.write_event(Event::End(BytesEnd::new(PRIVILEGES)))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_definition<W: Write>(
    writer: &mut Writer<W>,
    definition: &PrivilegeDefinition,
) -> Result<()> {
    let name = definition.name().to_string();
    let mut element = BytesStart::new(PRIVILEGE);
    if definition.is_abstract() {
        element.push_attribute((ATTR_ABSTRACT, "true"));
    }
    element.push_attribute((ATTR_NAME, name.as_str()));

    if !definition.is_aggregate() {
        writer.write_event(Event::Empty(element))?;
        return Ok(());
    }

    writer.write_event(Event::Start(element))?;
    for aggregate in definition.aggregates() {
        let aggregate = aggregate.to_string();
        let mut contains = BytesStart::new(CONTAINS);
        contains.push_attribute((ATTR_NAME, aggregate.as_str()));
        writer.write_event(Event::Empty(contains))?;
    }
    writer.write_event(Event::End(BytesEnd::new(PRIVILEGE)))?;
    Ok(())
}
