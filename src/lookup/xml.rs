use anyhow::{Result, anyhow};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Field, LookupOutcome, Translations};

/// Parsed element keeping the text layout the dictionary markup relies on:
/// `text` runs up to the first child, `tail` follows the closing tag.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub id: Option<String>,
    pub text: String,
    pub tail: String,
    pub children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let id = match start.try_get_attribute("id")? {
            Some(attr) => Some(attr.unescape_value()?.into_owned()),
            None => None,
        };
        Ok(Self {
            name,
            id,
            ..Self::default()
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

pub fn parse_document(body: &str) -> Result<Element> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(false);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element::open(&e)?),
            Ok(Event::Empty(e)) => {
                let element = Element::open(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| anyhow!("unexpected closing tag in xml"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = match e.unescape() {
                    Ok(text) => text.into_owned(),
                    // unknown entities: keep the raw text
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                append_text(&mut stack, &text);
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                append_text(&mut stack, &String::from_utf8_lossy(raw.as_ref()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(anyhow!("failed to parse xml: {}", err)),
        }
    }

    if !stack.is_empty() {
        return Err(anyhow!("failed to parse xml: unclosed element"));
    }
    root.ok_or_else(|| anyhow!("failed to parse xml: no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(anyhow!("failed to parse xml: multiple root elements"));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) {
    let Some(current) = stack.last_mut() else {
        return;
    };
    match current.children.last_mut() {
        Some(last) => last.tail.push_str(text),
        None => current.text.push_str(text),
    }
}

/// True when `id` names `word` itself, optionally with a sense suffix like `[2]`.
pub fn entry_matches(id: &str, word: &str) -> bool {
    let Some(rest) = id.strip_prefix(word) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    rest.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// `tag` children of every root-level entry matching `word`, in document order.
pub fn field_nodes<'a>(root: &'a Element, tag: &'a str, word: &'a str) -> Vec<&'a Element> {
    root.children_named("entry")
        .filter(|entry| entry.id.as_deref().is_some_and(|id| entry_matches(id, word)))
        .flat_map(|entry| entry.children_named(tag))
        .collect()
}

pub fn suggestions(root: &Element) -> Vec<String> {
    root.children_named("suggestion")
        .map(|suggestion| suggestion.text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn extract_translations(nodes: &[&Element]) -> Vec<String> {
    let mut translations = Vec::new();
    for node in nodes {
        translations.extend(
            node.text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string),
        );
        for child in &node.children {
            let tail = child
                .tail
                .trim_matches(|c: char| c == ',' || c == ';' || c.is_whitespace());
            if !tail.is_empty() {
                translations.push(tail.to_string());
            }
        }
    }
    translations
}

/// Interprets a service response for `word`.
pub fn read_outcome(body: &str, word: &str, field: Field) -> Result<LookupOutcome> {
    let root = parse_document(body)?;
    let nodes = field_nodes(&root, field.tag(), word);
    if nodes.is_empty() {
        return Ok(LookupOutcome::NotFound {
            alternatives: suggestions(&root),
        });
    }
    Ok(Translations::new(extract_translations(&nodes))
        .map(LookupOutcome::Found)
        .unwrap_or_else(LookupOutcome::not_found))
}
