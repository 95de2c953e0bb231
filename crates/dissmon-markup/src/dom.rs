//! A lenient, read-only markup tree.
//!
//! Registry pages are HTML, not XML: void elements are never closed, end tags
//! go missing, and entities like `&nbsp;` appear everywhere. The tree is built
//! from `quick-xml` events with end-name checks disabled and a small amount of
//! HTML knowledge layered on top:
//!
//! - `script` and `style` bodies are dropped before tokenising;
//! - void elements (`br`, `img`, …) never take children;
//! - an end tag closes the nearest open element with the same name and
//!   everything opened after it; an end tag with no open match is ignored.
//!
//! Nodes live in an arena in document order, so iterating the arena is a
//! pre-order walk.

use std::borrow::Cow;

use quick_xml::{
  Reader,
  escape::unescape_with,
  events::{BytesStart, Event},
};

use crate::error::{Error, Result};

const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
  "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

// ─── Nodes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
  Root,
  Element {
    /// Lower-cased tag name.
    name:  String,
    /// Attributes with lower-cased keys and unescaped values.
    attrs: Vec<(String, String)>,
  },
  Text(String),
}

#[derive(Debug, Clone)]
struct Node {
  kind:     NodeKind,
  parent:   Option<NodeId>,
  children: Vec<NodeId>,
}

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Document {
  nodes: Vec<Node>,
}

impl Document {
  /// Build a tree from HTML-ish markup.
  pub fn parse(markup: &str) -> Result<Self> {
    let cleaned = strip_raw_text_elements(markup);
    let mut reader = Reader::from_str(&cleaned);
    {
      let config = reader.config_mut();
      config.check_end_names = false;
      config.allow_unmatched_ends = true;
      config.check_comments = false;
    }

    let mut doc = Self {
      nodes: vec![Node {
        kind:     NodeKind::Root,
        parent:   None,
        children: vec![],
      }],
    };
    let mut open: Vec<NodeId> = vec![doc.root()];

    loop {
      let parent = open.last().copied().unwrap_or(doc.root());
      match reader.read_event() {
        Ok(Event::Start(ref e)) => {
          let (name, attrs) = element_parts(e);
          let is_void = VOID_ELEMENTS.contains(&name.as_str());
          let id = doc.push(NodeKind::Element { name, attrs }, parent);
          if !is_void {
            open.push(id);
          }
        }
        Ok(Event::Empty(ref e)) => {
          let (name, attrs) = element_parts(e);
          doc.push(NodeKind::Element { name, attrs }, parent);
        }
        Ok(Event::End(ref e)) => {
          let name = lower_name(e.name().as_ref());
          if let Some(pos) = open
            .iter()
            .rposition(|&id| doc.name(id) == Some(name.as_str()))
            && pos > 0
          {
            open.truncate(pos);
          }
        }
        Ok(Event::Text(ref e)) => {
          let raw = String::from_utf8_lossy(e);
          doc.push_text(unescape_lenient(&raw).into_owned(), parent);
        }
        Ok(Event::CData(ref e)) => {
          doc.push_text(String::from_utf8_lossy(e).into_owned(), parent);
        }
        Ok(Event::Eof) => break,
        Err(e) => {
          return Err(Error::Markup {
            position: reader.error_position(),
            message:  e.to_string(),
          });
        }
        _ => {}
      }
    }

    Ok(doc)
  }

  fn push(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
    let id = NodeId(self.nodes.len());
    self.nodes.push(Node {
      kind,
      parent: Some(parent),
      children: vec![],
    });
    self.nodes[parent.0].children.push(id);
    id
  }

  fn push_text(&mut self, text: String, parent: NodeId) {
    if !text.is_empty() {
      self.push(NodeKind::Text(text), parent);
    }
  }

  pub fn root(&self) -> NodeId { NodeId(0) }

  pub fn kind(&self, id: NodeId) -> &NodeKind { &self.nodes[id.0].kind }

  /// Tag name of an element node.
  pub fn name(&self, id: NodeId) -> Option<&str> {
    match &self.nodes[id.0].kind {
      NodeKind::Element { name, .. } => Some(name),
      _ => None,
    }
  }

  pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
    match &self.nodes[id.0].kind {
      NodeKind::Element { attrs, .. } => attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str()),
      _ => None,
    }
  }

  pub fn parent(&self, id: NodeId) -> Option<NodeId> { self.nodes[id.0].parent }

  pub fn children(&self, id: NodeId) -> &[NodeId] { &self.nodes[id.0].children }

  /// The next sibling of `id` that is an element, skipping text.
  pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
    let parent = self.parent(id)?;
    let siblings = self.children(parent);
    let pos = siblings.iter().position(|&s| s == id)?;
    siblings[pos + 1..]
      .iter()
      .copied()
      .find(|&s| self.name(s).is_some())
  }

  /// All nodes below `id`, in document order.
  pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
    while let Some(next) = stack.pop() {
      out.push(next);
      stack.extend(self.children(next).iter().rev());
    }
    out
  }

  /// Elements named `name` below `scope`, in document order.
  pub fn elements_in(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
    self
      .descendants(scope)
      .into_iter()
      .filter(|&id| self.name(id) == Some(name))
      .collect()
  }

  /// Every text node in the document with its content.
  pub fn text_nodes(&self) -> impl Iterator<Item = (NodeId, &str)> {
    self
      .nodes
      .iter()
      .enumerate()
      .filter_map(|(i, node)| match &node.kind {
        NodeKind::Text(t) => Some((NodeId(i), t.as_str())),
        _ => None,
      })
  }

  /// Concatenated text of `id` and everything below it, unnormalised.
  pub fn text(&self, id: NodeId) -> String {
    if let NodeKind::Text(t) = &self.nodes[id.0].kind {
      return t.clone();
    }
    self
      .descendants(id)
      .into_iter()
      .filter_map(|d| match &self.nodes[d.0].kind {
        NodeKind::Text(t) => Some(t.as_str()),
        _ => None,
      })
      .collect()
  }
}

// ─── Tokenising helpers ──────────────────────────────────────────────────────

fn lower_name(raw: &[u8]) -> String {
  String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn element_parts(e: &BytesStart<'_>) -> (String, Vec<(String, String)>) {
  let name = lower_name(e.name().as_ref());
  let attrs = e
    .html_attributes()
    .flatten()
    .map(|a| {
      let key = lower_name(a.key.as_ref());
      let raw = String::from_utf8_lossy(&a.value);
      (key, unescape_lenient(&raw).into_owned())
    })
    .collect();
  (name, attrs)
}

/// Resolve character references one at a time. An unknown entity or a bare
/// `&` is kept verbatim without affecting its neighbours.
fn unescape_lenient(raw: &str) -> Cow<'_, str> {
  if !raw.contains('&') {
    return Cow::Borrowed(raw);
  }

  let mut out = String::with_capacity(raw.len());
  let mut rest = raw;
  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    let tail = &rest[amp..];
    match reference_at(tail) {
      Some(reference) => {
        match unescape_with(reference, resolve_entity) {
          Ok(resolved) => out.push_str(&resolved),
          Err(_) => out.push_str(reference),
        }
        rest = &tail[reference.len()..];
      }
      None => {
        out.push('&');
        rest = &tail[1..];
      }
    }
  }
  out.push_str(rest);
  Cow::Owned(out)
}

/// The `&name;` or `&#nnn;` reference at the start of `tail`, if any.
fn reference_at(tail: &str) -> Option<&str> {
  let semi = tail[1..].find(';')? + 1;
  let name = &tail[1..semi];
  let well_formed = !name.is_empty()
    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#');
  well_formed.then(|| &tail[..=semi])
}

fn resolve_entity(name: &str) -> Option<&'static str> {
  Some(match name {
    "amp" => "&",
    "lt" => "<",
    "gt" => ">",
    "quot" => "\"",
    "apos" => "'",
    "nbsp" => "\u{a0}",
    "ensp" => "\u{2002}",
    "emsp" => "\u{2003}",
    "thinsp" => "\u{2009}",
    "laquo" => "«",
    "raquo" => "»",
    "ndash" => "–",
    "mdash" => "—",
    "hellip" => "…",
    "numero" => "№",
    "copy" => "©",
    _ => return None,
  })
}

/// Remove `<script>` / `<style>` elements including their bodies.
fn strip_raw_text_elements(markup: &str) -> Cow<'_, str> {
  // ASCII lower-casing keeps byte offsets aligned with `markup`.
  let lower = markup.to_ascii_lowercase();
  let mut out = String::new();
  let mut cursor = 0;

  while let Some((start, end)) = next_raw_block(&lower, cursor) {
    out.push_str(&markup[cursor..start]);
    cursor = end;
  }

  if cursor == 0 {
    return Cow::Borrowed(markup);
  }
  out.push_str(&markup[cursor..]);
  Cow::Owned(out)
}

fn next_raw_block(lower: &str, from: usize) -> Option<(usize, usize)> {
  RAW_TEXT_ELEMENTS
    .iter()
    .filter_map(|tag| {
      let open = format!("<{tag}");
      let mut search = from;
      let start = loop {
        let at = lower.get(search..)?.find(&open)? + search;
        let after = lower.as_bytes().get(at + open.len()).copied();
        if matches!(after, Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r')) {
          break at;
        }
        search = at + open.len();
      };
      let close = format!("</{tag}");
      let end = match lower[start..].find(&close) {
        Some(rel) => {
          let close_at = start + rel;
          lower[close_at..]
            .find('>')
            .map_or(lower.len(), |gt| close_at + gt + 1)
        }
        None => lower.len(),
      };
      Some((start, end))
    })
    .min_by_key(|&(start, _)| start)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
