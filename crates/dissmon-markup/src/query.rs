//! Label → value queries over a parsed document.
//!
//! The extractor only speaks [`DocumentQuery`]; [`Document`] is the one
//! implementation, but nothing in the extraction rules depends on the tree
//! representation.

use crate::dom::{Document, NodeId};

/// How a label string is compared with candidate text nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
  /// Normalised text equals the label, ignoring a trailing `:`.
  Exact,
  /// Normalised text contains the label.
  Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
  pub href: String,
  pub text: String,
}

/// The value side of a label.
pub trait ValueRegion {
  /// Whitespace-normalised text of the whole region.
  fn text(&self) -> String;

  /// Text of each link in the region, in document order.
  fn link_texts(&self) -> Vec<String>;

  /// Normalised text of the first `tag` element in the region.
  fn first_text_of(&self, tag: &str) -> Option<String>;
}

pub trait DocumentQuery {
  type Region<'a>: ValueRegion
  where
    Self: 'a;

  /// Value regions for every distinct text node matching `label`, in
  /// document order.
  fn value_regions(&self, label: &str, mode: LabelMatch) -> Vec<Self::Region<'_>>;

  /// Normalised text of the first `tag` element in the document.
  fn first_text_of(&self, tag: &str) -> Option<String>;

  /// First element whose `href` contains `marker`.
  fn link_with_href(&self, marker: &str) -> Option<Link>;

  /// Every `href` containing `marker`, in document order.
  fn hrefs_containing(&self, marker: &str) -> Vec<String>;

  /// Case-insensitive search over the document's normalised text.
  fn contains_text(&self, needle: &str) -> bool;
}

/// Collapse whitespace runs (including no-break spaces) to one space and trim.
pub fn normalize_ws(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold(text: &str) -> String { normalize_ws(text).to_lowercase() }

fn fold_label(text: &str) -> String {
  let folded = fold(text);
  folded.trim_end_matches(':').trim_end().to_owned()
}

// ─── Document implementation ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct NodeRegion<'a> {
  doc:  &'a Document,
  node: NodeId,
}

impl ValueRegion for NodeRegion<'_> {
  fn text(&self) -> String { normalize_ws(&self.doc.text(self.node)) }

  fn link_texts(&self) -> Vec<String> {
    self
      .doc
      .elements_in(self.node, "a")
      .into_iter()
      .map(|a| normalize_ws(&self.doc.text(a)))
      .filter(|t| !t.is_empty())
      .collect()
  }

  fn first_text_of(&self, tag: &str) -> Option<String> {
    let first = *self.doc.elements_in(self.node, tag).first()?;
    Some(normalize_ws(&self.doc.text(first)))
  }
}

impl Document {
  /// The label convention: `<container><label>TEXT</label></container>`
  /// followed by the value element.
  fn region_for_label_text(&self, text_node: NodeId) -> Option<NodeId> {
    let label = self.parent(text_node)?;
    let container = self.parent(label)?;
    self.next_element_sibling(container)
  }
}

impl DocumentQuery for Document {
  type Region<'a> = NodeRegion<'a>;

  fn value_regions(&self, label: &str, mode: LabelMatch) -> Vec<NodeRegion<'_>> {
    let wanted = fold_label(label);
    if wanted.is_empty() {
      return vec![];
    }

    let mut regions: Vec<NodeId> = Vec::new();
    for (id, text) in self.text_nodes() {
      let matched = match mode {
        LabelMatch::Exact => fold_label(text) == wanted,
        LabelMatch::Contains => fold(text).contains(&wanted),
      };
      if !matched {
        continue;
      }
      if let Some(region) = self.region_for_label_text(id)
        && !regions.contains(&region)
      {
        regions.push(region);
      }
    }

    regions
      .into_iter()
      .map(|node| NodeRegion { doc: self, node })
      .collect()
  }

  fn first_text_of(&self, tag: &str) -> Option<String> {
    NodeRegion {
      doc:  self,
      node: self.root(),
    }
    .first_text_of(tag)
  }

  fn link_with_href(&self, marker: &str) -> Option<Link> {
    self
      .descendants(self.root())
      .into_iter()
      .find_map(|id| {
        let href = self.attr(id, "href")?;
        href.contains(marker).then(|| Link {
          href: href.to_owned(),
          text: normalize_ws(&self.text(id)),
        })
      })
  }

  fn hrefs_containing(&self, marker: &str) -> Vec<String> {
    self
      .descendants(self.root())
      .into_iter()
      .filter_map(|id| self.attr(id, "href"))
      .filter(|href| href.contains(marker))
      .map(str::to_owned)
      .collect()
  }

  fn contains_text(&self, needle: &str) -> bool {
    let needle = fold(needle);
    !needle.is_empty() && fold(&self.text(self.root())).contains(&needle)
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
