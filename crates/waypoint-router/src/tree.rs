//! The compiled path tree.
//!
//! One tree per HTTP method; each node covers a fixed path depth and holds
//! its children grouped by segment kind. The grouping encodes matching
//! precedence structurally: literal children are consulted before typed
//! captures, which are consulted before the wildcard.
//!
//! Nodes are created during registration and never mutated afterwards; the
//! matcher only reads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::guard::Guard;
use crate::pattern::{PatternSegment, SegmentDecoder};
use crate::route::BoxInvoke;

/// A typed-capture child: decode function identity plus the subtree behind
/// it. Captures with the same target type share one child; among distinct
/// types, first registered is first tried.
pub(crate) struct CaptureChild {
    pub(crate) type_id: std::any::TypeId,
    /// Name from the first registration, used in failure reports.
    pub(crate) name: String,
    pub(crate) decoder: SegmentDecoder,
    pub(crate) node: Node,
}

/// A terminal route attached to a node.
pub(crate) struct Leaf {
    pub(crate) guards: Vec<Arc<dyn Guard>>,
    pub(crate) invoke: BoxInvoke,
    /// Index into the router's declaration list.
    pub(crate) route: usize,
}

/// One point in the trie.
#[derive(Default)]
pub(crate) struct Node {
    pub(crate) literals: HashMap<String, Node>,
    pub(crate) captures: Vec<CaptureChild>,
    pub(crate) wildcard: Option<Box<Node>>,
    pub(crate) leaves: Vec<Leaf>,
}

impl Node {
    /// Register one route's remaining pattern segments below this node.
    ///
    /// Registration is append-only: nodes are created on first need, leaf
    /// order is insertion order, and capture children are never reordered.
    pub(crate) fn insert(&mut self, segments: &[PatternSegment], leaf: Leaf) {
        let Some((segment, rest)) = segments.split_first() else {
            self.leaves.push(leaf);
            return;
        };
        match segment {
            PatternSegment::Literal(lit) => {
                self.literals
                    .entry(lit.clone())
                    .or_default()
                    .insert(rest, leaf);
            }
            PatternSegment::Capture(capture) => {
                let position = self
                    .captures
                    .iter()
                    .position(|child| child.type_id == capture.type_id());
                let child = match position {
                    Some(position) => &mut self.captures[position],
                    None => {
                        self.captures.push(CaptureChild {
                            type_id: capture.type_id(),
                            name: capture.name().to_string(),
                            decoder: capture.decoder(),
                            node: Node::default(),
                        });
                        self.captures.last_mut().expect("just pushed")
                    }
                };
                child.node.insert(rest, leaf);
            }
            PatternSegment::Wildcard(_) => {
                // The pattern layer guarantees nothing follows a wildcard.
                self.wildcard.get_or_insert_default().insert(rest, leaf);
            }
        }
    }
}
