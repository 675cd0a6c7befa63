//! The schema tree and its registration API.
//!
//! A [`Schema`] is built once by declaring blocks and fields, then used any number
//! of times to save or load documents. The tree is an arena of nodes addressed by
//! index; each node keeps its fields and child blocks in declaration order, which
//! is the order the write engine emits them in. The read engine matches by name,
//! so documents may list elements in any order.
//!
//! ## Sticky failure
//!
//! Registration methods return `&mut Self` so a whole batch can be chained. A
//! failed registration (bad tag name, duplicate name, unbalanced block) is skipped
//! and its error is recorded; [`Schema::check`] reports the first one.
//!
//! ```rust
//! use std::cell::RefCell;
//! use tagcfg::Schema;
//!
//! let a = RefCell::new(String::new());
//! let b = RefCell::new(0u32);
//!
//! let mut schema = Schema::new("Root").unwrap();
//! schema
//!     .register_string("Bad-Name", &a)
//!     .register_int("Good_Name1", &b);
//!
//! assert!(schema.has_failed());
//! assert!(schema.check().is_err());
//! assert_eq!(schema.to_string().unwrap(), "<Root><Good_Name1>0</Good_Name1></Root>");
//! ```

use crate::binding::{Aggregate, Binding, Scalar};
use crate::{Error, Result};
use indexmap::IndexMap;
use log::debug;

/// Index of a node in the schema arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

pub(crate) const ROOT: NodeId = NodeId(0);

/// One block level of the document.
#[derive(Debug)]
pub(crate) struct Node<'a> {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, Binding<'a>>,
    pub(crate) children: IndexMap<String, NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl<'a> Node<'a> {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Node {
            name: name.to_string(),
            fields: IndexMap::new(),
            children: IndexMap::new(),
            parent,
        }
    }

    pub(crate) fn field(&self, name: &[u8]) -> Option<&Binding<'a>> {
        std::str::from_utf8(name)
            .ok()
            .and_then(|name| self.fields.get(name))
    }

    pub(crate) fn child(&self, name: &[u8]) -> Option<NodeId> {
        std::str::from_utf8(name)
            .ok()
            .and_then(|name| self.children.get(name).copied())
    }

    fn holds(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.children.contains_key(name)
    }
}

/// Returns `true` if `name` is a legal tag name: non-empty, `[A-Za-z0-9_]` only.
///
/// # Examples
///
/// ```rust
/// use tagcfg::schema::is_valid_name;
///
/// assert!(is_valid_name("Bad_Name1"));
/// assert!(!is_valid_name("Bad-Name"));
/// assert!(!is_valid_name("Bad Name"));
/// assert!(!is_valid_name(""));
/// ```
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A registered schema: one tree of blocks and field bindings.
///
/// The lifetime `'a` is the lifetime of the caller's bound values.
#[derive(Debug)]
pub struct Schema<'a> {
    nodes: Vec<Node<'a>>,
    current: NodeId,
    // Blocks opened below a rejected `start_block`; their registrations are dropped.
    rejected_depth: usize,
    failure: Option<Error>,
}

impl<'a> Schema<'a> {
    /// Creates a schema whose document root element is `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `root` is empty or uses characters
    /// outside `[A-Za-z0-9_]`.
    pub fn new(root: &str) -> Result<Self> {
        if !is_valid_name(root) {
            return Err(Error::invalid_name(root));
        }
        Ok(Schema {
            nodes: vec![Node::new(root, None)],
            current: ROOT,
            rejected_depth: 0,
            failure: None,
        })
    }

    /// Name of the root element.
    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.nodes[ROOT.0].name
    }

    /// Opens a nested block under the current block and makes it current.
    ///
    /// Opening a block name that already exists at this level re-enters it.
    pub fn start_block(&mut self, name: &str) -> &mut Self {
        if self.rejected_depth > 0 {
            self.rejected_depth += 1;
            return self;
        }
        if !is_valid_name(name) {
            self.rejected_depth = 1;
            self.fail(Error::invalid_name(name));
            return self;
        }

        let parent = self.current;
        if let Some(existing) = self.nodes[parent.0].children.get(name).copied() {
            self.current = existing;
            return self;
        }
        if self.nodes[parent.0].fields.contains_key(name) {
            self.rejected_depth = 1;
            let block = self.nodes[parent.0].name.clone();
            self.fail(Error::duplicate_name(name, &block));
            return self;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, Some(parent)));
        self.nodes[parent.0].children.insert(name.to_string(), id);
        self.current = id;
        self
    }

    /// Closes the current block and returns to its parent.
    pub fn end_block(&mut self) -> &mut Self {
        if self.rejected_depth > 0 {
            self.rejected_depth -= 1;
            return self;
        }
        match self.nodes[self.current.0].parent {
            Some(parent) => self.current = parent,
            None => self.fail(Error::schema("end_block called with no open block")),
        }
        self
    }

    /// Registers `binding` under `name` in the current block.
    pub fn register(&mut self, name: &str, binding: Binding<'a>) -> &mut Self {
        if self.rejected_depth > 0 {
            return self;
        }
        if !is_valid_name(name) {
            self.fail(Error::invalid_name(name));
            return self;
        }
        let node = &mut self.nodes[self.current.0];
        if node.holds(name) {
            let err = Error::duplicate_name(name, &node.name);
            self.fail(err);
            return self;
        }
        node.fields.insert(name.to_string(), binding);
        self
    }

    /// Registers a caller-supplied [`Scalar`] binding.
    pub fn register_scalar<S: Scalar + 'a>(&mut self, name: &str, scalar: S) -> &mut Self {
        self.register(name, Binding::scalar(scalar))
    }

    /// Registers a caller-supplied [`Aggregate`] binding.
    pub fn register_aggregate<A: Aggregate + 'a>(&mut self, name: &str, aggregate: A) -> &mut Self {
        self.register(name, Binding::aggregate(aggregate))
    }

    /// Returns `true` if any registration has failed since construction or the
    /// last [`Schema::clear`].
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The first registration error, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    /// Reports the first registration error.
    ///
    /// # Errors
    ///
    /// Returns a clone of the first error recorded during registration.
    pub fn check(&self) -> Result<()> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Drops every registration, keeping only the empty root block.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        let root = &mut self.nodes[ROOT.0];
        root.fields.clear();
        root.children.clear();
        self.current = ROOT;
        self.rejected_depth = 0;
        self.failure = None;
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0]
    }

    fn fail(&mut self, err: Error) {
        debug!("Schema registration failed: {}", err);
        if self.failure.is_none() {
            self.failure = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_new_rejects_bad_root_names() {
        assert!(Schema::new("").is_err());
        assert!(Schema::new("Bad Root").is_err());
        assert!(Schema::new("Root_1").is_ok());
    }

    #[test]
    fn test_blocks_link_to_parent() {
        let mut schema = Schema::new("Root").unwrap();
        schema.start_block("Outer").start_block("Inner");

        let outer = schema.node(ROOT).children["Outer"];
        let inner = schema.node(outer).children["Inner"];
        assert_eq!(schema.node(inner).parent, Some(outer));
        assert_eq!(schema.node(outer).parent, Some(ROOT));

        schema.end_block().end_block();
        assert_eq!(schema.current, ROOT);
        assert!(!schema.has_failed());
    }

    #[test]
    fn test_reopening_block_reenters_it() {
        let a = RefCell::new(0i32);
        let b = RefCell::new(0i32);
        let mut schema = Schema::new("Root").unwrap();
        schema.start_block("Sub").register_int("A", &a).end_block();
        schema.start_block("Sub").register_int("B", &b).end_block();

        let sub = schema.node(ROOT).children["Sub"];
        assert_eq!(schema.node(ROOT).children.len(), 1);
        assert_eq!(schema.node(sub).fields.len(), 2);
    }

    #[test]
    fn test_invalid_field_name_is_sticky_and_skipped() {
        let a = RefCell::new(String::new());
        let mut schema = Schema::new("Root").unwrap();
        schema
            .register_string("Bad Name", &a)
            .register_string("Fine", &a);

        assert!(matches!(schema.failure(), Some(Error::InvalidName { .. })));
        assert_eq!(schema.node(ROOT).fields.len(), 1);
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let a = RefCell::new(0u16);
        let mut schema = Schema::new("Root").unwrap();
        schema.register_int("A", &a).register_int("A", &a);

        assert!(matches!(schema.failure(), Some(Error::DuplicateName { .. })));
        assert_eq!(schema.node(ROOT).fields.len(), 1);
    }

    #[test]
    fn test_rejected_block_swallows_its_contents() {
        let a = RefCell::new(false);
        let mut schema = Schema::new("Root").unwrap();
        schema
            .start_block("Bad-Block")
            .register_bool("Inside", &a)
            .start_block("Deeper")
            .end_block()
            .end_block()
            .register_bool("After", &a);

        let root = schema.node(ROOT);
        assert!(root.children.is_empty());
        assert_eq!(root.fields.keys().collect::<Vec<_>>(), vec!["After"]);
        assert_eq!(schema.current, ROOT);
    }

    #[test]
    fn test_ending_root_block_fails() {
        let mut schema = Schema::new("Root").unwrap();
        schema.end_block();
        assert!(matches!(schema.check(), Err(Error::Schema(_))));
    }

    #[test]
    fn test_clear_keeps_root_and_resets_failure() {
        let a = RefCell::new(0i64);
        let mut schema = Schema::new("Root").unwrap();
        schema.start_block("Sub").register_int("A", &a).register_int("A", &a);
        assert!(schema.has_failed());

        schema.clear();
        assert!(!schema.has_failed());
        assert_eq!(schema.root_name(), "Root");
        assert!(schema.node(ROOT).children.is_empty());
        assert_eq!(schema.to_string().unwrap(), "<Root></Root>");
    }
}
