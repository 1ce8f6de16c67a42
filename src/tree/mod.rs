//! In-memory configuration tree.
//!
//! Nodes live in an arena owned by [`ConfigTree`] and are addressed by
//! [`NodeId`]. Parent links are plain indices, so change propagation walks
//! them without taking part in ownership.

/// Index of a node inside a [`ConfigTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Key comparison rule used when looking up children and attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMatch {
	/// Keys must be byte-for-byte equal.
	Exact,
	/// Keys are compared after lowercasing.
	#[default]
	IgnoreCase,
}

impl KeyMatch {
	pub fn from_ignore_case(ignore_case: bool) -> Self {
		if ignore_case {
			KeyMatch::IgnoreCase
		} else {
			KeyMatch::Exact
		}
	}

	/// Check whether two keys are equal under this rule.
	pub fn matches(self, a: &str, b: &str) -> bool {
		match self {
			KeyMatch::Exact => a == b,
			KeyMatch::IgnoreCase => a
				.chars()
				.flat_map(char::to_lowercase)
				.eq(b.chars().flat_map(char::to_lowercase)),
		}
	}
}

/// A key/value pair attached to a node.
#[derive(Debug, Clone)]
pub struct ConfigAttribute {
	key: String,
	value: String,
	parent: NodeId,
	changed: bool,
}

impl ConfigAttribute {
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	/// The node owning this attribute.
	pub fn parent(&self) -> NodeId {
		self.parent
	}

	/// True once the value was set at runtime.
	pub fn changed(&self) -> bool {
		self.changed
	}
}

/// A named node carrying a scalar value, attributes and child nodes.
#[derive(Debug, Clone)]
pub struct ConfigNode {
	key: String,
	value: String,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	attributes: Vec<ConfigAttribute>,
	changed: bool,
}

impl ConfigNode {
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	/// Parent node, `None` for the root.
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	/// Child nodes in document order.
	pub fn children(&self) -> &[NodeId] {
		&self.children
	}

	/// Attributes in document order.
	pub fn attributes(&self) -> &[ConfigAttribute] {
		&self.attributes
	}

	/// True once this node, one of its attributes or a descendant was set at runtime.
	pub fn changed(&self) -> bool {
		self.changed
	}

	pub fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}
}

/// What a dotted key resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
	Node(NodeId),
	Attribute { node: NodeId, index: usize },
}

/// Arena holding every node of one configuration document.
#[derive(Debug, Clone)]
pub struct ConfigTree {
	nodes: Vec<ConfigNode>,
}

impl ConfigTree {
	/// Create a tree containing only a root node.
	pub fn new(root_key: impl Into<String>) -> Self {
		Self {
			nodes: vec![ConfigNode {
				key: root_key.into(),
				value: String::new(),
				parent: None,
				children: Vec::new(),
				attributes: Vec::new(),
				changed: false,
			}],
		}
	}

	pub fn root(&self) -> NodeId {
		NodeId(0)
	}

	pub fn node(&self, id: NodeId) -> &ConfigNode {
		&self.nodes[id.0]
	}

	/// Total number of nodes, root included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Append a child node and return its id.
	pub fn add_child(
		&mut self,
		parent: NodeId,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(ConfigNode {
			key: key.into(),
			value: value.into(),
			parent: Some(parent),
			children: Vec::new(),
			attributes: Vec::new(),
			changed: false,
		});
		self.nodes[parent.0].children.push(id);
		id
	}

	/// Append an attribute to a node and return its index.
	pub fn add_attribute(
		&mut self,
		node: NodeId,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> usize {
		let attributes = &mut self.nodes[node.0].attributes;
		attributes.push(ConfigAttribute {
			key: key.into(),
			value: value.into(),
			parent: node,
			changed: false,
		});
		attributes.len() - 1
	}

	/// First child of `node` whose key matches.
	pub fn find_child(&self, node: NodeId, key: &str, rule: KeyMatch) -> Option<NodeId> {
		self.node(node)
			.children
			.iter()
			.copied()
			.find(|child| rule.matches(&self.node(*child).key, key))
	}

	/// Index of the first attribute of `node` whose key matches.
	pub fn find_attribute(&self, node: NodeId, key: &str, rule: KeyMatch) -> Option<usize> {
		self.node(node)
			.attributes
			.iter()
			.position(|attribute| rule.matches(&attribute.key, key))
	}

	pub fn attribute(&self, node: NodeId, index: usize) -> &ConfigAttribute {
		&self.node(node).attributes[index]
	}

	/// Replace a node's value.
	///
	/// With `notify_parent` the node and every ancestor are flagged as changed.
	/// Without it the value is replaced silently, which is how on-disk overlays
	/// are applied.
	pub fn update_node(&mut self, id: NodeId, value: impl Into<String>, notify_parent: bool) {
		self.nodes[id.0].value = value.into();
		if notify_parent {
			self.notify(id);
		}
	}

	/// Replace an attribute's value, propagating the change through its node.
	pub fn update_attribute(
		&mut self,
		node: NodeId,
		index: usize,
		value: impl Into<String>,
		notify_parent: bool,
	) {
		let attribute = &mut self.nodes[node.0].attributes[index];
		attribute.value = value.into();
		if notify_parent {
			attribute.changed = true;
			self.notify(node);
		}
	}

	/// Replace the value of whatever `target` points at.
	pub fn update(&mut self, target: Target, value: impl Into<String>, notify_parent: bool) {
		match target {
			Target::Node(id) => self.update_node(id, value, notify_parent),
			Target::Attribute { node, index } => {
				self.update_attribute(node, index, value, notify_parent)
			}
		}
	}

	pub fn value(&self, target: Target) -> &str {
		match target {
			Target::Node(id) => self.node(id).value(),
			Target::Attribute { node, index } => self.attribute(node, index).value(),
		}
	}

	pub fn is_changed(&self, target: Target) -> bool {
		match target {
			Target::Node(id) => self.node(id).changed,
			Target::Attribute { node, index } => self.attribute(node, index).changed,
		}
	}

	/// Flag `id` and all of its ancestors as changed.
	fn notify(&mut self, id: NodeId) {
		let mut current = Some(id);
		while let Some(id) = current {
			let node = &mut self.nodes[id.0];
			node.changed = true;
			current = node.parent;
		}
	}

	/// Every addressable leaf and attribute below the root, as `(path, value)`.
	///
	/// Paths are joined with `separator` and do not include the root key.
	pub fn entries(&self, separator: char) -> Vec<(String, String)> {
		let mut entries = Vec::new();
		self.collect_entries(self.root(), "", separator, &mut entries);
		entries
	}

	fn collect_entries(
		&self,
		id: NodeId,
		prefix: &str,
		separator: char,
		entries: &mut Vec<(String, String)>,
	) {
		let node = self.node(id);
		let join = |key: &str| {
			if prefix.is_empty() {
				key.to_string()
			} else {
				format!("{prefix}{separator}{key}")
			}
		};

		for attribute in &node.attributes {
			entries.push((join(&attribute.key), attribute.value.clone()));
		}

		for child in &node.children {
			let child_node = self.node(*child);
			let path = join(&child_node.key);
			if child_node.is_leaf() {
				entries.push((path.clone(), child_node.value.clone()));
			}
			self.collect_entries(*child, &path, separator, entries);
		}
	}
}
