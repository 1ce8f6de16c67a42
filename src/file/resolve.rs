use crate::error::{ConfigError, Result};
use crate::tree::{ConfigTree, KeyMatch, Target};

/// Resolve a separator-delimited key against `tree`.
///
/// A leading token equal to the root key is optional and always consumed, so
/// the bare root key names the root itself. Tokens are matched against child
/// nodes; only the last token may fall back to an attribute of the node
/// reached so far.
pub fn resolve_key(tree: &ConfigTree, key: &str, separator: char, rule: KeyMatch) -> Result<Target> {
	if key.is_empty() {
		return Err(ConfigError::InvalidArgument("key can't be empty".to_string()));
	}

	let root = tree.root();
	let mut tokens: Vec<&str> = key.split(separator).collect();
	if rule.matches(tree.node(root).key(), tokens[0]) {
		tokens.remove(0);
	}
	if tokens.is_empty() {
		return Ok(Target::Node(root));
	}

	let mut current = root;
	let last = tokens.len() - 1;
	for (i, token) in tokens.iter().enumerate() {
		if let Some(child) = tree.find_child(current, token, rule) {
			current = child;
			continue;
		}

		if i < last {
			return Err(ConfigError::NodeNotFound {
				key: key.to_string(),
				segment: token.to_string(),
			});
		}

		return tree
			.find_attribute(current, token, rule)
			.map(|index| Target::Attribute {
				node: current,
				index,
			})
			.ok_or_else(|| ConfigError::AttributeNotFound {
				key: key.to_string(),
				segment: token.to_string(),
			});
	}

	Ok(Target::Node(current))
}
