use crate::tree::{ConfigTree, KeyMatch, NodeId};

/// Apply the values of `overlay` onto `target`.
///
/// Only nodes and attributes that already exist in `target` are updated, so
/// the shape of the tree never changes. Updates do not mark anything as
/// changed. Returns the number of values replaced.
pub fn merge_into(
	target: &mut ConfigTree,
	target_node: NodeId,
	overlay: &ConfigTree,
	overlay_node: NodeId,
	rule: KeyMatch,
) -> usize {
	let mut replaced = 0;
	let update = overlay.node(overlay_node);

	if target.node(target_node).value() != update.value() {
		target.update_node(target_node, update.value(), false);
		replaced += 1;
	}

	for attribute in update.attributes() {
		if let Some(index) = target.find_attribute(target_node, attribute.key(), rule)
			&& target.attribute(target_node, index).value() != attribute.value()
		{
			target.update_attribute(target_node, index, attribute.value(), false);
			replaced += 1;
		}
	}

	for child in update.children() {
		let key = overlay.node(*child).key();
		if let Some(existing) = target.find_child(target_node, key, rule) {
			replaced += merge_into(target, existing, overlay, *child, rule);
		}
	}

	replaced
}
