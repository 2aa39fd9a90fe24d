use super::types::{Category, GraphNode};

/// Category10 palette.
pub const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Fill for nodes without a category.
pub const DEFAULT_COLOR: &str = COLORS[0];

/// Radius floor, also the divisor applied to `size`.
pub const DEFAULT_NODE_SIZE: f64 = 5.0;

/// Radius for a node of the given `size`.
///
/// Sizes are scaled down by [`DEFAULT_NODE_SIZE`] and never drawn smaller
/// than it. Missing or unusable sizes get the default.
pub fn node_radius(size: Option<f64>) -> f64 {
	match size {
		Some(s) if s.is_finite() && s > 0.0 => {
			let scaled = s / DEFAULT_NODE_SIZE;
			if scaled > DEFAULT_NODE_SIZE {
				scaled
			} else {
				DEFAULT_NODE_SIZE
			}
		}
		_ => DEFAULT_NODE_SIZE,
	}
}

/// Normalized lookup key for a named category.
///
/// Lowercased and trimmed, with runs of anything non-alphanumeric collapsed
/// to a single `_`. Returns `None` when nothing is left.
pub fn category_key(category: &str) -> Option<String> {
	let mut key = String::with_capacity(category.len());
	let mut pending_sep = false;
	for c in category.trim().chars() {
		if c.is_alphanumeric() {
			if pending_sep && !key.is_empty() {
				key.push('_');
			}
			pending_sep = false;
			key.extend(c.to_lowercase());
		} else {
			pending_sep = true;
		}
	}
	(!key.is_empty()).then_some(key)
}

/// Palette color for a category.
pub fn category_color(category: Option<&Category>) -> &'static str {
	match category {
		Some(Category::Index(i)) => palette(*i),
		Some(Category::Number(n)) if n.is_finite() => palette(n.trunc() as i64),
		Some(Category::Name(name)) => match category_key(name) {
			Some(key) => COLORS[(fnv1a(key.as_bytes()) % COLORS.len() as u64) as usize],
			None => DEFAULT_COLOR,
		},
		_ => DEFAULT_COLOR,
	}
}

fn palette(index: i64) -> &'static str {
	COLORS[index.rem_euclid(COLORS.len() as i64) as usize]
}

/// Fill for a node: its explicit `color`, else its category's.
pub fn node_color(node: &GraphNode) -> String {
	match node.color.as_deref().map(str::trim) {
		Some(color) if !color.is_empty() => color.to_owned(),
		_ => category_color(node.category.as_ref()).to_owned(),
	}
}

fn fnv1a(bytes: &[u8]) -> u64 {
	bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
		(hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn radius_has_a_floor() {
		assert_eq!(node_radius(None), DEFAULT_NODE_SIZE);
		assert_eq!(node_radius(Some(10.0)), DEFAULT_NODE_SIZE);
		assert_eq!(node_radius(Some(25.0)), DEFAULT_NODE_SIZE);
		assert_eq!(node_radius(Some(100.0)), 20.0);
	}

	#[test]
	fn unusable_sizes_use_default() {
		for size in [0.0, -40.0, f64::NAN, f64::INFINITY] {
			assert_eq!(node_radius(Some(size)), DEFAULT_NODE_SIZE);
		}
	}

	#[test]
	fn category_keys_are_normalized() {
		assert_eq!(category_key("  Web Server ").as_deref(), Some("web_server"));
		assert_eq!(category_key("web--server").as_deref(), Some("web_server"));
		assert_eq!(category_key("__db__").as_deref(), Some("db"));
		assert_eq!(category_key(" - "), None);
	}

	#[test]
	fn equivalent_categories_share_a_color() {
		let a = Category::Name("Web Server".into());
		let b = Category::Name("web_server".into());
		assert_eq!(category_color(Some(&a)), category_color(Some(&b)));
	}

	#[test]
	fn numeric_categories_wrap_the_palette() {
		assert_eq!(category_color(Some(&Category::Index(1))), COLORS[1]);
		assert_eq!(category_color(Some(&Category::Index(12))), COLORS[2]);
		assert_eq!(category_color(Some(&Category::Index(-1))), COLORS[9]);
	}

	#[test]
	fn fractional_categories_are_truncated() {
		let node: GraphNode = serde_json::from_str(r#"{"id": "a", "category": 1.5}"#).unwrap();
		assert_eq!(node_color(&node), COLORS[1]);
		assert_eq!(category_color(Some(&Category::Number(12.9))), COLORS[2]);
		assert_eq!(category_color(Some(&Category::Number(f64::NAN))), DEFAULT_COLOR);
	}

	#[test]
	fn unsupported_category_uses_default() {
		let node: GraphNode = serde_json::from_str(r#"{"id": "a", "category": false}"#).unwrap();
		assert_eq!(node_color(&node), DEFAULT_COLOR);
	}

	#[test]
	fn missing_category_uses_default() {
		assert_eq!(category_color(None), DEFAULT_COLOR);
		assert_eq!(category_color(Some(&Category::Name("".into()))), DEFAULT_COLOR);
	}

	#[test]
	fn explicit_color_wins() {
		let mut node = GraphNode::new("a");
		node.category = Some(Category::Index(3));
		assert_eq!(node_color(&node), COLORS[3]);
		node.color = Some("#abcdef".into());
		assert_eq!(node_color(&node), "#abcdef");
	}
}
