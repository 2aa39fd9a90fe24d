use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Node category used to pick a palette color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
	/// Numeric group, indexes the palette directly.
	Index(i64),
	/// Fractional group, truncated before indexing.
	Number(f64),
	/// Named group, hashed into the palette.
	Name(String),
}

/// A graph vertex as sent by the Python side.
///
/// Decorative fields are read leniently: a value of the wrong type leaves
/// the field `None` and stays in [`extra`](Self::extra) as sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode")]
pub struct GraphNode {
	/// Unique node id. Numeric ids are stringified.
	pub id: String,
	/// Text drawn beside the node.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Alternative to `label`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Explicit fill, overrides the category palette.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	/// Relative size, mapped to a radius by [`node_radius`](super::style::node_radius).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size: Option<f64>,
	/// Palette group.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<Category>,
	/// Initial x position.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Initial y position.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	/// Any other fields, passed through untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawNode {
	#[serde(deserialize_with = "id_from_value")]
	id: String,
	#[serde(flatten)]
	fields: Map<String, Value>,
}

impl From<RawNode> for GraphNode {
	fn from(raw: RawNode) -> Self {
		let mut extra = raw.fields;
		let text = |v: &Value| v.as_str().map(str::to_owned);
		Self {
			id: raw.id,
			label: take_field(&mut extra, "label", text),
			name: take_field(&mut extra, "name", text),
			color: take_field(&mut extra, "color", text),
			size: take_field(&mut extra, "size", Value::as_f64),
			category: take_field(&mut extra, "category", |v| match v {
				Value::Number(_) | Value::String(_) => Category::deserialize(v).ok(),
				_ => None,
			}),
			x: take_field(&mut extra, "x", Value::as_f64),
			y: take_field(&mut extra, "y", Value::as_f64),
			extra,
		}
	}
}

/// Move `key` out of `fields` when `read` accepts it. Nulls are dropped.
fn take_field<T>(
	fields: &mut Map<String, Value>,
	key: &str,
	read: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
	let value = match fields.get(key)? {
		Value::Null => None,
		other => Some(read(other)?),
	};
	fields.remove(key);
	value
}

impl GraphNode {
	/// Node with just an id.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Default::default()
		}
	}

	/// `label`, falling back to `name`.
	pub fn display_label(&self) -> Option<&str> {
		self.label.as_deref().or(self.name.as_deref())
	}
}

/// One end of a link: a bare id, or a node object already resolved by a
/// layout library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
	/// Node id.
	Id(#[serde(deserialize_with = "id_from_value")] String),
	/// Resolved node object; only its id matters.
	Node {
		/// Id of the referenced node.
		#[serde(deserialize_with = "id_from_value")]
		id: String,
	},
}

impl Endpoint {
	/// The referenced node id.
	pub fn id(&self) -> &str {
		match self {
			Endpoint::Id(id) | Endpoint::Node { id } => id,
		}
	}
}

impl From<&str> for Endpoint {
	fn from(id: &str) -> Self {
		Endpoint::Id(id.to_owned())
	}
}

/// A graph edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Source endpoint.
	pub source: Endpoint,
	/// Target endpoint.
	pub target: Endpoint,
	/// Any other fields, passed through untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl GraphLink {
	/// Link between two node ids.
	pub fn new(source: &str, target: &str) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			extra: Map::new(),
		}
	}
}

/// The `{nodes, links}` payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Vertices.
	pub nodes: Vec<GraphNode>,
	/// Edges.
	pub links: Vec<GraphLink>,
}

fn id_from_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawId {
		Text(String),
		Int(i64),
		Float(f64),
	}

	Ok(match RawId::deserialize(deserializer)? {
		RawId::Text(s) => s,
		RawId::Int(i) => i.to_string(),
		RawId::Float(f) => f.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_ids_are_stringified() {
		let node: GraphNode = serde_json::from_str(r#"{"id": 7}"#).unwrap();
		assert_eq!(node.id, "7");
	}

	#[test]
	fn extra_fields_survive_a_round_trip() {
		let node: GraphNode =
			serde_json::from_str(r#"{"id": "a", "weight": 3, "category": "x"}"#).unwrap();
		assert_eq!(node.extra.get("weight"), Some(&Value::from(3)));
		assert_eq!(node.category, Some(Category::Name("x".into())));

		let back = serde_json::to_value(&node).unwrap();
		assert_eq!(back["weight"], 3);
		assert!(back.get("label").is_none());
	}

	#[test]
	fn link_endpoints_accept_resolved_nodes() {
		let link: GraphLink =
			serde_json::from_str(r#"{"source": {"id": "a", "x": 1.0}, "target": "b"}"#).unwrap();
		assert_eq!(link.source.id(), "a");
		assert_eq!(link.target.id(), "b");
	}

	#[test]
	fn display_label_prefers_label_over_name() {
		let mut node = GraphNode::new("a");
		node.name = Some("Name".into());
		assert_eq!(node.display_label(), Some("Name"));
		node.label = Some("Label".into());
		assert_eq!(node.display_label(), Some("Label"));
	}

	#[test]
	fn fractional_category_is_accepted() {
		let node: GraphNode = serde_json::from_str(r#"{"id": "a", "category": 1.5}"#).unwrap();
		assert_eq!(node.category, Some(Category::Number(1.5)));
	}

	#[test]
	fn unsupported_category_is_kept_aside() {
		let node: GraphNode = serde_json::from_str(r#"{"id": "a", "category": true}"#).unwrap();
		assert_eq!(node.category, None);
		assert_eq!(node.extra.get("category"), Some(&Value::Bool(true)));

		let node: GraphNode =
			serde_json::from_str(r#"{"id": "b", "category": {"kind": "db"}}"#).unwrap();
		assert_eq!(node.category, None);
	}

	#[test]
	fn numeric_name_is_kept_aside() {
		let node: GraphNode = serde_json::from_str(r#"{"id": "a", "name": 42}"#).unwrap();
		assert_eq!(node.name, None);
		assert_eq!(node.display_label(), None);
		assert_eq!(node.extra.get("name"), Some(&Value::from(42)));

		let back = serde_json::to_value(&node).unwrap();
		assert_eq!(back["name"], 42);
	}

	#[test]
	fn string_size_is_kept_aside() {
		let node: GraphNode =
			serde_json::from_str(r#"{"id": "a", "size": "big", "x": "left", "y": 3}"#).unwrap();
		assert_eq!(node.size, None);
		assert_eq!(node.x, None);
		assert_eq!(node.y, Some(3.0));
		assert_eq!(node.extra.get("size"), Some(&Value::from("big")));
		assert_eq!(node.extra.get("x"), Some(&Value::from("left")));
	}

	#[test]
	fn null_fields_are_dropped() {
		let node: GraphNode = serde_json::from_str(r#"{"id": "a", "label": null}"#).unwrap();
		assert_eq!(node.label, None);
		assert!(node.extra.is_empty());
	}
}
