//! MIME bundle decoding and graph payload validation.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::components::graph_view::GraphData;
use crate::config::RenderConfig;

/// MIME type the renderer is registered for.
pub const MIME_TYPE: &str = "application/vnd.netvis+json";

/// Version the Python package is expected to report.
pub const FRONTEND_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The object stored under [`MIME_TYPE`] in a notebook output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MimeBundle {
	/// JSON-encoded `{nodes, links}`.
	#[serde(default)]
	pub data: Option<String>,
	/// Version of the producing Python package.
	#[serde(default)]
	pub version: Option<String>,
	/// Optional render overrides.
	#[serde(default)]
	pub config: Option<RenderConfig>,
}

impl MimeBundle {
	/// Bundle carrying `data` at the current version.
	pub fn new(data: impl Into<String>) -> Self {
		Self {
			data: Some(data.into()),
			version: Some(FRONTEND_VERSION.to_owned()),
			config: None,
		}
	}
}

/// Reasons a payload cannot be turned into a graph.
#[derive(Debug, Error)]
pub enum PayloadError {
	/// The bundle has no `data` field.
	#[error("Invalid graph data: missing data field")]
	MissingData,
	/// `data` is not valid JSON.
	#[error("Invalid graph data: {0}")]
	InvalidJson(#[source] serde_json::Error),
	/// `data` is JSON but not an object.
	#[error("Invalid graph data: graph data must be an object")]
	NotAnObject,
	/// `nodes` or `links` is absent or not an array.
	#[error("Invalid graph data: missing nodes or links")]
	MissingNodesOrLinks,
	/// A node or link record has the wrong shape.
	#[error("Invalid graph data: {0}")]
	InvalidRecord(#[source] serde_json::Error),
}

/// Outcome of comparing the backend version with [`FRONTEND_VERSION`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionCheck {
	/// Versions agree.
	Match,
	/// The bundle carried no version.
	Missing,
	/// Versions differ.
	Mismatch {
		/// Our version.
		frontend: String,
		/// The bundle's version.
		backend: String,
	},
}

/// Compare the backend version against ours. Never fatal; problems are
/// logged as warnings.
pub fn validate_version(backend: Option<&str>) -> VersionCheck {
	match backend.map(str::trim).filter(|v| !v.is_empty()) {
		None => {
			warn!("backend version information missing");
			VersionCheck::Missing
		}
		Some(v) if v == FRONTEND_VERSION => {
			info!("version check passed: v{FRONTEND_VERSION}");
			VersionCheck::Match
		}
		Some(v) => {
			warn!(
				"version mismatch: frontend v{FRONTEND_VERSION}, backend v{v}; \
				 update both packages to the same version"
			);
			VersionCheck::Mismatch {
				frontend: FRONTEND_VERSION.to_owned(),
				backend: v.to_owned(),
			}
		}
	}
}

/// Parse a JSON graph string. Blank input yields an empty graph.
pub fn parse_graph_data(data: &str) -> Result<GraphData, PayloadError> {
	if data.trim().is_empty() {
		info!("empty data received, rendering empty graph");
		return Ok(GraphData::default());
	}

	let value: Value = serde_json::from_str(data).map_err(PayloadError::InvalidJson)?;
	let Value::Object(map) = &value else {
		return Err(PayloadError::NotAnObject);
	};
	let has_array = |key: &str| map.get(key).is_some_and(Value::is_array);
	if !has_array("nodes") || !has_array("links") {
		return Err(PayloadError::MissingNodesOrLinks);
	}

	let graph: GraphData = serde_json::from_value(value).map_err(PayloadError::InvalidRecord)?;
	info!(
		"parsed graph payload: {} nodes, {} links",
		graph.nodes.len(),
		graph.links.len()
	);
	Ok(graph)
}

/// Validate the bundle's version and parse its graph.
pub fn parse_bundle(bundle: &MimeBundle) -> Result<GraphData, PayloadError> {
	validate_version(bundle.version.as_deref());
	let data = bundle.data.as_deref().ok_or(PayloadError::MissingData)?;
	parse_graph_data(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bundle(data: Option<&str>) -> MimeBundle {
		MimeBundle {
			data: data.map(str::to_owned),
			version: Some(FRONTEND_VERSION.into()),
			config: None,
		}
	}

	#[test]
	fn valid_payload_parses() {
		let graph = parse_bundle(&bundle(Some(
			r#"{"nodes": [{"id": "A"}, {"id": "B"}], "links": [{"source": "A", "target": "B"}]}"#,
		)))
		.unwrap();
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.links.len(), 1);
	}

	#[test]
	fn missing_data_field_is_rejected() {
		let err = parse_bundle(&bundle(None)).unwrap_err();
		assert!(matches!(err, PayloadError::MissingData));
		assert!(err.to_string().contains("missing data field"));
	}

	#[test]
	fn malformed_json_is_rejected() {
		let err = parse_bundle(&bundle(Some("invalid json"))).unwrap_err();
		assert!(matches!(err, PayloadError::InvalidJson(_)));
	}

	#[test]
	fn missing_nodes_or_links_is_rejected() {
		for data in [r#"{"links": []}"#, r#"{"nodes": [{"id": "A"}]}"#, r#"{"nodes": {}, "links": []}"#] {
			let err = parse_bundle(&bundle(Some(data))).unwrap_err();
			assert!(err.to_string().contains("missing nodes or links"), "{data}");
		}
	}

	#[test]
	fn non_object_payload_is_rejected() {
		let err = parse_graph_data("[1, 2]").unwrap_err();
		assert!(matches!(err, PayloadError::NotAnObject));
	}

	#[test]
	fn node_without_id_is_rejected() {
		let err = parse_graph_data(r#"{"nodes": [{"size": 3}], "links": []}"#).unwrap_err();
		assert!(matches!(err, PayloadError::InvalidRecord(_)));
	}

	#[test]
	fn loosely_typed_node_fields_are_accepted() {
		let graph = parse_graph_data(
			r#"{"nodes": [{"id": "a", "category": 1.5}, {"id": "b", "name": 42, "size": "3"}],
			"links": [{"source": "a", "target": "b"}]}"#,
		)
		.unwrap();
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.nodes[1].name, None);
		assert_eq!(graph.nodes[1].extra["size"], "3");
	}

	#[test]
	fn blank_data_is_an_empty_graph() {
		assert_eq!(parse_graph_data("  \n").unwrap(), GraphData::default());
	}

	#[test]
	fn version_checks() {
		assert_eq!(validate_version(Some(FRONTEND_VERSION)), VersionCheck::Match);
		assert_eq!(validate_version(None), VersionCheck::Missing);
		assert_eq!(validate_version(Some(" ")), VersionCheck::Missing);
		assert_eq!(
			validate_version(Some("0.1.0")),
			VersionCheck::Mismatch {
				frontend: FRONTEND_VERSION.into(),
				backend: "0.1.0".into(),
			}
		);
	}

	#[test]
	fn version_mismatch_is_not_fatal() {
		let mut b = bundle(Some(r#"{"nodes": [], "links": []}"#));
		b.version = Some("0.0.1".into());
		assert!(parse_bundle(&b).is_ok());
	}

	#[test]
	fn bundle_config_is_optional() {
		let b: MimeBundle =
			serde_json::from_str(r#"{"data": "", "version": "0.4.0", "config": {"width": 320}}"#)
				.unwrap();
		assert_eq!(b.config.unwrap().width, 320.0);
	}
}
