//! View components.

pub mod graph_view;
