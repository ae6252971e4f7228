//! Widgets that compose the dashboard's view nodes. Each widget is built
//! from an identifier plus the data it projects, and turns itself into a
//! [`crate::view::ViewNode`] through [`crate::view::Compose`].

pub mod chart;
pub mod filter;
pub mod graph;
pub mod history;
pub mod timeline;
