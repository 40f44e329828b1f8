#![deny(missing_docs)]
//! SVG path geometry for the shared canvas
//!
//! Shapes travel the network as SVG path strings; this crate turns the `d`
//! attribute into a polyline and answers the geometric questions validation
//! needs: bounds, cross-shape overlap, and ink cost. The supported path
//! language is `M`, `L`, `h`, `v` and `Z`

mod path;
mod polyline;

pub use path::{path_to_polyline, svg_path_string};
pub use polyline::{ink_required, out_of_bounds, overlaps, Point, Polyline};

/// Error type for path parsing
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Returned when the path uses a command outside `M L h v Z`
    #[error("Unsupported path command '{0}'")]
    UnsupportedCommand(String),

    /// Returned when a command is missing a numeric argument
    #[error("Expected a coordinate, found '{0}'")]
    ExpectedCoordinate(String),

    /// Returned when the path does not describe at least one segment
    #[error("Path does not describe a drawable shape")]
    MalformedPath,
}
