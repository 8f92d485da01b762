//! Graphics capability consumed by scene filters.
//!
//! A [`Graphics`] is a single visual primitive (points, lines, surfaces...)
//! drawn for some field domain of a region's scene. Filters only ever query
//! it, so any renderer-side type can implement this trait.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ZincError;
use crate::region::Region;

/// The kind of primitive a graphics draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraphicsType {
    /// Glyphs drawn at points.
    Points,
    /// Lines along 1D elements or element edges.
    Lines,
    /// Surfaces over 2D elements or element faces.
    Surfaces,
    /// Iso-surfaces, iso-lines or iso-points.
    Contours,
    /// Streamlines tracked through a vector field.
    Streamlines,
}

impl GraphicsType {
    /// All graphics types in enumeration order.
    pub const ALL: [Self; 5] = [
        Self::Points,
        Self::Lines,
        Self::Surfaces,
        Self::Contours,
        Self::Streamlines,
    ];

    /// Returns the canonical string for this graphics type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Points => "POINTS",
            Self::Lines => "LINES",
            Self::Surfaces => "SURFACES",
            Self::Contours => "CONTOURS",
            Self::Streamlines => "STREAMLINES",
        }
    }
}

impl fmt::Display for GraphicsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphicsType {
    type Err = ZincError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|value| value.as_str() == s)
            .ok_or_else(|| ZincError::UnknownEnumValue {
                kind: "graphics type",
                value: s.to_string(),
            })
    }
}

/// The field domain a graphics is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainType {
    /// A single point, independent of any mesh.
    Point,
    /// Nodes of the region.
    Nodes,
    /// Data points of the region.
    Datapoints,
    /// One-dimensional mesh elements.
    Mesh1d,
    /// Two-dimensional mesh elements.
    Mesh2d,
    /// Three-dimensional mesh elements.
    Mesh3d,
    /// Elements of the highest dimension present in the region.
    MeshHighestDimension,
}

impl DomainType {
    /// All domain types in enumeration order.
    pub const ALL: [Self; 7] = [
        Self::Point,
        Self::Nodes,
        Self::Datapoints,
        Self::Mesh1d,
        Self::Mesh2d,
        Self::Mesh3d,
        Self::MeshHighestDimension,
    ];

    /// Returns the canonical string for this domain type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::Nodes => "NODES",
            Self::Datapoints => "DATAPOINTS",
            Self::Mesh1d => "MESH1D",
            Self::Mesh2d => "MESH2D",
            Self::Mesh3d => "MESH3D",
            Self::MeshHighestDimension => "MESH_HIGHEST_DIMENSION",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainType {
    type Err = ZincError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|value| value.as_str() == s)
            .ok_or_else(|| ZincError::UnknownEnumValue {
                kind: "domain type",
                value: s.to_string(),
            })
    }
}

/// A drawable primitive that scene filters can test.
pub trait Graphics {
    /// Returns the name of this graphics.
    fn name(&self) -> &str;

    /// Returns the kind of primitive drawn.
    fn graphics_type(&self) -> GraphicsType;

    /// Returns the field domain this graphics is drawn over.
    fn domain_type(&self) -> DomainType;

    /// Returns the graphics' own visibility flag.
    fn visibility_flag(&self) -> bool;

    /// Returns the region owning the scene this graphics belongs to.
    fn region(&self) -> &Region;

    /// Returns whether the owning scene is visible.
    fn scene_visibility_flag(&self) -> bool {
        true
    }

    /// Returns true if both the graphics and its scene are visible.
    fn is_visible_in_scene(&self) -> bool {
        self.visibility_flag() && self.scene_visibility_flag()
    }
}
