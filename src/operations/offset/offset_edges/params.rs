use std::f64::consts::FRAC_PI_4;

use crate::error::{OperationError, Result};
use crate::topology::MeshStore;

/// What happens to the extruded ribbon once the offset is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryMode {
    /// Keep the original chain and leave the displaced copy as new edges.
    #[default]
    Offset,
    /// Keep the ribbon of side faces between the chain and its displaced copy.
    Extrude,
    /// Move the original chain onto the displaced positions.
    Move,
}

/// Where corner normals come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowFace {
    /// Follow neighbouring faces when any face of the mesh is selected.
    #[default]
    Auto,
    /// Always use the normals of the faces around each chain edge.
    On,
    /// Always use the flat normal of each temporary cap face.
    Off,
}

/// Which normals define the tangent at a folded corner after the edge
/// directions were rotated apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoldNormals {
    /// Keep the tangent computed around the rotated normals.
    #[default]
    Rotated,
    /// Re-project the tangent onto the plane of the unrotated active normal.
    Original,
}

/// Parameters of an [`OffsetEdges`](super::OffsetEdges) invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetEdgesParams {
    /// Perpendicular offset distance, measured along the surface.
    pub width: f64,
    /// How the result is shaped.
    pub mode: GeometryMode,
    /// Normal sourcing for corner directions.
    pub follow_face: FollowFace,
    /// Negates `width`.
    pub flip: bool,
    /// Angle (radians) below which directions count as parallel.
    pub angle_threshold: f64,
    /// Tangent frame used at folded corners.
    pub fold_normals: FoldNormals,
}

impl Default for OffsetEdgesParams {
    fn default() -> Self {
        Self {
            width: 0.2,
            mode: GeometryMode::Offset,
            follow_face: FollowFace::Auto,
            flip: false,
            angle_threshold: 1.0e-4,
            fold_normals: FoldNormals::Rotated,
        }
    }
}

impl OffsetEdgesParams {
    /// Sets the offset width.
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Sets the geometry mode.
    #[must_use]
    pub fn with_mode(mut self, mode: GeometryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the normal sourcing.
    #[must_use]
    pub fn with_follow_face(mut self, follow_face: FollowFace) -> Self {
        self.follow_face = follow_face;
        self
    }

    /// Sets whether the width is negated.
    #[must_use]
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Sets the angle threshold in radians.
    #[must_use]
    pub fn with_angle_threshold(mut self, angle_threshold: f64) -> Self {
        self.angle_threshold = angle_threshold;
        self
    }

    /// Sets the tangent frame used at folded corners.
    #[must_use]
    pub fn with_fold_normals(mut self, fold_normals: FoldNormals) -> Self {
        self.fold_normals = fold_normals;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the width is not finite or
    /// the angle threshold is outside `(0, π/4)`.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() {
            return Err(OperationError::InvalidInput("width must be finite".to_owned()).into());
        }
        if !(self.angle_threshold > 0.0 && self.angle_threshold < FRAC_PI_4) {
            return Err(OperationError::InvalidInput(
                "angle threshold must be in (0, pi/4)".to_owned(),
            )
            .into());
        }
        Ok(())
    }

    /// Width with `flip` applied.
    #[must_use]
    pub fn signed_width(&self) -> f64 {
        if self.flip {
            -self.width
        } else {
            self.width
        }
    }

    /// Resolves [`FollowFace::Auto`] against the mesh's face selection.
    #[must_use]
    pub fn follows_faces(&self, store: &MeshStore) -> bool {
        match self.follow_face {
            FollowFace::On => true,
            FollowFace::Off => false,
            FollowFace::Auto => store.faces().any(|(_, f)| f.select),
        }
    }
}
