//! Offsetting selected edge chains across the surface they lie on.
//!
//! The pipeline runs in four stages:
//!
//! 1. `chain` validates the selection, orders it into chains and closes
//!    open chains with temporary bridge geometry.
//! 2. `side_geometry` extrudes the chains into a ribbon, fills the offset
//!    boundary with cap faces and records the surface normal behind every
//!    cap corner.
//! 3. `corner` turns each cap corner into a direction and a scale factor.
//! 4. `finalize` moves the corners and shapes the result for the
//!    requested [`GeometryMode`].

mod chain;
mod corner;
mod finalize;
mod params;
mod side_geometry;

use tracing::{info, warn};

pub use chain::EdgeChain;
pub use corner::{solve_corner, CornerKind, CornerNormals, CornerVector};
pub use params::{FoldNormals, FollowFace, GeometryMode, OffsetEdgesParams};

use crate::error::{OffsetEdgesError, Result};
use crate::topology::{EdgeId, FaceId, MeshStore, VertexId};

/// Geometry left behind by an [`OffsetEdges`] run.
#[derive(Debug, Clone, Default)]
pub struct OffsetEdgesOutput {
    /// The chains the selection was ordered into.
    pub chains: Vec<EdgeChain>,
    /// Displaced copies of the chain vertices still in the mesh.
    pub offset_vertices: Vec<VertexId>,
    /// Edges of the displaced boundary still in the mesh.
    pub offset_edges: Vec<EdgeId>,
    /// Ribbon faces kept by [`GeometryMode::Extrude`].
    pub side_faces: Vec<FaceId>,
}

/// Offsets the selected edges of a mesh by a fixed distance measured along
/// the surrounding surface.
///
/// Selected edges bordering at most one selected face form the input. They
/// must split into non-branching chains; open chains are fine.
///
/// # Example
///
/// ```
/// use offset_edges::math::Point3;
/// use offset_edges::operations::creation::MakeWire;
/// use offset_edges::operations::offset::{GeometryMode, OffsetEdges, OffsetEdgesParams};
/// use offset_edges::topology::MeshStore;
///
/// let mut store = MeshStore::new();
/// let square = MakeWire::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(1.0, 1.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     true,
/// )
/// .execute(&mut store)?;
/// for &e in &square.edges {
///     store.edge_mut(e)?.select = true;
/// }
///
/// let params = OffsetEdgesParams::default()
///     .with_width(0.1)
///     .with_mode(GeometryMode::Move);
/// OffsetEdges::new(params).execute(&mut store)?;
///
/// let corner = store.point(square.verts[0])?;
/// assert!((corner.x + 0.1).abs() < 1e-9 && (corner.y + 0.1).abs() < 1e-9);
/// # Ok::<(), offset_edges::OffsetEdgesError>(())
/// ```
pub struct OffsetEdges {
    params: OffsetEdgesParams,
}

impl OffsetEdges {
    /// Creates a new `OffsetEdges` operation.
    #[must_use]
    pub fn new(params: OffsetEdgesParams) -> Self {
        Self { params }
    }

    /// Executes the offset on the store's current selection.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`](crate::error::OperationError::InvalidInput)
    /// for bad parameters and a [`SelectionError`](crate::error::SelectionError)
    /// for an empty or branching selection, both before touching the mesh.
    /// Returns another error if a mesh primitive fails midway.
    pub fn execute(&self, store: &mut MeshStore) -> Result<OffsetEdgesOutput> {
        let reject = |e: &OffsetEdgesError| warn!("Offset edges rejected: {e}");
        self.params.validate().inspect_err(reject)?;
        let selection = chain::collect(store).inspect_err(reject)?;
        let follow_faces = self.params.follows_faces(store);

        store.normal_update()?;
        let mut chain_edges = chain::bridge(store, selection)?;
        let geometry = side_geometry::build(store, &mut chain_edges)?;
        finalize::displace(store, &geometry, &chain_edges, &self.params, follow_faces)?;
        finalize::clean_up(store, &geometry, &mut chain_edges, self.params.mode)?;

        let output = OffsetEdgesOutput {
            offset_vertices: geometry
                .offset_verts
                .iter()
                .copied()
                .filter(|&v| store.contains_vertex(v))
                .collect(),
            offset_edges: geometry
                .offset_edges
                .iter()
                .copied()
                .filter(|&e| store.contains_edge(e))
                .collect(),
            side_faces: geometry
                .side_faces
                .iter()
                .copied()
                .filter(|&f| store.contains_face(f))
                .collect(),
            chains: chain_edges.chains,
        };
        info!(
            "Offset {} chains by {} ({:?}): {} new vertices, {} side faces",
            output.chains.len(),
            self.params.signed_width(),
            self.params.mode,
            output.offset_vertices.len(),
            output.side_faces.len()
        );
        Ok(output)
    }
}
