use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::{FaceId, MeshStore, VertexId};

/// A rectangular patch of quads produced by [`MakeGrid`].
#[derive(Debug, Clone)]
pub struct Grid {
    /// Vertices indexed `[row][column]`.
    pub verts: Vec<Vec<VertexId>>,
    /// Faces indexed `[row][column]`; face `(r, c)` spans vertex rows `r..=r+1`
    /// and columns `c..=c+1`.
    pub faces: Vec<Vec<FaceId>>,
}

/// Creates a grid of quads whose vertex positions come from a function of
/// `(column, row)`.
///
/// Faces are wound counter-clockwise in parameter space, so a flat grid
/// with `position(c, r) = (c, r, 0)` faces `+Z`.
pub struct MakeGrid<F> {
    columns: usize,
    rows: usize,
    position: F,
}

impl<F> MakeGrid<F>
where
    F: Fn(usize, usize) -> Point3,
{
    /// Creates a new `MakeGrid` operation with `columns × rows` quads.
    #[must_use]
    pub fn new(columns: usize, rows: usize, position: F) -> Self {
        Self {
            columns,
            rows,
            position,
        }
    }

    /// Executes the operation, creating the grid in the mesh store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for an empty grid.
    pub fn execute(&self, store: &mut MeshStore) -> Result<Grid> {
        if self.columns == 0 || self.rows == 0 {
            return Err(
                OperationError::InvalidInput("grid needs at least one quad".into()).into(),
            );
        }

        let verts: Vec<Vec<VertexId>> = (0..=self.rows)
            .map(|r| {
                (0..=self.columns)
                    .map(|c| store.add_vertex((self.position)(c, r)))
                    .collect()
            })
            .collect();

        let mut faces = Vec::with_capacity(self.rows);
        for r in 0..self.rows {
            let mut row = Vec::with_capacity(self.columns);
            for c in 0..self.columns {
                row.push(store.add_face(&[
                    verts[r][c],
                    verts[r][c + 1],
                    verts[r + 1][c + 1],
                    verts[r + 1][c],
                ])?);
            }
            faces.push(row);
        }
        Ok(Grid { verts, faces })
    }
}
