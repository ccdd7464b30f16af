mod extrude_edge_only;
mod extrude_vert_indiv;

pub use extrude_edge_only::{ExtrudeEdgeOnly, ExtrudedEdges};
pub use extrude_vert_indiv::{ExtrudeVertIndiv, ExtrudedVerts};
