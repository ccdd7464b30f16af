mod offset_edges;

pub use offset_edges::{
    solve_corner, CornerKind, CornerNormals, CornerVector, EdgeChain, FoldNormals, FollowFace,
    GeometryMode, OffsetEdges, OffsetEdgesOutput, OffsetEdgesParams,
};
