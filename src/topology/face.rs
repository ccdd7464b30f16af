use crate::math::Vector3;

use super::loops::LoopId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the mesh store.
    pub struct FaceId;
}

/// Data associated with a mesh face.
///
/// A face is a cycle of loops starting at `first`. The normal is cached and
/// refreshed by [`MeshStore::update_face_normal`](super::MeshStore::update_face_normal)
/// or [`MeshStore::normal_update`](super::MeshStore::normal_update).
#[derive(Debug, Clone)]
pub struct FaceData {
    pub(crate) first: LoopId,
    pub(crate) len: usize,
    pub(crate) normal: Vector3,
    /// Selection flag.
    pub select: bool,
    /// Hidden faces are ignored by surface queries.
    pub hide: bool,
}

impl FaceData {
    /// First corner of the face cycle.
    #[must_use]
    pub fn first_loop(&self) -> LoopId {
        self.first
    }

    /// Number of corners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for faces created through the store.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cached unit normal, or zero for degenerate faces.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        self.normal
    }
}
