pub mod edge;
pub mod face;
pub mod loops;
pub mod vertex;

pub use edge::{EdgeData, EdgeId};
pub use face::{FaceData, FaceId};
pub use loops::{LoopData, LoopId};
pub use vertex::{VertexData, VertexId};

use std::collections::BTreeSet;

use crate::error::TopologyError;
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3};
use slotmap::SlotMap;

/// Central arena that owns all mesh entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
/// Adjacency is kept in both directions: vertices list their edges, edges
/// list the loops of the faces using them, and loops link to their
/// neighbours inside the face.
#[derive(Debug, Default, Clone)]
pub struct MeshStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    loops: SlotMap<LoopId, LoopData>,
    faces: SlotMap<FaceId, FaceData>,
}

impl MeshStore {
    /// Creates a new, empty mesh store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts an unconnected vertex and returns its ID.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(VertexData::new(point))
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point(&self, id: VertexId) -> Result<Point3, TopologyError> {
        Ok(self.vertex(id)?.point)
    }

    /// Edges incident to a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_edges(&self, id: VertexId) -> Result<Vec<EdgeId>, TopologyError> {
        Ok(self.vertex(id)?.edges.clone())
    }

    /// Faces incident to a vertex, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex or one of its edges is not found.
    pub fn vertex_faces(&self, id: VertexId) -> Result<Vec<FaceId>, TopologyError> {
        let mut faces = Vec::new();
        for &edge in &self.vertex(id)?.edges {
            for face in self.edge_faces(edge)? {
                if !faces.contains(&face) {
                    faces.push(face);
                }
            }
        }
        Ok(faces)
    }

    /// Normalized sum of the normals of the faces around a vertex, leaving
    /// out the faces in `exclude`.
    ///
    /// Returns the zero vector for loose vertices and for vertices whose
    /// counted faces are all degenerate or cancel out.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn vertex_normal(
        &self,
        id: VertexId,
        exclude: &BTreeSet<FaceId>,
    ) -> Result<Vector3, TopologyError> {
        let mut sum = Vector3::zeros();
        for face in self.vertex_faces(id)? {
            if !exclude.contains(&face) {
                sum += self.face(face)?.normal;
            }
        }
        Ok(crate::math::vector_3d::normalize_or_zero(&sum))
    }

    // --- Edge operations ---

    /// Inserts an edge between two distinct vertices and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is missing, the vertices are the
    /// same, or an edge between them already exists.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId, TopologyError> {
        self.vertex(a)?;
        self.vertex(b)?;
        if a == b {
            return Err(TopologyError::InvalidTopology(
                "edge endpoints must be distinct".into(),
            ));
        }
        if self.edge_between(a, b)?.is_some() {
            return Err(TopologyError::DuplicateEdge);
        }
        let id = self.edges.insert(EdgeData::new(a, b));
        self.vertex_mut(a)?.edges.push(id);
        self.vertex_mut(b)?.edges.push(id);
        Ok(id)
    }

    /// Returns the edge between two vertices, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is missing or the vertices are the same.
    pub fn ensure_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId, TopologyError> {
        match self.edge_between(a, b)? {
            Some(edge) => Ok(edge),
            None => self.add_edge(a, b),
        }
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Returns a mutable reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData, TopologyError> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Finds the edge joining two vertices, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not found.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Result<Option<EdgeId>, TopologyError> {
        for &edge in &self.vertex(a)?.edges {
            if self.edge(edge)?.has_vertex(b) {
                return Ok(Some(edge));
            }
        }
        Ok(None)
    }

    /// The endpoint of `edge` that is not `vertex`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing or does not touch `vertex`.
    pub fn other_vertex(&self, edge: EdgeId, vertex: VertexId) -> Result<VertexId, TopologyError> {
        let [a, b] = self.edge(edge)?.verts;
        if a == vertex {
            Ok(b)
        } else if b == vertex {
            Ok(a)
        } else {
            Err(TopologyError::InvalidTopology(
                "vertex is not an endpoint of the edge".into(),
            ))
        }
    }

    /// Faces using an edge, in radial order.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its loops is not found.
    pub fn edge_faces(&self, id: EdgeId) -> Result<Vec<FaceId>, TopologyError> {
        let mut faces = Vec::new();
        for &l in &self.edge(id)?.loops {
            let face = self.loop_data(l)?.face;
            if !faces.contains(&face) {
                faces.push(face);
            }
        }
        Ok(faces)
    }

    /// Euclidean length of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its vertices are not found.
    pub fn edge_length(&self, id: EdgeId) -> Result<f64, TopologyError> {
        let [a, b] = self.edge(id)?.verts;
        Ok((self.point(b)? - self.point(a)?).norm())
    }

    // --- Loop operations ---

    /// Returns the face corner data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn loop_data(&self, id: LoopId) -> Result<&LoopData, TopologyError> {
        self.loops
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("loop".into()))
    }

    /// Next corner of the same face.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn loop_next(&self, id: LoopId) -> Result<LoopId, TopologyError> {
        Ok(self.loop_data(id)?.next)
    }

    /// Previous corner of the same face.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn loop_prev(&self, id: LoopId) -> Result<LoopId, TopologyError> {
        Ok(self.loop_data(id)?.prev)
    }

    /// The corner of the next face around the same edge.
    ///
    /// Returns `id` itself when the edge is used by a single face.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop or its edge is not found, or the loop is
    /// missing from its edge's radial list.
    pub fn radial_next(&self, id: LoopId) -> Result<LoopId, TopologyError> {
        let radial = &self.edge(self.loop_data(id)?.edge)?.loops;
        let pos = radial.iter().position(|&l| l == id).ok_or_else(|| {
            TopologyError::InvalidTopology("loop missing from its edge's radial list".into())
        })?;
        Ok(radial[(pos + 1) % radial.len()])
    }

    /// Position of a corner's vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop or its vertex is not found.
    pub fn loop_point(&self, id: LoopId) -> Result<Point3, TopologyError> {
        self.point(self.loop_data(id)?.vert)
    }

    // --- Face operations ---

    /// Creates a face from a cycle of at least three distinct vertices.
    ///
    /// Missing boundary edges are created. The face normal is computed
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three vertices are given, a vertex is
    /// repeated, or a vertex is not found.
    pub fn add_face(&mut self, verts: &[VertexId]) -> Result<FaceId, TopologyError> {
        if verts.len() < 3 {
            return Err(TopologyError::InvalidTopology(
                "a face needs at least three vertices".into(),
            ));
        }
        for (i, &v) in verts.iter().enumerate() {
            self.vertex(v)?;
            if verts[..i].contains(&v) {
                return Err(TopologyError::InvalidTopology(
                    "face vertices must be distinct".into(),
                ));
            }
        }

        let n = verts.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            edges.push(self.ensure_edge(verts[i], verts[(i + 1) % n])?);
        }

        let face = self.faces.insert(FaceData {
            first: LoopId::default(),
            len: n,
            normal: Vector3::zeros(),
            select: false,
            hide: false,
        });
        let loop_ids: Vec<LoopId> = verts
            .iter()
            .zip(&edges)
            .map(|(&vert, &edge)| {
                self.loops.insert(LoopData {
                    vert,
                    edge,
                    face,
                    next: LoopId::default(),
                    prev: LoopId::default(),
                })
            })
            .collect();

        for i in 0..n {
            let next = loop_ids[(i + 1) % n];
            let prev = loop_ids[(i + n - 1) % n];
            if let Some(l) = self.loops.get_mut(loop_ids[i]) {
                l.next = next;
                l.prev = prev;
            }
            self.edge_mut(edges[i])?.loops.push(loop_ids[i]);
        }
        self.face_mut(face)?.first = loop_ids[0];
        self.update_face_normal(face)?;
        Ok(face)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Returns a mutable reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Corners of a face in cycle order, starting at its first loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its loops is not found.
    pub fn face_loops(&self, id: FaceId) -> Result<Vec<LoopId>, TopologyError> {
        let face = self.face(id)?;
        let mut loops = Vec::with_capacity(face.len);
        let mut current = face.first;
        for _ in 0..face.len {
            loops.push(current);
            current = self.loop_data(current)?.next;
        }
        Ok(loops)
    }

    /// Vertices of a face in cycle order.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its loops is not found.
    pub fn face_vertices(&self, id: FaceId) -> Result<Vec<VertexId>, TopologyError> {
        self.face_loops(id)?
            .into_iter()
            .map(|l| self.loop_data(l).map(|d| d.vert))
            .collect()
    }

    /// Vertex positions of a face in cycle order.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its vertices is not found.
    pub fn face_points(&self, id: FaceId) -> Result<Vec<Point3>, TopologyError> {
        self.face_vertices(id)?
            .into_iter()
            .map(|v| self.point(v))
            .collect()
    }

    /// Recomputes the cached normal of one face.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its vertices is not found.
    pub fn update_face_normal(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let normal = newell_normal(&self.face_points(id)?);
        self.face_mut(id)?.normal = normal;
        Ok(())
    }

    /// Recomputes the cached normals of every face.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is internally inconsistent.
    pub fn normal_update(&mut self) -> Result<(), TopologyError> {
        let ids: Vec<FaceId> = self.faces.keys().collect();
        for id in ids {
            self.update_face_normal(id)?;
        }
        Ok(())
    }

    /// Reverses the winding of a face.
    ///
    /// Every loop keeps its vertex but is re-bound to the edge leading to its
    /// former predecessor, so loop-keyed data refers to different edges
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its loops are not found.
    pub fn flip_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let loops = self.face_loops(id)?;
        let n = loops.len();
        let old: Vec<LoopData> = loops
            .iter()
            .map(|&l| self.loop_data(l).copied())
            .collect::<Result<_, _>>()?;

        for (&l, data) in loops.iter().zip(&old) {
            self.edge_mut(data.edge)?.loops.retain(|&x| x != l);
        }
        for i in 0..n {
            let new_edge = old[(i + n - 1) % n].edge;
            if let Some(l) = self.loops.get_mut(loops[i]) {
                l.edge = new_edge;
                l.next = old[i].prev;
                l.prev = old[i].next;
            }
            self.edge_mut(new_edge)?.loops.push(loops[i]);
        }

        let face = self.face_mut(id)?;
        face.normal = -face.normal;
        Ok(())
    }

    /// Selects a face together with its edges and vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its loops are not found.
    pub fn select_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        for l in self.face_loops(id)? {
            let LoopData { vert, edge, .. } = *self.loop_data(l)?;
            self.vertex_mut(vert)?.select = true;
            self.edge_mut(edge)?.select = true;
        }
        self.face_mut(id)?.select = true;
        Ok(())
    }

    // --- Removal ---

    /// Removes a face and its loops. Edges and vertices are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its loops are not found.
    pub fn remove_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        for l in self.face_loops(id)? {
            let edge = self.loop_data(l)?.edge;
            self.edge_mut(edge)?.loops.retain(|&x| x != l);
            self.loops.remove(l);
        }
        self.faces.remove(id);
        Ok(())
    }

    /// Removes an edge and every face using it. Vertices are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or its adjacency is not found.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<(), TopologyError> {
        for face in self.edge_faces(id)? {
            self.remove_face(face)?;
        }
        let [a, b] = self.edge(id)?.verts;
        self.vertex_mut(a)?.edges.retain(|&e| e != id);
        self.vertex_mut(b)?.edges.retain(|&e| e != id);
        self.edges.remove(id);
        Ok(())
    }

    /// Removes a vertex together with its edges and their faces.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex or its adjacency is not found.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<(), TopologyError> {
        for edge in self.vertex_edges(id)? {
            self.remove_edge(edge)?;
        }
        self.vertices.remove(id);
        Ok(())
    }

    // --- Queries over the whole store ---

    /// Returns `true` if the vertex exists.
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    /// Returns `true` if the edge exists.
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Returns `true` if the face exists.
    #[must_use]
    pub fn contains_face(&self, id: FaceId) -> bool {
        self.faces.contains_key(id)
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of face corners.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// Iterates over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    /// Iterates over all face corners.
    pub fn loops(&self) -> impl Iterator<Item = (LoopId, &LoopData)> {
        self.loops.iter()
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }
}
