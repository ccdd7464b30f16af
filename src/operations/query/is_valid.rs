use crate::topology::MeshStore;

/// Validates the internal consistency of a mesh store.
///
/// Checks that every face's loop cycle closes after exactly `len` steps,
/// that each loop's edge joins its vertex to the next loop's vertex, that
/// radial lists hold exactly the loops bound to each edge, and that vertex
/// disk lists match edge endpoints.
#[derive(Debug, Default)]
pub struct IsValid;

impl IsValid {
    /// Creates a new `IsValid` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the validation, returning `true` if the store is consistent.
    #[must_use]
    pub fn execute(&self, store: &MeshStore) -> bool {
        Self::faces_ok(store) && Self::radial_ok(store) && Self::disks_ok(store)
    }

    fn faces_ok(store: &MeshStore) -> bool {
        store.faces().all(|(id, face)| {
            let Ok(loops) = store.face_loops(id) else {
                return false;
            };
            if face.is_empty() || store.loop_next(loops[loops.len() - 1]).ok() != Some(face.first_loop()) {
                return false;
            }
            loops.iter().all(|&l| {
                let (Ok(data), Ok(next)) = (store.loop_data(l), store.loop_next(l)) else {
                    return false;
                };
                let Ok(next_vert) = store.loop_data(next).map(|d| d.vert()) else {
                    return false;
                };
                data.face() == id
                    && store.loop_prev(next).ok() == Some(l)
                    && store
                        .edge(data.edge())
                        .is_ok_and(|e| e.has_vertex(data.vert()) && e.has_vertex(next_vert))
            })
        })
    }

    fn radial_ok(store: &MeshStore) -> bool {
        let bound = store.edges().all(|(id, edge)| {
            edge.loops()
                .iter()
                .all(|&l| store.loop_data(l).is_ok_and(|d| d.edge() == id))
        });
        bound
            && store.loops().all(|(l, data)| {
                store
                    .edge(data.edge())
                    .is_ok_and(|e| e.loops().iter().filter(|&&x| x == l).count() == 1)
                    && store.contains_face(data.face())
            })
    }

    fn disks_ok(store: &MeshStore) -> bool {
        let listed = store.edges().all(|(id, edge)| {
            edge.verts()
                .iter()
                .all(|&v| store.vertex(v).is_ok_and(|d| d.edges().contains(&id)))
        });
        listed
            && store.vertices().all(|(v, data)| {
                data.edges()
                    .iter()
                    .all(|&e| store.edge(e).is_ok_and(|d| d.has_vertex(v)))
            })
    }
}
