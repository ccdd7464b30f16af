use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{OperationError, Result, SelectionError};
use crate::math::{Vector3, TOLERANCE};
use crate::operations::shaping::ExtrudeVertIndiv;
use crate::topology::{EdgeId, MeshStore, VertexId};

/// A maximal walk along selected, non-branching edges.
///
/// Each link pairs a vertex with the edge leaving it along the walk. For an
/// open chain the far endpoint is the other vertex of the last edge.
#[derive(Debug, Clone)]
pub struct EdgeChain {
    /// Ordered `(vertex, outgoing edge)` pairs.
    pub links: Vec<(VertexId, EdgeId)>,
    /// Whether the walk returns to its first vertex.
    pub closed: bool,
}

/// The validated selection, gathered without touching the mesh.
#[derive(Debug, Clone)]
pub(super) struct ChainSelection {
    edges: Vec<EdgeId>,
    chains: Vec<EdgeChain>,
}

/// Edges ready for ribbon extrusion.
#[derive(Debug, Clone)]
pub(super) struct ChainEdges {
    /// Selected edges, followed by the edges added to close open chains.
    pub edges: Vec<EdgeId>,
    /// Every edge in `edges`, for membership tests.
    pub edge_set: BTreeSet<EdgeId>,
    /// Vertices synthesized to close open chains; removed at the end.
    pub extended: BTreeSet<VertexId>,
    /// The chains the edges were gathered from.
    pub chains: Vec<EdgeChain>,
}

/// Selected edges bordering at most one selected face.
fn boundary_selection(store: &MeshStore) -> Result<Vec<EdgeId>> {
    let mut edges = Vec::new();
    for (id, edge) in store.edges() {
        if !edge.select {
            continue;
        }
        let mut selected_faces = 0;
        for f in store.edge_faces(id)? {
            if store.face(f)?.select {
                selected_faces += 1;
            }
        }
        if selected_faces <= 1 {
            edges.push(id);
        }
    }
    Ok(edges)
}

/// Validates the selection and orders it into chains.
///
/// # Errors
///
/// Returns [`SelectionError::NoEdgesSelected`] when nothing qualifies and
/// [`SelectionError::Branching`] when a vertex has three or more selected
/// edges. The mesh is never modified.
pub(super) fn collect(store: &MeshStore) -> Result<ChainSelection> {
    let edges = boundary_selection(store)?;
    if edges.is_empty() {
        return Err(SelectionError::NoEdgesSelected.into());
    }
    let edge_set: BTreeSet<EdgeId> = edges.iter().copied().collect();

    let mut incident: BTreeMap<VertexId, Vec<EdgeId>> = BTreeMap::new();
    for &e in &edges {
        for v in store.edge(e)?.verts() {
            if incident.contains_key(&v) {
                continue;
            }
            let linked: Vec<EdgeId> = store
                .vertex(v)?
                .edges()
                .iter()
                .copied()
                .filter(|e| edge_set.contains(e))
                .collect();
            if linked.len() >= 3 {
                return Err(SelectionError::Branching {
                    selected_edges: linked.len(),
                }
                .into());
            }
            incident.insert(v, linked);
        }
    }

    let mut endpoints: BTreeSet<VertexId> = incident
        .iter()
        .filter(|(_, es)| es.len() == 1)
        .map(|(&v, _)| v)
        .collect();

    let mut chains = Vec::new();
    let mut used = BTreeSet::new();
    while let Some(start) = endpoints.pop_first() {
        let first = incident[&start][0];
        let mut links = vec![(start, first)];
        used.insert(first);
        let mut current = store.other_vertex(first, start)?;
        let mut prev = first;
        while !endpoints.contains(&current) {
            let next = next_edge(&incident, current, prev)?;
            links.push((current, next));
            used.insert(next);
            current = store.other_vertex(next, current)?;
            prev = next;
        }
        endpoints.remove(&current);
        chains.push(EdgeChain {
            links,
            closed: false,
        });
    }

    for &first in &edges {
        if used.contains(&first) {
            continue;
        }
        let [start, mut current] = store.edge(first)?.verts();
        let mut links = vec![(start, first)];
        used.insert(first);
        let mut prev = first;
        while current != start {
            let next = next_edge(&incident, current, prev)?;
            links.push((current, next));
            used.insert(next);
            current = store.other_vertex(next, current)?;
            prev = next;
        }
        chains.push(EdgeChain {
            links,
            closed: true,
        });
    }

    debug!(
        edges = edges.len(),
        open = chains.iter().filter(|c| !c.closed).count(),
        closed = chains.iter().filter(|c| c.closed).count(),
        "collected edge chains"
    );
    Ok(ChainSelection { edges, chains })
}

fn next_edge(
    incident: &BTreeMap<VertexId, Vec<EdgeId>>,
    vertex: VertexId,
    prev: EdgeId,
) -> Result<EdgeId> {
    incident
        .get(&vertex)
        .and_then(|es| es.iter().copied().find(|&e| e != prev))
        .ok_or_else(|| OperationError::Failed("edge chain walk ended early".into()).into())
}

/// Direction of the first (or last) non-degenerate edge of a chain, pointing
/// outward past the chain's start (or end).
fn outward_direction(
    store: &MeshStore,
    chain: &EdgeChain,
    at_end: bool,
) -> Result<Option<Vector3>> {
    let n = chain.links.len();
    for i in 0..n {
        let (v, e) = chain.links[if at_end { n - 1 - i } else { i }];
        if store.edge_length(e)? <= TOLERANCE {
            continue;
        }
        let here = store.point(v)?;
        let other = store.point(store.other_vertex(e, v)?)?;
        return Ok(Some(if at_end { other - here } else { here - other }));
    }
    Ok(None)
}

/// Closes every open chain with temporary geometry.
///
/// Each endpoint is extruded into a new vertex pushed outward along the
/// chain's end direction, and a bridge edge joins the two new vertices.
///
/// # Errors
///
/// Returns an error if a primitive operation fails.
pub(super) fn bridge(store: &mut MeshStore, selection: ChainSelection) -> Result<ChainEdges> {
    let ChainSelection { mut edges, chains } = selection;
    let mut extended = BTreeSet::new();

    for chain in chains.iter().filter(|c| !c.closed) {
        let (start, _) = chain.links[0];
        let (last_vert, last_edge) = chain.links[chain.links.len() - 1];
        let end = store.other_vertex(last_edge, last_vert)?;

        let out = ExtrudeVertIndiv::new(vec![start, end]).execute(store)?;
        for (&new_vert, at_end) in out.verts.iter().zip([false, true]) {
            if let Some(shift) = outward_direction(store, chain, at_end)? {
                store.vertex_mut(new_vert)?.point += shift;
            }
        }
        extended.extend(out.verts.iter().copied());
        edges.extend(out.edges.iter().copied());
        edges.push(store.add_edge(out.verts[0], out.verts[1])?);
    }

    debug!(bridged = extended.len() / 2, "closed open chains");
    let edge_set = edges.iter().copied().collect();
    Ok(ChainEdges {
        edges,
        edge_set,
        extended,
        chains,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::OffsetEdgesError;
    use crate::math::Point3;
    use crate::operations::creation::{MakeGrid, MakeWire};

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn select_all_edges(store: &mut MeshStore) {
        let ids: Vec<EdgeId> = store.edges().map(|(id, _)| id).collect();
        for id in ids {
            store.edge_mut(id).unwrap().select = true;
        }
    }

    #[test]
    fn empty_selection_rejected() {
        let mut store = MeshStore::new();
        MakeWire::new(vec![p(0.0, 0.0), p(1.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        let err = collect(&store).unwrap_err();
        assert!(matches!(err, OffsetEdgesError::Selection(SelectionError::NoEdgesSelected)));
    }

    #[test]
    fn branching_selection_rejected() {
        let mut store = MeshStore::new();
        let centre = store.add_vertex(p(0.0, 0.0));
        for tip in [p(1.0, 0.0), p(-1.0, 0.0), p(0.0, 1.0)] {
            let v = store.add_vertex(tip);
            store.add_edge(centre, v).unwrap();
        }
        select_all_edges(&mut store);

        let err = collect(&store).unwrap_err();
        assert!(matches!(
            err,
            OffsetEdgesError::Selection(SelectionError::Branching { selected_edges: 3 })
        ));
    }

    #[test]
    fn open_chain_is_walked_end_to_end() {
        let mut store = MeshStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(2.0, 1.0)], false)
            .execute(&mut store)
            .unwrap();
        select_all_edges(&mut store);

        let selection = collect(&store).unwrap();
        assert_eq!(selection.chains.len(), 1);
        let chain = &selection.chains[0];
        assert!(!chain.closed);
        assert_eq!(chain.links.len(), 3);
        let ends = [chain.links[0].0, store.other_vertex(chain.links[2].1, chain.links[2].0).unwrap()];
        assert!(ends.contains(&wire.verts[0]) && ends.contains(&wire.verts[3]));
    }

    #[test]
    fn bridge_extends_along_end_directions() {
        let mut store = MeshStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)], false)
            .execute(&mut store)
            .unwrap();
        select_all_edges(&mut store);

        let selection = collect(&store).unwrap();
        let chain_edges = bridge(&mut store, selection).unwrap();

        // 2 selected + 2 endpoint extrusions + 1 bridge
        assert_eq!(chain_edges.edges.len(), 5);
        assert_eq!(chain_edges.extended.len(), 2);
        let mut positions: Vec<Point3> = chain_edges
            .extended
            .iter()
            .map(|&v| store.point(v).unwrap())
            .collect();
        positions.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert_relative_eq!(positions[0], p(-1.0, 0.0));
        assert_relative_eq!(positions[1], p(1.0, 2.0));

        let [a, b]: [VertexId; 2] = {
            let mut it = chain_edges.extended.iter().copied();
            [it.next().unwrap(), it.next().unwrap()]
        };
        assert!(store.edge_between(a, b).unwrap().is_some());
        assert_eq!(store.vertex_edges(wire.verts[0]).unwrap().len(), 2);
    }

    #[test]
    fn bridge_skips_zero_length_end_edges() {
        let mut store = MeshStore::new();
        MakeWire::new(vec![p(0.0, 0.0), p(0.0, 0.0), p(2.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        select_all_edges(&mut store);

        let selection = collect(&store).unwrap();
        let chain_edges = bridge(&mut store, selection).unwrap();
        let mut xs: Vec<f64> = chain_edges
            .extended
            .iter()
            .map(|&v| store.point(v).unwrap().x)
            .collect();
        xs.sort_by(f64::total_cmp);
        assert_relative_eq!(xs[0], -2.0);
        assert_relative_eq!(xs[1], 4.0);
    }

    #[test]
    fn closed_loop_needs_no_bridge() {
        let mut store = MeshStore::new();
        MakeWire::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)], true)
            .execute(&mut store)
            .unwrap();
        select_all_edges(&mut store);

        let selection = collect(&store).unwrap();
        assert_eq!(selection.chains.len(), 1);
        assert!(selection.chains[0].closed);
        assert_eq!(selection.chains[0].links.len(), 4);

        let chain_edges = bridge(&mut store, selection).unwrap();
        assert!(chain_edges.extended.is_empty());
        assert_eq!(chain_edges.edges.len(), 4);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn interior_edges_of_selected_region_are_ignored() {
        let mut store = MeshStore::new();
        let grid = MakeGrid::new(2, 1, |c, r| Point3::new(c as f64, r as f64, 0.0))
            .execute(&mut store)
            .unwrap();
        select_all_edges(&mut store);
        for row in &grid.faces {
            for &f in row {
                store.select_face(f).unwrap();
            }
        }

        let selection = collect(&store).unwrap();
        assert_eq!(selection.chains.len(), 1);
        assert!(selection.chains[0].closed);
        assert_eq!(selection.chains[0].links.len(), 6);
    }
}
