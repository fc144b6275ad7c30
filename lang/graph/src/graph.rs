use std::hash::Hash;

use crate::HashMap;

/// A directed edge from `src` to `dst`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<V> {
    pub src: V,
    pub dst: V,
}

/// A directed multigraph over vertices of type `V`.
///
/// Vertices are kept in insertion order, which makes every algorithm in this crate
/// deterministic. Parallel edges and self loops are allowed.
#[derive(Debug, Clone)]
pub struct Graph<V> {
    vertices: Vec<V>,
    index: HashMap<V, usize>,
    edges: Vec<Edge<V>>,
    /// Source and destination vertex index of every edge
    ends: Vec<(usize, usize)>,
    /// Outgoing edge indices per vertex index
    by_src: Vec<Vec<usize>>,
    /// Incoming edge indices per vertex index
    by_dst: Vec<Vec<usize>>,
}

impl<V: Clone + Eq + Hash> Default for Graph<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            index: HashMap::default(),
            edges: Vec::new(),
            ends: Vec::new(),
            by_src: Vec::new(),
            by_dst: Vec::new(),
        }
    }
}

impl<V: Clone + Eq + Hash> Graph<V> {
    /// Build a graph from an edge list. Vertices are discovered from the edges.
    pub fn new<I: IntoIterator<Item = (V, V)>>(edges: I) -> Self {
        Self::with_vertices(std::iter::empty(), edges)
    }

    /// Build a graph from an explicit vertex list and an edge list.
    ///
    /// The explicit vertices come first in the vertex order, which allows isolated
    /// vertices to take part in the algorithms.
    pub fn with_vertices<IV, IE>(vertices: IV, edges: IE) -> Self
    where
        IV: IntoIterator<Item = V>,
        IE: IntoIterator<Item = (V, V)>,
    {
        let mut graph = Self::default();
        for vertex in vertices {
            graph.add_vertex(vertex);
        }
        for (src, dst) in edges {
            graph.add_edge(src, dst);
        }
        graph
    }

    /// Add a vertex if it is not present yet and return its index.
    pub fn add_vertex(&mut self, vertex: V) -> usize {
        if let Some(idx) = self.index.get(&vertex) {
            return *idx;
        }
        let idx = self.vertices.len();
        self.index.insert(vertex.clone(), idx);
        self.vertices.push(vertex);
        self.by_src.push(Vec::new());
        self.by_dst.push(Vec::new());
        idx
    }

    pub fn add_edge(&mut self, src: V, dst: V) {
        let src_idx = self.add_vertex(src.clone());
        let dst_idx = self.add_vertex(dst.clone());
        let edge_idx = self.edges.len();
        self.edges.push(Edge { src, dst });
        self.ends.push((src_idx, dst_idx));
        self.by_src[src_idx].push(edge_idx);
        self.by_dst[dst_idx].push(edge_idx);
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge<V>] {
        &self.edges
    }

    pub fn contains(&self, vertex: &V) -> bool {
        self.index.contains_key(vertex)
    }

    /// The destinations of all edges leaving `vertex`, one entry per edge.
    pub fn successors<'a>(&'a self, vertex: &V) -> impl Iterator<Item = &'a V> + 'a {
        let out = self.index.get(vertex).map(|idx| self.by_src[*idx].as_slice()).unwrap_or(&[]);
        out.iter().map(move |edge| &self.edges[*edge].dst)
    }

    /// The sources of all edges entering `vertex`, one entry per edge.
    pub fn predecessors<'a>(&'a self, vertex: &V) -> impl Iterator<Item = &'a V> + 'a {
        let inc = self.index.get(vertex).map(|idx| self.by_dst[*idx].as_slice()).unwrap_or(&[]);
        inc.iter().map(move |edge| &self.edges[*edge].src)
    }

    pub fn out_degree(&self, vertex: &V) -> usize {
        self.index.get(vertex).map(|idx| self.by_src[*idx].len()).unwrap_or(0)
    }

    // Index-level accessors used by the algorithms of this crate

    pub(crate) fn len(&self) -> usize {
        self.vertices.len()
    }

    pub(crate) fn out_edges(&self, idx: usize) -> &[usize] {
        &self.by_src[idx]
    }

    pub(crate) fn in_edges(&self, idx: usize) -> &[usize] {
        &self.by_dst[idx]
    }

    pub(crate) fn ends(&self, edge: usize) -> (usize, usize) {
        self.ends[edge]
    }

    pub(crate) fn vertex(&self, idx: usize) -> &V {
        &self.vertices[idx]
    }
}
