//! Tarjan's strongly connected components over a name-keyed adjacency map.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::hash::Hash;

/// Strongly connected components of `graph`, in reverse topological order:
/// a component comes after every component it has an edge into.
///
/// Edges pointing at keys that are not in the map are ignored. Roots are
/// visited in map order, so the result is deterministic for a given map.
pub fn strongly_connected<K>(graph: &IndexMap<K, Vec<K>>) -> Vec<Vec<K>>
where
    K: Hash + Eq + Clone,
{
    let adjacency: Vec<Vec<usize>> = graph
        .values()
        .map(|targets| {
            targets
                .iter()
                .filter_map(|target| graph.get_index_of(target))
                .collect()
        })
        .collect();

    let mut tarjan = Tarjan::new(adjacency.len());
    for node in 0..adjacency.len() {
        if tarjan.index[node].is_none() {
            tarjan.connect(node, &adjacency);
        }
    }

    tarjan
        .components
        .into_iter()
        .map(|members| {
            members
                .into_iter()
                .filter_map(|idx| graph.get_index(idx).map(|(key, _)| key.clone()))
                .collect()
        })
        .collect()
}

/// Scheduling level of each component returned by [`strongly_connected`].
///
/// A component without outgoing edges sits on level 0; any other component
/// sits one level above the highest component it points at. Components on
/// the same level never point at each other.
pub fn levels<K>(graph: &IndexMap<K, Vec<K>>, components: &[Vec<K>]) -> Vec<usize>
where
    K: Hash + Eq,
{
    let owner: HashMap<&K, usize> = components
        .iter()
        .enumerate()
        .flat_map(|(idx, members)| members.iter().map(move |m| (m, idx)))
        .collect();

    let mut levels = vec![0usize; components.len()];
    for (idx, members) in components.iter().enumerate() {
        let level = members
            .iter()
            .filter_map(|m| graph.get(m))
            .flatten()
            .filter_map(|target| owner.get(target).copied())
            .filter(|&other| other != idx)
            .map(|other| levels[other] + 1)
            .max()
            .unwrap_or(0);
        levels[idx] = level;
    }
    levels
}

struct Tarjan {
    next: usize,
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl Tarjan {
    fn new(size: usize) -> Self {
        Self {
            next: 0,
            index: vec![None; size],
            low: vec![0; size],
            on_stack: vec![false; size],
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn connect(&mut self, v: usize, adjacency: &[Vec<usize>]) {
        self.index[v] = Some(self.next);
        self.low[v] = self.next;
        self.next += 1;
        self.stack.push(v);
        self.on_stack[v] = true;

        for &w in &adjacency[v] {
            match self.index[w] {
                None => {
                    self.connect(w, adjacency);
                    self.low[v] = self.low[v].min(self.low[w]);
                }
                Some(w_index) if self.on_stack[w] => {
                    self.low[v] = self.low[v].min(w_index);
                }
                Some(_) => {}
            }
        }

        if Some(self.low[v]) == self.index[v] {
            let mut members = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                members.push(w);
                if w == v {
                    break;
                }
            }
            self.components.push(members);
        }
    }
}
