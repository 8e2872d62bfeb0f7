use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Directed graph of internal modules. Nodes and edges live in ordered maps
/// so traversal order, and therefore cycle output, is independent of input
/// ordering.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, module: String) {
        self.adjacency.entry(module).or_default();
    }

    pub fn add_edge(&mut self, from: String, to: String) {
        self.add_node(to.clone());
        self.adjacency.entry(from).or_default().insert(to);
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// DFS with a recursion stack. Revisiting a node currently on the stack
    /// closes a cycle: the path from that node to the current one. Each
    /// distinct cycle is reported once, keyed by its node set, and written
    /// without repeating the first element, rotated so the smallest module
    /// leads.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut visited: BTreeMap<&str, bool> =
            self.adjacency.keys().map(|m| (m.as_str(), false)).collect();
        let mut on_stack: BTreeMap<&str, bool> =
            self.adjacency.keys().map(|m| (m.as_str(), false)).collect();
        let mut path: Vec<&str> = Vec::new();
        let mut seen: HashSet<BTreeSet<String>> = HashSet::new();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        for module in self.adjacency.keys() {
            if !visited[module.as_str()] {
                self.dfs(
                    module,
                    &mut visited,
                    &mut on_stack,
                    &mut path,
                    &mut seen,
                    &mut cycles,
                );
            }
        }

        cycles.sort_by(|a, b| (a.len(), a).cmp(&(b.len(), b)));
        cycles
    }

    fn dfs<'a>(
        &'a self,
        module: &'a str,
        visited: &mut BTreeMap<&'a str, bool>,
        on_stack: &mut BTreeMap<&'a str, bool>,
        path: &mut Vec<&'a str>,
        seen: &mut HashSet<BTreeSet<String>>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(module, true);
        on_stack.insert(module, true);
        path.push(module);

        if let Some(deps) = self.adjacency.get(module) {
            for dep in deps {
                if !visited.get(dep.as_str()).copied().unwrap_or(true) {
                    self.dfs(dep, visited, on_stack, path, seen, cycles);
                } else if on_stack.get(dep.as_str()).copied().unwrap_or(false) {
                    let start = path
                        .iter()
                        .position(|m| *m == dep.as_str())
                        .unwrap_or(0);
                    let cycle: Vec<String> =
                        path[start..].iter().map(|m| m.to_string()).collect();
                    let signature: BTreeSet<String> = cycle.iter().cloned().collect();
                    if seen.insert(signature) {
                        cycles.push(canonicalize(cycle));
                    }
                }
            }
        }

        path.pop();
        on_stack.insert(module, false);
    }
}

/// Rotate a cycle so its lexically smallest member comes first; the edge
/// order is preserved, only the starting point changes.
fn canonicalize(cycle: Vec<String>) -> Vec<String> {
    let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
    else {
        return cycle;
    };
    let mut rotated = Vec::with_capacity(cycle.len());
    rotated.extend_from_slice(&cycle[min_pos..]);
    rotated.extend_from_slice(&cycle[..min_pos]);
    rotated
}
