use std::collections::HashMap;
use crate::models::{Chain, CourseNode};

/// Merge a chain forest into one node per course code, in depth-first
/// pre-order of first encounter.
///
/// The first occurrence of a code provides its descriptive fields and its
/// prerequisite list (the codes of its child chains); later occurrences only
/// raise `level`. Dependents are recomputed inside the flattened set.
pub fn flatten_chains(chains: &[Chain]) -> Vec<CourseNode> {
    let mut nodes: Vec<CourseNode> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    fn visit(chain: &Chain, nodes: &mut Vec<CourseNode>, index: &mut HashMap<String, usize>) {
        let code = &chain.course.code;
        match index.get(code) {
            Some(&i) => {
                nodes[i].level = nodes[i].level.max(chain.level);
            }
            None => {
                let mut node = chain.course.clone();
                node.level = chain.level;
                node.prerequisites = Vec::new();
                for p in &chain.prerequisites {
                    if !node.prerequisites.contains(&p.course.code) {
                        node.prerequisites.push(p.course.code.clone());
                    }
                }
                index.insert(code.clone(), nodes.len());
                nodes.push(node);
            }
        }
        for p in &chain.prerequisites {
            visit(p, nodes, index);
        }
    }

    for chain in chains {
        visit(chain, &mut nodes, &mut index);
    }

    let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
    for node in &nodes {
        for p in &node.prerequisites {
            dependents.entry(p.clone()).or_default().push(node.code.clone());
        }
    }
    for node in nodes.iter_mut() {
        let mut deps = dependents.remove(&node.code).unwrap_or_default();
        deps.sort();
        deps.dedup();
        node.dependents = deps;
        // Only alternatives inside the working set can replace each other.
        node.alternatives.retain(|a| index.contains_key(a));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(code: &str) -> Chain {
        chain(code, vec![])
    }

    fn chain(code: &str, prerequisites: Vec<Chain>) -> Chain {
        let level = prerequisites.iter().map(|c| c.level + 1).max().unwrap_or(0);
        Chain {
            course: CourseNode {
                code: code.to_string(),
                name: format!("{} name", code),
                units: 5.0,
                prerequisites: vec![],
                dependents: vec![],
                alternatives: vec![],
                co_requisites: vec![],
                terms_offered: vec![],
                level,
                additional_notes: String::new(),
            },
            prerequisites,
            level,
        }
    }

    #[test]
    fn test_shared_subchain_merged_with_max_level() {
        let a = leaf("A");
        let b = chain("B", vec![a.clone()]);
        let c = chain("C", vec![b.clone()]);
        let d = chain("D", vec![a.clone()]);
        let flat = flatten_chains(&[c, d]);

        let codes: Vec<&str> = flat.iter().map(|n| n.code.as_str()).collect();
        assert_eq!(codes, vec!["C", "B", "A", "D"]);

        let get = |code: &str| flat.iter().find(|n| n.code == code).unwrap();
        assert_eq!(get("C").level, 2);
        assert_eq!(get("A").level, 0);
        assert_eq!(get("B").prerequisites, vec!["A"]);
        assert_eq!(get("A").dependents, vec!["B", "D"]);
    }

    #[test]
    fn test_alternatives_outside_working_set_dropped() {
        let mut x = leaf("X");
        x.course.alternatives = vec!["Y".to_string(), "Z".to_string()];
        let y = leaf("Y");
        let flat = flatten_chains(&[x, y]);
        assert_eq!(flat[0].alternatives, vec!["Y"]);
    }
}
