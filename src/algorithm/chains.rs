// Chain builder: requirement records -> course graph -> prerequisite trees.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use crate::error::PlannerError;
use crate::models::{
    Chain, ChainForest, CourseGroup, CourseNode, Equivalency, NoEquivalentCourse, UnmappedCourse, UnmappedReason,
};
use crate::repository::CourseRepository;

pub const DEFAULT_NO_EQUIVALENT_MESSAGE: &str = "No articulated equivalent at the source college.";

/// Build the prerequisite chains that cover every requirement of a major.
///
/// Target courses without an equivalency record, or belonging to another
/// university, are left out and listed in `ChainForest::unmapped`.
pub fn build_chains(
    university_id: &str,
    major_id: &str,
    repo: &dyn CourseRepository,
) -> Result<ChainForest, PlannerError> {
    let mut forest = ChainForest::default();

    let requirements = repo.find_requirements(major_id)?;
    let requested: BTreeSet<String> = requirements.iter().flat_map(|r| r.courses.iter().cloned()).collect();
    log::debug!("major {}: {} requirement blocks, {} target courses", major_id, requirements.len(), requested.len());

    // Target courses, restricted to the university being planned.
    let targets = repo.find_target_courses(&requested)?;
    let mut target_ids: BTreeSet<String> = BTreeSet::new();
    for t in &targets {
        if t.university_id == university_id {
            target_ids.insert(t.id.clone());
        } else {
            log::warn!("target course {} belongs to {} not {}", t.id, t.university_id, university_id);
            forest.unmapped.push(UnmappedCourse {
                target_course_id: t.id.clone(),
                code: Some(t.code.clone()),
                reason: UnmappedReason::OtherUniversity,
            });
        }
    }
    for id in &requested {
        if !targets.iter().any(|t| &t.id == id) {
            log::warn!("requirement references unknown target course {}", id);
            forest.unmapped.push(UnmappedCourse {
                target_course_id: id.clone(),
                code: None,
                reason: UnmappedReason::MissingTargetCourse,
            });
        }
    }

    let equivalencies = repo.find_equivalencies(&target_ids)?;
    for t in targets.iter().filter(|t| target_ids.contains(&t.id)) {
        if !equivalencies.iter().any(|e| e.target_course_id == t.id) {
            log::warn!("no equivalency record for {} ({})", t.code, t.id);
            forest.unmapped.push(UnmappedCourse {
                target_course_id: t.id.clone(),
                code: Some(t.code.clone()),
                reason: UnmappedReason::NoEquivalency,
            });
        }
    }

    // Advisories for target courses with no articulated equivalent.
    for eq in equivalencies.iter().filter(|e| e.has_no_equivalent) {
        if forest.no_equivalent_courses.iter().any(|n| n.target_course_id == eq.target_course_id) {
            continue;
        }
        let target = targets.iter().find(|t| t.id == eq.target_course_id);
        forest.no_equivalent_courses.push(NoEquivalentCourse {
            target_course_id: eq.target_course_id.clone(),
            code: target.map(|t| t.code.clone()).unwrap_or_else(|| "Unknown".to_string()),
            name: target.map(|t| t.name.clone()).unwrap_or_else(|| "Unknown Course".to_string()),
            units: target.map(|t| t.units).unwrap_or(0.0),
            message: eq
                .no_equivalent_message
                .clone()
                .unwrap_or_else(|| DEFAULT_NO_EQUIVALENT_MESSAGE.to_string()),
        });
    }

    let source_ids: BTreeSet<String> = equivalencies
        .iter()
        .flat_map(|e| e.source_course_ids.iter().cloned())
        .collect();
    let sources = repo.find_source_courses(&source_ids)?;

    let id_to_code: HashMap<&str, &str> = sources.iter().map(|s| (s.id.as_str(), s.code.as_str())).collect();
    let mut nodes: BTreeMap<String, CourseNode> = BTreeMap::new();
    for s in &sources {
        nodes.entry(s.code.clone()).or_insert_with(|| CourseNode {
            code: s.code.clone(),
            name: s.name.clone(),
            units: s.units,
            prerequisites: s.prerequisites.clone(),
            dependents: Vec::new(),
            alternatives: Vec::new(),
            co_requisites: s.co_requisites.clone(),
            terms_offered: s.terms_offered.clone(),
            level: 0,
            additional_notes: s.additional_notes.clone(),
        });
    }

    for eq in &equivalencies {
        register_alternatives(eq, &id_to_code, &mut nodes);
        if let Some(group) = linked_group(eq, &id_to_code) {
            if !group.sequential {
                for code in &group.codes {
                    if let Some(node) = nodes.get_mut(code) {
                        for other in group.codes.iter().filter(|c| *c != code) {
                            push_unique(&mut node.co_requisites, other);
                        }
                    }
                }
            }
            if !forest.groups.contains(&group) {
                forest.groups.push(group);
            }
        }
    }

    // Graph of the working set, edges prerequisite -> dependent.
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut node_map: HashMap<String, NodeIndex> = HashMap::new();
    for code in nodes.keys() {
        node_map.insert(code.clone(), graph.add_node(code.clone()));
    }
    for (code, node) in &nodes {
        for prereq in &node.prerequisites {
            if let (Some(&from), Some(&to)) = (node_map.get(prereq), node_map.get(code)) {
                if from != to && graph.find_edge(from, to).is_none() {
                    graph.add_edge(from, to, ());
                }
            }
        }
    }
    if is_cyclic_directed(&graph) {
        log::warn!("prerequisite graph of {} has a cycle; cycle edges are cut during expansion", major_id);
    }

    for (code, node) in nodes.iter_mut() {
        let idx = node_map[code];
        let mut dependents: Vec<String> = graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|d| graph[d].clone())
            .collect();
        dependents.sort();
        node.dependents = dependents;
    }

    let terminals: Vec<String> = nodes
        .keys()
        .filter(|code| graph.neighbors_directed(node_map[*code], Direction::Outgoing).next().is_none())
        .cloned()
        .collect();

    let mut expander = Expander::new(&nodes);
    for code in &terminals {
        if let Some(chain) = expander.expand(code) {
            forest.chains.push(chain);
        }
    }
    // Components made only of a cycle have no terminal node.
    for code in nodes.keys() {
        if !expander.is_expanded(code) {
            if let Some(chain) = expander.expand(code) {
                log::warn!("{} is only reachable through a cycle; planning it as a root", code);
                forest.chains.push(chain);
            }
        }
    }

    log::info!(
        "built {} chains for {} / {} ({} no-equivalent, {} unmapped)",
        forest.chains.len(),
        university_id,
        major_id,
        forest.no_equivalent_courses.len(),
        forest.unmapped.len()
    );
    Ok(forest)
}

fn push_unique(list: &mut Vec<String>, code: &str) {
    if !list.iter().any(|c| c == code) {
        list.push(code.to_string());
    }
}

/// `alternativeSets` lists options; courses in different options replace
/// each other. A single option with several courses is one group.
fn register_alternatives(eq: &Equivalency, id_to_code: &HashMap<&str, &str>, nodes: &mut BTreeMap<String, CourseNode>) {
    let options: Vec<Vec<String>> = eq
        .alternative_sets
        .iter()
        .map(|set| {
            set.iter()
                .filter_map(|id| id_to_code.get(id.as_str()).map(|c| c.to_string()))
                .filter(|code| nodes.contains_key(code))
                .collect::<Vec<String>>()
        })
        .filter(|codes| !codes.is_empty())
        .collect();

    let pairs: Vec<(String, String)> = match options.len() {
        0 => Vec::new(),
        1 => {
            let only = &options[0];
            only.iter()
                .flat_map(|a| only.iter().filter(move |b| *b != a).map(move |b| (a.clone(), b.clone())))
                .collect()
        }
        _ => options
            .iter()
            .enumerate()
            .flat_map(|(i, opt)| {
                options
                    .iter()
                    .enumerate()
                    .filter(move |(j, _)| *j != i)
                    .flat_map(move |(_, other)| {
                        opt.iter().flat_map(move |a| other.iter().map(move |b| (a.clone(), b.clone())))
                    })
            })
            .collect(),
    };

    for (code, alt) in pairs {
        if code == alt {
            continue;
        }
        if let Some(node) = nodes.get_mut(&code) {
            push_unique(&mut node.alternatives, &alt);
        }
    }
}

fn linked_group(eq: &Equivalency, id_to_code: &HashMap<&str, &str>) -> Option<CourseGroup> {
    if !eq.and_relationship || eq.source_course_ids.len() < 2 {
        return None;
    }
    let mut codes: Vec<String> = Vec::new();
    for id in &eq.source_course_ids {
        if let Some(code) = id_to_code.get(id.as_str()) {
            push_unique(&mut codes, code);
        }
    }
    if codes.len() < 2 {
        return None;
    }
    Some(CourseGroup { codes, sequential: eq.is_sequential_pair })
}

/// Memoized depth-first expansion. `on_path` holds the codes of the current
/// recursion path and cuts cycle edges; `cache` keeps finished subtrees so a
/// course reachable through several paths is expanded once.
struct Expander<'a> {
    nodes: &'a BTreeMap<String, CourseNode>,
    cache: HashMap<String, Chain>,
    on_path: HashSet<String>,
}

impl<'a> Expander<'a> {
    fn new(nodes: &'a BTreeMap<String, CourseNode>) -> Self {
        Expander { nodes, cache: HashMap::new(), on_path: HashSet::new() }
    }

    fn is_expanded(&self, code: &str) -> bool {
        self.cache.contains_key(code)
    }

    fn expand(&mut self, code: &str) -> Option<Chain> {
        if let Some(chain) = self.cache.get(code) {
            return Some(chain.clone());
        }
        if self.on_path.contains(code) {
            log::debug!("cycle edge into {} cut", code);
            return None;
        }
        let node = self.nodes.get(code)?;

        self.on_path.insert(code.to_string());
        let mut children: Vec<Chain> = Vec::new();
        for prereq in &node.prerequisites {
            if prereq == code || children.iter().any(|c| &c.course.code == prereq) {
                continue;
            }
            // Prerequisites outside the working set count as satisfied.
            if !self.nodes.contains_key(prereq) {
                continue;
            }
            if let Some(child) = self.expand(prereq) {
                children.push(child);
            }
        }
        self.on_path.remove(code);

        let level = children.iter().map(|c| c.level + 1).max().unwrap_or(0);
        let mut course = node.clone();
        course.level = level;
        let chain = Chain { course, prerequisites: children, level };
        self.cache.insert(code.to_string(), chain.clone());
        Some(chain)
    }
}
