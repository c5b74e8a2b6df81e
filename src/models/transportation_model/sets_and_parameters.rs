use crate::lp::{Error, Result};
use itertools::Itertools;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type NodeIndex = usize;
/// The type used for capacities, demands and flows
pub type Quantity = f64;
/// The type used for unit costs
pub type Cost = f64;

/// A directed arc with a unit transportation cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub cost: Cost,
}

/// Sparse unit costs of the arcs between source and target nodes.
///
/// **An arc without a declared cost costs 0.** It is a free arc, not a forbidden one: the model
/// still creates a flow variable for it. Use [`UndeclaredArcs::Forbidden`] to close such arcs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcCosts(HashMap<(NodeIndex, NodeIndex), Cost>);

impl ArcCosts {
    /// The declared cost of the arc, if any
    pub fn get(&self, from: NodeIndex, to: NodeIndex) -> Option<Cost> {
        self.0.get(&(from, to)).copied()
    }

    /// The declared cost of the arc, or `default` when the arc has none
    pub fn get_or(&self, from: NodeIndex, to: NodeIndex, default: Cost) -> Cost {
        self.get(from, to).unwrap_or(default)
    }

    /// The cost used by the model: the declared cost, or 0 for an undeclared (free) arc
    pub fn cost(&self, from: NodeIndex, to: NodeIndex) -> Cost {
        self.get_or(from, to, 0.0)
    }

    pub fn is_declared(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.0.contains_key(&(from, to))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Arc> for ArcCosts {
    fn from_iter<I: IntoIterator<Item = Arc>>(iter: I) -> Self {
        ArcCosts(
            iter.into_iter()
                .map(|arc| ((arc.from, arc.to), arc.cost))
                .collect(),
        )
    }
}

/// How (source, target) pairs without a declared cost are modelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeclaredArcs {
    /// The arc exists and costs nothing
    #[default]
    Free,
    /// The flow on the arc is fixed to 0
    Forbidden,
}

/// A transportation instance as read from JSON.
///
/// ```json
/// {
///   "capacities": { "1": 15, "2": 20 },
///   "demands": { "3": 7, "4": 10, "5": 15 },
///   "costs": [ { "from": 1, "to": 3, "cost": 2 } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportationProblem {
    /// Upper bound on the total outgoing flow of each source node
    pub capacities: BTreeMap<NodeIndex, Quantity>,
    /// Lower bound on the total incoming flow of each target node
    pub demands: BTreeMap<NodeIndex, Quantity>,
    /// Declared arc costs. Missing (source, target) pairs cost 0.
    #[serde(default)]
    pub costs: Vec<Arc>,
    #[serde(default)]
    pub undeclared_arcs: UndeclaredArcs,
}

impl TransportationProblem {
    /// The instance of the tutorial: two sources, three targets and four priced arcs
    pub fn example() -> TransportationProblem {
        let arc = |from, to, cost| Arc { from, to, cost };
        TransportationProblem {
            capacities: BTreeMap::from([(1, 15.0), (2, 20.0)]),
            demands: BTreeMap::from([(3, 7.0), (4, 10.0), (5, 15.0)]),
            costs: vec![arc(1, 3, 2.0), arc(1, 5, 4.0), arc(2, 4, 5.0), arc(2, 5, 3.0)],
            undeclared_arcs: UndeclaredArcs::Free,
        }
    }

    pub fn from_json(json: &str) -> Result<TransportationProblem> {
        let problem: TransportationProblem =
            serde_json::from_str(json).map_err(|err| Error::InvalidData(err.to_string()))?;
        problem.validate()?;
        Ok(problem)
    }

    /// Checks the instance: finite non-negative data, disjoint non-empty node sets, and costs only
    /// on arcs from a source to a target.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidData(msg));

        if self.capacities.is_empty() || self.demands.is_empty() {
            return invalid("there must be at least one source and one target node".into());
        }
        for (node, capacity) in &self.capacities {
            if !capacity.is_finite() || *capacity < 0.0 {
                return invalid(format!("capacity of node {} is {}", node, capacity));
            }
        }
        for (node, demand) in &self.demands {
            if !demand.is_finite() || *demand < 0.0 {
                return invalid(format!("demand of node {} is {}", node, demand));
            }
        }
        if let Some(node) = self.capacities.keys().find(|n| self.demands.contains_key(*n)) {
            return invalid(format!("node {} is both a source and a target", node));
        }
        for arc in &self.costs {
            if !self.capacities.contains_key(&arc.from) || !self.demands.contains_key(&arc.to) {
                return invalid(format!(
                    "arc ({}, {}) does not go from a source to a target",
                    arc.from, arc.to
                ));
            }
            if !arc.cost.is_finite() || arc.cost < 0.0 {
                return invalid(format!("arc ({}, {}) costs {}", arc.from, arc.to, arc.cost));
            }
        }
        if let Some((from, to)) = self.costs.iter().map(|a| (a.from, a.to)).duplicates().next() {
            return invalid(format!("arc ({}, {}) is declared twice", from, to));
        }
        Ok(())
    }

    pub fn total_capacity(&self) -> Quantity {
        self.capacities.values().sum()
    }

    pub fn total_demand(&self) -> Quantity {
        self.demands.values().sum()
    }
}

/// sets for the transportation model
#[derive(Debug, Clone)]
pub struct Sets {
    /// Source (supply) nodes, ascending
    pub sources: Vec<NodeIndex>,
    /// Target (demand) nodes, ascending
    pub targets: Vec<NodeIndex>,
}

/// parameters for the transportation model
#[derive(Debug, Clone)]
pub struct Parameters {
    pub capacity: HashMap<NodeIndex, Quantity>,
    pub demand: HashMap<NodeIndex, Quantity>,
    pub costs: ArcCosts,
    pub undeclared_arcs: UndeclaredArcs,
}

impl Sets {
    pub fn new(problem: &TransportationProblem) -> Sets {
        let sets = Sets {
            sources: problem.capacities.keys().copied().collect(),
            targets: problem.demands.keys().copied().collect(),
        };
        trace!("sources: {:?}, targets: {:?}", sets.sources, sets.targets);
        sets
    }

    /// Every (source, target) pair
    pub fn pairs(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        itertools::iproduct!(self.sources.iter().copied(), self.targets.iter().copied())
    }
}

impl Parameters {
    pub fn new(problem: &TransportationProblem) -> Parameters {
        Parameters {
            capacity: problem.capacities.iter().map(|(k, v)| (*k, *v)).collect(),
            demand: problem.demands.iter().map(|(k, v)| (*k, *v)).collect(),
            costs: problem.costs.iter().copied().collect(),
            undeclared_arcs: problem.undeclared_arcs,
        }
    }

    pub fn capacity(&self, node: NodeIndex) -> Result<Quantity> {
        self.capacity
            .get(&node)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("no capacity for source node {}", node)))
    }

    pub fn demand(&self, node: NodeIndex) -> Result<Quantity> {
        self.demand
            .get(&node)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("no demand for target node {}", node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_arcs_cost_nothing() {
        let params = Parameters::new(&TransportationProblem::example());
        assert_eq!(params.costs.cost(1, 3), 2.0);
        assert_eq!(params.costs.cost(1, 4), 0.0);
        assert_eq!(params.costs.get(1, 4), None);
        assert_eq!(params.costs.get_or(1, 4, 99.0), 99.0);
        assert!(!params.costs.is_declared(2, 3));
        assert_eq!(params.costs.len(), 4);
        assert!(!params.costs.is_empty());
        assert!(ArcCosts::default().is_empty());
    }

    #[test]
    fn reads_json_instances() {
        let json = r#"{
            "capacities": { "1": 15, "2": 20 },
            "demands": { "3": 7, "4": 10, "5": 15 },
            "costs": [
                { "from": 1, "to": 3, "cost": 2 },
                { "from": 1, "to": 5, "cost": 4 },
                { "from": 2, "to": 4, "cost": 5 },
                { "from": 2, "to": 5, "cost": 3 }
            ]
        }"#;
        let problem = TransportationProblem::from_json(json).unwrap();
        assert_eq!(problem, TransportationProblem::example());
        assert_eq!(problem.total_capacity(), 35.0);
        assert_eq!(problem.total_demand(), 32.0);

        let sets = Sets::new(&problem);
        assert_eq!(sets.sources, vec![1, 2]);
        assert_eq!(sets.targets, vec![3, 4, 5]);
        assert_eq!(sets.pairs().count(), 6);
    }

    #[test]
    fn rejects_malformed_instances() {
        let mut problem = TransportationProblem::example();
        problem.capacities.insert(3, 1.0);
        assert!(problem.validate().is_err());

        let mut problem = TransportationProblem::example();
        problem.demands.insert(4, -1.0);
        assert!(problem.validate().is_err());

        let mut problem = TransportationProblem::example();
        problem.costs.push(Arc {
            from: 3,
            to: 1,
            cost: 1.0,
        });
        assert!(problem.validate().is_err());

        let mut problem = TransportationProblem::example();
        problem.costs.push(Arc {
            from: 1,
            to: 3,
            cost: 7.0,
        });
        assert!(problem.validate().is_err());

        assert!(TransportationProblem::from_json("{\"capacities\": {}}").is_err());
        assert!(TransportationProblem::example().validate().is_ok());
    }
}
