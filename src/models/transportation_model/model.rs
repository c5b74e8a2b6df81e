use super::sets_and_parameters::{NodeIndex, Parameters, Quantity, Sets, UndeclaredArcs};
use crate::c;
use crate::lp::{Backend, Domain, LinSum, Model, Result, Sense, Solution, SolveOptions, Var};
use crate::models::utils::{AddVars, ConvertVars};
use derive_more::Display;
use itertools::iproduct;
use log::{info, warn};

/// Absolute tolerance used when checking a solved flow against the data
const TOLERANCE: f64 = 1e-6;

pub struct TransportationSolver {}

#[allow(non_snake_case)]
impl TransportationSolver {
    /// builds the transportation model
    pub fn build(sets: &Sets, parameters: &Parameters) -> Result<(Model, Variables)> {
        info!(
            "Building transportation model for {} sources and {} targets",
            sets.sources.len(),
            sets.targets.len()
        );

        let mut model = Model::new("transportation");

        //*************CREATE VARIABLES*************//
        let S = sets.sources.len();
        let T = sets.targets.len();

        // flow from source i to target j
        let x: Vec<Vec<Var>> = (S, T).vars_with(|(i, j)| {
            let (source, target) = (sets.sources[i], sets.targets[j]);
            let upper = match parameters.costs.is_declared(source, target) {
                true => f64::INFINITY,
                false => match parameters.undeclared_arcs {
                    UndeclaredArcs::Free => {
                        warn!(
                            "arc ({}, {}) has no declared cost and is used as a free arc",
                            source, target
                        );
                        f64::INFINITY
                    }
                    UndeclaredArcs::Forbidden => 0.0,
                },
            };
            model.add_var(
                &format!("x_{}_{}", source, target),
                Domain::Continuous,
                0.0..upper,
            )
        })?;

        // ******************** ADD CONSTRAINTS ********************
        // the total outgoing flow of a source is limited by its capacity
        for (i, source) in sets.sources.iter().enumerate() {
            let lhs = x[i].iter().lin_sum();
            model.add_constr(
                &format!("capacity_{}", source),
                c!(lhs <= parameters.capacity(*source)?),
            )?;
        }

        // the total incoming flow of a target covers its demand
        for (j, target) in sets.targets.iter().enumerate() {
            let lhs = (0..S).map(|i| x[i][j]).lin_sum();
            model.add_constr(
                &format!("demand_{}", target),
                c!(lhs >= parameters.demand(*target)?),
            )?;
        }

        // minimize the total cost of the flows; undeclared arcs cost 0
        let transport_costs = iproduct!(0..S, 0..T)
            .map(|(i, j)| {
                parameters.costs.cost(sets.sources[i], sets.targets[j]) * x[i][j]
            })
            .lin_sum();
        model.set_objective(transport_costs, Sense::Minimize)?;

        info!("Successfully built transportation model");
        Ok((model, Variables::new(x)))
    }

    pub fn solve(
        sets: &Sets,
        parameters: &Parameters,
        backend: &dyn Backend,
        options: &SolveOptions,
    ) -> Result<TransportationResult> {
        // build model
        let (model, vars) = TransportationSolver::build(sets, parameters)?;

        // optimize model
        let solution = model.solve_with(backend, options)?;

        TransportationResult::new(sets, &vars, &solution)
    }
}

pub struct Variables {
    x: Vec<Vec<Var>>,
}

impl Variables {
    pub fn new(x: Vec<Vec<Var>>) -> Variables {
        Variables { x }
    }

    /// flow variable of the i'th source and the j'th target (positions, not node ids)
    pub fn x(&self, i: usize, j: usize) -> Var {
        self.x[i][j]
    }
}

/// A constraint of the instance that a flow does not respect
#[derive(Debug, Display, Clone, PartialEq)]
pub enum Violation {
    #[display(fmt = "source {} ships {} but has capacity {}", node, outflow, capacity)]
    Capacity {
        node: NodeIndex,
        outflow: Quantity,
        capacity: Quantity,
    },
    #[display(fmt = "target {} receives {} but demands {}", node, inflow, demand)]
    Demand {
        node: NodeIndex,
        inflow: Quantity,
        demand: Quantity,
    },
    #[display(fmt = "flow {} -> {} is negative ({})", from, to, flow)]
    Negative {
        from: NodeIndex,
        to: NodeIndex,
        flow: Quantity,
    },
    #[display(fmt = "reported objective {} differs from recomputed cost {}", reported, recomputed)]
    Objective { reported: f64, recomputed: f64 },
}

#[derive(Debug, Clone)]
pub struct TransportationResult {
    pub sources: Vec<NodeIndex>,
    pub targets: Vec<NodeIndex>,
    /// flow from the i'th source to the j'th target
    pub x: Vec<Vec<Quantity>>,
    /// objective value reported by the solver
    pub objective: f64,
}

impl TransportationResult {
    pub fn new(
        sets: &Sets,
        variables: &Variables,
        solution: &Solution,
    ) -> Result<TransportationResult> {
        Ok(TransportationResult {
            sources: sets.sources.clone(),
            targets: sets.targets.clone(),
            x: variables.x.convert(solution)?,
            objective: solution.objective_value(),
        })
    }

    /// The flow between two nodes (by node id)
    pub fn flow(&self, from: NodeIndex, to: NodeIndex) -> Option<Quantity> {
        let i = self.sources.iter().position(|n| *n == from)?;
        let j = self.targets.iter().position(|n| *n == to)?;
        Some(self.x[i][j])
    }

    /// Every `(from, to, flow)`, including zero flows
    pub fn flows(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, Quantity)> + '_ {
        iproduct!(0..self.sources.len(), 0..self.targets.len())
            .map(move |(i, j)| (self.sources[i], self.targets[j], self.x[i][j]))
    }

    pub fn outflow(&self, source: NodeIndex) -> Quantity {
        self.flows()
            .filter(|(from, _, _)| *from == source)
            .map(|(_, _, flow)| flow)
            .sum()
    }

    pub fn inflow(&self, target: NodeIndex) -> Quantity {
        self.flows()
            .filter(|(_, to, _)| *to == target)
            .map(|(_, _, flow)| flow)
            .sum()
    }

    /// Total cost of the flow, recomputed from the arc costs
    pub fn cost(&self, parameters: &Parameters) -> f64 {
        self.flows()
            .map(|(from, to, flow)| parameters.costs.cost(from, to) * flow)
            .sum()
    }

    /// Checks the flow against capacities, demands and the reported objective
    pub fn violations(&self, parameters: &Parameters) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (from, to, flow) in self.flows() {
            if flow < -TOLERANCE {
                violations.push(Violation::Negative { from, to, flow });
            }
        }
        for source in &self.sources {
            let capacity = parameters.capacity.get(source).copied().unwrap_or(0.0);
            let outflow = self.outflow(*source);
            if outflow > capacity + TOLERANCE {
                violations.push(Violation::Capacity {
                    node: *source,
                    outflow,
                    capacity,
                });
            }
        }
        for target in &self.targets {
            let demand = parameters.demand.get(target).copied().unwrap_or(0.0);
            let inflow = self.inflow(*target);
            if inflow + TOLERANCE < demand {
                violations.push(Violation::Demand {
                    node: *target,
                    inflow,
                    demand,
                });
            }
        }

        let recomputed = self.cost(parameters);
        if (recomputed - self.objective).abs() > TOLERANCE * (1.0 + recomputed.abs()) {
            violations.push(Violation::Objective {
                reported: self.objective,
                recomputed,
            });
        }

        violations
    }
}
