//! Finite-domain planning tasks.
//!
//! A task is produced by an external grounder and handed to heuristics
//! read-only. Construction validates every index once so the heuristics can
//! index propositions and operators directly.

use std::collections::HashMap;

use crate::error::{Result, TaskError};
use crate::state::State;

/// A finite-domain variable with one fact name per value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Variable {
    pub name: String,
    pub fact_names: Vec<String>,
}

impl Variable {
    pub fn new<I, N>(name: impl Into<String>, fact_names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            name: name.into(),
            fact_names: fact_names.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn domain_size(&self) -> usize {
        self.fact_names.len()
    }

    pub fn fact_name(&self, value: usize) -> Option<&str> {
        self.fact_names.get(value).map(String::as_str)
    }
}

/// A `(variable, value)` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FactPair {
    pub var: usize,
    pub value: usize,
}

impl FactPair {
    #[inline]
    pub const fn new(var: usize, value: usize) -> Self {
        Self { var, value }
    }
}

/// An operator effect, optionally guarded by extra conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Effect {
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<FactPair>,
    pub fact: FactPair,
}

impl Effect {
    pub fn new(fact: FactPair) -> Self {
        Self {
            conditions: Vec::new(),
            fact,
        }
    }

    pub fn conditional(conditions: Vec<FactPair>, fact: FactPair) -> Self {
        Self { conditions, fact }
    }

    /// Returns true if every effect condition holds in `state`.
    pub fn fires_in(&self, state: &State) -> bool {
        self.conditions.iter().all(|&c| state.holds(c))
    }
}

/// A grounded action.
///
/// # Example
///
/// ```
/// use antplan_core::{Operator, State};
///
/// let op = Operator::new("set_a", 1)
///     .with_precondition(0, 0)
///     .with_effect(0, 1);
///
/// assert!(op.is_applicable(&State::new(vec![0])));
/// assert!(!op.is_applicable(&State::new(vec![1])));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Operator {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub preconditions: Vec<FactPair>,
    pub effects: Vec<Effect>,
    pub cost: i32,
}

impl Operator {
    pub fn new(name: impl Into<String>, cost: i32) -> Self {
        Self {
            name: name.into(),
            preconditions: Vec::new(),
            effects: Vec::new(),
            cost,
        }
    }

    pub fn with_precondition(mut self, var: usize, value: usize) -> Self {
        self.preconditions.push(FactPair::new(var, value));
        self
    }

    pub fn with_effect(mut self, var: usize, value: usize) -> Self {
        self.effects.push(Effect::new(FactPair::new(var, value)));
        self
    }

    pub fn with_conditional_effect(
        mut self,
        conditions: Vec<FactPair>,
        var: usize,
        value: usize,
    ) -> Self {
        self.effects
            .push(Effect::conditional(conditions, FactPair::new(var, value)));
        self
    }

    pub fn is_applicable(&self, state: &State) -> bool {
        self.preconditions.iter().all(|&p| state.holds(p))
    }
}

/// A validated finite-domain planning task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningTask {
    variables: Vec<Variable>,
    operators: Vec<Operator>,
    goals: Vec<FactPair>,
    initial_state: State,
}

impl PlanningTask {
    /// Builds a task, validating every fact, cost and the initial state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] for empty domains, out-of-range facts,
    /// negative costs, contradictory conditions and a mis-sized initial state.
    pub fn new(
        variables: Vec<Variable>,
        operators: Vec<Operator>,
        goals: Vec<FactPair>,
        initial_state: Vec<usize>,
    ) -> Result<Self> {
        let task = Self {
            variables,
            operators,
            goals,
            initial_state: State::new(initial_state),
        };
        task.validate()?;
        Ok(task)
    }

    fn validate(&self) -> Result<()> {
        if let Some(var) = self.variables.iter().find(|v| v.domain_size() == 0) {
            return Err(TaskError::EmptyDomain(var.name.clone()));
        }

        self.validate_state(&self.initial_state)?;
        self.validate_conditions(&self.goals)?;

        for op in &self.operators {
            if op.cost < 0 {
                return Err(TaskError::NegativeCost {
                    name: op.name.clone(),
                    cost: op.cost,
                });
            }
            self.validate_conditions(&op.preconditions)?;
            for effect in &op.effects {
                self.validate_conditions(&effect.conditions)?;
                self.validate_fact(effect.fact)?;
            }
        }
        Ok(())
    }

    fn validate_conditions(&self, facts: &[FactPair]) -> Result<()> {
        let mut seen: HashMap<usize, usize> = HashMap::with_capacity(facts.len());
        for &fact in facts {
            self.validate_fact(fact)?;
            if let Some(&other) = seen.get(&fact.var) {
                if other != fact.value {
                    return Err(TaskError::Contradiction(
                        self.variables[fact.var].name.clone(),
                    ));
                }
            }
            seen.insert(fact.var, fact.value);
        }
        Ok(())
    }

    fn validate_fact(&self, fact: FactPair) -> Result<()> {
        let var = self
            .variables
            .get(fact.var)
            .ok_or(TaskError::UnknownVariable {
                var: fact.var,
                num_vars: self.variables.len(),
            })?;
        if fact.value >= var.domain_size() {
            return Err(TaskError::ValueOutOfDomain {
                name: var.name.clone(),
                value: fact.value,
                domain: var.domain_size(),
            });
        }
        Ok(())
    }

    /// Checks that `state` assigns every variable a value inside its domain.
    pub fn validate_state(&self, state: &State) -> Result<()> {
        if state.len() != self.variables.len() {
            return Err(TaskError::StateSize {
                expected: self.variables.len(),
                actual: state.len(),
            });
        }
        for fact in state.facts() {
            self.validate_fact(fact)?;
        }
        Ok(())
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[inline]
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    #[inline]
    pub fn operator(&self, index: usize) -> &Operator {
        &self.operators[index]
    }

    #[inline]
    pub fn goals(&self) -> &[FactPair] {
        &self.goals
    }

    #[inline]
    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// Returns the display name of a fact.
    pub fn fact_name(&self, fact: FactPair) -> &str {
        &self.variables[fact.var].fact_names[fact.value]
    }

    /// Looks up a variable index by name.
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    pub fn is_goal_state(&self, state: &State) -> bool {
        self.goals.iter().all(|&g| state.holds(g))
    }

    /// Iterates the indices of operators applicable in `state`, ascending.
    pub fn applicable_operators<'a>(
        &'a self,
        state: &'a State,
    ) -> impl Iterator<Item = usize> + 'a {
        self.operators
            .iter()
            .enumerate()
            .filter(move |(_, op)| op.is_applicable(state))
            .map(|(index, _)| index)
    }

    /// Applies an operator, returning the successor state.
    ///
    /// Effect conditions are evaluated against `state`, not against a
    /// partially updated successor. Applicability is the caller's concern.
    pub fn apply(&self, op_index: usize, state: &State) -> State {
        let op = &self.operators[op_index];
        debug_assert!(op.is_applicable(state), "applying inapplicable {}", op.name);

        let mut values = state.values().to_vec();
        for effect in op.effects.iter().filter(|e| e.fires_in(state)) {
            values[effect.fact.var] = effect.fact.value;
        }
        State::new(values)
    }
}
