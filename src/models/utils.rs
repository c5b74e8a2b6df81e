use crate::lp::{Domain, Model, Result, Solution, Var};
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

pub trait AddVars {
    type Out;

    /// Create a variable with a closure
    fn vars_with<F: FnMut(Self) -> Result<Var>>(&self, func: F) -> Result<Self::Out>
    where
        Self: Sized;

    /// Create a variable for any domain
    fn vars(
        &self,
        model: &mut Model,
        base_name: &str,
        domain: Domain,
        bounds: &Range<f64>,
    ) -> Result<Self::Out>;

    /// Binary variables
    fn binary(&self, model: &mut Model, base_name: &str) -> Result<Self::Out> {
        self.vars(model, base_name, Domain::Binary, &(0.0..1.0))
    }

    /// A continuous non-negative variable
    fn cont(&self, model: &mut Model, base_name: &str) -> Result<Self::Out> {
        self.vars(model, base_name, Domain::Continuous, &(0.0..f64::INFINITY))
    }
}

impl AddVars for usize {
    type Out = Vec<Var>;

    fn vars_with<F: FnMut(Self) -> Result<Var>>(&self, mut func: F) -> Result<Self::Out>
    where
        Self: Sized,
    {
        let mut vec = Vec::with_capacity(*self);
        for i in 0..*self {
            vec.push(func(i)?);
        }

        Ok(vec)
    }

    fn vars(
        &self,
        model: &mut Model,
        base_name: &str,
        domain: Domain,
        bounds: &Range<f64>,
    ) -> Result<Self::Out> {
        let mut vec = Vec::with_capacity(*self);
        for i in 0..*self {
            vec.push(model.add_var(&format!("{}_{}", base_name, i), domain, bounds.clone())?);
        }

        Ok(vec)
    }
}

impl AddVars for (usize, usize) {
    type Out = Vec<<usize as AddVars>::Out>;

    fn vars(
        &self,
        model: &mut Model,
        base_name: &str,
        domain: Domain,
        bounds: &Range<f64>,
    ) -> Result<Self::Out> {
        let mut out = Vec::with_capacity(self.0);
        for i in 0..self.0 {
            out.push(
                self.1
                    .vars(model, &format!("{}_{}", base_name, i), domain, bounds)?,
            )
        }

        Ok(out)
    }

    fn vars_with<F: FnMut(Self) -> Result<Var>>(&self, mut func: F) -> Result<Self::Out>
    where
        Self: Sized,
    {
        let mut out = Vec::with_capacity(self.0);
        for i in 0..self.0 {
            out.push(self.1.vars_with(|j| func((i, j)))?);
        }

        Ok(out)
    }
}

/// Creates one variable per key, named `{base_name}_{key}` with the key's `Display`.
pub fn vars<K>(
    indices: Vec<K>,
    model: &mut Model,
    domain: Domain,
    bounds: &Range<f64>,
    base_name: &str,
) -> Result<HashMap<K, Var>>
where
    K: Eq + Hash + std::fmt::Display,
{
    let mut map = HashMap::with_capacity(indices.len());
    for key in indices {
        let var = model.add_var(&format!("{}_{}", base_name, key), domain, bounds.clone())?;
        map.insert(key, var);
    }
    Ok(map)
}

/// Trait that converts model variables to their solved values
pub trait ConvertVars {
    type Out;
    fn convert(&self, solution: &Solution) -> Result<Self::Out>;
}

impl<T: ConvertVars> ConvertVars for Vec<T> {
    type Out = Vec<T::Out>;

    fn convert(&self, solution: &Solution) -> Result<Self::Out> {
        let mut out = Vec::with_capacity(self.len());
        for e in self {
            out.push(e.convert(solution)?);
        }
        Ok(out)
    }
}

impl<K: Eq + Hash + Clone, T: ConvertVars> ConvertVars for HashMap<K, T> {
    type Out = HashMap<K, T::Out>;

    fn convert(&self, solution: &Solution) -> Result<Self::Out> {
        let mut out = HashMap::with_capacity(self.len());
        for (k, e) in self {
            out.insert(k.clone(), e.convert(solution)?);
        }
        Ok(out)
    }
}

impl ConvertVars for Var {
    type Out = f64;

    fn convert(&self, solution: &Solution) -> Result<Self::Out> {
        solution.value(*self)
    }
}
