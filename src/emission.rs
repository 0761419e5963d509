//! Emission models: Pr{observation | state} in log space.
use crate::logprob::ln_factorial;
use crate::{Error, Result, State};

/// An emission distribution for a two-state model.
pub trait Emission {
    /// log(Pr{obs | state}).
    /// `obs` should be less than `symbol_count()`, if any. The engine checks it before calling this.
    fn log_emission(&self, obs: u64, state: State) -> f64;
    /// Size of the alphabet, or `None` if every non-negative integer can be emitted.
    fn symbol_count(&self) -> Option<u64> {
        None
    }
}

/// A categorical emission table, one row per symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    probs: Vec<[f64; 2]>,
    log_probs: Vec<[f64; 2]>,
}

impl Categorical {
    /// Create a table from linear probabilities in [0,1]. `probs[symbol][state]`.
    /// Columns are not normalized.
    pub fn new(probs: &[[f64; 2]]) -> Result<Self> {
        if probs.is_empty() {
            return Err(Error::InvalidModel("emission table has no symbol".into()));
        }
        for (symbol, row) in probs.iter().enumerate() {
            if let Some(p) = row.iter().find(|p| !(0f64..=1f64).contains(*p)) {
                let msg = format!("emission probability {} for symbol {}", p, symbol);
                return Err(Error::InvalidModel(msg));
            }
        }
        let log_probs = probs.iter().map(|&[x, y]| [x.ln(), y.ln()]).collect();
        Ok(Self {
            probs: probs.to_vec(),
            log_probs,
        })
    }
    /// The occasionally dishonest casino: a fair die and a die loaded towards six.
    pub fn casino() -> Self {
        let mut probs = [[1f64 / 6f64, 0.1]; 6];
        probs[5][1] = 0.5;
        let log_probs = probs.iter().map(|&[x, y]| [x.ln(), y.ln()]).collect();
        Self {
            probs: probs.to_vec(),
            log_probs,
        }
    }
    /// Linear probabilities, `probs()[symbol][state]`.
    pub fn probs(&self) -> &[[f64; 2]] {
        &self.probs
    }
}

impl Emission for Categorical {
    fn log_emission(&self, obs: u64, state: State) -> f64 {
        self.log_probs[obs as usize][state.index()]
    }
    fn symbol_count(&self) -> Option<u64> {
        Some(self.log_probs.len() as u64)
    }
}

/// Poisson distributed counts with a rate for each state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poisson {
    rates: [f64; 2],
    log_rates: [f64; 2],
}

impl Poisson {
    pub fn new(rates: [f64; 2]) -> Result<Self> {
        if let Some(rate) = rates.iter().find(|r| !(r.is_finite() && 0f64 < **r)) {
            let msg = format!("Poisson rate must be positive, found {}", rate);
            return Err(Error::InvalidModel(msg));
        }
        Ok(Self::new_unchecked(rates))
    }
    pub(crate) fn new_unchecked(rates: [f64; 2]) -> Self {
        Self {
            rates,
            log_rates: [rates[0].ln(), rates[1].ln()],
        }
    }
    pub fn rate(&self, state: State) -> f64 {
        self.rates[state.index()]
    }
    pub fn rates(&self) -> [f64; 2] {
        self.rates
    }
}

impl Emission for Poisson {
    /// k * ln(lambda) - lambda - ln(k!)
    fn log_emission(&self, obs: u64, state: State) -> f64 {
        let idx = state.index();
        obs as f64 * self.log_rates[idx] - self.rates[idx] - ln_factorial(obs)
    }
}

/// Either of the emission models above, chosen at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum EmissionModel {
    Categorical(Categorical),
    Poisson(Poisson),
}

impl EmissionModel {
    /// The value to subtract from the integers in a sequence file.
    /// Categorical symbols are written 1-based, counts are written as is.
    pub fn input_offset(&self) -> u64 {
        match self {
            EmissionModel::Categorical(_) => 1,
            EmissionModel::Poisson(_) => 0,
        }
    }
}

impl Emission for EmissionModel {
    fn log_emission(&self, obs: u64, state: State) -> f64 {
        match self {
            EmissionModel::Categorical(model) => model.log_emission(obs, state),
            EmissionModel::Poisson(model) => model.log_emission(obs, state),
        }
    }
    fn symbol_count(&self) -> Option<u64> {
        match self {
            EmissionModel::Categorical(model) => model.symbol_count(),
            EmissionModel::Poisson(model) => model.symbol_count(),
        }
    }
}

impl std::convert::From<Categorical> for EmissionModel {
    fn from(model: Categorical) -> Self {
        EmissionModel::Categorical(model)
    }
}

impl std::convert::From<Poisson> for EmissionModel {
    fn from(model: Poisson) -> Self {
        EmissionModel::Poisson(model)
    }
}
