//! This module is to generate random sequences from a model, to assess the decoder.
//! Usually, it would not be used in the real applications.
use crate::emission::{Categorical, EmissionModel, Poisson};
use crate::model::HiddenMarkovModel;
use crate::{Error, Result, State, STATES};
use rand::seq::SliceRandom;

/// Emission models which can generate an observation from a state.
pub trait Generate {
    fn gen<R: rand::Rng>(&self, state: State, rng: &mut R) -> Result<u64>;
}

impl Generate for Categorical {
    fn gen<R: rand::Rng>(&self, state: State, rng: &mut R) -> Result<u64> {
        let symbols: Vec<_> = (0..self.probs().len() as u64).collect();
        symbols
            .choose_weighted(rng, |&obs| self.probs()[obs as usize][state.index()])
            .copied()
            .map_err(|why| Error::InvalidModel(format!("{}", why)))
    }
}

// Knuth's method is fine up to this rate. Larger rates are split into chunks.
const POISSON_CHUNK: f64 = 30f64;

fn knuth<R: rand::Rng>(rate: f64, rng: &mut R) -> u64 {
    let threshold = (-rate).exp();
    let (mut count, mut prod) = (0, rng.gen::<f64>());
    while threshold < prod {
        count += 1;
        prod *= rng.gen::<f64>();
    }
    count
}

impl Generate for Poisson {
    fn gen<R: rand::Rng>(&self, state: State, rng: &mut R) -> Result<u64> {
        // Sum of independent Poisson variables is Poisson again.
        let mut rest = self.rate(state);
        let mut count = 0;
        while 0f64 < rest {
            let rate = rest.min(POISSON_CHUNK);
            count += knuth(rate, rng);
            rest -= rate;
        }
        Ok(count)
    }
}

impl Generate for EmissionModel {
    fn gen<R: rand::Rng>(&self, state: State, rng: &mut R) -> Result<u64> {
        match self {
            EmissionModel::Categorical(model) => model.gen(state, rng),
            EmissionModel::Poisson(model) => model.gen(state, rng),
        }
    }
}

fn choose_state<R: rand::Rng, F: Fn(State) -> f64>(rng: &mut R, weight: F) -> Result<State> {
    STATES
        .choose_weighted(rng, |&s| weight(s))
        .copied()
        .map_err(|why| Error::InvalidModel(format!("{}", why)))
}

/// Sample `len` hidden states and their observations (0-based) from `model`.
pub fn simulate<R: rand::Rng>(
    model: &HiddenMarkovModel,
    len: usize,
    rng: &mut R,
) -> Result<(Vec<State>, Vec<u64>)> {
    let mut states = Vec::with_capacity(len);
    let mut observations = Vec::with_capacity(len);
    let mut current = choose_state(rng, |s| model.prior.log_prob(s).exp())?;
    for t in 0..len {
        if 0 < t {
            let from = current;
            current = choose_state(rng, |to| model.transition.log_prob(from, to).exp())?;
        }
        observations.push(model.emission.gen(current, rng)?);
        states.push(current);
    }
    Ok((states, observations))
}
