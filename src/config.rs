//! JSON configuration of a model. All the probabilities are linear, not logarithms.
//!
//! ```json
//! {
//!   "transition": [[0.95, 0.05], [0.1, 0.9]],
//!   "emission": {"kind": "poisson", "rates": [1.5, 6.0]},
//!   "initial": [1.0, 0.0],
//!   "labels": ["1", "2"]
//! }
//! ```
//! `initial` and `labels` can be omitted. Then, the first state is the start state for sure,
//! and the labels are "1" and "2".
use crate::emission::{Categorical, EmissionModel, Poisson};
use crate::model::{HiddenMarkovModel, Labels};
use crate::viterbi::{Prior, Transition};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Names of the built-in models.
pub const PRESETS: [&str; 2] = ["casino", "poisson"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EmissionConfig {
    /// `probs[symbol][state]`
    Categorical { probs: Vec<[f64; 2]> },
    Poisson { rates: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// `transition[from][to]`
    pub transition: [[f64; 2]; 2],
    pub emission: EmissionConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<[String; 2]>,
}

impl ModelConfig {
    /// Configuration of a built-in model, see `PRESETS`.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "casino" => Some(Self::from(&HiddenMarkovModel::casino())),
            "poisson" => Some(Self::from(&HiddenMarkovModel::poisson_counts())),
            _ => None,
        }
    }
    /// Validate the parameters and build the model.
    pub fn build(&self) -> Result<HiddenMarkovModel> {
        let transition = Transition::from_probs(self.transition)?;
        let emission: EmissionModel = match &self.emission {
            EmissionConfig::Categorical { probs } => Categorical::new(probs)?.into(),
            EmissionConfig::Poisson { rates } => Poisson::new(*rates)?.into(),
        };
        let prior = match self.initial {
            Some(probs) => Prior::from_probs(probs)?,
            None => Prior::default(),
        };
        let labels = match &self.labels {
            Some([x, y]) if x == y => {
                let msg = format!("both states are labeled {:?}", x);
                return Err(Error::InvalidModel(msg));
            }
            Some(labels) => Labels::from(labels.clone()),
            None => Labels::default(),
        };
        Ok(HiddenMarkovModel::new(transition, emission, prior, labels))
    }
    pub fn from_reader<R: std::io::Read>(rdr: R) -> Result<Self> {
        Ok(serde_json::from_reader(rdr)?)
    }
    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
        Self::from_reader(rdr)
    }
    pub fn to_writer<W: std::io::Write>(&self, wtr: W) -> Result<()> {
        Ok(serde_json::to_writer_pretty(wtr, self)?)
    }
}

impl std::convert::From<&HiddenMarkovModel> for ModelConfig {
    fn from(model: &HiddenMarkovModel) -> Self {
        let emission = match &model.emission {
            EmissionModel::Categorical(model) => EmissionConfig::Categorical {
                probs: model.probs().to_vec(),
            },
            EmissionModel::Poisson(model) => EmissionConfig::Poisson {
                rates: model.rates(),
            },
        };
        Self {
            transition: model.transition.probs(),
            emission,
            initial: Some(model.prior.probs()),
            labels: Some(model.labels.clone().into_inner()),
        }
    }
}
