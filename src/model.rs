//! A complete two-state model: transitions, emissions, initial distribution, and labels.
use crate::emission::{Categorical, EmissionModel, Poisson};
use crate::viterbi::{self, Decoded, Prior, Transition};
use crate::{Result, State, STATES};

/// Text labels for the two states, such as "F"/"L" or "1"/"2".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels([String; 2]);

impl Labels {
    pub fn new<S: Into<String>>(first: S, second: S) -> Self {
        Self([first.into(), second.into()])
    }
    pub fn label(&self, state: State) -> &str {
        &self.0[state.index()]
    }
    pub fn parse(&self, label: &str) -> Option<State> {
        STATES.iter().copied().find(|&s| self.label(s) == label)
    }
    /// Concatenate the labels of `path`.
    pub fn render(&self, path: &[State]) -> String {
        path.iter().map(|&s| self.label(s)).collect()
    }
    pub fn into_inner(self) -> [String; 2] {
        self.0
    }
}

impl std::default::Default for Labels {
    fn default() -> Self {
        Self::new("1", "2")
    }
}

impl std::convert::From<[String; 2]> for Labels {
    fn from(labels: [String; 2]) -> Self {
        Self(labels)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HiddenMarkovModel {
    pub transition: Transition,
    pub emission: EmissionModel,
    pub prior: Prior,
    pub labels: Labels,
}

impl HiddenMarkovModel {
    pub fn new(
        transition: Transition,
        emission: EmissionModel,
        prior: Prior,
        labels: Labels,
    ) -> Self {
        Self {
            transition,
            emission,
            prior,
            labels,
        }
    }
    /// Fair(F) and loaded(L) dice, from "the occasionally dishonest casino" in Durbin et al.
    pub fn casino() -> Self {
        let transition = [[0.95, 0.05], [0.1, 0.9]];
        Self {
            transition: Transition::from_probs_unchecked(transition),
            emission: Categorical::casino().into(),
            prior: Prior::certain(State::First),
            labels: Labels::new("F", "L"),
        }
    }
    /// Counts from two Poisson distributions with low and high rates.
    pub fn poisson_counts() -> Self {
        let transition = [[0.9551, 0.0449], [0.0880, 0.9120]];
        Self {
            transition: Transition::from_probs_unchecked(transition),
            emission: Poisson::new_unchecked([1.8234, 5.7812]).into(),
            prior: Prior::certain(State::First),
            labels: Labels::new("1", "2"),
        }
    }
    pub fn decode(&self, observations: &[u64]) -> Result<Decoded> {
        viterbi::decode(observations, &self.transition, &self.emission, &self.prior)
    }
    pub fn path_log_prob(&self, observations: &[u64], path: &[State]) -> Result<f64> {
        viterbi::path_log_prob(
            observations,
            path,
            &self.transition,
            &self.emission,
            &self.prior,
        )
    }
}

impl std::fmt::Display for HiddenMarkovModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let probs = self.transition.probs();
        for (&from, row) in STATES.iter().zip(probs.iter()) {
            let [x, y] = *row;
            writeln!(f, "{}:{:.4}\t{:.4}", self.labels.label(from), x, y)?;
        }
        match &self.emission {
            EmissionModel::Categorical(model) => {
                for (symbol, &[x, y]) in model.probs().iter().enumerate() {
                    writeln!(f, "Obs{}:{:.4}\t{:.4}", symbol + 1, x, y)?;
                }
            }
            EmissionModel::Poisson(model) => {
                let [x, y] = model.rates();
                writeln!(f, "Rate:{:.4}\t{:.4}", x, y)?;
            }
        }
        let [x, y] = self.prior.probs();
        write!(f, "Init:{:.4}\t{:.4}", x, y)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn labels() {
        let labels = Labels::new("F", "L");
        assert_eq!(labels.label(State::Second), "L");
        assert_eq!(labels.parse("F"), Some(State::First));
        assert_eq!(labels.parse("X"), None);
        let path = vec![State::First, State::Second, State::Second];
        assert_eq!(labels.render(&path), "FLL");
        assert_eq!(Labels::default().render(&path), "122");
    }
    #[test]
    fn presets_decode() {
        let model = HiddenMarkovModel::casino();
        let rolls = vec![0, 3, 2, 1, 4, 0, 5, 5, 5, 5, 5, 5, 5, 5, 2, 1, 0, 3, 2, 4, 1];
        let decoded = model.decode(&rolls).unwrap();
        assert_eq!(decoded.len(), rolls.len());
        assert_eq!(model.labels.render(&decoded.path[..6]), "FFFFFF");
        assert_eq!(model.labels.render(&decoded.path[7..13]), "LLLLLL");
        let lk = model.path_log_prob(&rolls, &decoded.path).unwrap();
        assert!((lk - decoded.log_prob).abs() < 1e-9);
        let model = HiddenMarkovModel::poisson_counts();
        let counts = vec![1, 2, 0, 1, 2, 8, 7, 6, 9, 5];
        let decoded = model.decode(&counts).unwrap();
        assert_eq!(model.labels.render(&decoded.path), "1111122222");
    }
    #[test]
    fn display() {
        let model = HiddenMarkovModel::casino();
        let text = format!("{}", model);
        assert!(text.starts_with("F:0.9500\t0.0500\nL:0.1000\t0.9000\n"));
        assert!(text.contains("Obs6:0.1667\t0.5000"));
        assert!(text.ends_with("Init:1.0000\t0.0000"));
    }
}
