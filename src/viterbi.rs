//! Viterbi decoding for two-state hidden Markov models.
//!
//! Everything here is in natural-log space. A decode call borrows the observations,
//! fills two DP tables (best log probabilities and back pointers) of `2 x T` cells,
//! and traces the optimal path back from the last position.
//!
//! Conventions:
//! - The first position is scored by the initial distribution alone, i.e.,
//!   `observations[0]` is validated but never emitted.
//! - When two candidates are exactly equal, the one from `State::First` wins. This holds
//!   in the recurrence and for the choice of the last state.
//! - The first position of the path is decided by the back pointer at `t = 1`,
//!   or by the initial distribution if there is only one observation.
use crate::dptable::DPTable;
use crate::emission::Emission;
use crate::logprob::max_arg;
use crate::{Error, Result, State, STATES};

/// A 2x2 transition matrix. `log_prob(i, j)` = log(Pr{j at t | i at t-1}).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    log: [[f64; 2]; 2],
}

impl Transition {
    /// Create a transition matrix from linear probabilities.
    /// Each entry should be in [0,1] and each row should have a positive sum.
    /// Rows are not normalized.
    pub fn from_probs(probs: [[f64; 2]; 2]) -> Result<Self> {
        for row in probs.iter() {
            check_distribution(row, "transition")?;
        }
        Ok(Self::from_probs_unchecked(probs))
    }
    pub(crate) fn from_probs_unchecked(probs: [[f64; 2]; 2]) -> Self {
        let log = [
            [probs[0][0].ln(), probs[0][1].ln()],
            [probs[1][0].ln(), probs[1][1].ln()],
        ];
        Self { log }
    }
    /// Create a transition matrix from log probabilities. NaN and +inf are rejected.
    pub fn from_log(log: [[f64; 2]; 2]) -> Result<Self> {
        let is_valid = |x: &f64| !x.is_nan() && *x != f64::INFINITY;
        if log.iter().flatten().all(is_valid) {
            Ok(Self { log })
        } else {
            let msg = format!("log transition matrix {:?}", log);
            Err(Error::InvalidModel(msg))
        }
    }
    #[inline]
    pub fn log_prob(&self, from: State, to: State) -> f64 {
        self.log[from.index()][to.index()]
    }
    /// Linear probabilities, `probs()[from][to]`.
    pub fn probs(&self) -> [[f64; 2]; 2] {
        let [[a, b], [c, d]] = self.log;
        [[a.exp(), b.exp()], [c.exp(), d.exp()]]
    }
}

/// The initial state distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prior {
    log: [f64; 2],
}

impl Prior {
    /// The path starts from `state` for sure, i.e., log(1) = 0 and log(0) = -inf.
    pub fn certain(state: State) -> Self {
        let mut log = [f64::NEG_INFINITY; 2];
        log[state.index()] = 0f64;
        Self { log }
    }
    pub fn from_probs(probs: [f64; 2]) -> Result<Self> {
        check_distribution(&probs, "initial")?;
        Ok(Self {
            log: [probs[0].ln(), probs[1].ln()],
        })
    }
    #[inline]
    pub fn log_prob(&self, state: State) -> f64 {
        self.log[state.index()]
    }
    pub fn probs(&self) -> [f64; 2] {
        [self.log[0].exp(), self.log[1].exp()]
    }
}

impl std::default::Default for Prior {
    fn default() -> Self {
        Self::certain(State::First)
    }
}

fn check_distribution(probs: &[f64; 2], name: &str) -> Result<()> {
    let in_range = probs.iter().all(|p| (0f64..=1f64).contains(p));
    if in_range && 0f64 < probs[0] + probs[1] {
        Ok(())
    } else {
        let msg = format!("{} probabilities {:?}", name, probs);
        Err(Error::InvalidModel(msg))
    }
}

/// The most probable state path and its log probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub path: Vec<State>,
    pub log_prob: f64,
}

impl Decoded {
    pub fn len(&self) -> usize {
        self.path.len()
    }
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
    /// Number of positions where the decoded path agrees with `reference`.
    pub fn agreement(&self, reference: &[State]) -> Result<usize> {
        if reference.len() != self.path.len() {
            return Err(Error::LengthMismatch {
                expected: self.path.len(),
                actual: reference.len(),
            });
        }
        Ok(self
            .path
            .iter()
            .zip(reference.iter())
            .filter(|(x, y)| x == y)
            .count())
    }
}

fn check_observations<E: Emission + ?Sized>(observations: &[u64], emission: &E) -> Result<()> {
    if observations.is_empty() {
        return Err(Error::EmptySequence);
    }
    if let Some(symbols) = emission.symbol_count() {
        let out_of_range = observations.iter().enumerate().find(|x| symbols <= *x.1);
        if let Some((position, &value)) = out_of_range {
            return Err(Error::ObservationOutOfRange {
                position,
                value,
                symbols,
            });
        }
    }
    Ok(())
}

/// Decode the most probable state path of `observations`.
pub fn decode<E: Emission + ?Sized>(
    observations: &[u64],
    transition: &Transition,
    emission: &E,
    prior: &Prior,
) -> Result<Decoded> {
    check_observations(observations, emission)?;
    let len = observations.len();
    debug!("Viterbi on {} observations", len);
    let mut best = DPTable::new(len, f64::NEG_INFINITY);
    let mut pointers = DPTable::new(len, State::First);
    for &state in STATES.iter() {
        best.set(state, 0, prior.log_prob(state));
    }
    for (t, &obs) in observations.iter().enumerate().skip(1) {
        for &to in STATES.iter() {
            let from_first = best.get(State::First, t - 1) + transition.log_prob(State::First, to);
            let from_second =
                best.get(State::Second, t - 1) + transition.log_prob(State::Second, to);
            let (max, arg) = max_arg(from_first, from_second);
            best.set(to, t, emission.log_emission(obs, to) + max);
            pointers.set(to, t, arg);
        }
        trace!("{}\t{:?}\t{:?}", t, best.column(t), pointers.column(t));
    }
    let (log_prob, last) = max_arg(
        best.get(State::First, len - 1),
        best.get(State::Second, len - 1),
    );
    if log_prob == f64::NEG_INFINITY {
        return Err(Error::NoFeasiblePath);
    }
    let mut path = vec![last; len];
    for t in (0..len - 1).rev() {
        path[t] = pointers.get(path[t + 1], t + 1);
    }
    debug!("Viterbi log probability:{:.3}", log_prob);
    Ok(Decoded { path, log_prob })
}

/// Log probability of a given state path, scored the same way as `decode` does.
/// The maximum over all paths equals `decode(..).log_prob`.
pub fn path_log_prob<E: Emission + ?Sized>(
    observations: &[u64],
    path: &[State],
    transition: &Transition,
    emission: &E,
    prior: &Prior,
) -> Result<f64> {
    check_observations(observations, emission)?;
    if observations.len() != path.len() {
        return Err(Error::LengthMismatch {
            expected: observations.len(),
            actual: path.len(),
        });
    }
    // Positions 1.. are scored by their incoming transition and emission.
    let lk = path
        .windows(2)
        .zip(observations.iter().skip(1))
        .fold(prior.log_prob(path[0]), |lk, (states, &obs)| {
            let (from, to) = (states[0], states[1]);
            emission.log_emission(obs, to) + (lk + transition.log_prob(from, to))
        });
    Ok(lk)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::emission::{Categorical, Poisson};
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    const SEED: u64 = 1293890;
    const TOL: f64 = 1e-9;
    // Rolls 1-6 of the occasionally dishonest casino in Durbin et al.
    const ROLLS: &[u8] = b"315116246446644245311321631164152133625144543631656626566666\
651166453132651245636664631636663162326455236266666625151631\
222555441666566563564324364131513465146353411126414626253356\
366163666466232534413661661163252562462255265252266435353336\
233121625364414432335163243633665562466662632666612355245242";
    const CASINO_PATH: &[u8] = b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFLLLLLLLLLLLL\
LLLLLLFFFFFFFFFFFFLLLLLLLLLLLLLLLLLLLLLLLLLLLLLLLLLLFFFFFFFF\
FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFL\
LLLLLLLLLLLLFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF\
FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFLLLLLLLLLLLLLLLLLLLFFFFFFFFFFF";
    fn casino_transition() -> Transition {
        Transition::from_probs([[0.95, 0.05], [0.1, 0.9]]).unwrap()
    }
    fn poisson_transition() -> Transition {
        Transition::from_probs([[0.9551, 0.0449], [0.0880, 0.9120]]).unwrap()
    }
    fn to_labels(path: &[State]) -> String {
        path.iter()
            .map(|s| match s {
                State::First => 'F',
                State::Second => 'L',
            })
            .collect()
    }
    // Exhaustive maximization over all 2^T paths.
    fn brute_force<E: Emission>(
        obs: &[u64],
        transition: &Transition,
        emission: &E,
        prior: &Prior,
    ) -> f64 {
        let len = obs.len();
        (0..1usize << len)
            .map(|bits| {
                let path: Vec<_> = (0..len)
                    .map(|t| State::from_index((bits >> t) & 1).unwrap())
                    .collect();
                path_log_prob(obs, &path, transition, emission, prior).unwrap()
            })
            .fold(f64::NEG_INFINITY, f64::max)
    }
    fn random_row<R: Rng>(rng: &mut R) -> [f64; 2] {
        let p = rng.gen_range(0.01..0.99);
        [p, 1f64 - p]
    }
    #[test]
    fn casino_known_path() {
        let obs: Vec<u64> = ROLLS.iter().map(|&b| (b - b'1') as u64).collect();
        let emission = Categorical::casino();
        let prior = Prior::default();
        let decoded = decode(&obs, &casino_transition(), &emission, &prior).unwrap();
        assert_eq!(decoded.len(), ROLLS.len());
        let expected = String::from_utf8_lossy(CASINO_PATH);
        assert_eq!(to_labels(&decoded.path), expected);
        assert!((decoded.log_prob - -537.0090959959844).abs() < 1e-6);
    }
    #[test]
    fn naive_check() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(SEED);
        for _ in 0..200 {
            let transition = Transition::from_probs([random_row(&mut rng), random_row(&mut rng)]);
            let transition = transition.unwrap();
            let prior = Prior::from_probs(random_row(&mut rng)).unwrap();
            let probs: Vec<_> = (0..3)
                .map(|_| [rng.gen_range(0.01..1.0), rng.gen_range(0.01..1.0)])
                .collect();
            let emission = Categorical::new(&probs).unwrap();
            let len = rng.gen_range(1..=10);
            let obs: Vec<u64> = (0..len).map(|_| rng.gen_range(0..3)).collect();
            let decoded = decode(&obs, &transition, &emission, &prior).unwrap();
            let naive = brute_force(&obs, &transition, &emission, &prior);
            assert!((decoded.log_prob - naive).abs() < TOL, "{:?}", obs);
            let lk = path_log_prob(&obs, &decoded.path, &transition, &emission, &prior).unwrap();
            assert!((decoded.log_prob - lk).abs() < TOL, "{:?}", obs);
        }
    }
    #[test]
    fn naive_check_poisson() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(SEED + 1);
        for _ in 0..100 {
            let transition = Transition::from_probs([random_row(&mut rng), random_row(&mut rng)]);
            let transition = transition.unwrap();
            let rates = [rng.gen_range(0.5..3.0), rng.gen_range(3.0..10.0)];
            let emission = Poisson::new(rates).unwrap();
            let prior = Prior::from_probs(random_row(&mut rng)).unwrap();
            let len = rng.gen_range(1..=10);
            let obs: Vec<u64> = (0..len).map(|_| rng.gen_range(0..12)).collect();
            let decoded = decode(&obs, &transition, &emission, &prior).unwrap();
            let naive = brute_force(&obs, &transition, &emission, &prior);
            assert!((decoded.log_prob - naive).abs() < TOL, "{:?}", obs);
        }
    }
    #[test]
    fn single_observation_follows_prior() {
        let emission = Categorical::casino();
        let transition = casino_transition();
        for obs in 0..6 {
            let prior = Prior::certain(State::Second);
            let decoded = decode(&[obs], &transition, &emission, &prior).unwrap();
            assert_eq!(decoded.path, vec![State::Second]);
            assert_eq!(decoded.log_prob, 0f64);
            let prior = Prior::from_probs([0.7, 0.3]).unwrap();
            let decoded = decode(&[obs], &transition, &emission, &prior).unwrap();
            assert_eq!(decoded.path, vec![State::First]);
            assert!((decoded.log_prob - 0.7f64.ln()).abs() < TOL);
            let prior = Prior::from_probs([0.3, 0.7]).unwrap();
            let decoded = decode(&[obs], &transition, &emission, &prior).unwrap();
            assert_eq!(decoded.path, vec![State::Second]);
        }
    }
    #[test]
    fn ties_go_to_first_state() {
        let transition = Transition::from_probs([[0.5, 0.5], [0.5, 0.5]]).unwrap();
        let emission = Categorical::new(&[[0.25, 0.25], [0.75, 0.75]]).unwrap();
        let prior = Prior::from_probs([0.5, 0.5]).unwrap();
        let obs = vec![0, 1, 1, 0, 1, 0, 0, 0, 1, 1, 0, 1];
        for _ in 0..10 {
            let decoded = decode(&obs, &transition, &emission, &prior).unwrap();
            assert!(decoded.path.iter().all(|&s| s == State::First));
        }
        // The start is forced, every later step is a tie.
        let prior = Prior::certain(State::Second);
        let decoded = decode(&obs, &transition, &emission, &prior).unwrap();
        assert_eq!(decoded.path[0], State::Second);
        assert!(decoded.path[1..].iter().all(|&s| s == State::First));
    }
    #[test]
    fn deterministic() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(SEED);
        let obs: Vec<u64> = (0..1000).map(|_| rng.gen_range(0..6)).collect();
        let emission = Categorical::casino();
        let first = decode(&obs, &casino_transition(), &emission, &Prior::default()).unwrap();
        let second = decode(&obs, &casino_transition(), &emission, &Prior::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), obs.len());
    }
    #[test]
    fn poisson_changepoint() {
        let obs = vec![1, 2, 1, 0, 2, 1, 3, 2, 1, 2, 6, 5, 7, 6, 8, 5, 6, 7, 4, 6];
        let emission = Poisson::new([1.8234, 5.7812]).unwrap();
        let decoded = decode(&obs, &poisson_transition(), &emission, &Prior::default()).unwrap();
        assert_eq!(decoded.len(), obs.len());
        assert!(decoded.path[..8].iter().all(|&s| s == State::First));
        assert!(decoded.path[12..].iter().all(|&s| s == State::Second));
        let change = decoded.path.iter().position(|&s| s == State::Second).unwrap();
        assert!((8..=12).contains(&change), "{}", change);
    }
    #[test]
    fn poisson_large_counts() {
        let obs = vec![2, 170, 171, 3, 500, 1];
        let emission = Poisson::new([1.8234, 5.7812]).unwrap();
        let decoded = decode(&obs, &poisson_transition(), &emission, &Prior::default()).unwrap();
        assert!(decoded.log_prob.is_finite());
        assert_eq!(decoded.path[1], State::Second);
        assert_eq!(decoded.path[4], State::Second);
    }
    #[test]
    fn errors() {
        let emission = Categorical::casino();
        let transition = casino_transition();
        let prior = Prior::default();
        match decode(&[], &transition, &emission, &prior) {
            Err(Error::EmptySequence) => {}
            x => panic!("{:?}", x),
        }
        match decode(&[0, 3, 6, 1], &transition, &emission, &prior) {
            Err(Error::ObservationOutOfRange {
                position: 2,
                value: 6,
                symbols: 6,
            }) => {}
            x => panic!("{:?}", x),
        }
        // The first observation is not emitted, but still checked.
        assert!(decode(&[9, 0], &transition, &emission, &prior).is_err());
        let path = vec![State::First; 3];
        match path_log_prob(&[0, 1], &path, &transition, &emission, &prior) {
            Err(Error::LengthMismatch {
                expected: 2,
                actual: 3,
            }) => {}
            x => panic!("{:?}", x),
        }
    }
    #[test]
    fn infeasible() {
        // Symbol 1 can not be emitted by anyone.
        let emission = Categorical::new(&[[1.0, 1.0], [0.0, 0.0]]).unwrap();
        let decoded = decode(&[0, 1], &casino_transition(), &emission, &Prior::default());
        assert!(matches!(decoded, Err(Error::NoFeasiblePath)));
        // Only the second state can emit symbol 1, and it is unreachable.
        let emission = Categorical::new(&[[1.0, 1.0], [0.0, 1.0]]).unwrap();
        let transition = Transition::from_probs([[1.0, 0.0], [0.0, 1.0]]).unwrap();
        let decoded = decode(&[0, 0, 1], &transition, &emission, &Prior::default());
        assert!(matches!(decoded, Err(Error::NoFeasiblePath)));
    }
    #[test]
    fn model_validation() {
        assert!(Transition::from_probs([[0.5, 0.5], [1.5, 0.0]]).is_err());
        assert!(Transition::from_probs([[0.0, 0.0], [0.5, 0.5]]).is_err());
        assert!(Transition::from_probs([[f64::NAN, 0.5], [0.5, 0.5]]).is_err());
        assert!(Transition::from_log([[0.0, f64::NEG_INFINITY], [-0.1, -2.3]]).is_ok());
        assert!(Transition::from_log([[f64::INFINITY, 0.0], [0.0, 0.0]]).is_err());
        assert!(Prior::from_probs([0.0, 0.0]).is_err());
        assert!(Prior::from_probs([-0.1, 1.1]).is_err());
        let probs = Prior::certain(State::Second).probs();
        assert_eq!(probs, [0f64, 1f64]);
        let probs = casino_transition().probs();
        assert!((probs[1][1] - 0.9).abs() < TOL);
    }
    #[test]
    fn agreement() {
        let decoded = Decoded {
            path: vec![State::First, State::Second, State::Second],
            log_prob: -1.0,
        };
        let reference = vec![State::First, State::First, State::Second];
        assert_eq!(decoded.agreement(&reference).unwrap(), 2);
        assert!(decoded.agreement(&reference[..2]).is_err());
    }
    #[test]
    fn parallel_equivalence() {
        use rayon::prelude::*;
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(SEED);
        let seqs: Vec<Vec<u64>> = (0..32)
            .map(|_| (0..500).map(|_| rng.gen_range(0..6)).collect())
            .collect();
        let emission = Categorical::casino();
        let transition = casino_transition();
        let prior = Prior::default();
        let serial: Vec<_> = seqs
            .iter()
            .map(|obs| decode(obs, &transition, &emission, &prior).unwrap())
            .collect();
        let parallel: Vec<_> = seqs
            .par_iter()
            .map(|obs| decode(obs, &transition, &emission, &prior).unwrap())
            .collect();
        assert_eq!(serial, parallel);
    }
}
