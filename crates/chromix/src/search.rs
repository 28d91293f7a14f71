use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use ecow::EcoString;
use rayon::prelude::*;

use crate::color::{Cmyk, Rgb};
use crate::diag::{SolveError, eco_format};
use crate::expr::Expression;
use crate::metric::{Metric, Target};
use crate::palette::Palette;

/// Parameters of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// The deepest nesting of mixes to explore.
    pub max_bangs: usize,
    /// How the distance to the target is measured.
    pub metric: Metric,
    /// How many of the best candidates of a depth are expanded further.
    pub beam_width: usize,
    /// The distance between two tried mixing percentages.
    pub step_size: u8,
    /// When a palette color is considered a no-op mix for an expression.
    pub self_mix: SelfMixRule,
    /// What to do when the lightener is not part of the palette.
    pub missing_lightener: MissingColorPolicy,
    /// The color every bare base color is additionally tinted with at depth 1.
    pub lightener: EcoString,
}

impl SearchConfig {
    /// Checks that the parameters describe a bounded, non-empty search.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.beam_width == 0 {
            return Err(SolveError::InvalidParameter(
                "beam width must be at least 1".into(),
            ));
        }
        if !(1..100).contains(&self.step_size) {
            return Err(SolveError::InvalidParameter(eco_format!(
                "step size must be between 1 and 99, got {}",
                self.step_size
            )));
        }
        Ok(())
    }

    /// The mixing percentages tried for every pair, in ascending order.
    pub fn percentages(&self) -> impl Iterator<Item = u8> + use<> {
        (self.step_size..100).step_by(self.step_size.max(1).into())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_bangs: 2,
            metric: Metric::Rgb,
            beam_width: 1000,
            step_size: 5,
            self_mix: SelfMixRule::default(),
            missing_lightener: MissingColorPolicy::default(),
            lightener: "White".into(),
        }
    }
}

/// Decides which palette colors are not mixed into an expression.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SelfMixRule {
    /// Skip a color if the written expression ends with its name.
    ///
    /// This is a purely textual check: `DarkRed` also blocks mixing in `Red`.
    #[default]
    Suffix,
    /// Skip a color only if it is exactly the most recently mixed color.
    LastName,
}

impl SelfMixRule {
    /// Whether mixing `name` into `expr` is skipped.
    pub fn skips(self, expr: &Expression, name: &str) -> bool {
        // Names never contain `!`, so the written expression ends with a name
        // exactly if its last segment does.
        match self {
            Self::Suffix => expr.tail().ends_with(name),
            Self::LastName => expr.tail() == name,
        }
    }
}

/// How to react when a color the search wants to use is missing.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MissingColorPolicy {
    /// Leave out the part of the search that needs the color.
    #[default]
    Skip,
    /// Refuse to search.
    Error,
}

/// A mixing expression together with its simulated color.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The distance between the simulated color and the target.
    pub gap: f64,
    /// The mixed color.
    pub cmyk: Cmyk,
    /// How the color is written.
    pub expr: Expression,
    /// The mixed color as it is displayed.
    pub rgb: Rgb,
}

impl Candidate {
    /// Simulates a color and measures its distance to the target.
    pub fn new(target: &Target, cmyk: Cmyk, expr: Expression) -> Self {
        let rgb = cmyk.to_rgb();
        Self { gap: target.gap(rgb), cmyk, expr, rgb }
    }

    /// The simulated color on the 0-255 scale.
    pub fn rgb_bytes(&self) -> [f64; 3] {
        self.rgb.to_bytes_f64()
    }
}

/// The best candidate found at each depth.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultSet(BTreeMap<usize, Candidate>);

impl ResultSet {
    /// The best candidate of a depth, if any was generated.
    pub fn get(&self, depth: usize) -> Option<&Candidate> {
        self.0.get(&depth)
    }

    /// Iterates over depths and their best candidates in ascending depth order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &Candidate)> {
        self.0.iter().map(|(&depth, candidate)| (depth, candidate))
    }

    /// The closest candidate over all depths. The shallower one wins a tie.
    pub fn best(&self) -> Option<&Candidate> {
        self.0
            .values()
            .reduce(|best, candidate| if candidate.gap < best.gap { candidate } else { best })
    }

    /// The number of depths with a result.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no depth has a result, which happens for an empty palette.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, depth: usize, candidate: Candidate) {
        self.0.insert(depth, candidate);
    }
}

/// Runs a beam search for mixing expressions close to `target`.
pub fn search(
    target: Rgb,
    palette: &Palette,
    config: &SearchConfig,
) -> Result<ResultSet, SolveError> {
    Ok(Solver::new(target, palette, config)?.run())
}

/// A prepared search over a fixed palette.
#[derive(Debug)]
pub struct Solver<'a> {
    palette: &'a Palette,
    config: &'a SearchConfig,
    target: Target,
    lightener: Option<Cmyk>,
}

impl<'a> Solver<'a> {
    /// Validates the configuration and resolves the lightener.
    pub fn new(
        target: Rgb,
        palette: &'a Palette,
        config: &'a SearchConfig,
    ) -> Result<Self, SolveError> {
        config.validate()?;

        let lightener = palette.get(&config.lightener);
        if lightener.is_none() && config.max_bangs > 0 && !palette.is_empty() {
            match config.missing_lightener {
                MissingColorPolicy::Skip => tracing::warn!(
                    "palette has no `{}`, skipping implicit lightening",
                    config.lightener
                ),
                MissingColorPolicy::Error => {
                    return Err(SolveError::MissingRequiredColor(
                        config.lightener.clone(),
                    ));
                }
            }
        }

        Ok(Self {
            palette,
            config,
            target: Target::new(target, config.metric),
            lightener,
        })
    }

    /// The depth-0 generation: every palette color on its own, in palette
    /// order.
    pub fn seed(&self) -> Vec<Candidate> {
        self.palette
            .iter()
            .map(|(name, cmyk)| {
                Candidate::new(&self.target, cmyk, Expression::base(name.clone()))
            })
            .collect()
    }

    /// All candidates generated at `depth` from the given frontier, in
    /// generation order.
    pub fn expand<'s>(
        &'s self,
        frontier: &'s [Candidate],
        depth: usize,
    ) -> impl Iterator<Item = Candidate> + 's {
        frontier
            .iter()
            .flat_map(move |parent| self.children(parent, depth).map(Child::build))
    }

    /// Runs the search up to the configured depth.
    pub fn run(&self) -> ResultSet {
        let mut results = ResultSet::default();
        let width = self.config.beam_width;

        let mut seed: Vec<_> = self.seed().into_iter().enumerate().collect();
        seed.sort_by(|(i, a), (j, b)| a.gap.total_cmp(&b.gap).then(i.cmp(j)));
        let mut frontier: Vec<_> = seed.into_iter().map(|(_, c)| c).collect();
        let Some(best) = frontier.first() else { return results };
        results.insert(0, best.clone());
        frontier.truncate(width);

        for depth in 1..=self.config.max_bangs {
            let beam = frontier
                .par_iter()
                .enumerate()
                .fold(
                    || Beam::new(width),
                    |mut beam, (i, parent)| {
                        for (j, child) in self.children(parent, depth).enumerate() {
                            beam.offer(child.gap, (i, j), || child.build());
                        }
                        beam
                    },
                )
                .reduce(|| Beam::new(width), Beam::merge);

            let generated = beam.generated;
            let next = beam.into_sorted();
            let Some(best) = next.first() else {
                // Later depths would only see the same frontier again, minus
                // the implicit lightening.
                tracing::debug!(depth, "no candidates generated, stopping");
                break;
            };

            tracing::debug!(
                depth,
                frontier = frontier.len(),
                generated,
                best_gap = best.gap,
                best = %best.expr,
                "expanded depth"
            );

            results.insert(depth, best.clone());
            frontier = next;
        }

        results
    }

    /// The mixes generated from a single parent, in generation order.
    fn children<'s>(
        &'s self,
        parent: &'s Candidate,
        depth: usize,
    ) -> impl Iterator<Item = Child<'s>> + 's {
        let mixes = self
            .palette
            .iter()
            .filter(move |(name, _)| !self.config.self_mix.skips(&parent.expr, name))
            .flat_map(move |(name, cmyk)| self.mixes(parent, name, cmyk));

        // A bare base color can additionally be tinted, even if it is the
        // lightener itself.
        let tints = self
            .lightener
            .filter(|_| depth == 1 && parent.expr.depth() == 0)
            .into_iter()
            .flat_map(move |cmyk| self.mixes(parent, &self.config.lightener, cmyk));

        mixes.chain(tints)
    }

    /// Mixes `parent` with one color at every percentage.
    fn mixes<'s>(
        &'s self,
        parent: &'s Candidate,
        name: &'s EcoString,
        cmyk: Cmyk,
    ) -> impl Iterator<Item = Child<'s>> + 's {
        self.config.percentages().map(move |percent| {
            let mixed = parent.cmyk.mix(cmyk, percent);
            let rgb = mixed.to_rgb();
            Child {
                parent,
                percent,
                name,
                cmyk: mixed,
                rgb,
                gap: self.target.gap(rgb),
            }
        })
    }
}

/// A measured mix whose expression is not written out yet.
struct Child<'s> {
    parent: &'s Candidate,
    percent: u8,
    name: &'s EcoString,
    cmyk: Cmyk,
    rgb: Rgb,
    gap: f64,
}

impl Child<'_> {
    fn build(self) -> Candidate {
        Candidate {
            gap: self.gap,
            cmyk: self.cmyk,
            expr: self.parent.expr.mixed(self.percent, self.name.clone()),
            rgb: self.rgb,
        }
    }
}

/// Keeps the `width` smallest candidates of a generation.
///
/// Candidates are ordered by gap and then by their position in the
/// generation, so the kept set does not depend on the order of offers.
struct Beam {
    width: usize,
    generated: usize,
    heap: BinaryHeap<Ranked>,
}

impl Beam {
    fn new(width: usize) -> Self {
        Self { width, generated: 0, heap: BinaryHeap::new() }
    }

    /// Considers a candidate, building it only if it is kept.
    fn offer(
        &mut self,
        gap: f64,
        order: (usize, usize),
        build: impl FnOnce() -> Candidate,
    ) {
        self.generated += 1;
        if self.admits(gap, order) {
            self.push(Ranked { gap, order, candidate: build() });
        }
    }

    fn admits(&self, gap: f64, order: (usize, usize)) -> bool {
        self.heap.len() < self.width
            || self.heap.peek().is_some_and(|worst| worst.cmp_key(gap, order).is_gt())
    }

    fn push(&mut self, ranked: Ranked) {
        if self.heap.len() >= self.width {
            self.heap.pop();
        }
        self.heap.push(ranked);
    }

    fn merge(mut self, other: Self) -> Self {
        self.generated += other.generated;
        for ranked in other.heap {
            if self.admits(ranked.gap, ranked.order) {
                self.push(ranked);
            }
        }
        self
    }

    fn into_sorted(self) -> Vec<Candidate> {
        self.heap.into_sorted_vec().into_iter().map(|r| r.candidate).collect()
    }
}

/// A kept candidate with its sort key.
struct Ranked {
    gap: f64,
    order: (usize, usize),
    candidate: Candidate,
}

impl Ranked {
    fn cmp_key(&self, gap: f64, order: (usize, usize)) -> Ordering {
        self.gap.total_cmp(&gap).then(self.order.cmp(&order))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_key(other.gap, other.order)
    }
}
