use crate::engine::{
    FeatureGraph, MoverAware, MovementLicensed, NeighborPolicy, ParseSession, RouteId, StepResult, Strict,
};
use crate::error::{Error, LexiconError, SessionError};
use crate::lexicon::{Lexicon, LexiconEntry, tokenize};
use crate::Signal;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Text of the built-in toy lexicon.
pub const DEFAULT_LEXICON_TEXT: &str = include_str!("../data/lexicon.txt");

static DEFAULT_LEXICON: Lazy<Result<Lexicon, LexiconError>> = Lazy::new(|| Lexicon::parse(DEFAULT_LEXICON_TEXT));

/// The built-in toy lexicon.
pub fn default_lexicon() -> Result<&'static Lexicon, LexiconError> {
    DEFAULT_LEXICON.as_ref().map_err(Clone::clone)
}

/// Which rule decides that two routes are close enough to combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborPolicyKind {
    /// Contiguous spans, or a pending mover reaching over a gap.
    #[default]
    MoverAware,
    /// Contiguous spans only.
    Strict,
    /// Contiguous spans, or a lower route headed by an unused mover.
    MovementLicensed,
}

impl NeighborPolicyKind {
    pub fn policy(self) -> Box<dyn NeighborPolicy> {
        match self {
            NeighborPolicyKind::MoverAware => Box::new(MoverAware),
            NeighborPolicyKind::Strict => Box::new(Strict),
            NeighborPolicyKind::MovementLicensed => Box::new(MovementLicensed),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NeighborPolicyKind::MoverAware => "mover-aware",
            NeighborPolicyKind::Strict => "strict",
            NeighborPolicyKind::MovementLicensed => "movement-licensed",
        }
    }
}

impl FromStr for NeighborPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mover-aware" => Ok(NeighborPolicyKind::MoverAware),
            "strict" => Ok(NeighborPolicyKind::Strict),
            "movement-licensed" => Ok(NeighborPolicyKind::MovementLicensed),
            _ => Err(format!("unknown neighbor policy '{s}' (expected mover-aware, strict or movement-licensed)")),
        }
    }
}

impl fmt::Display for NeighborPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How [`render_tree`] labels inner nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// `[.admires Pekka admires]`: lexical ids, adjuncts joined with `+`.
    #[default]
    Label,
    /// `[.1-2 Pekka-1 admires-2]`: signal numbers, movers suffixed with `M`.
    Signal,
}

/// Options that affect the route search and its output.
#[derive(Debug, Clone)]
pub struct Options {
    pub neighbor_policy: NeighborPolicyKind,
    /// Routes kept per (root, span, movers) scope before new ones are dropped.
    pub profile_cap: usize,
    /// Routes kept per sentence before new ones are dropped.
    pub max_routes: usize,
    /// Reject adjunctions that clash with adjuncts already attached.
    pub check_adjunct_agreement: bool,
    pub tree_style: TreeStyle,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            neighbor_policy: NeighborPolicyKind::default(),
            profile_cap: 64,
            max_routes: 50_000,
            check_adjunct_agreement: true,
            tree_style: TreeStyle::default(),
        }
    }
}

// --- Session-level operations -----------------------------------------------

/// Build the feature graph for parsed lexicon entries.
pub fn load_lexicon(entries: Vec<LexiconEntry>) -> Result<FeatureGraph, LexiconError> {
    let lexicon = Lexicon::from_entries(entries)?;
    Ok(FeatureGraph::build(&lexicon))
}

/// Start parsing `tokens` against `graph`.
pub fn start_sentence<'g>(
    tokens: &[&str],
    graph: &'g FeatureGraph,
    options: Options,
) -> Result<ParseSession<'g>, SessionError> {
    ParseSession::start(graph, tokens, options)
}

/// Activate the next word part.
pub fn step(session: &mut ParseSession<'_>) -> Result<StepResult, SessionError> {
    session.step()
}

pub fn is_complete(session: &ParseSession<'_>) -> bool {
    session.is_complete()
}

/// Complete routes, best first. Empty when the sentence has no parse.
pub fn best_routes(session: &ParseSession<'_>) -> Result<Vec<RouteId>, SessionError> {
    Ok(session.best_routes()?.into_iter().map(|r| r.id).collect())
}

pub fn render_tree(session: &ParseSession<'_>, route: RouteId) -> String {
    session.render_tree(route)
}

// --- One-shot parsing --------------------------------------------------------

/// One complete parse of a sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
    /// Bracketed tree, `[.Label left right]`.
    pub tree: String,
    /// Arrow notation, e.g. `(Pekka->admires).(admires'<-Merjaa)`.
    pub route: String,
    pub cost: f64,
    pub size: usize,
    pub weight: usize,
}

/// Result from [`parse`] and [`parse_with`].
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub sentence: String,
    /// Complete parses, best first. Empty when nothing spans the sentence.
    pub parses: Vec<Parse>,
    pub elapsed: Duration,
}

impl ParseResult {
    pub fn best(&self) -> Option<&Parse> {
        self.parses.first()
    }
}

/// A compact per-step trace.
#[derive(Debug, Clone)]
pub struct StepSummary {
    pub signal: Signal,
    pub word: String,
    pub duration: Duration,
    pub passes: usize,
    pub merges: Vec<(Signal, Signal)>,
    pub adjunctions: Vec<(Signal, Signal)>,
    pub routes_added: usize,
    pub capped: usize,
    /// Arrow notation of a few routes created by the step.
    pub samples: Vec<String>,
}

/// Additional details returned by [`parse_verbose`] and [`parse_verbose_with`].
#[derive(Debug, Clone)]
pub struct ParseDetails {
    pub total: Duration,
    pub policy: &'static str,
    /// `id-signal` of every word part.
    pub word_parts: Vec<String>,
    pub steps: Vec<StepSummary>,
    /// Activated `cat:` tags with the signals that activated them.
    pub categories: Vec<(String, Vec<Signal>)>,
    /// Routes stored over the whole sentence.
    pub routes: usize,
    pub capped: usize,
    /// Complete routes before ranking.
    pub complete: usize,
}

/// Result from [`parse_verbose`] and [`parse_verbose_with`].
#[derive(Debug, Clone)]
pub struct ParseResultVerbose {
    pub sentence: String,
    pub parses: Vec<Parse>,
    pub elapsed: Duration,
    pub details: ParseDetails,
}

/// Parse `sentence` with the built-in lexicon and default [`Options`].
///
/// # Example
/// ```
/// use minimerge::parse;
///
/// let out = parse("Pekka admires Merjaa").unwrap();
/// assert_eq!(out.best().unwrap().tree, "[.admires Pekka [.admires admires [.admires' admires' Merjaa]]]");
/// ```
pub fn parse(sentence: &str) -> Result<ParseResult, Error> {
    parse_with(sentence, default_lexicon()?, &Options::default())
}

/// Parse `sentence` with `lexicon` and `options`.
pub fn parse_with(sentence: &str, lexicon: &Lexicon, options: &Options) -> Result<ParseResult, Error> {
    let verbose = parse_verbose_with(sentence, lexicon, options)?;
    Ok(ParseResult { sentence: verbose.sentence, parses: verbose.parses, elapsed: verbose.elapsed })
}

pub fn parse_verbose(sentence: &str) -> Result<ParseResultVerbose, Error> {
    parse_verbose_with(sentence, default_lexicon()?, &Options::default())
}

/// Parse `sentence` and keep a compact per-step trace.
pub fn parse_verbose_with(sentence: &str, lexicon: &Lexicon, options: &Options) -> Result<ParseResultVerbose, Error> {
    let tokens = tokenize(sentence);
    let graph = FeatureGraph::for_sentence(lexicon, &tokens)?;
    let mut session = ParseSession::start(&graph, &tokens, options.clone())?;

    let steps = session.run()?;
    let ranked = session.best_routes()?;

    let parses: Vec<Parse> = ranked
        .iter()
        .map(|r| Parse {
            tree: session.render_tree(r.id),
            route: session.print_route(r.id),
            cost: r.cost,
            size: r.size,
            weight: r.weight,
        })
        .collect();

    let details = ParseDetails {
        total: session.metrics().total,
        policy: session.policy_name(),
        word_parts: session
            .word_parts()
            .iter()
            .map(|wp| format!("{}-{}", graph.entry(wp.entry).id, wp.signal))
            .collect(),
        steps: steps.iter().map(|step| step_summary(&session, step)).collect(),
        categories: session.active_categories(),
        routes: session.route_count(),
        capped: session.capped(),
        complete: ranked.len(),
    };

    Ok(ParseResultVerbose { sentence: sentence.to_string(), parses, elapsed: details.total, details })
}

fn step_summary(session: &ParseSession<'_>, step: &StepResult) -> StepSummary {
    let word = step.word_part.map(|wp| session.graph().entry(wp.entry).id.clone()).unwrap_or_default();
    StepSummary {
        signal: step.metrics.signal,
        word,
        duration: step.metrics.duration,
        passes: step.metrics.passes,
        merges: step.new_merge_edges.clone(),
        adjunctions: step.new_adjunction_edges.clone(),
        routes_added: step.routes_touched.len(),
        capped: step.capped,
        samples: step.routes_touched.iter().take(8).map(|&id| session.print_route(id)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_returns_the_best_tree() {
        let res = parse("Pekka admires Merjaa").unwrap();
        assert_eq!(res.sentence, "Pekka admires Merjaa");
        assert_eq!(res.parses.len(), 1);

        let best = res.best().unwrap();
        assert_eq!(best.tree, "[.admires Pekka [.admires admires [.admires' admires' Merjaa]]]");
        assert_eq!(best.route, "(Pekka->admires).(admires'<-Merjaa)");
        assert_eq!(best.cost, 0.0);
        assert_eq!(best.size, 4);
    }

    #[test]
    fn adjunct_inside_an_argument() {
        let res = parse("hyvä Pekka nukkuu").unwrap();
        assert_eq!(res.best().unwrap().tree, "[.nukkuu [.hyvä+Pekka hyvä Pekka] nukkuu]");
    }

    #[test]
    fn adjective_on_the_object() {
        let res = parse("Pekka ihailee hyvä Merjaa").unwrap();
        assert_eq!(res.parses.len(), 1);

        let best = res.best().unwrap();
        assert_eq!(best.tree, "[.ihailee Pekka [.ihailee ihailee [.ihailee' ihailee' [.hyvä+Merjaa hyvä Merjaa]]]]");
        assert_eq!(best.size, 5);
        assert!((best.cost - 0.1).abs() < 1e-9);
    }

    #[test]
    fn verbose_details_list_active_categories() {
        let res = parse_verbose("hyvä talo nukkuu").unwrap();
        assert_eq!(res.details.categories, vec![("cat:NP".to_string(), vec![2])]);
        assert!(parse_verbose("Pekka nukkuu").unwrap().details.categories.is_empty());
    }

    #[test]
    fn no_parse_is_an_empty_result() {
        let res = parse("Merjaa sleeps").unwrap();
        assert!(res.parses.is_empty());
        assert!(res.best().is_none());
    }

    #[test]
    fn unknown_words_and_empty_sentences_are_errors() {
        assert_eq!(parse("Pekka juoksee").unwrap_err(), Error::Session(SessionError::UnknownWord("juoksee".into())));
        assert_eq!(parse("   ").unwrap_err(), Error::Session(SessionError::EmptySentence));
    }

    #[test]
    fn parse_verbose_includes_steps() {
        let res = parse_verbose("Pekka admires Merjaa").unwrap();
        assert_eq!(res.elapsed, res.details.total);
        assert_eq!(res.details.policy, "mover-aware");
        assert_eq!(res.details.word_parts, vec!["Pekka-1", "admires-2", "admires'-3", "Merjaa-4"]);
        assert_eq!(res.details.steps.len(), 4);
        assert_eq!(res.details.steps[1].merges, vec![(2, 1)]);
        assert_eq!(res.details.steps[3].merges, vec![(3, 4)]);
        assert_eq!(res.details.complete, 1);
        assert_eq!(res.details.capped, 0);
    }

    #[test]
    fn signal_trees_on_request() {
        let opts = Options { tree_style: TreeStyle::Signal, ..Options::default() };
        let res = parse_with("ketä Pekka näki", default_lexicon().unwrap(), &opts).unwrap();
        assert_eq!(res.best().unwrap().tree, "[.1-2-3-4 Pekka-2 [.3-1-4 näki-3 [.1-4 ketä-1 näki'-4]]]");
        assert!((res.best().unwrap().cost - 1.2).abs() < 1e-9);
    }

    #[test]
    fn step_api_drives_a_session() {
        let lexicon = Lexicon::parse("hyvä :: adjL:a\nPekka :: N:nom3sg -adjL:a").unwrap();
        let graph = load_lexicon(lexicon.entries().to_vec()).unwrap();
        let mut session = start_sentence(&["hyvä", "Pekka"], &graph, Options::default()).unwrap();

        assert_eq!(best_routes(&session).unwrap_err(), SessionError::Incomplete { consumed: 0, total: 2 });
        step(&mut session).unwrap();
        let second = step(&mut session).unwrap();
        assert_eq!(second.new_adjunction_edges, vec![(2, 1)]);
        assert!(is_complete(&session));
        assert_eq!(step(&mut session).unwrap_err(), SessionError::Exhausted);

        let best = best_routes(&session).unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(render_tree(&session, best[0]), "[.hyvä+Pekka hyvä Pekka]");
    }

    #[test]
    fn policy_names_round_trip() {
        for kind in [NeighborPolicyKind::MoverAware, NeighborPolicyKind::Strict, NeighborPolicyKind::MovementLicensed] {
            assert_eq!(kind.name().parse::<NeighborPolicyKind>(), Ok(kind));
            assert_eq!(kind.policy().name(), kind.name());
        }
        assert!("nearest".parse::<NeighborPolicyKind>().is_err());
    }
}
