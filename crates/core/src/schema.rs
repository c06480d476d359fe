//! Presentation schemas and the slide selector.
//!
//! A schema pairs a topic sequencer with weighted slide generators. For each
//! deck position the selector draws a generator by weight, runs it on the
//! position's context and keeps the slide if its content respects the
//! generator's repetition budget. Generators that come back empty are
//! excluded for that position and the draw is repeated among the rest; a
//! position nothing can fill is recorded as a gap.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::generator::{boxed, choose_weighted, BoxedGenerator, Generator};
use crate::topics::BoxedSequencer;
use crate::types::{mix_seed, Context, Presentation, Slide, SlideGap};
use crate::weight::{constant, BoxedWeight};

/// How many times a generator is rerun at one position when its slide
/// repeats content beyond its budget.
pub const MAX_REPETITION_RETRIES: usize = 3;

/// Creates the empty deck for a topic and presenter.
pub type DeckFactory = fn(&str, &str) -> Presentation;

/// Deck factory producing an empty deck with just the topic and presenter.
pub fn plain_deck(topic: &str, presenter: &str) -> Presentation {
    Presentation::new(topic, presenter)
}

/// One weighted slide generator in a schema.
#[derive(Clone)]
pub struct SlideGenerator {
    name: String,
    content: BoxedGenerator<Slide>,
    weight: BoxedWeight,
    allowed_repeated_elements: Option<usize>,
}

impl SlideGenerator {
    /// A generator with constant weight 1 and no repetition limit.
    pub fn new<G>(name: &str, content: G) -> Self
    where
        G: Generator<Slide> + 'static,
    {
        Self {
            name: name.to_string(),
            content: boxed(content),
            weight: constant(1.0),
            allowed_repeated_elements: None,
        }
    }

    pub fn with_weight(mut self, weight: BoxedWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Allow each content value of this generator's slides to appear at
    /// most `allowed + 1` times in the deck.
    pub fn with_allowed_repeated_elements(mut self, allowed: usize) -> Self {
        self.allowed_repeated_elements = Some(allowed);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allowed_repeated_elements(&self) -> Option<usize> {
        self.allowed_repeated_elements
    }

    /// Selection weight at `position`, with invalid values read as zero.
    pub fn weight_at(&self, position: usize) -> f64 {
        let weight = self.weight.weight(position);
        if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        }
    }
}

/// Content values already in the deck and the tightest budget claiming each.
///
/// A value produced by a budgeted generator stays bound by that budget no
/// matter which generator would repeat it next.
#[derive(Debug, Default)]
struct BudgetLedger {
    used: HashMap<String, usize>,
    claims: HashMap<String, usize>,
}

impl BudgetLedger {
    fn slide_counts(slide: &Slide) -> HashMap<String, usize> {
        let mut on_slide: HashMap<String, usize> = HashMap::new();
        for content in slide.contents() {
            *on_slide.entry(content.key()).or_insert(0) += 1;
        }
        on_slide
    }

    /// Whether a slide from a generator with budget `allowed` keeps every
    /// content value within the budgets that apply to it.
    fn admits(&self, slide: &Slide, allowed: Option<usize>) -> bool {
        Self::slide_counts(slide).iter().all(|(key, count)| {
            let limit = match (allowed, self.claims.get(key).copied()) {
                (Some(a), Some(c)) => a.min(c),
                (Some(a), None) => a,
                (None, Some(c)) => c,
                (None, None) => return true,
            };
            self.used.get(key).copied().unwrap_or(0) + count <= limit + 1
        })
    }

    fn record(&mut self, slide: &Slide, allowed: Option<usize>) {
        for (key, count) in Self::slide_counts(slide) {
            *self.used.entry(key.clone()).or_insert(0) += count;
            if let Some(allowed) = allowed {
                let claim = self.claims.entry(key).or_insert(allowed);
                *claim = (*claim).min(allowed);
            }
        }
    }
}

/// Everything needed to generate one kind of talk.
#[derive(Clone)]
pub struct PresentationSchema {
    deck_factory: DeckFactory,
    topic_sequencer: BoxedSequencer,
    entries: Vec<SlideGenerator>,
}

impl PresentationSchema {
    pub fn new(deck_factory: DeckFactory, topic_sequencer: BoxedSequencer, entries: Vec<SlideGenerator>) -> Self {
        Self {
            deck_factory,
            topic_sequencer,
            entries,
        }
    }

    pub fn entries(&self) -> &[SlideGenerator] {
        &self.entries
    }

    /// Generate a talk of `num_slides` positions.
    ///
    /// The same topic, slide count and presenter give the same deck as long
    /// as the sources answer the same way.
    pub fn generate_presentation(&self, topic: &str, num_slides: usize, presenter: &str) -> Result<Presentation> {
        self.generate(topic, num_slides, presenter, None)
    }

    /// Like [`generate_presentation`](Self::generate_presentation), with an
    /// extra seed mixed into every random choice.
    pub fn generate_presentation_with_seed(
        &self,
        topic: &str,
        num_slides: usize,
        presenter: &str,
        seed: u64,
    ) -> Result<Presentation> {
        self.generate(topic, num_slides, presenter, Some(seed))
    }

    fn generate(&self, topic: &str, num_slides: usize, presenter: &str, seed: Option<u64>) -> Result<Presentation> {
        if num_slides == 0 {
            return Err(Error::InvalidSlideCount(num_slides));
        }

        log::info!("Generating {} slide talk on: {}", num_slides, topic);

        let mut presentation = (self.deck_factory)(topic, presenter);
        let topics = self.topic_sequencer.sequence(topic, num_slides);
        log::debug!("Slide topics: {:?}", topics);

        let mut rng = StdRng::seed_from_u64(mix_seed(seed.unwrap_or(0), topic));
        let mut ledger = BudgetLedger::default();

        for (index, slide_topic) in topics.iter().enumerate().take(num_slides) {
            let mut ctx = Context::new(slide_topic.as_str(), index, presenter);
            if let Some(seed) = seed {
                ctx = ctx.reseeded(seed);
            }

            match self.fill_position(&ctx, &ledger, &mut rng) {
                Ok((slide, allowed)) => {
                    ledger.record(&slide, allowed);
                    log::info!("Slide {}: {}", index, slide.generator);
                    presentation.add_slide(slide);
                }
                Err(gap) => {
                    log::warn!("No slide generator could fill position {}", index);
                    presentation.add_gap(gap);
                }
            }
        }

        // A sequencer that returned too few topics leaves the rest as gaps.
        for index in presentation.positions()..num_slides {
            presentation.add_gap(SlideGap {
                index,
                attempted: Vec::new(),
            });
        }

        Ok(presentation)
    }

    /// Pick and run generators for one position until one yields a slide.
    fn fill_position(
        &self,
        ctx: &Context,
        ledger: &BudgetLedger,
        rng: &mut StdRng,
    ) -> std::result::Result<(Slide, Option<usize>), SlideGap> {
        let index = ctx.slide_index();
        let mut weights: Vec<f64> = self.entries.iter().map(|e| e.weight_at(index)).collect();
        let mut attempted = Vec::new();

        while let Some(choice) = choose_weighted(&weights, rng) {
            let entry = &self.entries[choice];
            attempted.push(entry.name.clone());
            log::debug!("Position {}: trying '{}'", index, entry.name);

            if let Some(mut slide) = self.run_entry(entry, ctx, ledger, rng) {
                slide.index = index;
                slide.generator = entry.name.clone();
                return Ok((slide, entry.allowed_repeated_elements));
            }

            weights[choice] = 0.0;
        }

        Err(SlideGap { index, attempted })
    }

    /// Run one generator, retrying on fresh seeds while its slide repeats
    /// content beyond a budget. Nothing when it yields nothing.
    fn run_entry(
        &self,
        entry: &SlideGenerator,
        ctx: &Context,
        ledger: &BudgetLedger,
        rng: &mut StdRng,
    ) -> Option<Slide> {
        for attempt in 0..=MAX_REPETITION_RETRIES {
            let attempt_ctx = if attempt == 0 {
                ctx.clone()
            } else {
                ctx.reseeded(attempt as u64)
            };

            let Some(slide) = entry.content.generate(&attempt_ctx, rng) else {
                log::debug!("'{}' produced nothing for position {}", entry.name, ctx.slide_index());
                return None;
            };

            if ledger.admits(&slide, entry.allowed_repeated_elements) {
                return Some(slide);
            }

            log::debug!(
                "'{}' repeated content at position {} (attempt {})",
                entry.name,
                ctx.slide_index(),
                attempt + 1
            );
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{from_fn, from_list, none, static_value};
    use crate::slides::{image_slide, large_quote_slide, title_slide};
    use crate::topics::IdentityTopics;
    use crate::weight::peaked;
    use rand::Rng;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn schema(entries: Vec<SlideGenerator>) -> PresentationSchema {
        PresentationSchema::new(plain_deck, Arc::new(IdentityTopics), entries)
    }

    fn statement(text: &str) -> SlideGenerator {
        SlideGenerator::new(text, large_quote_slide(static_value(text.to_string())))
    }

    fn random_statements() -> SlideGenerator {
        SlideGenerator::new(
            "Random",
            large_quote_slide(from_fn(|_ctx: &Context, rng: &mut StdRng| {
                Some(format!("statement {}", rng.gen::<u32>()))
            })),
        )
    }

    #[test]
    fn test_zero_slides_is_rejected() {
        let result = schema(vec![statement("a")]).generate_presentation("cat", 0, "Ada");
        assert!(matches!(result, Err(Error::InvalidSlideCount(0))));
    }

    #[test]
    fn test_exactly_n_positions() {
        let schema = schema(vec![random_statements()]);
        for n in [1, 2, 5, 17] {
            let deck = schema.generate_presentation("cat", n, "Ada").unwrap();
            assert_eq!(deck.positions(), n);
            assert_eq!(deck.slides.len(), n);
        }
    }

    #[test]
    fn test_slides_are_indexed_and_named() {
        let deck = schema(vec![random_statements()])
            .generate_presentation("cat", 3, "Ada")
            .unwrap();
        for (i, slide) in deck.slides.iter().enumerate() {
            assert_eq!(slide.index, i);
            assert_eq!(slide.generator, "Random");
        }
        assert_eq!(deck.topic, "cat");
        assert_eq!(deck.presenter, "Ada");
    }

    #[test]
    fn test_unfillable_positions_become_gaps() {
        let broken = SlideGenerator::new("Broken", image_slide(static_value("x".to_string()), none()));
        let deck = schema(vec![broken]).generate_presentation("cat", 3, "Ada").unwrap();
        assert!(deck.slides.is_empty());
        assert_eq!(deck.gaps.len(), 3);
        assert_eq!(deck.gaps[1].index, 1);
        assert_eq!(deck.gaps[1].attempted, vec!["Broken"]);
    }

    #[test]
    fn test_empty_generator_is_reselected_away() {
        let broken = SlideGenerator::new("Broken", image_slide(none(), none())).with_weight(constant(1000.0));
        let deck = schema(vec![broken, random_statements()])
            .generate_presentation("cat", 4, "Ada")
            .unwrap();
        assert!(deck.is_complete());
        assert!(deck.slides.iter().all(|s| s.generator == "Random"));
    }

    #[test]
    fn test_zero_weight_is_never_selected() {
        let title = SlideGenerator::new("Title", title_slide(static_value("T".to_string()), none()))
            .with_weight(peaked(&[0], 100.0, 0.0));
        let deck = schema(vec![title, random_statements()])
            .generate_presentation("cat", 6, "Ada")
            .unwrap();
        assert!(deck.slides[1..].iter().all(|s| s.generator == "Random"));
    }

    #[test]
    fn test_dominant_weight_wins_position() {
        let title = SlideGenerator::new("Title", title_slide(static_value("T".to_string()), none()))
            .with_weight(peaked(&[0], 100_000.0, 0.0));
        let deck = schema(vec![random_statements(), title])
            .generate_presentation("cat", 3, "Ada")
            .unwrap();
        assert_eq!(deck.slides[0].generator, "Title");
    }

    #[test]
    fn test_repetition_budget_bounds_occurrences() {
        for allowed in 0..3 {
            let same_image = SlideGenerator::new(
                "Same",
                image_slide(none(), static_value(PathBuf::from("same.jpg"))),
            )
            .with_weight(constant(100.0))
            .with_allowed_repeated_elements(allowed);

            let deck = schema(vec![same_image, random_statements()])
                .generate_presentation("cat", 8, "Ada")
                .unwrap();
            let occurrences = deck.slides.iter().filter(|s| s.generator == "Same").count();
            assert_eq!(occurrences, allowed + 1);
            assert_eq!(deck.positions(), 8);
        }
    }

    #[test]
    fn test_unlimited_repetition_by_default() {
        let deck = schema(vec![statement("again")])
            .generate_presentation("cat", 4, "Ada")
            .unwrap();
        assert_eq!(deck.slides.len(), 4);
    }

    #[test]
    fn test_repetition_retry_finds_fresh_content() {
        let images = from_list(static_value(vec![
            PathBuf::from("a.jpg"),
            PathBuf::from("b.jpg"),
            PathBuf::from("c.jpg"),
            PathBuf::from("d.jpg"),
        ]));
        let entry = SlideGenerator::new("Pictures", image_slide(none(), images)).with_allowed_repeated_elements(0);
        let deck = schema(vec![entry]).generate_presentation("cat", 2, "Ada").unwrap();

        let mut seen: Vec<_> = deck.slides.iter().flat_map(|s| s.images()).collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn test_generation_is_reproducible() {
        let schema = schema(vec![random_statements(), statement("fixed")]);
        let first = schema.generate_presentation("cat", 6, "Ada").unwrap();
        let second = schema.generate_presentation("cat", 6, "Ada").unwrap();
        assert_eq!(first, second);

        let reseeded = schema.generate_presentation_with_seed("cat", 6, "Ada", 9).unwrap();
        assert_eq!(reseeded.positions(), 6);
    }

    #[test]
    fn test_budget_counts_duplicates_within_one_slide() {
        let entry = SlideGenerator::new("Same", image_slide(none(), static_value(PathBuf::from("a.jpg"))))
            .with_allowed_repeated_elements(0);
        let mut slide = Slide::new(crate::types::SlideLayout::TwoColumn);
        slide.add_column(None, Some(crate::types::SlideContent::Text("x".to_string())));
        slide.add_column(None, Some(crate::types::SlideContent::Text("x".to_string())));
        assert!(!BudgetLedger::default().admits(&slide, entry.allowed_repeated_elements()));
        assert!(BudgetLedger::default().admits(&slide, None));
    }

    #[test]
    fn test_budget_binds_values_reused_by_unlimited_generator() {
        let budgeted = SlideGenerator::new("Budgeted", image_slide(none(), static_value(PathBuf::from("x.jpg"))))
            .with_weight(peaked(&[0], 1.0, 0.0))
            .with_allowed_repeated_elements(0);
        let unlimited = SlideGenerator::new("Unlimited", image_slide(none(), static_value(PathBuf::from("x.jpg"))))
            .with_weight(peaked(&[1, 2], 1.0, 0.0));

        let deck = schema(vec![budgeted, unlimited])
            .generate_presentation("cat", 3, "Ada")
            .unwrap();

        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].generator, "Budgeted");
        assert_eq!(deck.gaps.len(), 2);
        assert_eq!(deck.gaps[0].attempted, vec!["Unlimited"]);
    }

    #[test]
    fn test_ledger_keeps_tightest_claim() {
        let mut slide = Slide::new(crate::types::SlideLayout::Image);
        slide.add_column(None, Some(crate::types::SlideContent::Image(PathBuf::from("x.jpg"))));

        let mut ledger = BudgetLedger::default();
        ledger.record(&slide, Some(2));
        ledger.record(&slide, Some(1));
        assert!(!ledger.admits(&slide, None));
        assert!(!ledger.admits(&slide, Some(5)));

        let mut loose = BudgetLedger::default();
        loose.record(&slide, None);
        loose.record(&slide, None);
        assert!(loose.admits(&slide, None));
        assert!(!loose.admits(&slide, Some(1)));
    }
}
