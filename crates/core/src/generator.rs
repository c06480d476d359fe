//! Content generators and the combinators that compose them.
//!
//! A [`Generator`] turns a slide [`Context`] into a value, or into nothing
//! when its data is unavailable. Absence is never an error: a search with no
//! results, a failed download and a corrupt image all come back as `None`,
//! and the combinators in this module decide what to do about it.
//!
//! Randomness is threaded through as a [`StdRng`] so that one deck built from
//! one selector seed is reproducible. [`seeded`] swaps that stream for one
//! derived from the context seed, which pins a generator to its topic and
//! slide position regardless of what ran before it.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::DownloadCache;
use crate::normalize::title_case;
use crate::types::{mix_seed, Context};

/// Something that produces a value for a slide, or nothing.
pub trait Generator<T>: Send + Sync {
    /// Produce a value for `ctx`, drawing any randomness from `rng`.
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<T>;
}

/// Shared, type-erased generator.
pub type BoxedGenerator<T> = Arc<dyn Generator<T>>;

impl<T> Generator<T> for Arc<dyn Generator<T>> {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<T> {
        (**self).generate(ctx, rng)
    }
}

/// Erase a generator's concrete type.
pub fn boxed<T, G>(generator: G) -> BoxedGenerator<T>
where
    G: Generator<T> + 'static,
{
    Arc::new(generator)
}

/// Pick an index according to relative weights.
///
/// Negative and non-finite weights count as zero. Zero-weight entries are
/// never picked; returns `None` when nothing has positive weight. Weights
/// whose total overflows are scaled down first.
pub fn choose_weighted(weights: &[f64], rng: &mut StdRng) -> Option<usize> {
    let mut cleaned: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    if !cleaned.iter().sum::<f64>().is_finite() {
        let largest = cleaned.iter().copied().fold(0.0, f64::max);
        cleaned.iter_mut().for_each(|w| *w /= largest);
    }
    let distribution = WeightedIndex::new(&cleaned).ok()?;
    Some(distribution.sample(rng))
}

/// Generator backed by a closure.
pub struct FnGenerator<T, F> {
    f: F,
    _output: PhantomData<fn() -> T>,
}

impl<T, F> Generator<T> for FnGenerator<T, F>
where
    F: Fn(&Context, &mut StdRng) -> Option<T> + Send + Sync,
{
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<T> {
        (self.f)(ctx, rng)
    }
}

/// Wrap a closure as a generator.
pub fn from_fn<T, F>(f: F) -> FnGenerator<T, F>
where
    F: Fn(&Context, &mut StdRng) -> Option<T> + Send + Sync,
{
    FnGenerator {
        f,
        _output: PhantomData,
    }
}

/// Always yields the same value.
#[derive(Debug, Clone)]
pub struct Static<T> {
    value: T,
}

impl<T: Clone + Send + Sync> Generator<T> for Static<T> {
    fn generate(&self, _ctx: &Context, _rng: &mut StdRng) -> Option<T> {
        Some(self.value.clone())
    }
}

pub fn static_value<T: Clone + Send + Sync>(value: T) -> Static<T> {
    Static { value }
}

/// Always yields nothing. Used for optional slide elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nothing;

impl<T> Generator<T> for Nothing {
    fn generate(&self, _ctx: &Context, _rng: &mut StdRng) -> Option<T> {
        None
    }
}

pub fn none() -> Nothing {
    Nothing
}

/// Runs the inner generator on randomness derived from the context seed.
pub struct Seeded<T> {
    salt: u64,
    inner: BoxedGenerator<T>,
}

impl<T> Generator<T> for Seeded<T> {
    fn generate(&self, ctx: &Context, _rng: &mut StdRng) -> Option<T> {
        let mut seeded_rng = StdRng::seed_from_u64(mix_seed(ctx.seed(), self.salt));
        self.inner.generate(ctx, &mut seeded_rng)
    }
}

/// Pin `inner` to the context seed: same topic and position, same result.
pub fn seeded<T, G>(inner: G) -> Seeded<T>
where
    G: Generator<T> + 'static,
{
    seeded_with(0, inner)
}

/// Like [`seeded`], with a salt so sibling generators do not share a stream.
pub fn seeded_with<T, G>(salt: u64, inner: G) -> Seeded<T>
where
    G: Generator<T> + 'static,
{
    Seeded {
        salt,
        inner: boxed(inner),
    }
}

/// Picks one element uniformly from a list produced by another generator.
pub struct FromList<T> {
    candidates: BoxedGenerator<Vec<T>>,
}

impl<T> Generator<T> for FromList<T> {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<T> {
        let mut candidates = self.candidates.generate(ctx, rng)?;
        if candidates.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..candidates.len());
        Some(candidates.swap_remove(index))
    }
}

pub fn from_list<T, G>(candidates: G) -> FromList<T>
where
    G: Generator<Vec<T>> + 'static,
{
    FromList {
        candidates: boxed(candidates),
    }
}

/// Maps a remote locator to its cache identifier.
pub type CacheKeyFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Picks one remote locator from a list and materializes it through the
/// download cache, yielding the local path.
pub struct FromExternalList {
    candidates: BoxedGenerator<Vec<String>>,
    cache: Arc<DownloadCache>,
    key: CacheKeyFn,
}

impl Generator<PathBuf> for FromExternalList {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<PathBuf> {
        let candidates = self.candidates.generate(ctx, rng)?;
        if candidates.is_empty() {
            return None;
        }
        let locator = &candidates[rng.gen_range(0..candidates.len())];
        let Some(key) = (self.key)(locator) else {
            log::debug!("No cache key for locator {}", locator);
            return None;
        };
        self.cache.fetch(&key, locator)
    }
}

pub fn from_external_list<G, K>(candidates: G, cache: Arc<DownloadCache>, key: K) -> FromExternalList
where
    G: Generator<Vec<String>> + 'static,
    K: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    FromExternalList {
        candidates: boxed(candidates),
        cache,
        key: Arc::new(key),
    }
}

/// Validity check applied to generated values.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Discards values that fail a validity check.
pub struct Filtered<T> {
    inner: BoxedGenerator<T>,
    predicate: Predicate<T>,
}

impl<T> Generator<T> for Filtered<T> {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<T> {
        self.inner.generate(ctx, rng).filter(|value| (self.predicate)(value))
    }
}

pub fn filtered<T, G, P>(inner: G, predicate: P) -> Filtered<T>
where
    G: Generator<T> + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Filtered {
        inner: boxed(inner),
        predicate: Arc::new(predicate),
    }
}

/// Drops invalid elements from a generated list; nothing when none survive.
pub struct Retain<T> {
    inner: BoxedGenerator<Vec<T>>,
    predicate: Predicate<T>,
}

impl<T> Generator<Vec<T>> for Retain<T> {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<Vec<T>> {
        let mut values = self.inner.generate(ctx, rng)?;
        values.retain(|value| (self.predicate)(value));
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }
}

pub fn retain<T, G, P>(inner: G, predicate: P) -> Retain<T>
where
    G: Generator<Vec<T>> + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    Retain {
        inner: boxed(inner),
        predicate: Arc::new(predicate),
    }
}

/// Tries `primary`; when it yields nothing, asks `secondary` with a detached
/// context so the fallback is not tied to the draw that just failed.
pub struct Backup<T> {
    primary: BoxedGenerator<T>,
    secondary: BoxedGenerator<T>,
}

impl<T> Generator<T> for Backup<T> {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<T> {
        if let Some(value) = self.primary.generate(ctx, rng) {
            return Some(value);
        }
        log::debug!("Primary generator empty for slide {}, using backup", ctx.slide_index());
        self.secondary.generate(&ctx.detached(), rng)
    }
}

pub fn backup<T, P, S>(primary: P, secondary: S) -> Backup<T>
where
    P: Generator<T> + 'static,
    S: Generator<T> + 'static,
{
    Backup {
        primary: boxed(primary),
        secondary: boxed(secondary),
    }
}

/// Picks one of several generators by relative weight and delegates to it.
pub struct Combined<T> {
    weights: Vec<f64>,
    generators: Vec<BoxedGenerator<T>>,
}

impl<T> Generator<T> for Combined<T> {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<T> {
        let index = choose_weighted(&self.weights, rng)?;
        self.generators[index].generate(ctx, rng)
    }
}

pub fn combined<T>(entries: Vec<(f64, BoxedGenerator<T>)>) -> Combined<T> {
    let (weights, generators) = entries.into_iter().unzip();
    Combined { weights, generators }
}

/// Splits one drawn value into a consistent pair.
pub struct InspiredTuple<T, A, B> {
    inner: BoxedGenerator<T>,
    split: Arc<dyn Fn(T) -> Option<(A, B)> + Send + Sync>,
}

impl<T, A, B> Generator<(A, B)> for InspiredTuple<T, A, B> {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<(A, B)> {
        self.inner.generate(ctx, rng).and_then(|value| (self.split)(value))
    }
}

pub fn inspired_tuple<T, A, B, G, S>(inner: G, split: S) -> InspiredTuple<T, A, B>
where
    G: Generator<T> + 'static,
    S: Fn(T) -> Option<(A, B)> + Send + Sync + 'static,
{
    InspiredTuple {
        inner: boxed(inner),
        split: Arc::new(split),
    }
}

/// Split a generated line on `delimiter` into two non-empty halves.
pub fn split_pair<G>(inner: G, delimiter: char) -> InspiredTuple<String, String, String>
where
    G: Generator<String> + 'static,
{
    inspired_tuple(inner, move |line: String| {
        let (left, right) = line.split_once(delimiter)?;
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() || right.is_empty() {
            None
        } else {
            Some((left.to_string(), right.to_string()))
        }
    })
}

/// Transforms generated values.
pub struct Map<T, U> {
    inner: BoxedGenerator<T>,
    f: Arc<dyn Fn(T) -> U + Send + Sync>,
}

impl<T, U> Generator<U> for Map<T, U> {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<U> {
        self.inner.generate(ctx, rng).map(|value| (self.f)(value))
    }
}

pub fn map<T, U, G, F>(inner: G, f: F) -> Map<T, U>
where
    G: Generator<T> + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    Map {
        inner: boxed(inner),
        f: Arc::new(f),
    }
}

/// The slide topic in title case; nothing for an empty topic.
pub fn titled_identity() -> impl Generator<String> {
    from_fn(|ctx: &Context, _rng: &mut StdRng| {
        let title = title_case(ctx.topic());
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx(topic: &str, index: usize) -> Context {
        Context::new(topic, index, "Ada Lovelace")
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Echoes the context topic and seed so tests can see which context ran.
    fn echo() -> BoxedGenerator<String> {
        boxed(from_fn(|ctx: &Context, _rng: &mut StdRng| {
            Some(format!("{}#{}", ctx.topic(), ctx.seed()))
        }))
    }

    fn numbers(values: Vec<u32>) -> BoxedGenerator<Vec<u32>> {
        boxed(from_fn(move |_ctx: &Context, _rng: &mut StdRng| Some(values.clone())))
    }

    #[test]
    fn test_static_ignores_context() {
        let generator = static_value("downloads/inspirobot/01-743.jpg".to_string());
        assert_eq!(
            generator.generate(&ctx("cat", 0), &mut rng()),
            generator.generate(&ctx("dog", 5), &mut rng())
        );
    }

    #[test]
    fn test_none_is_empty() {
        let generator: Nothing = none();
        let value: Option<String> = generator.generate(&ctx("cat", 0), &mut rng());
        assert_eq!(value, None);
    }

    #[test]
    fn test_from_list_empty_list_is_empty() {
        let generator = from_list(numbers(Vec::new()));
        assert_eq!(generator.generate(&ctx("cat", 0), &mut rng()), None);
    }

    #[test]
    fn test_from_list_picks_a_candidate() {
        let generator = from_list(numbers(vec![1, 2, 3]));
        let mut rng = rng();
        for _ in 0..50 {
            let value = generator.generate(&ctx("cat", 0), &mut rng).unwrap();
            assert!([1, 2, 3].contains(&value));
        }
    }

    #[test]
    fn test_from_list_covers_all_candidates() {
        let generator = from_list(numbers(vec![1, 2, 3]));
        let mut rng = rng();
        let mut seen = [false; 3];
        for _ in 0..200 {
            let value = generator.generate(&ctx("cat", 0), &mut rng).unwrap();
            seen[value as usize - 1] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_seeded_is_reproducible_per_position() {
        let generator = seeded(from_list(numbers((0..1000).collect())));
        let first = generator.generate(&ctx("cat", 2), &mut StdRng::seed_from_u64(1));
        let second = generator.generate(&ctx("cat", 2), &mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_diverges_across_positions() {
        let generator = seeded(from_list(numbers((0..100_000).collect())));
        let values: Vec<Option<u32>> = (0..5)
            .map(|i| generator.generate(&ctx("cat", i), &mut rng()))
            .collect();
        let mut distinct = values.clone();
        distinct.sort();
        distinct.dedup();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_filtered_discards_invalid() {
        let even = filtered(static_value(3u32), |v: &u32| v % 2 == 0);
        assert_eq!(even.generate(&ctx("cat", 0), &mut rng()), None);

        let odd = filtered(static_value(3u32), |v: &u32| v % 2 == 1);
        assert_eq!(odd.generate(&ctx("cat", 0), &mut rng()), Some(3));
    }

    #[test]
    fn test_retain_empty_when_nothing_valid() {
        let generator = retain(numbers(vec![1, 3, 5]), |v: &u32| v % 2 == 0);
        assert_eq!(generator.generate(&ctx("cat", 0), &mut rng()), None);

        let generator = retain(numbers(vec![1, 2, 4]), |v: &u32| v % 2 == 0);
        assert_eq!(generator.generate(&ctx("cat", 0), &mut rng()), Some(vec![2, 4]));
    }

    #[test]
    fn test_backup_uses_primary_when_present() {
        let generator = backup(static_value("primary".to_string()), echo());
        assert_eq!(
            generator.generate(&ctx("cat", 0), &mut rng()),
            Some("primary".to_string())
        );
    }

    #[test]
    fn test_backup_equals_secondary_on_detached_context() {
        let context = ctx("cat", 4);
        let generator = backup(none(), echo());
        let expected = echo().generate(&context.detached(), &mut rng());
        assert_eq!(generator.generate(&context, &mut rng()), expected);
    }

    #[test]
    fn test_backup_does_not_call_secondary_when_primary_succeeds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let secondary = from_fn(move |_ctx: &Context, _rng: &mut StdRng| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(0u32)
        });
        let generator = backup(static_value(1u32), secondary);
        generator.generate(&ctx("cat", 0), &mut rng());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_combined_never_picks_zero_weight() {
        let generator = combined(vec![
            (0.0, boxed(static_value("never"))),
            (1.0, boxed(static_value("always"))),
        ]);
        let mut rng = rng();
        for _ in 0..500 {
            assert_eq!(generator.generate(&ctx("cat", 0), &mut rng), Some("always"));
        }
    }

    #[test]
    fn test_combined_all_zero_is_empty() {
        let generator = combined(vec![(0.0, boxed(static_value(1u32)))]);
        assert_eq!(generator.generate(&ctx("cat", 0), &mut rng()), None);
    }

    #[test]
    fn test_choose_weighted_converges_to_relative_weights() {
        let weights = [1.0, 2.0, 7.0, 0.0];
        let total: f64 = weights.iter().sum();
        let draws = 50_000;
        let mut counts = [0usize; 4];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..draws {
            counts[choose_weighted(&weights, &mut rng).unwrap()] += 1;
        }
        for (count, weight) in counts.iter().zip(weights) {
            let observed = *count as f64 / draws as f64;
            let expected = weight / total;
            assert!(
                (observed - expected).abs() < 0.01,
                "observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_choose_weighted_ignores_invalid_weights() {
        let mut rng = rng();
        assert_eq!(choose_weighted(&[], &mut rng), None);
        assert_eq!(choose_weighted(&[-1.0, f64::NAN], &mut rng), None);
        assert_eq!(choose_weighted(&[-1.0, f64::NAN, 2.0], &mut rng), Some(2));
    }

    #[test]
    fn test_choose_weighted_with_overflowing_total() {
        let mut rng = rng();
        let mut seen = [false; 2];
        for _ in 0..200 {
            seen[choose_weighted(&[f64::MAX, f64::MAX], &mut rng).unwrap()] = true;
        }
        assert_eq!(seen, [true, true]);
        assert_eq!(choose_weighted(&[f64::MAX, 0.0, f64::MAX / 2.0], &mut rng).map(|i| i != 1), Some(true));
    }

    #[test]
    fn test_split_pair_is_consistent() {
        let generator = split_pair(static_value("When I met you | When you met me".to_string()), '|');
        assert_eq!(
            generator.generate(&ctx("cat", 0), &mut rng()),
            Some(("When I met you".to_string(), "When you met me".to_string()))
        );
    }

    #[test]
    fn test_split_pair_without_delimiter_is_empty() {
        let generator = split_pair(static_value("no delimiter here".to_string()), '|');
        assert_eq!(generator.generate(&ctx("cat", 0), &mut rng()), None);

        let generator = split_pair(static_value("left only|".to_string()), '|');
        assert_eq!(generator.generate(&ctx("cat", 0), &mut rng()), None);
    }

    #[test]
    fn test_map_transforms_value() {
        let generator = map(static_value(21u32), |v| v * 2);
        assert_eq!(generator.generate(&ctx("cat", 0), &mut rng()), Some(42));
    }

    #[test]
    fn test_titled_identity() {
        let generator = titled_identity();
        assert_eq!(
            generator.generate(&ctx("black cat", 0), &mut rng()),
            Some("Black Cat".to_string())
        );
        assert_eq!(generator.generate(&ctx("", 0), &mut rng()), None);
    }
}
