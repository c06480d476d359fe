//! Slide templates: generators that assemble a [`Slide`] from element
//! generators.
//!
//! Body elements (images, quotes, statements) are mandatory: when one comes
//! back empty the whole slide is empty and the selector moves on. Titles,
//! subtitles and captions are optional and simply left out.
//!
//! Each column is generated on its own reseeded context, so one seeded
//! generator used for two columns draws twice instead of repeating itself.

use rand::rngs::StdRng;
use std::path::PathBuf;

use crate::generator::{boxed, from_fn, map, none, BoxedGenerator, Generator};
use crate::types::{Context, Slide, SlideContent, SlideLayout};

/// Caption and content generators for one slide column.
#[derive(Clone)]
pub struct ColumnGenerator {
    caption: BoxedGenerator<String>,
    content: BoxedGenerator<SlideContent>,
}

impl ColumnGenerator {
    fn generate(&self, ctx: &Context, rng: &mut StdRng) -> Option<(Option<String>, SlideContent)> {
        let content = self.content.generate(ctx, rng)?;
        let caption = self.caption.generate(ctx, rng);
        Some((caption, content))
    }
}

/// A column with an image body.
pub fn image_column<C, I>(caption: C, image: I) -> ColumnGenerator
where
    C: Generator<String> + 'static,
    I: Generator<PathBuf> + 'static,
{
    ColumnGenerator {
        caption: boxed(caption),
        content: boxed(map(image, SlideContent::Image)),
    }
}

/// A column with a text body.
pub fn text_column<C, T>(caption: C, text: T) -> ColumnGenerator
where
    C: Generator<String> + 'static,
    T: Generator<String> + 'static,
{
    ColumnGenerator {
        caption: boxed(caption),
        content: boxed(map(text, SlideContent::Text)),
    }
}

fn column_context(ctx: &Context, column: usize) -> Context {
    ctx.reseeded(column as u64 + 1)
}

fn columns_slide(
    layout: SlideLayout,
    title: BoxedGenerator<String>,
    columns: Vec<ColumnGenerator>,
) -> impl Generator<Slide> {
    from_fn(move |ctx: &Context, rng: &mut StdRng| {
        let mut slide = Slide::new(layout);
        for (i, column) in columns.iter().enumerate() {
            let (caption, content) = column.generate(&column_context(ctx, i), rng)?;
            slide.add_column(caption, Some(content));
        }
        Some(slide.with_title(title.generate(ctx, rng)))
    })
}

/// Talk title with an optional subtitle. The title is mandatory.
pub fn title_slide<T, S>(title: T, subtitle: S) -> impl Generator<Slide>
where
    T: Generator<String> + 'static,
    S: Generator<String> + 'static,
{
    let (title, subtitle) = (boxed(title), boxed(subtitle));
    from_fn(move |ctx: &Context, rng: &mut StdRng| {
        let title = title.generate(ctx, rng)?;
        let subtitle = subtitle.generate(&ctx.with_var("title", title.clone()), rng);
        Some(
            Slide::new(SlideLayout::Title)
                .with_title(Some(title))
                .with_subtitle(subtitle),
        )
    })
}

/// A title above a single image.
pub fn image_slide<T, I>(title: T, image: I) -> impl Generator<Slide>
where
    T: Generator<String> + 'static,
    I: Generator<PathBuf> + 'static,
{
    columns_slide(
        SlideLayout::Image,
        boxed(title),
        vec![image_column(none(), image)],
    )
}

/// A single image filling the slide, with an optional title.
pub fn full_image_slide<T, I>(title: T, image: I) -> impl Generator<Slide>
where
    T: Generator<String> + 'static,
    I: Generator<PathBuf> + 'static,
{
    columns_slide(
        SlideLayout::FullImage,
        boxed(title),
        vec![image_column(none(), image)],
    )
}

/// One large statement.
pub fn large_quote_slide<T>(text: T) -> impl Generator<Slide>
where
    T: Generator<String> + 'static,
{
    columns_slide(
        SlideLayout::LargeQuote,
        boxed(none()),
        vec![text_column(none(), text)],
    )
}

/// A title over two captioned columns.
pub fn two_column_slide<T>(title: T, left: ColumnGenerator, right: ColumnGenerator) -> impl Generator<Slide>
where
    T: Generator<String> + 'static,
{
    columns_slide(SlideLayout::TwoColumn, boxed(title), vec![left, right])
}

/// A title over three captioned columns.
pub fn three_column_slide<T>(
    title: T,
    first: ColumnGenerator,
    second: ColumnGenerator,
    third: ColumnGenerator,
) -> impl Generator<Slide>
where
    T: Generator<String> + 'static,
{
    columns_slide(SlideLayout::ThreeColumn, boxed(title), vec![first, second, third])
}

/// Two image columns whose captions come from one paired draw, so the
/// captions belong together.
pub fn two_column_tuple_caption_slide<T, C, L, R>(title: T, captions: C, left: L, right: R) -> impl Generator<Slide>
where
    T: Generator<String> + 'static,
    C: Generator<(String, String)> + 'static,
    L: Generator<PathBuf> + 'static,
    R: Generator<PathBuf> + 'static,
{
    let (title, captions) = (boxed(title), boxed(captions));
    let (left, right) = (boxed(left), boxed(right));
    from_fn(move |ctx: &Context, rng: &mut StdRng| {
        let left_image = left.generate(&column_context(ctx, 0), rng)?;
        let right_image = right.generate(&column_context(ctx, 1), rng)?;
        let (left_caption, right_caption) = match captions.generate(ctx, rng) {
            Some((l, r)) => (Some(l), Some(r)),
            None => (None, None),
        };

        let mut slide = Slide::new(SlideLayout::TwoColumn).with_title(title.generate(ctx, rng));
        slide.add_column(left_caption, Some(SlideContent::Image(left_image)));
        slide.add_column(right_caption, Some(SlideContent::Image(right_image)));
        Some(slide)
    })
}
