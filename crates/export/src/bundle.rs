//! Deck bundle layout: a ZIP archive holding `deck.xml` and the slide media.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use talk_core::normalize::sanitize_component;
use talk_core::{Error, Presentation, Slide, SlideContent, SlideGap};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive entry holding the deck description.
pub const DECK_ENTRY: &str = "deck.xml";

/// Archive folder holding copied images.
pub const MEDIA_DIR: &str = "media";

/// Bundle format version written to `deck.xml`.
pub const FORMAT_VERSION: &str = "1";

type Result<T> = talk_core::Result<T>;

fn xml_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::XmlError(format!("{}: {}", context, e))
}

fn zip_error(e: zip::result::ZipError) -> Error {
    Error::ZipError(e.to_string())
}

/// Images of a deck and their names inside the archive.
#[derive(Debug, Default)]
pub struct MediaIndex {
    entries: Vec<(PathBuf, String)>,
    by_path: HashMap<PathBuf, usize>,
}

impl MediaIndex {
    /// Assign an archive name to every distinct image in `presentation`,
    /// in deck order.
    pub fn for_presentation(presentation: &Presentation) -> Self {
        let mut index = Self::default();
        for image in presentation.slides.iter().flat_map(Slide::images) {
            if index.by_path.contains_key(image) {
                continue;
            }
            let file_name = image
                .file_name()
                .map(|n| sanitize_component(&n.to_string_lossy()))
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "image".to_string());
            let name = format!("{}/{:03}-{}", MEDIA_DIR, index.entries.len() + 1, file_name);
            index.by_path.insert(image.to_path_buf(), index.entries.len());
            index.entries.push((image.to_path_buf(), name));
        }
        index
    }

    /// Archive name for a local image.
    pub fn name_of(&self, path: &Path) -> Option<&str> {
        self.by_path.get(path).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &(PathBuf, String)> {
        self.entries.iter()
    }
}

struct XmlOut {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>, context: &str) -> Result<()> {
        self.writer.write_event(event).map_err(|e| xml_error(context, e))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.event(Event::Start(BytesStart::new(name)), name)?;
        self.event(Event::Text(BytesText::new(text)), name)?;
        self.event(Event::End(BytesEnd::new(name)), name)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| xml_error("Invalid UTF-8 in generated XML", e))
    }
}

/// Describe `presentation` as XML, referring to images by their names in
/// `media`.
///
/// Images missing from `media` are written with their local path and a
/// `missing="true"` marker.
pub fn deck_xml(presentation: &Presentation, media: &MediaIndex) -> Result<String> {
    let mut out = XmlOut::new();
    out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)), "declaration")?;

    let mut deck = BytesStart::new("deck");
    deck.push_attribute(("version", FORMAT_VERSION));
    deck.push_attribute(("topic", presentation.topic.as_str()));
    deck.push_attribute(("presenter", presentation.presenter.as_str()));
    deck.push_attribute(("positions", presentation.positions().to_string().as_str()));
    out.event(Event::Start(deck), "deck")?;

    let mut gaps = presentation.gaps.iter().peekable();
    for slide in &presentation.slides {
        while let Some(gap) = gaps.next_if(|g| g.index < slide.index) {
            write_gap(&mut out, gap)?;
        }
        write_slide(&mut out, slide, media)?;
    }
    for gap in gaps {
        write_gap(&mut out, gap)?;
    }

    out.event(Event::End(BytesEnd::new("deck")), "deck")?;
    out.finish()
}

fn write_slide(out: &mut XmlOut, slide: &Slide, media: &MediaIndex) -> Result<()> {
    let mut start = BytesStart::new("slide");
    start.push_attribute(("index", slide.index.to_string().as_str()));
    start.push_attribute(("layout", slide.layout.as_str()));
    start.push_attribute(("generator", slide.generator.as_str()));
    out.event(Event::Start(start), "slide")?;

    if let Some(title) = &slide.title {
        out.text_element("title", title)?;
    }
    if let Some(subtitle) = &slide.subtitle {
        out.text_element("subtitle", subtitle)?;
    }

    for column in &slide.columns {
        out.event(Event::Start(BytesStart::new("column")), "column")?;
        if let Some(caption) = &column.caption {
            out.text_element("caption", caption)?;
        }
        match &column.content {
            Some(SlideContent::Text(text)) => out.text_element("text", text)?,
            Some(SlideContent::Image(path)) => {
                let mut image = BytesStart::new("image");
                match media.name_of(path) {
                    Some(name) => image.push_attribute(("src", name)),
                    None => {
                        let local = path.display().to_string();
                        image.push_attribute(("src", local.as_str()));
                        image.push_attribute(("missing", "true"));
                    }
                }
                out.event(Event::Empty(image), "image")?;
            }
            None => {}
        }
        out.event(Event::End(BytesEnd::new("column")), "column")?;
    }

    out.event(Event::End(BytesEnd::new("slide")), "slide")
}

fn write_gap(out: &mut XmlOut, gap: &SlideGap) -> Result<()> {
    let mut start = BytesStart::new("gap");
    start.push_attribute(("index", gap.index.to_string().as_str()));
    out.event(Event::Start(start), "gap")?;
    for name in &gap.attempted {
        out.text_element("attempted", name)?;
    }
    out.event(Event::End(BytesEnd::new("gap")), "gap")
}

/// Write the whole bundle for `presentation` into `writer`.
///
/// Images that cannot be read are left out of the archive and marked
/// missing in `deck.xml`.
pub fn write_bundle<W: Write + Seek>(presentation: &Presentation, writer: W) -> Result<()> {
    let candidates = MediaIndex::for_presentation(presentation);

    let mut media = MediaIndex::default();
    let mut blobs: Vec<(String, Vec<u8>)> = Vec::new();
    for (path, name) in candidates.iter() {
        match fs::read(path) {
            Ok(bytes) => {
                media.by_path.insert(path.clone(), media.entries.len());
                media.entries.push((path.clone(), name.clone()));
                blobs.push((name.clone(), bytes));
            }
            Err(e) => log::warn!("Leaving out image {}: {}", path.display(), e),
        }
    }

    let xml = deck_xml(presentation, &media)?;

    let mut zip = ZipWriter::new(writer);
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);
    // Images are already compressed.
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file(DECK_ENTRY, deflated).map_err(zip_error)?;
    zip.write_all(xml.as_bytes())?;

    for (name, bytes) in &blobs {
        zip.start_file(name.as_str(), stored).map_err(zip_error)?;
        zip.write_all(bytes)?;
    }

    zip.finish().map_err(zip_error)?;
    log::debug!("Wrote deck bundle with {} media files", blobs.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use std::io::Read;
    use talk_core::SlideLayout;
    use zip::ZipArchive;

    fn deck(image: &Path) -> Presentation {
        let mut deck = Presentation::new("cats & dogs", "Ada <Lovelace>");

        let mut title = Slide::new(SlideLayout::Title).with_title(Some("Cats & Dogs".to_string()));
        title.generator = "Title slide".to_string();
        deck.add_slide(title);

        deck.add_gap(SlideGap {
            index: 1,
            attempted: vec!["Inspirobot".to_string()],
        });

        let mut pictures = Slide::new(SlideLayout::TwoColumn);
        pictures.index = 2;
        pictures.add_column(Some("Left".to_string()), Some(SlideContent::Image(image.to_path_buf())));
        pictures.add_column(None, Some(SlideContent::Image(image.to_path_buf())));
        deck.add_slide(pictures);

        deck
    }

    /// Element names in document order.
    fn element_names(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut names = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    names.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                }
                Ok(Event::Eof) => break,
                Err(e) => panic!("invalid xml: {}", e),
                _ => {}
            }
        }
        names
    }

    #[test]
    fn test_media_index_dedups_images() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("photo one.jpg");
        let media = MediaIndex::for_presentation(&deck(&image));
        assert_eq!(media.len(), 1);
        assert_eq!(media.name_of(&image), Some("media/001-photo_one.jpg"));
    }

    #[test]
    fn test_deck_xml_orders_slides_and_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        let presentation = deck(&image);
        let xml = deck_xml(&presentation, &MediaIndex::for_presentation(&presentation)).unwrap();

        assert_eq!(
            element_names(&xml),
            vec!["deck", "slide", "title", "gap", "attempted", "slide", "column", "caption", "image", "column", "image"]
        );
        assert!(xml.contains("topic=\"cats &amp; dogs\""));
        assert!(xml.contains("Ada &lt;Lovelace&gt;"));
        assert!(xml.contains("<title>Cats &amp; Dogs</title>"));
        assert!(xml.contains("src=\"media/001-a.jpg\""));
    }

    #[test]
    fn test_bundle_contains_deck_and_media() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        fs::write(&image, b"jpeg bytes").unwrap();

        let mut buffer = Cursor::new(Vec::new());
        write_bundle(&deck(&image), &mut buffer).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["deck.xml", "media/001-a.jpg"]);

        let mut media = String::new();
        archive
            .by_name("media/001-a.jpg")
            .unwrap()
            .read_to_string(&mut media)
            .unwrap();
        assert_eq!(media, "jpeg bytes");
    }

    #[test]
    fn test_missing_image_is_marked() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("gone.jpg");

        let mut buffer = Cursor::new(Vec::new());
        write_bundle(&deck(&image), &mut buffer).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        assert_eq!(archive.len(), 1);
        let mut xml = String::new();
        archive.by_name(DECK_ENTRY).unwrap().read_to_string(&mut xml).unwrap();
        assert!(xml.contains("missing=\"true\""));
    }
}
