use std::collections::HashMap;
use std::path::Path;

use super::{Shape, Slide};
use crate::common::Result;
use crate::ppt::document::DocumentTemplate;
use crate::ppt::pictures::PictureStore;

/// An in-memory deck: slides in order, the picture store, and the document-level
/// records the writer needs to produce a valid file.
#[derive(Debug, Clone)]
pub struct Presentation {
    slides: Vec<Slide>,
    pictures: PictureStore,
    pub(crate) document: DocumentTemplate,
}

impl Presentation {
    pub(crate) fn from_parts(
        slides: Vec<Slide>,
        pictures: PictureStore,
        document: DocumentTemplate,
    ) -> Self {
        Self {
            slides,
            pictures,
            document,
        }
    }

    /// A deck with one master and no slides.
    pub fn blank() -> Self {
        Self::from_parts(
            Vec::new(),
            PictureStore::new(),
            crate::ppt::skeleton::blank_document(),
        )
    }

    /// Decode a deck from the bytes of a `.ppt` file.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        crate::ppt::reader::read_presentation(data)
    }

    /// Encode the deck as the bytes of a `.ppt` file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        crate::ppt::writer::write_presentation(self)
    }

    /// Write the deck to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::ppt::save(self, path)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Append an empty slide and return it.
    pub fn create_slide(&mut self) -> &mut Slide {
        self.add_slide(Slide::new())
    }

    /// Append a slide and return it.
    pub fn add_slide(&mut self, slide: Slide) -> &mut Slide {
        self.slides.push(slide);
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    /// Remove and return the slide at `index`.
    pub fn remove_slide(&mut self, index: usize) -> Option<Slide> {
        (index < self.slides.len()).then(|| self.slides.remove(index))
    }

    pub fn pictures(&self) -> &PictureStore {
        &self.pictures
    }

    /// Split into slides and picture store, dropping the document records.
    pub fn into_parts(self) -> (Vec<Slide>, PictureStore) {
        (self.slides, self.pictures)
    }

    /// Point a shape coming from another deck at this deck's picture store.
    ///
    /// Every blip the shape (or a group member) references is copied from `source`,
    /// and the reference is rewritten. `imported` caches source index to local index
    /// across calls for the same source deck. References `source` cannot resolve are
    /// cleared.
    pub fn adopt_pictures(
        &mut self,
        shape: &mut Shape,
        source: &PictureStore,
        imported: &mut HashMap<u32, u32>,
    ) {
        let pictures = &mut self.pictures;
        shape.for_each_frame_mut(&mut |frame| {
            for blip in frame.properties.blip_refs_mut() {
                let local = match imported.get(blip) {
                    Some(&local) => Some(local),
                    None => {
                        let local = pictures.import(source, *blip);
                        if let Some(local) = local {
                            imported.insert(*blip, local);
                        }
                        local
                    },
                };
                match local {
                    Some(local) => *blip = local,
                    None => {
                        log::warn!("dropping reference to missing picture {}", *blip);
                        *blip = 0;
                    },
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::ShapeFrame;
    use crate::ppt::escher::prop_id;
    use crate::ppt::pictures::BlipEntry;

    fn entry(seed: u8) -> BlipEntry {
        BlipEntry {
            blip_type_win32: 5,
            blip_type_mac: 5,
            uid: [seed; 16],
            tag: 0xFF,
            ref_count: 1,
            name: Vec::new(),
            blip: vec![seed; 8],
        }
    }

    #[test]
    fn test_slide_list_operations() {
        let mut deck = Presentation::blank();
        assert_eq!(deck.slide_count(), 0);
        deck.create_slide().set_title("one");
        deck.create_slide().set_title("two");
        let removed = deck.remove_slide(0).expect("first slide");
        assert_eq!(removed.title(), Some("one"));
        assert!(deck.remove_slide(5).is_none());
        assert_eq!(deck.slide(0).and_then(Slide::title), Some("two"));
    }

    #[test]
    fn test_adopt_pictures_rebases_references() {
        let mut source = PictureStore::new();
        source.push(entry(1));
        source.push(entry(2));

        let mut deck = Presentation::blank();
        deck.pictures.push(entry(9));

        let mut frame = ShapeFrame::new(75);
        frame.properties.set(prop_id::PIB, 2);
        let mut shape = Shape::from_frame(frame, None, None);
        let mut imported = HashMap::new();
        deck.adopt_pictures(&mut shape, &source, &mut imported);

        assert_eq!(shape.frame().properties.get(prop_id::PIB), Some(2));
        assert_eq!(deck.pictures().len(), 2);
        assert_eq!(deck.pictures().get(2).map(|e| e.uid), Some([2; 16]));

        let mut missing = ShapeFrame::new(75);
        missing.properties.set(prop_id::PIB, 7);
        let mut shape = Shape::from_frame(missing, None, None);
        deck.adopt_pictures(&mut shape, &source, &mut imported);
        assert_eq!(shape.frame().properties.get(prop_id::PIB), Some(0));
    }
}
