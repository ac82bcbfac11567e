//! praisedeck - assemble the weekly service deck from legacy PowerPoint files
//!
//! The crate reads and writes PowerPoint 97-2003 (`.ppt`) decks and implements one
//! fixed composition pipeline: keep the first slide of a title deck, append a
//! transformed slide for every slide of each song deck, append the bundled
//! announcements deck, and save the result under the date of the next service.
//!
//! # Example - building a deck by hand
//!
//! ```no_run
//! use praisedeck::compose::{append_song_slides, retain_title_slide};
//! use praisedeck::ppt;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut deck = ppt::load("title.ppt")?;
//! retain_title_slide(&mut deck);
//! append_song_slides(&mut deck, ppt::load("amazing_grace.ppt")?);
//! deck.save("service.ppt")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - running the whole pipeline
//!
//! ```no_run
//! use praisedeck::{Pipeline, PipelineConfig, Request};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = Request::new("decks/title.ppt", vec!["decks/song1.ppt".into()]);
//! let output = Pipeline::new(PipelineConfig::default()).run(&request)?;
//! println!("Successfully created {}", output.display());
//! # Ok(())
//! # }
//! ```

pub mod common;

/// OLE2 compound file reader and writer
pub mod ole;

/// PowerPoint binary record format: decoding into and encoding from the deck model
pub mod ppt;

pub mod deck;

pub mod compose;
pub mod config;
pub mod naming;
pub mod pipeline;
pub mod store;

pub use common::{Error, Result};
pub use config::PipelineConfig;
pub use deck::{
    AutoShape, Color, Fill, FillType, GenericShape, Presentation, Shape, ShapeKind, Slide,
    TextRun, TextShape, TextType,
};
pub use naming::{Clock, FixedClock, SystemClock};
pub use pipeline::{Pipeline, Request};
pub use store::{FileStore, LocalStore, Staging};
