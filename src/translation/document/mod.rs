/*!
 * Document model for extracted translation units.
 *
 * - `model`: units, produced text and the final translation map
 * - `corpus`: loading extractor output into documents and corpora
 */

pub mod corpus;
pub mod model;

pub use corpus::{Corpus, Document, parse_blocks, parse_units};
pub use model::{Origin, RenderedText, TranslationMap, TranslationUnit};
