//! HTML side of dissmon: a lenient markup tree, label → value queries, and
//! the Record Extractor and listing parser built on them.
//!
//! Everything here is synchronous and free of I/O; documents arrive as
//! strings from whatever [`dissmon_core::source::DocumentSource`] the caller
//! uses.
//!
//! ```no_run
//! use dissmon_core::{case::CaseId, extract::CaseExtractor};
//! use dissmon_markup::{HtmlExtractor, Lexicon};
//!
//! let extractor = HtmlExtractor::new(Lexicon::russian());
//! let id = CaseId::new("ivanov_ii").unwrap();
//! let draft = extractor.parse_case(&id, "<html>…</html>");
//! ```

pub mod dom;
pub mod error;
pub mod extract;
pub mod lexicon;
pub mod listing;
pub mod query;


pub use dom::Document;
pub use error::{Error, Result};
pub use extract::HtmlExtractor;
pub use lexicon::Lexicon;
pub use listing::parse_listing;
