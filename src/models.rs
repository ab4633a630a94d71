mod backend;
mod document;
mod ids;
mod suggestion;
mod tag;

pub use backend::Backend;
pub use document::Document;
pub use ids::{DocumentId, TagId};
pub use suggestion::{SuggestionSource, TagSuggestion};
pub use tag::TagRecord;
