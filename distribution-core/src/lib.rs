pub mod glyph;
pub mod histogram;
pub mod pipeline;
pub mod rank;
pub mod summary;
pub mod table;
pub mod tokenizer;

pub use distribution_common::{DistributionError, Result, Settings};
pub use glyph::GlyphSet;
pub use histogram::{Histogram, RenderLayout, Scale};
pub use pipeline::run;
pub use rank::{rank, RankedEntry, Ranking};
pub use summary::RunSummary;
pub use table::FrequencyTable;
pub use tokenizer::{IngestStats, PrunePolicy, Tally, Tokenizer};
