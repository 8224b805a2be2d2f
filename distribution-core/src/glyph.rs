use distribution_common::{DistributionError, Result};

/// Eighth-width blocks, emptiest to fullest.
pub const PARTIAL_BLOCKS: [&str; 8] = ["▏", "▎", "▍", "▌", "▋", "▊", "▉", "█"];
/// Third-width lines, emptiest to fullest.
pub const PARTIAL_LINES: [&str; 3] = ["╸", "╾", "━"];

const BLOCK_UNIT: f32 = 0.125;
const LINE_UNIT: f32 = 0.3334;

/// The characters a bar is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphSet {
    /// One unit per character: `fill` repeated, then a single `cap`.
    Full { fill: String, cap: String },
    /// Sub-character resolution: the last palette glyph fills whole cells
    /// and one partial glyph covers the remainder.
    Partial { palette: &'static [&'static str], unit: f32 },
}

impl GlyphSet {
    /// Parses a glyph identifier: `pb`, `pl`, one of the named substitutions,
    /// or a literal. An ASCII literal of two or more characters is split into
    /// fill and cap (`=>` draws `==>`).
    pub fn parse(ident: &str) -> Result<Self> {
        let named = match ident {
            "" => return Err(DistributionError::InvalidOption("empty bar glyph".into())),
            "pb" => return Ok(Self::Partial { palette: &PARTIAL_BLOCKS, unit: BLOCK_UNIT }),
            "pl" => return Ok(Self::Partial { palette: &PARTIAL_LINES, unit: LINE_UNIT }),
            "ba" => Some("▬"),
            "bl" => Some("Ξ"),
            "em" => Some("—"),
            "me" => Some("⋯"),
            "di" => Some("♦"),
            "dt" => Some("•"),
            "sq" => Some("□"),
            _ => None,
        };
        if let Some(glyph) = named {
            return Ok(Self::uniform(glyph));
        }
        let mut chars = ident.chars();
        match (ident.is_ascii(), chars.next(), chars.next()) {
            (true, Some(fill), Some(cap)) => Ok(Self::Full {
                fill: fill.to_string(),
                cap: cap.to_string(),
            }),
            _ => Ok(Self::uniform(ident)),
        }
    }

    fn uniform(glyph: &str) -> Self {
        Self::Full { fill: glyph.to_owned(), cap: glyph.to_owned() }
    }

    /// Fraction of a character cell one glyph step represents.
    pub fn resolution(&self) -> f32 {
        match self {
            Self::Full { .. } => 1.0,
            Self::Partial { unit, .. } => *unit,
        }
    }
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self::uniform("-")
    }
}
