use crate::glyph::GlyphSet;
use crate::rank::Ranking;
use distribution_common::{Colors, Result, Settings};
use std::io::{self, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Linear,
    /// Bars proportional to `ln(1 + count)`.
    Logarithmic,
}

/// Column geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderLayout {
    pub rows: usize,
    pub key_width: usize,
    pub count_width: usize,
    pub percent_width: usize,
    pub bar_width: usize,
    pub max_value: u64,
}

pub fn format_percent(pct: f64) -> String {
    format!("({pct:.2}%)")
}

pub fn rjust(s: &str, width: usize) -> String {
    format!("{s:>width$}")
}

pub fn ljust(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}

#[derive(Debug, Clone)]
pub struct Histogram {
    width: usize,
    height: usize,
    glyphs: GlyphSet,
    colors: Colors,
    scale: Scale,
}

impl Histogram {
    pub fn new(width: usize, height: usize, glyphs: GlyphSet, colors: Colors, scale: Scale) -> Self {
        Self { width, height, glyphs, colors, scale }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let scale = if settings.logarithmic { Scale::Logarithmic } else { Scale::Linear };
        if scale == Scale::Logarithmic {
            debug!("bars scaled by ln(1 + count)");
        }
        Ok(Self::new(
            settings.width,
            settings.height,
            GlyphSet::parse(&settings.glyphs)?,
            settings.colors.clone(),
            scale,
        ))
    }

    /// Count and percent columns are sized from the first (largest) row only;
    /// lower rows that format wider overflow rather than reflow.
    pub fn layout(&self, ranking: &Ranking) -> RenderLayout {
        let shown = &ranking.entries[..ranking.len().min(self.height)];
        let Some(first) = shown.first() else {
            return RenderLayout { bar_width: self.bar_width(0, 0, 0), ..Default::default() };
        };
        let key_width = shown.iter().map(|e| e.key.chars().count()).max().unwrap_or(0);
        let count_width = first.count.to_string().len();
        let percent_width = format_percent(first.percentage).chars().count();
        RenderLayout {
            rows: shown.len(),
            key_width,
            count_width,
            percent_width,
            bar_width: self.bar_width(key_width, count_width, percent_width),
            max_value: shown.iter().map(|e| e.count).max().unwrap_or(0),
        }
    }

    fn bar_width(&self, key_width: usize, count_width: usize, percent_width: usize) -> usize {
        // one separator after each column plus the bar's closing glyph
        self.width
            .saturating_sub(key_width + 1)
            .saturating_sub(count_width + 1)
            .saturating_sub(percent_width + 1)
            .saturating_sub(1)
    }

    /// The column header line, written to the diagnostic stream.
    pub fn header(&self, layout: &RenderLayout) -> String {
        format!(
            "{}|{} {}  Histogram{}",
            rjust("Key", layout.key_width),
            ljust("Ct", layout.count_width),
            ljust("(Pct)", layout.percent_width),
            self.colors.key,
        )
    }

    pub fn render(&self, ranking: &Ranking) -> Vec<String> {
        let layout = self.layout(ranking);
        let c = &self.colors;
        ranking.entries[..layout.rows]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let trailer = if i + 1 == layout.rows { &c.regular } else { &c.key };
                format!(
                    "{}{}|{}{} {}{} {}{}{}",
                    rjust(&entry.key, layout.key_width),
                    c.regular,
                    c.count,
                    rjust(&entry.count.to_string(), layout.count_width),
                    c.percent,
                    rjust(&format_percent(entry.percentage), layout.percent_width),
                    c.bar,
                    self.bar(layout.bar_width, layout.max_value, entry.count),
                    trailer,
                )
            })
            .collect()
    }

    /// Writes the rendered rows separated by newlines, without a final one.
    pub fn write_rows<W: Write>(&self, writer: &mut W, ranking: &Ranking) -> io::Result<()> {
        for (i, line) in self.render(ranking).iter().enumerate() {
            if i > 0 {
                writer.write_all(b"\n")?;
            }
            writer.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    fn fraction(&self, max_value: u64, value: u64) -> f32 {
        if max_value == 0 {
            return 0.0;
        }
        match self.scale {
            Scale::Linear => value as f32 / max_value as f32,
            Scale::Logarithmic => ((value as f64).ln_1p() / (max_value as f64).ln_1p()) as f32,
        }
    }

    /// A bar for `value` scaled against `max_value` over `bar_width` cells.
    pub fn bar(&self, bar_width: usize, max_value: u64, value: u64) -> String {
        let width = self.fraction(max_value, value) * bar_width as f32;
        let int_width = width as usize;
        let remainder = width - int_width as f32;

        match &self.glyphs {
            GlyphSet::Full { fill, cap } => {
                // every row keeps at least the cap, even at zero
                let mut bar = fill.repeat(int_width);
                bar.push_str(cap);
                bar
            }
            GlyphSet::Partial { palette, .. } => {
                let Some(fullest) = palette.last() else {
                    return String::new();
                };
                let unit = self.glyphs.resolution();
                let mut bar = fullest.repeat(int_width);
                if remainder > unit {
                    let idx = ((remainder / unit) as usize).min(palette.len() - 1);
                    bar.push_str(palette[idx]);
                }
                bar
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::rank;
    use crate::table::FrequencyTable;

    fn hist(width: usize, height: usize, glyphs: &str) -> Histogram {
        Histogram::new(width, height, GlyphSet::parse(glyphs).unwrap(), Colors::none(), Scale::Linear)
    }

    fn ranking(pairs: &[(&str, u64)]) -> Ranking {
        let table: FrequencyTable = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        rank(&table)
    }

    #[test]
    fn justify() {
        assert_eq!(ljust("a", 4), "a   ");
        assert_eq!(rjust("a", 4), "   a");
        assert_eq!(rjust("abcdef", 2), "abcdef");
    }

    #[test]
    fn bar_ascii_pair() {
        assert_eq!(hist(80, 15, "=>").bar(10, 10, 2), "==>");
    }

    #[test]
    fn bar_named_glyph() {
        assert_eq!(hist(80, 15, "dt").bar(10, 10, 2), "•••");
    }

    #[test]
    fn bar_partial_blocks() {
        assert_eq!(hist(80, 15, "pb").bar(10, 100, 25), "██▋");
    }

    #[test]
    fn bar_partial_lines() {
        // 10 * 0.55 = 5.5 -> five full lines, remainder 0.5 -> index 1
        assert_eq!(hist(80, 15, "pl").bar(10, 100, 55), "━━━━━╾");
    }

    #[test]
    fn partial_remainder_below_unit_is_dropped() {
        // 10 * 0.21 = 2.1, remainder under one eighth
        assert_eq!(hist(80, 15, "pb").bar(10, 100, 21), "██");
    }

    #[test]
    fn full_bar_and_minimum_marker() {
        let h = hist(80, 15, "#");
        assert_eq!(h.bar(12, 7, 7), "#".repeat(13));
        assert_eq!(h.bar(12, 7, 0), "#");
    }

    #[test]
    fn zero_max_does_not_divide_by_zero() {
        assert_eq!(hist(80, 15, "-").bar(10, 0, 0), "-");
        assert_eq!(hist(80, 15, "pb").bar(10, 0, 0), "");
    }

    #[test]
    fn logarithmic_scale() {
        let h = Histogram::new(80, 15, GlyphSet::parse("#").unwrap(), Colors::none(), Scale::Logarithmic);
        // ln(1+9)/ln(1+99) = 0.5
        assert_eq!(h.bar(10, 99, 9), "#".repeat(6));
        assert_eq!(h.bar(10, 99, 99), "#".repeat(11));
        assert_eq!(h.bar(10, 99, 0), "#");
    }

    #[test]
    fn empty_ranking_renders_nothing() {
        let h = hist(15, 15, "-");
        assert!(h.render(&Ranking::default()).is_empty());
        let mut buf = Vec::new();
        h.write_rows(&mut buf, &Ranking::default()).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn two_token_golden() {
        let h = hist(15, 15, "-");
        let mut buf = Vec::new();
        h.write_rows(&mut buf, &ranking(&[("a", 1), ("b", 2)])).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "b|2 (66.67%) --\na|1 (33.33%) -");
    }

    #[test]
    fn rows_fill_display_width() {
        let h = hist(40, 15, "-");
        let r = ranking(&[("alpha", 40), ("be", 20), ("c", 20)]);
        let layout = h.layout(&r);
        assert_eq!(layout.key_width, 5);
        assert_eq!(layout.count_width, 2);
        assert_eq!(layout.percent_width, "(50.00%)".len());
        assert_eq!(layout.bar_width, 40 - 6 - 3 - 9 - 1);
        let lines = h.render(&r);
        assert_eq!(lines[0].chars().count(), 40);
        // 20/40 of 21 cells = 10.5 -> ten fills plus the cap
        assert_eq!(lines[1], format!("   be|20 (25.00%) {}", "-".repeat(11)));
        assert!(lines[2].starts_with("    c|20 "));
    }

    #[test]
    fn height_limits_rows() {
        let r = ranking(&[("a", 5), ("b", 4), ("c", 3), ("dddddddd", 1)]);
        let h = hist(30, 2, "-");
        let lines = h.render(&r);
        assert_eq!(lines.len(), 2);
        // keys outside the displayed rows do not widen the column
        assert_eq!(h.layout(&r).key_width, 1);
        assert!(lines[0].starts_with("a|5 "));
    }

    #[test]
    fn lower_rows_justify_into_first_row_columns() {
        let r = ranking(&[("a", 95), ("b", 5)]);
        let h = hist(30, 15, "-");
        let layout = h.layout(&r);
        assert_eq!(layout.count_width, 2);
        assert_eq!(layout.percent_width, "(95.00%)".len());
        let lines = h.render(&r);
        assert!(lines[1].starts_with("b| 5  (5.00%) "));
    }

    #[test]
    fn narrow_width_clamps_bar_area() {
        let h = hist(5, 15, "-");
        let layout = h.layout(&ranking(&[("key", 100)]));
        assert_eq!(layout.bar_width, 0);
        assert_eq!(h.render(&ranking(&[("key", 100)]))[0], "key|100 (100.00%) -");
    }

    #[test]
    fn colors_wrap_fields() {
        let colors = Colors {
            regular: "<r>".into(),
            key: "<k>".into(),
            count: "<c>".into(),
            percent: "<p>".into(),
            bar: "<b>".into(),
        };
        let h = Histogram::new(15, 15, GlyphSet::default(), colors, Scale::Linear);
        let r = ranking(&[("a", 1), ("b", 2)]);
        let lines = h.render(&r);
        assert_eq!(lines[0], "b<r>|<c>2 <p>(66.67%) <b>--<k>");
        assert_eq!(lines[1], "a<r>|<c>1 <p>(33.33%) <b>-<r>");
        assert_eq!(h.header(&h.layout(&r)), "Key|Ct (Pct)     Histogram<k>");
    }

    #[test]
    fn repeated_render_is_byte_identical() {
        let r = ranking(&[("x", 3), ("y", 3), ("z", 1)]);
        let h = hist(30, 15, "pb");
        assert_eq!(h.render(&r), h.render(&r));
    }

    #[test]
    fn all_zero_counts_render_minimum_bars() {
        let lines = hist(20, 15, "-").render(&ranking(&[("a", 0), ("b", 0)]));
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.ends_with(" -")));
    }
}
