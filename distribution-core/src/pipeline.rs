use crate::histogram::Histogram;
use crate::rank::rank;
use crate::summary::{progress_line, RunSummary};
use crate::tokenizer::Tokenizer;
use distribution_common::{Result, Settings, MAX_KEYS_MARGIN};
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, info};

/// Reads `input` to the end, then writes histogram rows to `out` and the
/// header (plus the verbose summary) to `diag`.
pub fn run<R, W, E>(settings: &Settings, input: R, out: &mut W, diag: &mut E) -> Result<RunSummary>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let started = Instant::now();
    // both constructors validate configuration before any input is read
    let tokenizer = Tokenizer::from_settings(settings)?;
    let histogram = Histogram::from_settings(settings)?;

    if settings.verbose && settings.max_keys_raised {
        writeln!(
            diag,
            "Update MaxKeys to {} (height + {MAX_KEYS_MARGIN})",
            settings.max_keys
        )?;
    }

    let tally = if settings.verbose {
        let mut reporting = true;
        tokenizer.tokenize_with_progress(input, settings.progress_interval, |stats| {
            if !reporting {
                return;
            }
            if let Err(error) = diag.write_all(progress_line(stats).as_bytes()).and_then(|()| diag.flush()) {
                debug!(%error, "progress output failed, no further reports");
                reporting = false;
            }
        })?
    } else {
        tokenizer.tokenize(input)?
    };

    let ranking = rank(&tally.table);
    let layout = histogram.layout(&ranking);
    let summary = RunSummary::new(&tally.stats, tally.table.len(), started.elapsed());
    info!(
        examined = summary.examined,
        matched = summary.matched,
        keys = summary.distinct,
        prunes = summary.prunes,
        "input consumed"
    );

    if settings.verbose {
        for line in summary.lines() {
            writeln!(diag, "{line}")?;
        }
    }
    writeln!(diag, "{}", histogram.header(&layout))?;

    histogram.write_rows(out, &ranking)?;
    if layout.rows > 0 {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(summary)
}
