use distribution_common::{Colors, Mode, Settings};
use distribution_core::{rank, run, DistributionError, PrunePolicy, Tokenizer};
use std::io::Cursor;

const GOLDEN_TWO_TOKENS: &str = "b|2 (66.67%) --\na|1 (33.33%) -\n";

fn settings(mode: Mode) -> Settings {
    Settings { width: 15, mode, ..Settings::default() }
}

fn run_to_strings(settings: &Settings, input: &str) -> distribution_core::Result<(String, String)> {
    let mut out = Vec::new();
    let mut diag = Vec::new();
    run(settings, Cursor::new(input.to_owned()), &mut out, &mut diag)?;
    Ok((String::from_utf8(out).unwrap(), String::from_utf8(diag).unwrap()))
}

#[test]
fn value_key_two_tokens_golden() {
    let (out, diag) = run_to_strings(&settings(Mode::ValueKey), "1 a\n2 b\n").unwrap();
    assert_eq!(out, GOLDEN_TWO_TOKENS);
    assert_eq!(diag, "Key|Ct (Pct)     Histogram\n");
}

#[test]
fn key_value_matches_value_key() {
    let (out, _) = run_to_strings(&settings(Mode::KeyValue), "a 1\nb 2\n").unwrap();
    assert_eq!(out, GOLDEN_TWO_TOKENS);
}

#[test]
fn lines_mode_golden() {
    let (out, _) = run_to_strings(&settings(Mode::Lines), "a\nb\nb\n").unwrap();
    assert_eq!(out, GOLDEN_TWO_TOKENS);
}

#[test]
fn split_mode_counts_repeated_tokens() {
    let s = Settings {
        mode: Mode::Split { splitter: "white".into() },
        match_regexp: "word".into(),
        ..settings(Mode::Lines)
    };
    let (out, _) = run_to_strings(&s, "a a\n").unwrap();
    assert_eq!(out, "a|2 (100.00%) -\n");
}

#[test]
fn empty_input_writes_header_only() {
    let (out, diag) = run_to_strings(&settings(Mode::Lines), "").unwrap();
    assert!(out.is_empty());
    assert_eq!(diag, "Key|Ct (Pct)  Histogram\n");
}

#[test]
fn malformed_record_aborts_run() {
    let err = run_to_strings(&settings(Mode::ValueKey), "1 a\ngarbage\n").unwrap_err();
    assert!(matches!(err, DistributionError::MalformedRecord { line: 2, .. }));
}

#[test]
fn invalid_regex_fails_before_reading() {
    let s = Settings { match_regexp: "(unclosed".into(), ..settings(Mode::Lines) };
    assert!(matches!(run_to_strings(&s, "a\n"), Err(DistributionError::Regex(_))));
}

#[test]
fn invalid_glyph_fails_before_reading() {
    let s = Settings { glyphs: String::new(), ..settings(Mode::Lines) };
    assert!(matches!(run_to_strings(&s, "a\n"), Err(DistributionError::InvalidOption(_))));
}

#[test]
fn verbose_writes_summary_to_diagnostics() {
    let s = Settings { verbose: true, max_keys_raised: true, max_keys: 3015, ..settings(Mode::Lines) };
    let (out, diag) = run_to_strings(&s, "a\nb\nb\n").unwrap();
    assert_eq!(out, GOLDEN_TWO_TOKENS);
    let lines: Vec<&str> = diag.lines().collect();
    assert_eq!(lines[0], "Update MaxKeys to 3015 (height + 3000)");
    assert!(diag.contains("tokens/lines examined: 3\n"));
    assert!(diag.contains(" tokens/lines matched: 3\n"));
    assert!(diag.contains("       histogram keys: 2\n"));
    assert!(diag.contains("          hash prunes: 0\n"));
    assert!(diag.contains("              runtime: "));
    assert!(diag.ends_with("Key|Ct (Pct)     Histogram\n"));
}

#[test]
fn colored_output_wraps_each_field() {
    let s = Settings { colors: Colors::from_palette("0,37,34,33,32").unwrap(), ..settings(Mode::Lines) };
    let (out, diag) = run_to_strings(&s, "a\nb\nb\n").unwrap();
    let first = out.lines().next().unwrap();
    assert_eq!(first, "b\u{1b}[0m|\u{1b}[34m2 \u{1b}[33m(66.67%) \u{1b}[32m--\u{1b}[37m");
    assert!(diag.ends_with("Histogram\u{1b}[37m\n"));
}

#[test]
fn height_truncates_but_percentages_use_full_total() {
    let s = Settings { height: 1, ..settings(Mode::Lines) };
    let (out, _) = run_to_strings(&s, "x\nx\nx\ny\n").unwrap();
    assert_eq!(out.lines().count(), 1);
    assert!(out.starts_with("x|3 (75.00%) "));
}

#[test]
fn pruning_keeps_recurring_keys_exact() {
    // "hot" keys recur, every "cold" key appears once
    let mut input = String::new();
    for i in 0..2000 {
        input.push_str(&format!("hot{}\ncold{i}\n", i % 5));
    }
    let policy = PrunePolicy { max_keys: 20, interval: 100 };
    let tally = Tokenizer::lines(".", policy).unwrap().tokenize(Cursor::new(input)).unwrap();
    assert_eq!(tally.stats.prunes, 40);
    assert!(tally.table.len() <= 20);
    let ranked = rank(&tally.table);
    let top: Vec<&str> = ranked.entries.iter().take(5).map(|e| e.key.as_str()).collect();
    assert_eq!(top, vec!["hot0", "hot1", "hot2", "hot3", "hot4"]);
    assert!(ranked.entries[..5].iter().all(|e| e.count == 400));
}

#[test]
fn hand_built_max_keys_below_floor_keeps_every_key() {
    let s = Settings { max_keys: 2, key_prune_interval: 3, ..settings(Mode::Lines) };
    let (out, _) = run_to_strings(&s, "a\nb\nc\nd\ne\nf\n").unwrap();
    assert_eq!(out.lines().count(), 6);
}

#[test]
fn progress_stops_after_first_failed_write() {
    #[derive(Default)]
    struct Closed {
        attempts: usize,
    }
    impl std::io::Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            self.attempts += 1;
            Err(std::io::Error::other("closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    let s = Settings { verbose: true, progress_interval: std::time::Duration::ZERO, ..settings(Mode::Lines) };
    let mut out = Vec::new();
    let mut diag = Closed::default();
    let err = run(&s, Cursor::new("a\nb\nb\n"), &mut out, &mut diag).unwrap_err();
    // one progress write, then the first summary line
    assert_eq!(diag.attempts, 2);
    assert!(matches!(err, DistributionError::Io(_)));
    assert!(out.is_empty());
}
