use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use distribution_common::{Config, DistributionError, Overrides, Settings};
use distribution_core::run;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = "\
Samples:
  du -sb /etc/* | distribution --palette=0,37,34,33,32 --graph
  du -sk /etc/* | awk '{print $2\" \"$1}' | distribution --graph=kv
  zcat /var/log/syslog*gz | distribution --char=o --tokenize=white
  zcat /var/log/syslog*gz | awk '{print $5}' | distribution -t word -m word -H 15 -c /
  find /etc -type f | cut -c 6- | distribution --tokenize=/ -w 90 -H 35 -c dt
  cat /usr/share/dict/words | awk '{print length($1)}' | distribution -c '*' -w 50 -H 10 | sort -n";

/// Histogram of the tokens (or pre-tallied counts) read from stdin.
#[derive(Parser, Debug)]
#[command(name = "distribution", version, after_help = AFTER_HELP)]
struct Cli {
    /// Config file to use instead of $DISTRIBUTION_CONFIG or the default location
    #[arg(long)]
    rcfile: Option<PathBuf>,
    /// Histogram size: small, medium, large or full (terminal); abbreviations allowed
    #[arg(short, long)]
    size: Option<String>,
    /// Width of the report in characters, overrides --size
    #[arg(short, long)]
    width: Option<usize>,
    /// Rows of histogram, header excluded, overrides --size
    #[arg(short = 'H', long)]
    height: Option<usize>,
    /// Bar characters: pb, pl, ba, bl, em, me, di, dt, sq, or a literal
    #[arg(short, long)]
    char: Option<String>,
    /// Colourise the output
    #[arg(long, visible_alias = "colour")]
    color: bool,
    /// ANSI codes for regular,key,count,percent,bar; implies --color
    #[arg(short, long)]
    palette: Option<String>,
    /// Scale bars logarithmically
    #[arg(short, long)]
    logarithmic: bool,
    /// Split lines on this regex (`white` and `word` are shortcuts) and count the tokens
    #[arg(short, long)]
    tokenize: Option<String>,
    /// Only count lines or tokens matching this regex (`word` and `num` are shortcuts)
    #[arg(short, long = "match")]
    match_regexp: Option<String>,
    /// Input is pre-tallied: vk (value then key, the default) or kv
    #[arg(
        short,
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "vk",
        value_parser = ["kv", "vk"]
    )]
    graph: Option<String>,
    /// Prune the key table down to this many keys while reading
    #[arg(short = 'k', long = "keys")]
    max_keys: Option<usize>,
    /// Print a summary and progress to stderr
    #[arg(short, long)]
    verbose: bool,
    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            width: self.width,
            height: self.height,
            size: self.size.clone(),
            char: self.char.clone(),
            color: self.color,
            palette: self.palette.clone(),
            logarithmic: self.logarithmic,
            tokenize: self.tokenize.clone(),
            match_regexp: self.match_regexp.clone(),
            graph: self.graph.clone(),
            max_keys: self.max_keys,
            verbose: self.verbose,
        }
    }
}

fn terminal_size() -> distribution_common::Result<(usize, usize)> {
    let (cols, rows) = crossterm::terminal::size().map_err(|e| {
        DistributionError::InvalidOption(format!("cannot detect terminal size: {e}"))
    })?;
    Ok((cols as usize, rows as usize))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "distribution", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.rcfile.as_deref())?;
    let settings = Settings::resolve(&config, &cli.overrides(), terminal_size)?;
    debug!(?settings, "resolved settings");

    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    let mut diag = io::stderr().lock();
    match run(&settings, stdin.lock(), &mut out, &mut diag) {
        Ok(_) => Ok(()),
        // `distribution | head` closes the pipe early
        Err(DistributionError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e.into()),
    }
}
