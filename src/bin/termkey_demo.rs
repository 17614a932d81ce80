//! Termkey Demo - print decoded keys
//!
//! Puts the terminal in raw mode and prints every key it decodes until
//! input ends, Ctrl-C is pressed (with `--ctrlc`) or `--count` keys were read.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use termkey::{Config, Flags, FormatFlags, Key, KeyResult, Modifiers, TermKey};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Key notation for output
#[derive(ValueEnum, Debug, Clone, Copy)]
enum Notation {
    Plain,
    Long,
    Vim,
    Urwid,
}

impl Notation {
    fn flags(self) -> FormatFlags {
        match self {
            Notation::Plain => FormatFlags::empty(),
            Notation::Long => FormatFlags::LONGMOD,
            Notation::Vim => FormatFlags::VIM,
            Notation::Urwid => FormatFlags::URWID,
        }
    }
}

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "termkey-demo")]
#[command(version)]
#[command(about = "Print the keys a terminal sends", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Decode UTF-8 regardless of locale
    #[arg(long, conflicts_with = "raw")]
    utf8: bool,

    /// Treat every byte as a key
    #[arg(long)]
    raw: bool,

    /// Deliver Ctrl-C as a key; pressing it quits
    #[arg(long)]
    ctrlc: bool,

    /// Leave terminal settings alone
    #[arg(long)]
    no_termios: bool,

    /// Report keypad keys as the characters they print
    #[arg(long)]
    convert_kp: bool,

    /// Key notation
    #[arg(short, long, value_enum, default_value = "vim")]
    format: Notation,

    /// Append mouse coordinates
    #[arg(long)]
    mouse_pos: bool,

    /// Milliseconds to wait for the rest of an escape sequence
    #[arg(short, long, value_name = "MS")]
    wait_time: Option<u64>,

    /// Stop after this many keys
    #[arg(short = 'n', long, value_name = "N")]
    count: Option<usize>,
}

impl Args {
    fn flags(&self, base: Flags) -> Flags {
        let mut flags = base;
        flags.set(Flags::UTF8, self.utf8 || flags.contains(Flags::UTF8));
        flags.set(Flags::RAW, self.raw || flags.contains(Flags::RAW));
        flags.set(Flags::CTRLC, self.ctrlc || flags.contains(Flags::CTRLC));
        flags.set(Flags::NOTERMIOS, self.no_termios || flags.contains(Flags::NOTERMIOS));
        flags.set(Flags::CONVERTKP, self.convert_kp || flags.contains(Flags::CONVERTKP));
        flags
    }

    fn format(&self) -> FormatFlags {
        let mut format = self.format.flags();
        format.set(FormatFlags::MOUSE_POS, self.mouse_pos);
        format
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::load_or_default(),
    };
    config.flags = args.flags(config.flags);
    if let Some(ms) = args.wait_time {
        config.wait_time_ms = ms;
    }

    let mut tk = match TermKey::new(config.flags | Flags::NOSTART) {
        Ok(tk) => tk,
        Err(e) => {
            tracing::error!("Failed to open terminal: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = tk.configure(&config).and_then(|()| tk.start()) {
        tracing::error!("Failed to start: {}", e);
        return ExitCode::FAILURE;
    }
    tracing::info!("Decoding with flags {:?}", tk.flags());

    let code = run(&mut tk, &args);

    if let Err(e) = tk.stop() {
        tracing::error!("Failed to restore terminal: {}", e);
        return ExitCode::FAILURE;
    }
    code
}

fn run(tk: &mut TermKey, args: &Args) -> ExitCode {
    let format = args.format();
    let quit = Key::unicode('c').with_modifiers(Modifiers::CTRL);
    let mut stdout = io::stdout();
    let mut seen = 0;

    loop {
        if args.count.is_some_and(|count| seen >= count) {
            return ExitCode::SUCCESS;
        }

        let key = match tk.waitkey() {
            Ok(KeyResult::Key(key)) => key,
            Ok(KeyResult::Eof) => {
                tracing::info!("Input ended");
                return ExitCode::SUCCESS;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("Read error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        seen += 1;

        match tk.strfkey(&key, format) {
            Ok(text) => {
                let _ = write!(stdout, "{}\r\n", text);
                let _ = stdout.flush();
            }
            Err(e) => tracing::warn!("Cannot format {:?}: {}", key, e),
        }

        if tk.flags().contains(Flags::CTRLC) && tk.keycmp(&key, &quit).is_eq() {
            return ExitCode::SUCCESS;
        }
    }
}
