use anyhow::{Result, bail};
use kod_core::config::phrase_from_env;
use std::io::{BufRead, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use zeroize::Zeroizing;

/// Initializes tracing and the panic hook
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(fmt::layer().with_target(true).with_filter(filter)).init();

    // reports to stderr without requiring tracing macros on panic
    let default = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |pi| {
        eprintln!("panic: {}", pi);
        default(pi);
    }));
}

/// Recovery phrase from the named environment variable, or the first
/// non-empty line of stdin when no variable is given
pub fn read_phrase(env_var: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(var) = env_var {
        return match phrase_from_env(var) {
            Some(phrase) => Ok(Zeroizing::new(phrase)),
            None => bail!("environment variable {var} is empty or unset"),
        };
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("enter the 12-word recovery phrase:");
    }
    read_first_line(stdin.lock())
}

fn read_first_line(reader: impl BufRead) -> Result<Zeroizing<String>> {
    for line in reader.lines() {
        let line = Zeroizing::new(line?);
        if !line.trim().is_empty() {
            return Ok(Zeroizing::new(line.trim().to_string()));
        }
    }
    bail!("no recovery phrase on stdin")
}
