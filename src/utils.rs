use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so `--json` output on stdout stays clean.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: u32) -> String {
    let digits = num.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Keeps the house number and masks the rest of the street, e.g. "12 *** **".
pub fn redact_address(address: &str) -> String {
    let mut words = address.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };

    let mut redacted = if first.chars().any(|c| c.is_ascii_digit()) {
        first.to_string()
    } else {
        "*".repeat(first.chars().count())
    };

    for word in words {
        redacted.push(' ');
        redacted.push_str(&"*".repeat(word.chars().count()));
    }
    redacted
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if let Some(top) = args.top {
        if top == 0 {
            anyhow::bail!("--top must be greater than 0");
        }
    }

    if let Some(bottom) = args.bottom {
        if bottom == 0 {
            anyhow::bail!("--bottom must be greater than 0");
        }
    }

    if args.init && args.json {
        anyhow::bail!("--init cannot be combined with --json");
    }

    Ok(())
}
