//! Command-line flags, each with an environment fallback.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ghp_reconciler::ControllerOptions;

/// GitHub provider
#[derive(Parser, Debug, Clone)]
#[command(name = "github-provider")]
#[command(version)]
#[command(about = "Keeps GitHub repositories, collaborators and team permissions converged")]
pub struct Cli {
    /// Run with debug logging
    #[arg(short, long, env = "DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Manifest resync period, such as 300ms, 1.5h or 2h45m
    #[arg(short, long, env = "SYNC", default_value = "1h", value_parser = parse_period)]
    pub sync: Duration,

    /// How often an individual resource is checked for drift
    #[arg(long, env = "POLL_INTERVAL", default_value = "2m", value_parser = parse_period)]
    pub poll: Duration,

    /// Maximum number of reconciles in flight across all kinds
    #[arg(long, env = "MAX_RECONCILE_RATE", default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
    pub max_reconcile_rate: u16,

    /// YAML file declaring Repo, Collaborator and TeamRepo objects
    #[arg(long, env = "MANIFESTS")]
    pub manifests: PathBuf,

    /// Directory holding secrets as <namespace>/<name>/<key> files
    #[arg(long, env = "SECRETS_DIR", default_value = "/var/run/secrets/github-provider")]
    pub secrets_dir: PathBuf,
}

impl Cli {
    #[must_use]
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            poll_interval: self.poll,
            sync_period: self.sync,
            max_concurrent_reconciles: usize::from(self.max_reconcile_rate),
            ..ControllerOptions::default()
        }
    }
}

/// Parse a duration written as a sequence of decimal numbers with units,
/// e.g. `300ms`, `1.5h` or `2h45m`. Valid units are `ns`, `us` (or `µs`),
/// `ms`, `s`, `m` and `h`. A bare `0` is accepted.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let text = input.trim();
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    if text.is_empty() {
        return Err("empty duration".to_string());
    }

    let overflow = || format!("invalid duration '{text}': too large");
    let mut rest = text;
    let mut total_nanos: u128 = 0;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, after_number) = rest.split_at(number_len);

        let unit_len = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, after_unit) = after_number.split_at(unit_len);
        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "" => return Err(format!("invalid duration '{text}': missing unit")),
            other => return Err(format!("invalid duration '{text}': unknown unit '{other}'")),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(format!("invalid duration '{text}': expected a number"));
        }
        if fraction.contains('.') {
            return Err(format!("invalid duration '{text}': bad number '{number}'"));
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(unit_nanos).ok_or_else(overflow)?;

        // Digits beyond nanosecond precision cannot contribute.
        let fraction = fraction.get(..fraction.len().min(18)).unwrap_or(fraction);
        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().map_err(|_| overflow())?;
            let scale = 10u128.pow(u32::try_from(fraction.len()).map_err(|_| overflow())?);
            nanos = nanos
                .checked_add(digits * unit_nanos / scale)
                .ok_or_else(overflow)?;
        }

        total_nanos = total_nanos.checked_add(nanos).ok_or_else(overflow)?;
        rest = after_unit;
    }

    let nanos = u64::try_from(total_nanos).map_err(|_| overflow())?;
    Ok(Duration::from_nanos(nanos))
}

/// [`parse_duration`] for periods, which must be positive.
pub fn parse_period(input: &str) -> Result<Duration, String> {
    let period = parse_duration(input)?;
    if period.is_zero() {
        return Err(format!("period '{}' must be greater than zero", input.trim()));
    }
    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("300ms"), Ok(Duration::from_millis(300)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn test_parse_duration_compound_and_fractional() {
        assert_eq!(
            parse_duration("2h45m"),
            Ok(Duration::from_secs(2 * 3600 + 45 * 60))
        );
        assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("1m30s"), Ok(Duration::from_secs(90)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("1..5s").is_err());
    }

    #[test]
    fn test_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from(["github-provider", "--manifests", "objects.yaml"])?;

        assert!(!cli.debug);
        assert_eq!(cli.sync, Duration::from_secs(3600));
        let options = cli.controller_options();
        assert_eq!(options.poll_interval, Duration::from_secs(120));
        assert_eq!(options.sync_period, Duration::from_secs(3600));
        assert_eq!(options.max_concurrent_reconciles, 5);
        Ok(())
    }

    #[test]
    fn test_flags_override_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from([
            "github-provider",
            "-d",
            "-s",
            "10m",
            "--poll",
            "30s",
            "--max-reconcile-rate",
            "2",
            "--manifests",
            "objects.yaml",
            "--secrets-dir",
            "/tmp/secrets",
        ])?;

        assert!(cli.debug);
        assert_eq!(cli.sync, Duration::from_secs(600));
        assert_eq!(cli.poll, Duration::from_secs(30));
        assert_eq!(cli.max_reconcile_rate, 2);
        assert_eq!(cli.secrets_dir, PathBuf::from("/tmp/secrets"));
        Ok(())
    }

    #[test]
    fn test_bad_duration_flag_is_rejected() {
        let result = Cli::try_parse_from([
            "github-provider",
            "--manifests",
            "objects.yaml",
            "--poll",
            "soon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_every_flag_has_env_fallback() {
        use clap::CommandFactory;

        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|env| env.to_str())
                .map(str::to_string)
        };

        assert_eq!(env_of("sync").as_deref(), Some("SYNC"));
        assert!(
            command
                .get_arguments()
                .filter(|arg| !matches!(arg.get_id().as_str(), "help" | "version"))
                .all(|arg| arg.get_env().is_some())
        );
    }

    #[test]
    fn test_zero_period_is_rejected() {
        assert!(parse_period("0").is_err());
        assert!(parse_period("0s").is_err());
        assert_eq!(parse_period("1s"), Ok(Duration::from_secs(1)));
    }

    #[test]
    fn test_zero_reconcile_rate_is_rejected() {
        let result = Cli::try_parse_from([
            "github-provider",
            "--manifests",
            "objects.yaml",
            "--max-reconcile-rate",
            "0",
        ]);
        assert!(result.is_err());
    }
}
