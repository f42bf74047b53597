use std::io::stderr;

use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use timedec::{convert, format, guess, DateTime};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn build_cli() -> Command {
    let mut cmd = Command::new("timedec")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode timestamp values, or encode a date into every known format")
        .arg(
            Arg::new("guess")
                .long("guess")
                .value_name("VALUE")
                .help("Try the value against every known format"),
        )
        .arg(
            Arg::new("timestamp")
                .long("timestamp")
                .value_name("DATE")
                .num_args(0..=1)
                .default_missing_value("now")
                .help("Encode a date into every format that can hold it (default: now)"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        );
    // one decode flag per registry entry
    for desc in format::ALL {
        cmd = cmd.arg(
            Arg::new(desc.id)
                .long(desc.id)
                .value_name("VALUE")
                .help(desc.reason)
                .help_heading("Formats"),
        );
    }
    let mut modes: Vec<&'static str> = vec!["guess", "timestamp"];
    modes.extend(format::ALL.iter().map(|desc| desc.id));
    cmd.group(ArgGroup::new("mode").args(modes).required(true))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("TIMEDEC_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn run_guess(raw: &str, json: bool) -> Result<()> {
    match guess::guess(raw) {
        Ok(matches) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
                return Ok(());
            }
            for m in &matches {
                let marker = if m.likely { "*" } else { " " };
                println!("{marker} {:<36} {} {}", m.name, m.timestamp, m.zone);
            }
            println!("* = year within 5 years of today");
            Ok(())
        }
        Err(timedec::Error::NoMatches) => {
            println!("no valid dates found");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn run_encode(date: &str, json: bool) -> Result<()> {
    let dt = if date == "now" {
        DateTime::now()
    } else {
        DateTime::parse(date)?
    };
    debug!("encoding {dt}");
    let encoded = convert::encode_all(&dt);
    if json {
        println!("{}", serde_json::to_string_pretty(&encoded)?);
        return Ok(());
    }
    for e in &encoded {
        println!("{:<36} {}", e.name, e.value);
    }
    println!("{} of {} formats represent this date", encoded.len(), format::ALL.len());
    Ok(())
}

fn run_decode(id: &str, raw: &str, json: bool) -> Result<()> {
    let desc = format::from_id(id).ok_or_else(|| anyhow!("unknown format {id}"))?;
    let dt = desc.format.decode(raw)?;
    let zone = dt.offset_label().unwrap_or_else(|| desc.zone.to_string());
    if json {
        let value = serde_json::json!({
            "id": desc.id,
            "name": desc.name,
            "timestamp": dt.to_string(),
            "zone": zone,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}: {} {}", desc.name, dt, zone);
    }
    Ok(())
}

fn dispatch(matches: &ArgMatches) -> Result<()> {
    let json = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text")
        == "json";
    if let Some(raw) = matches.get_one::<String>("guess") {
        return run_guess(raw, json);
    }
    if let Some(date) = matches.get_one::<String>("timestamp") {
        return run_encode(date, json);
    }
    for desc in format::ALL {
        if let Some(raw) = matches.get_one::<String>(desc.id) {
            return run_decode(desc.id, raw, json);
        }
    }
    unreachable!("clap requires exactly one mode argument")
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_logging(
        matches
            .get_one::<u8>("verbose")
            .copied()
            .unwrap_or_default(),
    );
    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    dispatch(&matches)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn parses_single_format_flag() {
        let matches = build_cli()
            .try_get_matches_from(["timedec", "--unix", "1593561600"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("unix").map(String::as_str),
            Some("1593561600")
        );
    }

    #[test]
    fn modes_are_exclusive() {
        assert!(build_cli()
            .try_get_matches_from(["timedec", "--guess", "1", "--unix", "1"])
            .is_err());
        assert!(build_cli().try_get_matches_from(["timedec"]).is_err());
    }
}
