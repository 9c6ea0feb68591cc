mod notes;

use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs, process};

use anyhow::{Context, Result, bail};
use roam_extras_config::{Config, FileSettings, TRIGGER_HOUR, YEARS_BACK};
use roam_extras_copy::{extract_fenced_code, resolve_block_uid};
use roam_extras_history::{
    Clock, SystemClock, format_roam_date, next_occurrence, open_windows, parse_roam_date,
    resolve_from,
};
use roam_extras_host::memory::MemorySidebar;

use crate::notes::NotesGraph;

const USAGE: &str = "Usage:
  roam-extras block-uid <dom-id>
  roam-extras fence <markdown-file>
  roam-extras next-run [hour]
  roam-extras history [--date <title>] [--years <n>] [notes-folder-path]";

fn usage_exit() -> ! {
    eprintln!("{USAGE}");
    process::exit(1);
}

/// Value following `flag`, removed from `args` together with the flag.
fn take_flag(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(index) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    if index + 1 >= args.len() {
        bail!("{flag} needs a value");
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Ok(Some(value))
}

fn load_config() -> Option<Config> {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring config file: {e}");
            None
        }
    }
}

fn settings() -> Result<FileSettings> {
    let config_path = Config::config_path();
    FileSettings::open(&config_path)
        .with_context(|| format!("Could not open settings at {}", config_path.display()))
}

fn block_uid(args: &[String]) -> Result<()> {
    let [dom_id] = args else {
        usage_exit();
    };
    match resolve_block_uid(dom_id) {
        Some(uid) => println!("{uid}"),
        None => bail!("No block uid in {dom_id:?}"),
    }
    Ok(())
}

fn fence(args: &[String]) -> Result<()> {
    let [path] = args else {
        usage_exit();
    };
    let markdown =
        fs::read_to_string(path).with_context(|| format!("Could not read {path}"))?;
    match extract_fenced_code(&markdown) {
        Some(code) => println!("{code}"),
        None => bail!("No fenced code block in {path}"),
    }
    Ok(())
}

fn next_run(args: &[String]) -> Result<()> {
    let hour = match args {
        [] => TRIGGER_HOUR.read(&settings()?),
        [raw] => TRIGGER_HOUR.from_input(raw).unwrap_or(TRIGGER_HOUR.default),
        _ => usage_exit(),
    };
    let now = SystemClock.now();
    let next = next_occurrence(now, hour);
    println!("{next}");
    log::info!("Next run is {} from now", humanize(SystemClock.until(next)));
    Ok(())
}

fn humanize(delay: Duration) -> String {
    let minutes = delay.as_secs() / 60;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

async fn history(mut args: Vec<String>) -> Result<()> {
    let date = take_flag(&mut args, "--date")?;
    let years = take_flag(&mut args, "--years")?;

    let notes_path = match args.as_slice() {
        [path] => PathBuf::from(path),
        [] => match load_config().and_then(|config| config.notes_path) {
            Some(path) => path,
            None => {
                eprintln!("Error: No notes path provided and none configured");
                eprintln!("Set notes_path in {}", Config::config_path().display());
                usage_exit();
            }
        },
        _ => usage_exit(),
    };

    let today = match date {
        Some(title) => parse_roam_date(&title)?,
        None => SystemClock.now().date(),
    };
    let years_back = match years {
        Some(raw) => YEARS_BACK.from_input(&raw).unwrap_or(YEARS_BACK.default),
        None => YEARS_BACK.read(&settings()?),
    };

    let graph = NotesGraph::scan(&notes_path)
        .with_context(|| format!("Could not scan {}", notes_path.display()))?;
    if graph.is_empty() {
        log::warn!("No markdown pages under {}", notes_path.display());
    }
    log::info!(
        "Looking back {years_back} years from {} across {} pages",
        format_roam_date(today),
        graph.len()
    );

    let pages = resolve_from(&graph, today, years_back).await;
    let sidebar = MemorySidebar::default();
    open_windows(&sidebar, &pages).await?;

    // Same order the sidebar would show them in.
    for window in sidebar.windows() {
        let title = window.title.unwrap_or_default();
        println!("{title}\t{}", graph.path_of(&window.block_uid).display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        usage_exit();
    }
    let command = args.remove(0);

    match command.as_str() {
        "block-uid" => block_uid(&args),
        "fence" => fence(&args),
        "next-run" => next_run(&args),
        "history" => history(args).await,
        "-h" | "--help" | "help" => {
            println!("{USAGE}");
            Ok(())
        }
        _ => usage_exit(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_take_flag_removes_flag_and_value() {
        let mut rest = args(&["--date", "May 1st, 2020", "/notes"]);

        let date = take_flag(&mut rest, "--date").unwrap();

        assert_eq!(date.as_deref(), Some("May 1st, 2020"));
        assert_eq!(rest, args(&["/notes"]));
        assert_eq!(take_flag(&mut rest, "--years").unwrap(), None);
    }

    #[test]
    fn test_take_flag_without_value_is_an_error() {
        let mut rest = args(&["/notes", "--years"]);

        assert!(take_flag(&mut rest, "--years").is_err());
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize(Duration::from_secs(61 * 60)), "1h 01m");
        assert_eq!(humanize(Duration::from_secs(3603)), "1h 00m");
    }
}
