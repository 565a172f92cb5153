use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;
use chrono::{Local, Utc};

use fmc_portal::{
    api::{PortalApi, PortalClient},
    catalog::Webinar,
    reporting::{FileSink, ReportAssembler},
    schedule::{filter_upcoming, Carousel, Lineup, RotationState},
    storage::config::Config,
};

const USAGE: &str = "Usage: fmc-portal [--agenda [PACKAGE_ID]] [--slider [PACKAGE_ID]] [--report [OUTPUT_DIR]] [--help]";

#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    Agenda { package: Option<String> },
    Slider { package: Option<String> },
    Report { output_dir: Option<PathBuf> },
    Help,
}

pub fn parse_cli_mode() -> Result<CliMode, String> {
    parse_args(env::args().skip(1))
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliMode, String> {
    let mut args = args.into_iter().peekable();
    let mut mode = None;

    while let Some(arg) = args.next() {
        let value = args.next_if(|next| !next.starts_with("--"));
        let selected = match arg.as_str() {
            "--agenda" => CliMode::Agenda { package: value },
            "--slider" => CliMode::Slider { package: value },
            "--report" => CliMode::Report {
                output_dir: value.map(PathBuf::from),
            },
            "--help" => return Ok(CliMode::Help),
            _ => return Err(format!("Unknown argument: {}", arg)),
        };

        if mode.replace(selected).is_some() {
            return Err("Only one mode may be given".to_string());
        }
    }

    Ok(mode.unwrap_or(CliMode::Agenda { package: None }))
}

pub fn usage() -> &'static str {
    USAGE
}

async fn upcoming_webinars(config: &Config, package: Option<&str>) -> anyhow::Result<Lineup> {
    let client = PortalClient::from_config(&config.api)?;
    let webinars = client
        .fetch_webinars()
        .await
        .context("Failed to fetch webinars")?;
    Ok(filter_upcoming(&webinars, package, &Local::now()))
}

pub async fn run_agenda_mode(config: &Config, package: Option<&str>) -> anyhow::Result<()> {
    let lineup = upcoming_webinars(config, package).await?;
    println!("{}", format_agenda_text(&lineup));
    Ok(())
}

pub async fn run_slider_mode(config: &Config, package: Option<&str>) -> anyhow::Result<()> {
    let lineup = upcoming_webinars(config, package).await?;
    if lineup.is_empty() {
        println!("No upcoming webinars.");
        return Ok(());
    }

    let period = Duration::from_secs(config.slider.interval_seconds);
    let mut carousel = Carousel::new(period).context("Invalid slider interval")?;
    carousel.load(lineup.into_webinars());
    let mut changes = carousel.changes();
    let state = *changes.borrow_and_update();
    print_slide(&carousel, state);

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *changes.borrow_and_update();
                print_slide(&carousel, state);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Slider interrupted");
                break;
            }
        }
    }

    carousel.stop();
    Ok(())
}

pub async fn run_report_mode(config: &Config, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let client = PortalClient::from_config(&config.api)?;
    let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    let sink = FileSink::new(output_dir.clone());
    let assembler = ReportAssembler::new(client, config.report.tiers.clone());

    assembler
        .export(&sink, Utc::now())
        .await
        .context("Report export failed")?;

    println!("Report written to {}", output_dir.display());
    Ok(())
}

fn print_slide(carousel: &Carousel<Webinar>, state: RotationState) {
    if let (RotationState::Presenting(index), Some(webinar)) = (state, carousel.current()) {
        println!("[{}] {}", index + 1, build_agenda_line(&webinar));
    }
}

fn format_agenda_text(lineup: &Lineup) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Upcoming webinars – {}", Local::now().format("%A, %B %d, %Y")));
    lines.push(String::new());

    match lineup {
        Lineup::Empty => lines.push("No upcoming webinars.".to_string()),
        Lineup::Scheduled(webinars) => {
            for webinar in webinars {
                lines.push(format!("- {}", build_agenda_line(webinar)));
            }
        }
    }

    lines.join("\n")
}

fn build_agenda_line(webinar: &Webinar) -> String {
    let start_local = webinar.start.with_timezone(&Local);
    let mut line = format!("{:<17} {}", start_local.format("%Y-%m-%d %H:%M"), webinar.title);
    if let Some(link) = &webinar.join_link
        && !link.is_empty()
    {
        line.push_str(&format!(" <{}>", link));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn no_arguments_shows_unrestricted_agenda() {
        assert_eq!(parse_args(args(&[])), Ok(CliMode::Agenda { package: None }));
    }

    #[test]
    fn agenda_accepts_package_id() {
        assert_eq!(
            parse_args(args(&["--agenda", "pkg-gold"])),
            Ok(CliMode::Agenda { package: Some("pkg-gold".to_string()) })
        );
    }

    #[test]
    fn report_accepts_output_dir() {
        assert_eq!(
            parse_args(args(&["--report", "/tmp/out"])),
            Ok(CliMode::Report { output_dir: Some(PathBuf::from("/tmp/out")) })
        );
    }

    #[test]
    fn slider_without_value() {
        assert_eq!(parse_args(args(&["--slider"])), Ok(CliMode::Slider { package: None }));
    }

    #[test]
    fn two_modes_are_rejected() {
        assert!(parse_args(args(&["--agenda", "--report"])).is_err());
    }

    #[test]
    fn help_wins_over_other_flags() {
        assert_eq!(parse_args(args(&["--agenda", "--help"])), Ok(CliMode::Help));
        assert_eq!(parse_args(args(&["--help", "--export"])), Ok(CliMode::Help));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert_eq!(
            parse_args(args(&["--export"])),
            Err("Unknown argument: --export".to_string())
        );
    }

    #[test]
    fn empty_lineup_renders_fallback() {
        let text = format_agenda_text(&Lineup::Empty);

        assert!(text.ends_with("No upcoming webinars."));
    }
}
