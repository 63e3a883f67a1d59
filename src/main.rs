use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::Path;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use vitrine::build::build_site;
use vitrine::config::Config;
use vitrine::select::{Draw, RandomDraw, ScriptedDraw};
use vitrine::verify::verify_site;

fn main() {
    let matches = App::new("vitrine")
        .version(clap::crate_version!())
        .about("Composes a site's landing page from its placement schedule")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Raise diagnostic verbosity"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Compose and publish today's landing page")
                .arg(project_arg())
                .arg(output_arg())
                .arg(today_arg())
                .arg(
                    Arg::with_name("dryrun")
                        .long("dryrun")
                        .help("Render everything but write nothing"),
                ),
        )
        .subcommand(
            SubCommand::with_name("verify")
                .about("Run the composer against fixture inputs and diff the output against a golden tree")
                .arg(project_arg())
                .arg(output_arg())
                .arg(today_arg())
                .arg(
                    Arg::with_name("golden")
                        .short("g")
                        .long("golden")
                        .takes_value(true)
                        .required(true)
                        .help("Path of the golden expected tree"),
                )
                .arg(
                    Arg::with_name("draw")
                        .long("draw")
                        .takes_value(true)
                        .possible_values(&["promotion", "cause", "default"])
                        .help("Force a fallback branch instead of drawing at random"),
                ),
        )
        .get_matches();

    let default_level = match matches.is_present("verbose") {
        true => LevelFilter::DEBUG,
        false => LevelFilter::WARN,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_target(false)
        .init();

    let result = match matches.subcommand() {
        ("build", Some(matches)) => run_build(matches),
        ("verify", Some(matches)) => run_verify(matches),
        _ => unreachable!("subcommand is required"),
    };
    if let Err(err) = result {
        eprintln!("vitrine: {}", err);
        std::process::exit(1);
    }
}

fn project_arg() -> Arg<'static, 'static> {
    Arg::with_name("project")
        .short("p")
        .long("project")
        .takes_value(true)
        .default_value(".")
        .help("Directory in (or above) which to find the project file")
}

fn output_arg() -> Arg<'static, 'static> {
    Arg::with_name("output")
        .short("o")
        .long("output")
        .takes_value(true)
        .required(true)
        .help("Directory in which to write the published site")
}

fn today_arg() -> Arg<'static, 'static> {
    Arg::with_name("today")
        .long("today")
        .takes_value(true)
        .help("Compose for this ISO date instead of the system date")
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    Config::from_directory(
        Path::new(matches.value_of("project").unwrap()),
        Path::new(matches.value_of("output").unwrap()),
        matches.is_present("dryrun"),
    )
}

fn today(matches: &ArgMatches) -> Result<NaiveDate> {
    match matches.value_of("today") {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| anyhow!("Parsing --today `{}`: {}", s, e)),
        None => Ok(chrono::Local::today().naive_local()),
    }
}

fn run_build(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    build_site(&config, today(matches)?, &mut RandomDraw)?;
    Ok(())
}

fn run_verify(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let mut draw: Box<dyn Draw> = match matches.value_of("draw") {
        Some("promotion") => Box::new(ScriptedDraw::promotion()),
        Some("cause") => Box::new(ScriptedDraw::cause()),
        Some("default") => Box::new(ScriptedDraw::fallthrough()),
        _ => Box::new(RandomDraw),
    };

    let mismatches = verify_site(
        &config,
        today(matches)?,
        draw.as_mut(),
        Path::new(matches.value_of("golden").unwrap()),
    )?;
    if mismatches.is_empty() {
        return Ok(());
    }
    for mismatch in &mismatches {
        eprintln!("{}", mismatch);
    }
    Err(anyhow!(
        "{} path(s) differ from the golden tree",
        mismatches.len()
    ))
}
