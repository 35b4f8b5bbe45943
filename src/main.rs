//! Humanized Input - Main Entry Point
//!
//! Command line front end that drives the synthesizer against a trace
//! backend: a recording event sink and a fixed device list. Every synthesized
//! event is printed as one JSON line with its timestamp.

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use humanized_input::{
    config::{CliArgs, Settings},
    device::{
        DeviceClass, DeviceHandle, DeviceInfo, RecordingSink, RecordingSleeper, Sleeper,
        StaticEnumerator, ThreadSleeper,
    },
    global,
    input::{CurveParams, InputId, InputSynthesizer, Point, ScrollDirection},
    NAME, VERSION,
};

/// One synthesis request from the command line
#[derive(Debug, Clone, PartialEq)]
enum Action {
    Devices,
    Press {
        input: InputId,
        times: i32,
        duration: Option<Duration>,
        interval: Option<Duration>,
    },
    Hold {
        input: InputId,
        duration: Option<Duration>,
    },
    Write {
        text: String,
        wpm: Option<f64>,
    },
    Scroll {
        direction: ScrollDirection,
        times: i32,
        interval: Option<Duration>,
    },
    Move {
        to: Point,
        curve: CurveChoice,
    },
    SetPos {
        pos: Point,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurveChoice {
    Configured,
    Straight,
    Random,
}

fn millis_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("MS")
        .help(help)
        .value_parser(clap::value_parser!(u64))
}

fn coordinate_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("x")
            .required(true)
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(i32)),
    )
    .arg(
        Arg::new("y")
            .required(true)
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(i32)),
    )
}

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .about("Humanized keyboard and mouse input synthesis")
        .long_about(
            "Synthesizes keyboard and mouse input with human-like timing.\n\
             Runs against a trace backend and prints every event as a JSON line.",
        )
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("keyboard-filter")
                .long("keyboard-filter")
                .value_name("KEYWORD")
                .help("Prefer the keyboard whose hardware id contains KEYWORD")
                .global(true),
        )
        .arg(
            Arg::new("mouse-filter")
                .long("mouse-filter")
                .value_name("KEYWORD")
                .help("Prefer the mouse whose hardware id contains KEYWORD")
                .global(true),
        )
        .arg(
            Arg::new("no-randomize")
                .long("no-randomize")
                .help("Use exact durations without jitter")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(millis_arg("press-duration", "Default press duration in milliseconds").global(true))
        .arg(millis_arg("typing-interval", "Pause between typed characters in milliseconds").global(true))
        .arg(
            Arg::new("jitter-bounds")
                .long("jitter-bounds")
                .value_names(["LOWER", "UPPER"])
                .num_args(2)
                .help("Bounds of the random factor applied to every duration")
                .global(true)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("curve")
                .long("curve")
                .help("Move the pointer along the configured curve, defaults if none is set")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-curve")
                .long("no-curve")
                .help("Move the pointer in straight lines unless a move asks otherwise")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("curve"),
        )
        .arg(
            Arg::new("no-wait")
                .long("no-wait")
                .help("Record waits in the trace instead of sleeping")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress output except errors")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .subcommand(Command::new("devices").about("List devices and show which ones get captured"))
        .subcommand(
            Command::new("press")
                .about("Press and release a key or mouse button")
                .arg(Arg::new("input").required(true).help("Key name, character or mouse:<button>"))
                .arg(
                    Arg::new("times")
                        .short('n')
                        .long("times")
                        .default_value("1")
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(millis_arg("duration", "How long each press lasts"))
                .arg(millis_arg("interval", "Pause between presses")),
        )
        .subcommand(
            Command::new("hold")
                .about("Hold a key or button; released after --duration or on Ctrl+C")
                .arg(Arg::new("input").required(true).help("Key name, character or mouse:<button>"))
                .arg(millis_arg("duration", "Release automatically after this long")),
        )
        .subcommand(
            Command::new("write")
                .about("Type text")
                .arg(Arg::new("text").required(true))
                .arg(
                    Arg::new("wpm")
                        .long("wpm")
                        .value_name("RATE")
                        .help("Typing speed in words per minute")
                        .value_parser(clap::value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("scroll")
                .about("Scroll the wheel")
                .arg(
                    Arg::new("direction")
                        .required(true)
                        .value_parser(["up", "down"]),
                )
                .arg(
                    Arg::new("times")
                        .short('n')
                        .long("times")
                        .default_value("1")
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(millis_arg("interval", "Pause between notches")),
        )
        .subcommand(
            coordinate_args(Command::new("move").about("Move the pointer with relative steps"))
                .arg(
                    Arg::new("straight")
                        .long("straight")
                        .help("Move in a straight line")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("random-curve")
                        .long("random-curve")
                        .help("Draw random control points for the curve")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("straight"),
                ),
        )
        .subcommand(coordinate_args(
            Command::new("set-pos").about("Place the pointer with one absolute move"),
        ))
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &ArgMatches) -> CliArgs {
    let mut args = CliArgs::default();

    args.config_file = matches.get_one::<PathBuf>("config").cloned();
    args.keyboard_filter = matches.get_one::<String>("keyboard-filter").cloned();
    args.mouse_filter = matches.get_one::<String>("mouse-filter").cloned();
    args.press_duration_ms = matches.get_one::<u64>("press-duration").copied();
    args.typing_interval_ms = matches.get_one::<u64>("typing-interval").copied();

    if let Some(bounds) = matches.get_many::<f64>("jitter-bounds") {
        if let [lower, upper] = bounds.copied().collect::<Vec<_>>()[..] {
            args.rand_factor_bounds = Some((lower, upper));
        }
    }

    if matches.get_flag("no-randomize") {
        args.randomize = Some(false);
    }

    if matches.get_flag("curve") {
        args.curved = Some(true);
    } else if matches.get_flag("no-curve") {
        args.curved = Some(false);
    }

    args
}

fn millis(matches: &ArgMatches, name: &str) -> Option<Duration> {
    matches
        .get_one::<u64>(name)
        .map(|ms| Duration::from_millis(*ms))
}

fn point(matches: &ArgMatches) -> Point {
    Point::new(
        matches.get_one::<i32>("x").copied().unwrap_or_default(),
        matches.get_one::<i32>("y").copied().unwrap_or_default(),
    )
}

fn input(matches: &ArgMatches) -> Result<InputId> {
    let name = matches
        .get_one::<String>("input")
        .ok_or_else(|| anyhow!("missing input"))?;
    name.parse::<InputId>()
        .with_context(|| format!("Unknown key or button '{}'", name))
}

/// Turn the chosen subcommand into an action
fn parse_action(matches: &ArgMatches) -> Result<Action> {
    let action = match matches.subcommand() {
        Some(("devices", _)) => Action::Devices,
        Some(("press", sub)) => Action::Press {
            input: input(sub)?,
            times: sub.get_one::<i32>("times").copied().unwrap_or(1),
            duration: millis(sub, "duration"),
            interval: millis(sub, "interval"),
        },
        Some(("hold", sub)) => Action::Hold {
            input: input(sub)?,
            duration: millis(sub, "duration"),
        },
        Some(("write", sub)) => Action::Write {
            text: sub.get_one::<String>("text").cloned().unwrap_or_default(),
            wpm: sub.get_one::<f64>("wpm").copied(),
        },
        Some(("scroll", sub)) => Action::Scroll {
            direction: sub
                .get_one::<String>("direction")
                .map(String::as_str)
                .unwrap_or("down")
                .parse()?,
            times: sub.get_one::<i32>("times").copied().unwrap_or(1),
            interval: millis(sub, "interval"),
        },
        Some(("move", sub)) => Action::Move {
            to: point(sub),
            curve: if sub.get_flag("straight") {
                CurveChoice::Straight
            } else if sub.get_flag("random-curve") {
                CurveChoice::Random
            } else {
                CurveChoice::Configured
            },
        },
        Some(("set-pos", sub)) => Action::SetPos { pos: point(sub) },
        _ => return Err(anyhow!("no subcommand given")),
    };
    Ok(action)
}

/// Initialize the tracing/logging subsystem
fn init_tracing(verbosity: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs go to stderr so stdout stays a clean JSON stream
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Devices the trace backend pretends are connected
fn trace_devices() -> Vec<DeviceInfo> {
    vec![
        DeviceInfo::new(
            DeviceHandle::new(1, DeviceClass::Keyboard),
            "HID\\VID_046D&PID_C31C&MI_00",
        ),
        DeviceInfo::new(
            DeviceHandle::new(2, DeviceClass::Keyboard),
            "HID\\VID_1532&PID_0203&MI_00",
        ),
        DeviceInfo::new(
            DeviceHandle::new(11, DeviceClass::Mouse),
            "HID\\VID_046D&PID_C077",
        ),
        DeviceInfo::new(
            DeviceHandle::new(12, DeviceClass::Mouse),
            "HID\\VID_1532&PID_0084&MI_00",
        ),
    ]
}

/// Run one action on the installed synthesizer; blocks for its waits
fn run_action(action: &Action, settings: &Settings) -> Result<()> {
    let synth = global::synthesizer()?;

    match action {
        Action::Devices => {
            for device in synth.arbitrator().list_devices() {
                println!("{}", serde_json::to_string(&device)?);
            }
            println!("{}", serde_json::to_string(&synth.devices())?);
        }
        Action::Press {
            input,
            times,
            duration,
            interval,
        } => global::press(*input, *times, *duration, *interval)?,
        Action::Hold { input, duration } => {
            global::hold(*input, *duration)?;
            if duration.is_some() {
                // The release happens on the timer thread
                while synth.is_held(*input) {
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
        }
        Action::Write { text, wpm } => {
            if let Some(wpm) = wpm {
                synth.set_timing(synth.timing().with_typing_wpm(*wpm));
            }
            global::write(text)?;
        }
        Action::Scroll {
            direction,
            times,
            interval,
        } => global::scroll(*direction, *times, *interval)?,
        Action::Move { to, curve } => {
            let params = match curve {
                CurveChoice::Straight => None,
                CurveChoice::Configured => settings.curve.clone(),
                CurveChoice::Random => {
                    let base = settings.curve.clone().unwrap_or_default();
                    Some(CurveParams {
                        easing: base.easing,
                        step_granularity: base.step_granularity,
                        min_steps: base.min_steps,
                        max_steps: base.max_steps,
                        step_interval_ms: base.step_interval_ms,
                        ..CurveParams::randomized()
                    })
                }
            };
            global::move_mouse_to(*to, params.as_ref())?;
        }
        Action::SetPos { pos } => global::set_mouse_pos(*pos)?,
    }

    Ok(())
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    init_tracing(verbosity, quiet);

    let cli_args = parse_cli_args(&matches);
    let settings = cli_args
        .load_settings()
        .context("Failed to load configuration")?;
    let action = parse_action(&matches)?;

    let sink = RecordingSink::new();
    let sleeper: Arc<dyn Sleeper> = if matches.get_flag("no-wait") {
        Arc::new(RecordingSleeper::attached_to(&sink))
    } else {
        Arc::new(ThreadSleeper)
    };

    let synth = InputSynthesizer::builder(
        Arc::new(sink.clone()),
        Arc::new(StaticEnumerator::new(trace_devices())),
    )
    .sleeper(sleeper)
    .timing(settings.timing.clone())
    .build();

    global::install(synth).map_err(|_| anyhow!("Synthesizer already installed"))?;

    let outcome = global::capture_input_devices(&settings.keyboard_filter, &settings.mouse_filter)
        .context("Failed to capture input devices")?;
    if !outcome.is_success() {
        warn!(%outcome, "continuing with partial device capture");
    }

    let worker = {
        let action = action.clone();
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || run_action(&action, &settings))
    };

    tokio::select! {
        result = worker => {
            result.context("Synthesis task panicked")??;
            if matches!(action, Action::Hold { duration: None, .. }) {
                info!("Holding, press Ctrl+C to release");
                signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;
                global::release_all()?;
            }
        }
        _ = signal::ctrl_c() => {
            warn!("Interrupted, releasing held inputs");
            global::release_all()?;
        }
    }

    for event in sink.timeline() {
        println!("{}", serde_json::to_string(&event)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use humanized_input::input::{MouseButton, NamedKey};

    #[test]
    fn test_cli_global_flags() {
        let matches = build_cli()
            .try_get_matches_from([
                "humanized-input",
                "--no-randomize",
                "--keyboard-filter",
                "Logitech",
                "--press-duration",
                "15",
                "devices",
            ])
            .unwrap();

        let args = parse_cli_args(&matches);
        assert_eq!(args.randomize, Some(false));
        assert_eq!(args.keyboard_filter.as_deref(), Some("Logitech"));
        assert_eq!(args.press_duration_ms, Some(15));
        assert_eq!(parse_action(&matches).unwrap(), Action::Devices);
    }

    #[test]
    fn test_cli_timing_and_curve_flags() {
        let matches = build_cli()
            .try_get_matches_from([
                "humanized-input",
                "--typing-interval",
                "45",
                "--jitter-bounds",
                "0.9",
                "1.1",
                "--no-curve",
                "write",
                "hi",
            ])
            .unwrap();

        let args = parse_cli_args(&matches);
        assert_eq!(args.typing_interval_ms, Some(45));
        assert_eq!(args.rand_factor_bounds, Some((0.9, 1.1)));
        assert_eq!(args.curved, Some(false));

        let settings = Settings::default().merge_with_args(&args);
        assert_eq!(settings.timing.typing_interval_ms, 45);
        assert_eq!(settings.timing.rand_factor_bounds, (0.9, 1.1));
        assert!(settings.curve.is_none());
    }

    #[test]
    fn test_cli_curve_flag() {
        let matches = build_cli()
            .try_get_matches_from(["humanized-input", "move", "10", "20", "--curve"])
            .unwrap();
        assert_eq!(parse_cli_args(&matches).curved, Some(true));
        assert_eq!(parse_cli_args(&matches).rand_factor_bounds, None);

        assert!(build_cli()
            .try_get_matches_from(["humanized-input", "--curve", "--no-curve", "devices"])
            .is_err());
        assert!(build_cli()
            .try_get_matches_from(["humanized-input", "--jitter-bounds", "0.9", "devices"])
            .is_err());
    }

    #[test]
    fn test_cli_press() {
        let matches = build_cli()
            .try_get_matches_from(["humanized-input", "press", "mouse:left", "-n", "3"])
            .unwrap();

        assert_eq!(
            parse_action(&matches).unwrap(),
            Action::Press {
                input: MouseButton::Left.into(),
                times: 3,
                duration: None,
                interval: None,
            }
        );
    }

    #[test]
    fn test_cli_hold_with_duration() {
        let matches = build_cli()
            .try_get_matches_from(["humanized-input", "hold", "shift", "--duration", "200"])
            .unwrap();

        assert_eq!(
            parse_action(&matches).unwrap(),
            Action::Hold {
                input: NamedKey::Shift.into(),
                duration: Some(Duration::from_millis(200)),
            }
        );
    }

    #[test]
    fn test_cli_unknown_key() {
        let matches = build_cli()
            .try_get_matches_from(["humanized-input", "press", "hyper"])
            .unwrap();
        assert!(parse_action(&matches).is_err());
    }

    #[test]
    fn test_cli_move() {
        let matches = build_cli()
            .try_get_matches_from(["humanized-input", "move", "-20", "300", "--straight"])
            .unwrap();

        assert_eq!(
            parse_action(&matches).unwrap(),
            Action::Move {
                to: Point::new(-20, 300),
                curve: CurveChoice::Straight,
            }
        );
    }

    #[test]
    fn test_cli_conflicts() {
        let result = build_cli().try_get_matches_from([
            "humanized-input",
            "move",
            "1",
            "2",
            "--straight",
            "--random-curve",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(build_cli().try_get_matches_from(["humanized-input"]).is_err());
    }
}
