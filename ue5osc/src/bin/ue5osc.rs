//! Command-line front end for a running engine.
//!
//! Sends one command and prints the reply, if any.
//!
//! # Usage
//!
//! ```sh
//! ue5osc --engine 127.0.0.1:7447 --listen 127.0.0.1:7001 location
//! ue5osc yaw 90
//! ue5osc screenshot 'C:\captures\frame.png'
//! ```

use std::process::ExitCode;
use std::time::Duration;

use ue5osc::osc::address;
use ue5osc::{Communicator, CommunicatorConfig, Endpoint, Error, Location, Resolution, Rotation};

/// Default wait for request replies, in seconds.
const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// One parsed invocation.
#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    config: CommunicatorConfig,
    timeout: Duration,
    action: Action,
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Project,
    Location,
    Rotation,
    SetLocation(f32, f32, f32),
    Yaw(f32),
    Forward(f32),
    Backward(f32),
    Left(f32),
    Right(f32),
    Resolution(Resolution),
    Screenshot(String),
    Reset,
    Console(String),
    SwitchView,
    Quality(u8),
    Help,
}

fn main() -> ExitCode {
    ue5osc::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("ue5osc: {e}");
            eprintln!("run `ue5osc --help` for usage");
            return ExitCode::from(2);
        }
    };

    if invocation.action == Action::Help {
        print_usage();
        return ExitCode::SUCCESS;
    }

    match run(invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ue5osc: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(invocation: Invocation) -> Result<(), Error> {
    let Invocation {
        config,
        timeout,
        action,
    } = invocation;
    let comm = Communicator::connect(config)?;

    match action {
        Action::Project => {
            let name = comm
                .send_and_wait_timeout(address::GET_PROJECT, timeout)?
                .into_string()?;
            println!("{name}");
        }
        Action::Location => {
            let reply = comm.send_and_wait_timeout(address::GET_LOCATION, timeout)?;
            println!("{}", Location::try_from(reply)?);
        }
        Action::Rotation => {
            let reply = comm.send_and_wait_timeout(address::GET_ROTATION, timeout)?;
            println!("{}", Rotation::try_from(reply)?);
        }
        Action::Yaw(yaw) => {
            // Bounded variant of Communicator::set_yaw.
            let reply = comm.send_and_wait_timeout(address::GET_ROTATION, timeout)?;
            comm.set_rotation(Rotation::try_from(reply)?.with_yaw(yaw))?;
        }
        Action::SetLocation(x, y, z) => comm.set_location(x, y, z)?,
        Action::Forward(d) => comm.move_forward(d)?,
        Action::Backward(d) => comm.move_backward(d)?,
        Action::Left(deg) => comm.rotate_left(deg)?,
        Action::Right(deg) => comm.rotate_right(deg)?,
        Action::Resolution(res) => comm.set_resolution(res)?,
        Action::Screenshot(path) => comm.save_image(path)?,
        Action::Reset => comm.reset()?,
        Action::Console(cmd) => comm.console(&cmd)?,
        Action::SwitchView => comm.switch_camera()?,
        Action::Quality(level) => comm.set_quality(level)?,
        Action::Help => {}
    }
    Ok(())
}

/// Parses `argv` (program name included).
fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let mut config = CommunicatorConfig::default();
    let mut timeout = Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--engine" | "-e" => {
                config.engine_addr = parse_endpoint(value_of(args, &mut i, "--engine")?)?;
            }
            "--listen" | "-l" => {
                config.listen_addr = parse_endpoint(value_of(args, &mut i, "--listen")?)?;
            }
            "--timeout" | "-t" => {
                let secs: f64 = parse_number(value_of(args, &mut i, "--timeout")?)?;
                timeout = Duration::try_from_secs_f64(secs)
                    .map_err(|_| format!("invalid timeout: {secs}"))?;
            }
            "--no-settle" => config = config.without_settle(),
            "--help" | "-h" => {
                return Ok(Invocation {
                    config,
                    timeout,
                    action: Action::Help,
                });
            }
            flag if flag.starts_with('-') && flag.parse::<f64>().is_err() => {
                return Err(format!("unknown option: {flag}"));
            }
            _ => break,
        }
        i += 1;
    }

    let Some(command) = args.get(i) else {
        return Err("missing command".into());
    };
    let rest = &args[i + 1..];
    let action = parse_action(command, rest)?;
    Ok(Invocation {
        config,
        timeout,
        action,
    })
}

fn parse_action(command: &str, rest: &[String]) -> Result<Action, String> {
    let expect = |n: usize| {
        if rest.len() == n {
            Ok(())
        } else {
            Err(format!("`{command}` takes {n} argument(s), got {}", rest.len()))
        }
    };
    let number = |idx: usize| parse_number::<f32>(&rest[idx]);

    let action = match command {
        "project" => expect(0).map(|()| Action::Project)?,
        "location" => expect(0).map(|()| Action::Location)?,
        "rotation" => expect(0).map(|()| Action::Rotation)?,
        "set-location" => {
            expect(3)?;
            Action::SetLocation(number(0)?, number(1)?, number(2)?)
        }
        "yaw" => {
            expect(1)?;
            Action::Yaw(number(0)?)
        }
        "forward" => {
            expect(1)?;
            Action::Forward(number(0)?)
        }
        "backward" => {
            expect(1)?;
            Action::Backward(number(0)?)
        }
        "left" => {
            expect(1)?;
            Action::Left(number(0)?)
        }
        "right" => {
            expect(1)?;
            Action::Right(number(0)?)
        }
        "resolution" => {
            expect(1)?;
            Action::Resolution(rest[0].parse().map_err(|e: Error| e.to_string())?)
        }
        "screenshot" => {
            expect(1)?;
            Action::Screenshot(rest[0].clone())
        }
        "reset" => expect(0).map(|()| Action::Reset)?,
        "console" => {
            if rest.is_empty() {
                return Err("`console` needs a command".into());
            }
            Action::Console(rest.join(" "))
        }
        "switch-view" => expect(0).map(|()| Action::SwitchView)?,
        "quality" => {
            expect(1)?;
            Action::Quality(parse_number(&rest[0])?)
        }
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(action)
}

fn value_of<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn parse_endpoint(s: &str) -> Result<Endpoint, String> {
    s.parse().map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn parse_number<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("invalid number: {s:?}"))
}

fn print_usage() {
    eprintln!(
        r#"ue5osc - send one OSC command to an Unreal Engine 5 simulation

USAGE:
    ue5osc [OPTIONS] <COMMAND> [ARGS]

OPTIONS:
    -e, --engine <ADDR>     Engine OSC address (default: 127.0.0.1:7447)
    -l, --listen <ADDR>     Local address for replies (default: 127.0.0.1:7001)
    -t, --timeout <SECS>    Wait for replies at most this long (default: 5)
        --no-settle         Skip the pause after screenshot and reset
    -h, --help              Print this help message

COMMANDS:
    project                 Print the project name
    location                Print the player location
    rotation                Print the player rotation
    set-location X Y Z      Teleport the player
    yaw DEG                 Set yaw, keeping pitch and roll
    forward D | backward D  Move along the facing direction
    left DEG | right DEG    Turn in place
    resolution WxH          Set the screenshot resolution
    screenshot PATH         Save a screenshot on the engine host
    reset                   Return to the start location
    console CMD...          Run an engine console command
    switch-view             Toggle the camera view
    quality 0-4             Set the graphics quality level

ENVIRONMENT:
    RUST_LOG                Log filter when built with --features tracing
"#
    );
}
