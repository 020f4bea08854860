//! Remote simulator - drive a configured remote from the terminal
//!
//! Reads action strings from stdin, feeds them to the remote's worker and
//! applies the resulting commands to in-memory lights.
//!
//! ## Command line flags
//!
//! - `--config PATH`: remotes file (default `~/.config/hue-remote/remotes.yaml`)
//! - `--remote NAME`: remote that receives input (default: first configured)

mod input;

use std::collections::HashSet;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};

use input::{parse_line, InputLine};
use remote_core::{
    default_config_path, default_profile, load_config, ActionEvent, LightTarget, MemoryLights,
    RemoteCore, RemoteProfile, RemoteWorker, RemotesConfig,
};

struct Args {
    config_path: PathBuf,
    remote: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config_path: default_config_path(),
        remote: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config_path = iter.next().context("--config needs a path")?.into();
            }
            "--remote" => {
                args.remote = Some(iter.next().context("--remote needs a name")?);
            }
            other => bail!("Unknown argument '{}'", other),
        }
    }
    Ok(args)
}

/// Single demo remote used when the config file has none
fn demo_config() -> RemotesConfig {
    RemotesConfig {
        remotes: vec![RemoteProfile {
            name: "demo".to_string(),
            targets: vec![LightTarget::full(1, 2, 3), LightTarget::switch(4)],
            ..RemoteProfile::default()
        }],
    }
}

/// Build the simulated backend holding every variable and zone the remotes reference
fn build_lights(config: &RemotesConfig) -> MemoryLights {
    let mut lights = MemoryLights::new();
    let mut zones = HashSet::new();

    for profile in &config.remotes {
        let neutral = u32::try_from(profile.color_temp.neutral).unwrap_or(0);
        for target in &profile.targets {
            lights.seed_target(target, neutral);
        }
        if let Some(zone) = profile.automation_zone {
            if zones.insert(zone) {
                lights.add_zone(zone, true, profile.targets.clone());
                log::info!("Simulating automation zone {} (enabled)", zone);
            }
        }
    }

    lights
}

fn print_state(lights: &MemoryLights, config: &RemotesConfig) {
    for (var, value) in lights.snapshot() {
        println!("  {} = {:?}", var, value);
    }
    let mut seen = HashSet::new();
    for zone in config.remotes.iter().filter_map(|p| p.automation_zone) {
        if !seen.insert(zone) {
            continue;
        }
        if let Some(z) = lights.zone(zone) {
            println!("  zone {} enabled={}", zone, z.is_enabled());
            for line in z.event_log() {
                println!("    {}", line);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args()?;
    log::info!("remote-sim starting up");

    let mut config = load_config(&args.config_path);
    if config.remotes.is_empty() {
        log::info!("No remotes configured, using built-in demo remote");
        config = demo_config();
    }

    for profile in &mut config.remotes {
        if profile.button_map.is_empty() && profile.enable_default_profile {
            log::info!("[remote {}] Installing default profile", profile.name);
            profile.button_map = default_profile(profile.short_dim_step);
        }
    }

    let selected = match &args.remote {
        Some(name) => config
            .remote(name)
            .with_context(|| format!("No remote named '{}' in {:?}", name, args.config_path))?
            .name
            .clone(),
        None => config.remotes[0].name.clone(),
    };

    let lights = Arc::new(build_lights(&config));
    let workers: Vec<RemoteWorker> = config
        .remotes
        .iter()
        .map(|profile| RemoteWorker::spawn(RemoteCore::new(profile.clone(), lights.clone())))
        .collect();
    let Some(worker) = workers.iter().find(|w| w.name() == selected) else {
        bail!("Remote '{}' did not start", selected);
    };

    println!("Driving remote '{}'. Type action strings, :state, :default, :do <cmd> [param] or :quit", selected);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let parsed = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match parsed {
            InputLine::Empty => {}
            InputLine::Quit => break,
            InputLine::State => print_state(&lights, &config),
            InputLine::LoadDefaultProfile => worker.load_default_profile()?,
            InputLine::Action { raw, duration_secs } => {
                worker.action_changed(ActionEvent::with_duration(raw, duration_secs))?
            }
            InputLine::Request { command, param } => match worker.request(&command, param) {
                Ok(()) => println!("ok"),
                Err(e) => eprintln!("{}", e),
            },
        }
    }

    log::info!("remote-sim shutting down");
    drop(workers);
    Ok(())
}
