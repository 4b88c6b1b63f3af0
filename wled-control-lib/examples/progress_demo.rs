use std::env;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{Context, Result};
use wled_control_lib::control_interface::{ControlInterface, EffectOptions};

// Usage: progress_demo <host>        (HTTP, port 80)
//        progress_demo --serial <port>
fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut control = match args.as_slice() {
        [flag, port] if flag == "--serial" => ControlInterface::serial(port, 115_200)
            .with_context(|| format!("Failed to open {}", port))?,
        [host] => ControlInterface::http(host, 80)
            .with_context(|| format!("Failed to connect to {}", host))?,
        _ => anyhow::bail!("usage: progress_demo <host> | progress_demo --serial <port>"),
    };

    let result = run(&mut control);
    control.close();
    result
}

fn run(control: &mut ControlInterface) -> Result<()> {
    let info = control.get_info()?;
    println!("Connected to {} with {} LEDs", info.name, control.led_count());

    control.clear()?;
    println!("Setting full strip to green...");
    control.set_full_color("green")?;
    sleep(Duration::from_secs(2));

    println!("Setting progress from 0% to 30% (blue)...");
    control.set_progress(0.0, 30.0, "blue")?;
    sleep(Duration::from_secs(2));

    println!("Adding 30% progress (red)...");
    control.add_progress(30.0, "red")?;
    sleep(Duration::from_secs(1));

    println!("Adding 40% progress (purple)...");
    control.add_progress(40.0, "purple")?;
    sleep(Duration::from_secs(1));

    println!("Changing progress direction to right-to-left...");
    control.set_progress_direction(false);
    control.clear()?;
    sleep(Duration::from_secs(1));

    println!("Setting reverse progress from 0% to 30% (yellow)...");
    control.set_progress(0.0, 30.0, "yellow")?;
    sleep(Duration::from_secs(1));

    println!("Adding 40% reverse progress (cyan)...");
    control.add_progress(40.0, "cyan")?;
    sleep(Duration::from_secs(1));

    println!("Setting 50% of LEDs active...");
    control.set_on_percentage(50.0, "orange", "black")?;
    sleep(Duration::from_secs(2));

    println!("Running rainbow effect...");
    control.set_full_color("white")?;
    control.set_effect(
        "rainbow",
        &EffectOptions {
            speed: 200,
            ..Default::default()
        },
    )?;
    sleep(Duration::from_secs(3));

    control.clear()?;
    Ok(())
}
