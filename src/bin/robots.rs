//! Robots CLI — inspect configuration and run the reference scenario
//!
//! Commands:
//!   robots demo   [config.json]  — mint, trade, breed and burn on a manual clock
//!   robots config [config.json]  — print the effective configuration
//!   robots help                  — show usage

use robots_core::{Address, ManualClock, Registry, RegistryConfig, RegistryError};
use std::env;
use std::process::ExitCode;

fn print_usage() {
    println!(
        r#"
Crypto Robots — registry of owned, breedable robots

Usage: robots <command> [options]

Commands:
  demo   [config.json]   Run the reference scenario and print enumeration state
  config [config.json]   Print the effective configuration as JSON
  help                   Show this message

Logging is controlled with RUST_LOG (default: info).
"#
    );
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let config = match load_config(args.get(2)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("  {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args[1].as_str() {
        "demo" => match cmd_demo(config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("  Demo failed: {}", e);
                ExitCode::FAILURE
            }
        },
        "config" => cmd_config(&config),
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&String>) -> Result<RegistryConfig, robots_core::ConfigError> {
    match path {
        Some(path) => RegistryConfig::load(path),
        None => Ok(RegistryConfig::default()),
    }
}

fn cmd_config(config: &RegistryConfig) -> ExitCode {
    match serde_json::to_string_pretty(config) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("  Failed to render config: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_state(reg: &Registry<ManualClock>, holder: &Address) -> Result<(), RegistryError> {
    let q = reg.query();
    let global: Vec<_> = q.all_active()?.iter().map(|r| r.id).collect();
    let held: Vec<_> = q.all_active_of(holder)?.iter().map(|r| r.id).collect();
    println!("  total supply: {}", q.total_supply());
    println!("  global order: {:?}", global);
    println!("  {} holds:  {:?}", holder, held);
    Ok(())
}

fn cmd_demo(config: RegistryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let clock = ManualClock::default();
    let admin = config.admin.clone();
    let player1 = Address::new("player1");
    let maturity = config.maturity.genesis_secs.max(config.maturity.offspring_secs);
    let mut reg = Registry::with_clock(config, clock.clone())?;

    println!("\n  == Minting 10 robots ==");
    for _ in 0..10 {
        reg.mint(&admin, &admin)?;
        clock.advance_secs(maturity + 1);
    }
    for id in 2..=4 {
        reg.transfer_from(&admin, &admin, &player1, id)?;
    }
    print_state(&reg, &player1)?;

    println!("\n  == Rejected operations ==");
    for (what, result) in [
        ("mint by player1", reg.mint(&player1, &player1).map(|_| ())),
        ("breed 77 x 99", reg.breed(&admin, 77, 99).map(|_| ())),
        ("breed 1 x 2 by admin", reg.breed(&admin, 1, 2).map(|_| ())),
    ] {
        if let Err(e) = result {
            println!("  {:<22} -> {} ({})", what, e.code(), e);
        }
    }

    println!("\n  == Breeding 2 x 3 ==");
    let child = reg.breed(&player1, 2, 3)?;
    println!("  {}", reg.query().robot(child)?.summary());
    print_state(&reg, &player1)?;

    println!("\n  == Burning 1, 2, 4 ==");
    for id in [1, 2, 4] {
        reg.burn(&admin, id)?;
    }
    print_state(&reg, &player1)?;
    println!("  {}", reg.query().robot(4)?.summary());

    reg.verify_integrity()?;
    let stats = reg.query().stats();
    println!(
        "\n  {} minted, {} burned, {} holders, {} events",
        stats.ever_minted,
        stats.burned,
        stats.holders,
        reg.events().len()
    );
    Ok(())
}
