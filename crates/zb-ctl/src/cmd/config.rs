//! Persisted configuration commands.

use anyhow::{Context, Result};

use super::context::load_config;

pub fn cmd_show() -> Result<()> {
    let config = load_config()?;
    println!("═══════════════════════════════════════");
    println!("  zb-harness configuration");
    println!("═══════════════════════════════════════");
    println!("  file             : {}", zb_harness::config::HarnessConfig::file_path().display());
    println!("  coordinator host : {}", config.coordinator.host);
    println!("  coordinator port : {}", config.coordinator.port);
    match config.dut.node_id {
        Some(id) => println!("  DUT node id      : 0x{id:04X}"),
        None => println!("  DUT node id      : (unset)"),
    }
    match &config.dut.ieee_address {
        Some(addr) => println!("  DUT IEEE address : {addr}"),
        None => println!("  DUT IEEE address : (unset)"),
    }
    if config.schema.xml_paths.is_empty() {
        println!("  schema files     : (none)");
    } else {
        println!("  schema files     :");
        for path in &config.schema.xml_paths {
            println!("    - {}", path.display());
        }
    }
    Ok(())
}

pub fn cmd_set_coordinator(host: &str, port: u16) -> Result<()> {
    let mut config = load_config()?;
    config.coordinator.host = host.to_string();
    config.coordinator.port = port;
    config.save().context("failed to save config")?;
    println!("Saved coordinator address {host}:{port}");
    Ok(())
}

pub fn cmd_set_dut(node_id_hex: &str, ieee_hex: &str) -> Result<()> {
    let node_id = u16::from_str_radix(node_id_hex.trim_start_matches("0x"), 16)
        .context("node id must be a hex value, e.g. 0xBEEF")?;
    let mut config = load_config()?;
    config.dut.node_id = Some(node_id);
    config.dut.ieee_address = Some(ieee_hex.to_string());
    config.save().context("failed to save config")?;
    println!("Saved DUT identity: node 0x{node_id:04X}, ieee {ieee_hex}");
    Ok(())
}
