//! Schema inspection commands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::context::{load_config, load_schema};

pub fn cmd_add(path: &str) -> Result<()> {
    let mut config = load_config()?;
    config.schema.xml_paths.push(PathBuf::from(path));
    config.save().context("failed to save config")?;
    println!("Added schema file: {path}");
    Ok(())
}

pub fn cmd_clusters() -> Result<()> {
    let config = load_config()?;
    let schema = load_schema(&config)?;
    let mut clusters: Vec<_> = schema.clusters.values().collect();
    clusters.sort_by_key(|c| c.code);

    println!("═══════════════════════════════════════");
    println!("  Clusters ({})", clusters.len());
    println!("═══════════════════════════════════════");
    for cluster in clusters {
        println!(
            "  0x{:04X}  {:<24} {} command(s), {} attribute(s)",
            cluster.code,
            cluster.name,
            cluster.commands.len(),
            cluster.attributes.len()
        );
    }
    Ok(())
}

pub fn cmd_commands(cluster_name: &str) -> Result<()> {
    let config = load_config()?;
    let schema = load_schema(&config)?;
    let cluster = schema.cluster(cluster_name)?;

    let mut commands: Vec<_> = cluster.commands.values().collect();
    commands.sort_by_key(|c| c.code);

    println!("═══════════════════════════════════════");
    println!("  {} commands ({})", cluster.name, commands.len());
    println!("═══════════════════════════════════════");
    for cmd in commands {
        let params = cmd
            .params
            .iter()
            .map(|p| format!("{}: {:?}", p.name, p.r#type))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  0x{:02X}  {}({})", cmd.code, cmd.name, params);
    }
    Ok(())
}

pub fn cmd_attributes(cluster_name: &str) -> Result<()> {
    let config = load_config()?;
    let schema = load_schema(&config)?;
    let cluster = schema.cluster(cluster_name)?;

    let mut attrs: Vec<_> = cluster.attributes.values().collect();
    attrs.sort_by_key(|a| a.code);

    println!("═══════════════════════════════════════");
    println!("  {} attributes ({})", cluster.name, attrs.len());
    println!("═══════════════════════════════════════");
    for attr in attrs {
        println!("  0x{:04X}  {:<24} {:?}", attr.code, attr.name, attr.r#type);
    }
    Ok(())
}
