//! Attribute read/write commands.

use std::time::Duration;

use anyhow::{Context, Result};

use super::context::{connect, dut_node_id, load_config, load_schema, parse_value};

pub fn cmd_read(cluster_name: &str, attribute_name: &str, timeout_secs: u64) -> Result<()> {
    let config = load_config()?;
    let schema = load_schema(&config)?;
    let destination = dut_node_id(&config)?;
    let cluster = schema.cluster(cluster_name)?;
    let attribute = cluster.attribute(attribute_name)?;

    let mut controller = connect(&config)?;
    let value = controller
        .read_attribute(destination, attribute, Duration::from_secs(timeout_secs))
        .context("attribute read failed")?;

    println!("{}.{} = {:?}", cluster.name, attribute.name, value);
    Ok(())
}

pub fn cmd_write(cluster_name: &str, attribute_name: &str, raw_value: &str) -> Result<()> {
    let config = load_config()?;
    let schema = load_schema(&config)?;
    let destination = dut_node_id(&config)?;
    let cluster = schema.cluster(cluster_name)?;
    let attribute = cluster.attribute(attribute_name)?;
    let value = parse_value(attribute.r#type, raw_value)?;

    let mut controller = connect(&config)?;
    controller
        .write_attribute(destination, attribute, &value)
        .context("attribute write failed")?;

    println!("Wrote {}.{} = {:?}", cluster.name, attribute.name, value);
    Ok(())
}
