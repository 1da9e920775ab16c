//! Command-dispatch command: binds a schema prototype to CLI-supplied
//! positional arguments and sends it to the configured DUT.

use anyhow::{Context, Result};

use super::context::{connect, dut_node_id, load_config, load_schema, parse_value};

pub fn cmd_send(cluster_name: &str, command_name: &str, raw_args: &[&str]) -> Result<()> {
    let config = load_config()?;
    let schema = load_schema(&config)?;
    let destination = dut_node_id(&config)?;
    let cluster = schema.cluster(cluster_name)?;
    let proto = cluster.command(command_name)?;

    if raw_args.len() != proto.params.len() {
        anyhow::bail!(
            "{} takes {} argument(s) ({}), {} given",
            proto.name,
            proto.params.len(),
            proto
                .params
                .iter()
                .map(|p| format!("{}: {:?}", p.name, p.r#type))
                .collect::<Vec<_>>()
                .join(", "),
            raw_args.len()
        );
    }

    let values = proto
        .params
        .iter()
        .zip(raw_args)
        .map(|(param, raw)| parse_value(param.r#type, raw))
        .collect::<Result<Vec<_>>>()?;

    let invocation = zcl_core::bind(proto, values).context("failed to bind command arguments")?;

    let mut controller = connect(&config)?;
    controller
        .send_zcl_command(destination, &invocation)
        .context("send failed")?;

    println!("Sent {}.{} to 0x{destination:04X}", cluster.name, proto.name);
    Ok(())
}
