//! zb-ctl — command-line interface for the ZCL test harness.
//!
//! Deliberately thin: every command below loads the persisted
//! `HarnessConfig`, opens a `TcpTransport` to the coordinator console,
//! and calls straight into `zb-harness`/`zcl-core`. It is the
//! "interactive console glue" spec.md treats as an external
//! collaborator — it is not itself part of the specified core, and the
//! only state it owns is the config file on disk.

mod cmd;

use anyhow::{Context, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn print_usage() {
    println!("Usage: zb-ctl <command>");
    println!();
    println!("Config");
    println!("  config show                                Show resolved configuration");
    println!("  config set-coordinator <host> <port>       Persist coordinator address");
    println!("  config set-dut <node_id_hex> <ieee_hex>    Persist DUT identity");
    println!();
    println!("Schema");
    println!("  schema add <xml-path>                      Add an XML schema file to load");
    println!("  schema clusters                            List clusters in the configured schema");
    println!("  schema commands <cluster>                  List a cluster's commands");
    println!("  schema attributes <cluster>                List a cluster's attributes");
    println!();
    println!("Network");
    println!("  network form [channel] [power] [pan_id]    Form a network (defaults: 19 0 0xFAFA)");
    println!("  network leave                              Leave the current network");
    println!("  network pjoin enable|disable                Toggle permit-join");
    println!("  network join                                Prompt for inclusion, wait, persist DUT node id");
    println!();
    println!("Attributes");
    println!("  attr read <cluster> <attribute>             Read an attribute from the DUT");
    println!("  attr write <cluster> <attribute> <value>    Write an attribute on the DUT");
    println!();
    println!("Commands");
    println!("  send <cluster> <command> [args...]          Send a ZCL command to the DUT");
    println!();
    println!("Examples:");
    println!("  zb-ctl config set-coordinator 127.0.0.1 4900");
    println!("  zb-ctl schema add ./zcl/door-lock.xml");
    println!("  zb-ctl network form");
    println!("  zb-ctl network join");
    println!("  zb-ctl send door_lock set_pin 7 1 1 4 1234");
    println!("  zb-ctl attr read door_lock lock_state");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    match refs.as_slice() {
        ["config", "show"] => cmd::config::cmd_show(),
        ["config", "set-coordinator", host, port] => {
            let port: u16 = port.parse().context("port must be a number")?;
            cmd::config::cmd_set_coordinator(host, port)
        }
        ["config", "set-dut", node_id, ieee] => cmd::config::cmd_set_dut(node_id, ieee),

        ["schema", "add", path] => cmd::schema::cmd_add(path),
        ["schema", "clusters"] => cmd::schema::cmd_clusters(),
        ["schema", "commands", cluster] => cmd::schema::cmd_commands(cluster),
        ["schema", "attributes", cluster] => cmd::schema::cmd_attributes(cluster),

        ["network", "form"] => cmd::network::cmd_form(19, 0, 0xFAFA),
        ["network", "form", channel] => {
            cmd::network::cmd_form(channel.parse().context("channel must be a number")?, 0, 0xFAFA)
        }
        ["network", "form", channel, power] => cmd::network::cmd_form(
            channel.parse().context("channel must be a number")?,
            power.parse().context("power must be a number")?,
            0xFAFA,
        ),
        ["network", "form", channel, power, pan_id] => cmd::network::cmd_form(
            channel.parse().context("channel must be a number")?,
            power.parse().context("power must be a number")?,
            parse_u16(pan_id)?,
        ),
        ["network", "leave"] => cmd::network::cmd_leave(),
        ["network", "pjoin", "enable"] => cmd::network::cmd_pjoin(true),
        ["network", "pjoin", "disable"] => cmd::network::cmd_pjoin(false),
        ["network", "join"] => cmd::network::cmd_join(DEFAULT_TIMEOUT_SECS),

        ["attr", "read", cluster, attribute] => cmd::attr::cmd_read(cluster, attribute, DEFAULT_TIMEOUT_SECS),
        ["attr", "write", cluster, attribute, value] => cmd::attr::cmd_write(cluster, attribute, value),

        ["send", cluster, command, rest @ ..] => cmd::send::cmd_send(cluster, command, rest),

        ["help"] | ["--help"] | ["-h"] | [] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn parse_u16(raw: &str) -> Result<u16> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).context("expected a hex number")
    } else {
        raw.parse().context("expected a number")
    }
}
