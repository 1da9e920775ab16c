//! Shared setup helpers: load the persisted config, open a transport,
//! and load the configured schema files. Every `cmd::*` entry point
//! starts from one of these.

use anyhow::{Context, Result};
use zb_harness::config::HarnessConfig;
use zb_harness::controller::Controller;
use zb_harness::transport::TcpTransport;
use zcl_core::{DataType, Schema, Value};

pub fn load_config() -> Result<HarnessConfig> {
    HarnessConfig::load().context("failed to load zb-harness config")
}

pub fn connect(config: &HarnessConfig) -> Result<Controller<TcpTransport>> {
    let transport = TcpTransport::connect(&config.coordinator.host, config.coordinator.port)
        .with_context(|| {
            format!(
                "failed to connect to coordinator console at {}:{} — is it listening?",
                config.coordinator.host, config.coordinator.port
            )
        })?;
    Ok(Controller::new(transport))
}

pub fn load_schema(config: &HarnessConfig) -> Result<Schema> {
    if config.schema.xml_paths.is_empty() {
        anyhow::bail!("no schema XML files configured — run `zb-ctl schema add <path>` first");
    }
    zcl_core::load_files(&config.schema.xml_paths).context("failed to load ZCL schema")
}

pub fn dut_node_id(config: &HarnessConfig) -> Result<u16> {
    config
        .dut
        .node_id
        .context("no DUT node id configured — run `zb-ctl network join` or `zb-ctl config set-dut`")
}

/// Parses one CLI argument string into a `Value` under `ty`, for the
/// `send`/`attr write` commands. Numeric types accept decimal or
/// `0x`-prefixed hex; `CHAR_STRING` takes the raw text; `OCTET_STRING`
/// takes a comma-separated byte list.
pub fn parse_value(ty: DataType, raw: &str) -> Result<Value> {
    use zcl_core::StorageClass;
    Ok(match ty.storage_class() {
        StorageClass::Bool => Value::Bool(matches!(raw, "1" | "true" | "yes")),
        StorageClass::Text => Value::Text(raw.to_string()),
        StorageClass::Bytes => {
            let bytes = raw
                .split(',')
                .map(|b| parse_int(b.trim()).map(|v| v as u8))
                .collect::<Result<Vec<u8>>>()
                .with_context(|| format!("invalid byte list {raw:?}"))?;
            Value::Bytes(bytes)
        }
        StorageClass::Float => Value::Float(raw.parse().with_context(|| format!("invalid float {raw:?}"))?),
        StorageClass::Signed => Value::Signed(
            raw.parse()
                .with_context(|| format!("invalid signed integer {raw:?}"))?,
        ),
        StorageClass::Unsigned => Value::Unsigned(parse_int(raw)?),
    })
}

fn parse_int(raw: &str) -> Result<u64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).with_context(|| format!("invalid hex number {raw:?}"))
    } else {
        raw.parse().with_context(|| format!("invalid number {raw:?}"))
    }
}
