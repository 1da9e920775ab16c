//! Shared door-lock schema fixture for the integration scenarios. This
//! is a small excerpt of a real ZCL door-lock cluster XML: just enough
//! surface (one enum, one attribute, one command) to drive the
//! end-to-end wire path.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use zcl_core::Schema;

pub const DOOR_LOCK_XML: &str = r#"<?xml version="1.0"?>
<configurator>
  <cluster>
    <name>Door Lock</name>
    <define>DOOR_LOCK_CLUSTER</define>
    <code>0x0101</code>
    <attribute code="0x0000" type="ENUM8">LockState</attribute>
    <command name="SetPin" code="0x00">
      <arg name="user_id" type="INT16U"/>
      <arg name="user_status" type="ENUM8"/>
      <arg name="user_type" type="ENUM8"/>
      <arg name="user_access" type="ENUM8"/>
      <arg name="pin" type="CHAR_STRING"/>
    </command>
  </cluster>
  <enum name="LockState">
    <item name="NotFullyLocked" value="0x00"/>
    <item name="Locked" value="0x01"/>
    <item name="Unlocked" value="0x02"/>
  </enum>
</configurator>
"#;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Writes `DOOR_LOCK_XML` to a uniquely named temp file and loads it
/// into a `Schema`. The file is removed when the returned guard drops.
pub struct LoadedSchema {
    pub schema: Schema,
    _path: TempFile,
}

pub fn load_door_lock() -> LoadedSchema {
    let tmp = TempFile::new(DOOR_LOCK_XML);
    let schema = zcl_core::load_files(&[&tmp.path]).expect("door-lock fixture must parse");
    LoadedSchema { schema, _path: tmp }
}

pub struct TempFile {
    pub path: std::path::PathBuf,
}

impl TempFile {
    pub fn new(contents: &str) -> Self {
        let mut path = std::env::temp_dir();
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        path.push(format!("zb-harness-integration-{}-{}.xml", std::process::id(), n));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        Self { path }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
