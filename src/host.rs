//! Symbols this binary publishes about itself.

use std::{
    env,
    mem::{offset_of, size_of},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use crate::{
    diagnostics::Diagnostic,
    symbols::{Signature, SymbolRegistry},
    value::{ScalarType, TypeDescriptor, Value, ValueType},
};

pub const NAMESPACE: &str = "burrow/host";

#[repr(C)]
pub struct BuildInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub debug: bool,
    #[allow(dead_code)]
    checksum: u16,
}

pub static BUILD_INFO: BuildInfo = BuildInfo {
    major: parse_version(env!("CARGO_PKG_VERSION_MAJOR")),
    minor: parse_version(env!("CARGO_PKG_VERSION_MINOR")),
    patch: parse_version(env!("CARGO_PKG_VERSION_PATCH")),
    debug: cfg!(debug_assertions),
    checksum: 0xb0_77,
};

const fn parse_version(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let mut value = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        value = value * 10 + (bytes[idx] - b'0') as u32;
        idx += 1;
    }
    value
}

pub fn build_info_type() -> TypeDescriptor {
    TypeDescriptor::new(NAMESPACE, "BuildInfo", size_of::<BuildInfo>())
        .with_field("major", offset_of!(BuildInfo, major), ScalarType::U32, true)
        .with_field("minor", offset_of!(BuildInfo, minor), ScalarType::U32, true)
        .with_field("patch", offset_of!(BuildInfo, patch), ScalarType::U32, true)
        .with_field("debug", offset_of!(BuildInfo, debug), ScalarType::Bool, true)
        .with_field("checksum", offset_of!(BuildInfo, checksum), ScalarType::U16, false)
}

/// Registry describing the running process: version and identity globals,
/// environment and argument accessors, and the layout of [`BuildInfo`].
pub fn registry() -> SymbolRegistry {
    let started = Instant::now();
    let qualified = |name: &str| format!("{NAMESPACE}.{name}");

    let mut registry = SymbolRegistry::new();
    registry
        .register_global(qualified("Version"), || {
            Value::string(env!("CARGO_PKG_VERSION"))
        })
        .register_global(qualified("Pid"), || Value::int(i64::from(std::process::id())))
        .register_global(qualified("BuildInfoAddr"), || {
            Value::int(&BUILD_INFO as *const BuildInfo as usize as i64)
        })
        .register_function(qualified("Args"), Signature::new(vec![]), |_| {
            Ok(vec![Value::strings(env::args())])
        })
        .register_function(
            qualified("Getenv"),
            Signature::new(vec![ValueType::String]),
            |args| {
                let key = args[0].as_str().unwrap_or_default();
                Ok(match env::var(key) {
                    Ok(value) => vec![Value::string(value), Value::bool(true)],
                    Err(_) => vec![Value::string(""), Value::bool(false)],
                })
            },
        )
        .register_function(qualified("Uptime"), Signature::new(vec![]), move |_| {
            Ok(vec![Value::float(started.elapsed().as_secs_f64())])
        })
        .register_function(qualified("Now"), Signature::new(vec![]), |_| {
            let elapsed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|err| Diagnostic::invocation(format!("clock before epoch: {err}")))?;
            let secs = i64::try_from(elapsed.as_secs())
                .map_err(|_| Diagnostic::invocation("clock out of range"))?;
            Ok(vec![Value::int(secs)])
        })
        .register_type(build_info_type());
    registry
}
