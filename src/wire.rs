// Copyright 2026 The AirRide Project. All rights reserved.
// AirRide Panel Service Core - Device Wire Format
//
// The device builds its status JSON by hand from floats living in EEPROM,
// so corrupted storage shows up as literal `nan`/`inf` tokens in the body
// and occasionally as string-typed numbers. Parsing is therefore two-stage:
// token sanitization on the raw text, then lenient field extraction where
// anything that is not a usable number collapses to zero.

use serde_json::Value;
use thiserror::Error;

use crate::types::{LevelMode, PRESET_COUNT};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WireError {
    #[error("status payload is not valid JSON after sanitization: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── Sanitization ────────────────────────────────────────────────────────────

/// Replace bare `nan` / `inf` / `-inf` tokens (any case, quoted or not)
/// with `0` so the body survives JSON parsing. A quoted token becomes the
/// string `"0"`, which the lenient extractors below accept.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_ascii_alphabetic() {
            let mut end = start;
            while let Some(&(i, word_char)) = chars.peek() {
                if !word_char.is_ascii_alphabetic() {
                    break;
                }
                end = i + word_char.len_utf8();
                chars.next();
            }
            let word = &raw[start..end];
            if word.eq_ignore_ascii_case("nan") || word.eq_ignore_ascii_case("inf") {
                // Fold a leading sign into the replacement.
                if out.ends_with('-') {
                    out.pop();
                }
                out.push('0');
            } else {
                out.push_str(word);
            }
        } else {
            out.push(c);
            chars.next();
        }
    }
    out
}

// ─── Lenient extraction ──────────────────────────────────────────────────────

/// Best-effort numeric read: JSON numbers and numeric strings pass through,
/// everything else (including sanitized `"0"` leftovers that were booleans
/// or nulls) is zero.
fn num(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn num_field(root: &Value, key: &str) -> f64 {
    root.get(key).map(num).unwrap_or(0.0)
}

fn quad(root: &Value, key: &str) -> [f64; 4] {
    let mut out = [0.0; 4];
    if let Some(items) = root.get(key).and_then(Value::as_array) {
        for (i, slot) in out.iter_mut().enumerate() {
            if let Some(item) = items.get(i) {
                *slot = num(item);
            }
        }
    }
    out
}

fn bool_field(root: &Value, key: &str, default: bool) -> bool {
    root.get(key).and_then(Value::as_bool).unwrap_or(default)
}

// ─── Device Status ───────────────────────────────────────────────────────────

/// Parsed form of the device's `/s` report.
#[derive(Debug, Clone)]
pub struct DeviceStatus {
    pub pressures: [f64; 4],
    pub tank_psi: f64,
    pub targets: [f64; 4],
    /// The device reports the compressor as a display string; it is active
    /// iff the string contains "ON".
    pub pump_label: String,
    pub compressor_active: bool,
    pub level: LevelMode,
    pub lockout: bool,
    pub pump_enabled: bool,
    pub runtime: String,
    pub maint: String,
    pub maint_overdue: bool,
    pub timeouts: [bool; 4],
    /// Custom presets from the device's persistent storage, when present.
    pub presets: Option<Vec<[f64; 4]>>,
}

/// Parse a raw `/s` body. Failures here are treated by the gateway exactly
/// like a network failure.
pub fn parse_status(raw: &str) -> Result<DeviceStatus, WireError> {
    let root: Value = serde_json::from_str(&sanitize(raw))?;

    let pump_label = root
        .get("pump")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let compressor_active = pump_label.contains("ON");

    let level = LevelMode::from_wire(num_field(&root, "level") as u64)
        .unwrap_or(LevelMode::Off);

    let mut timeouts = [false; 4];
    if let Some(items) = root.get("timeouts").and_then(Value::as_array) {
        for (i, slot) in timeouts.iter_mut().enumerate() {
            *slot = items.get(i).and_then(Value::as_bool).unwrap_or(false);
        }
    }

    let presets = root.get("presets").and_then(Value::as_array).map(|rows| {
        rows.iter()
            .take(PRESET_COUNT)
            .map(|row| {
                let mut slot = [0.0; 4];
                if let Some(values) = row.as_array() {
                    for (i, target) in slot.iter_mut().enumerate() {
                        if let Some(v) = values.get(i) {
                            *target = num(v);
                        }
                    }
                }
                slot
            })
            .collect()
    });

    Ok(DeviceStatus {
        pressures: quad(&root, "bags"),
        tank_psi: num_field(&root, "tank"),
        targets: quad(&root, "targets"),
        pump_label,
        compressor_active,
        level,
        lockout: bool_field(&root, "lockout", false),
        pump_enabled: bool_field(&root, "pumpEnabled", true),
        runtime: root
            .get("runtime")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        maint: root
            .get("maint")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        maint_overdue: bool_field(&root, "maintOverdue", false),
        timeouts,
        presets,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
