//! The persisted state document.
//!
//! Every field is optional on the way in. A field that is missing or has the
//! wrong shape deserializes to `None` (or an empty collection) instead of
//! failing the whole document; list and map entries are parsed one by one so
//! a single bad entry is dropped on its own.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::game::{CaptureMode, LimitOutcome, PieceState, VictoryMode};

/// Whole-session document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    /// Number of files.
    #[serde(default, deserialize_with = "lenient_int")]
    pub cols: Option<i64>,
    /// Number of ranks.
    #[serde(default, deserialize_with = "lenient_int")]
    pub rows: Option<i64>,
    /// Side to move.
    #[serde(default, deserialize_with = "lenient")]
    pub turn: Option<String>,
    /// Full-move counter.
    #[serde(default, deserialize_with = "lenient_int")]
    pub fullmove: Option<i64>,
    /// Damaged squares as `[x, y]`.
    #[serde(default, deserialize_with = "lenient_list")]
    pub damaged: Vec<[i64; 2]>,
    /// Piece types by name.
    #[serde(default, deserialize_with = "lenient_map")]
    pub piece_types: BTreeMap<String, PieceTypeDoc>,
    /// Occupied squares.
    #[serde(default, deserialize_with = "lenient_list")]
    pub board: Vec<PieceDoc>,
    /// Rule overrides.
    #[serde(default, deserialize_with = "lenient")]
    pub rules: Option<RulesDoc>,
    /// Chunks by name.
    #[serde(default, deserialize_with = "lenient_map")]
    pub chunks: BTreeMap<String, ChunkDoc>,
    /// Edge triggers in firing order.
    #[serde(default, deserialize_with = "lenient_list")]
    pub edge_triggers: Vec<TriggerDoc>,
}

/// A piece type entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieceTypeDoc {
    /// Movement archetype name.
    #[serde(default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    /// Direction vectors as `[dx, dy]`.
    #[serde(default, deserialize_with = "lenient_list")]
    pub directions: Vec<[i64; 2]>,
    /// `null` is unlimited; a missing or malformed value falls back to 1.
    #[serde(default, deserialize_with = "lenient_nullable_int")]
    pub max_range: Option<Option<i64>>,
    /// Leaper flag.
    #[serde(default, deserialize_with = "lenient")]
    pub can_jump: Option<bool>,
    /// Explosion radius override.
    #[serde(default, deserialize_with = "lenient_int")]
    pub explosion_radius: Option<i64>,
    /// Explosion immunity.
    #[serde(default, deserialize_with = "lenient")]
    pub immune_to_explosion: Option<bool>,
    /// May enter damaged squares.
    #[serde(default, deserialize_with = "lenient")]
    pub damaged_ok: Option<bool>,
    /// Counts for royal capture.
    #[serde(default, deserialize_with = "lenient")]
    pub is_royal: Option<bool>,
    /// Default script name.
    #[serde(default, deserialize_with = "lenient")]
    pub script_name: Option<String>,
    /// Default script parameter.
    #[serde(default, deserialize_with = "lenient_float")]
    pub script_param: Option<f64>,
}

/// An occupied square.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieceDoc {
    /// File.
    #[serde(default, deserialize_with = "lenient_int")]
    pub x: Option<i64>,
    /// Rank.
    #[serde(default, deserialize_with = "lenient_int")]
    pub y: Option<i64>,
    /// `white` or `black`.
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<String>,
    /// Piece type name.
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub type_name: Option<String>,
    /// Display symbol.
    #[serde(default, deserialize_with = "lenient")]
    pub symbol: Option<String>,
    /// Script state; absent for fresh pieces.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub state: Option<PieceState>,
}

/// Rule overrides; absent fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesDoc {
    /// `atomic`, `normal` or `none`.
    #[serde(default, deserialize_with = "lenient")]
    pub capture_mode: Option<CaptureMode>,
    /// Global explosion radius.
    #[serde(default, deserialize_with = "lenient_int")]
    pub atomic_radius: Option<i64>,
    /// Explosion damages the capture square.
    #[serde(default, deserialize_with = "lenient")]
    pub center_damages: Option<bool>,
    /// Capturing piece survives.
    #[serde(default, deserialize_with = "lenient")]
    pub center_survives: Option<bool>,
    /// Damaged squares block movement.
    #[serde(default, deserialize_with = "lenient")]
    pub damage_blocks_move: Option<bool>,
    /// `elimination`, `king_capture` or `none`.
    #[serde(default, deserialize_with = "lenient")]
    pub victory: Option<VictoryMode>,
    /// Full-move limit.
    #[serde(default, deserialize_with = "lenient_int")]
    pub max_fullmoves: Option<i64>,
    /// Time limit in seconds.
    #[serde(default, deserialize_with = "lenient_int")]
    pub max_seconds: Option<i64>,
    /// `draw`, `white` or `black`.
    #[serde(default, deserialize_with = "lenient")]
    pub limit_result: Option<LimitOutcome>,
    /// Neighbour radius of move events.
    #[serde(default, alias = "osc_neighbour_radius", deserialize_with = "lenient_int")]
    pub neighbour_radius: Option<i64>,
    /// Move events carry neighbours.
    #[serde(default, alias = "osc_neighbours", deserialize_with = "lenient")]
    pub neighbours_enabled: Option<bool>,
    /// Move event label.
    #[serde(default, alias = "osc_label", deserialize_with = "lenient")]
    pub event_label: Option<String>,
}

/// A chunk entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDoc {
    /// `[x1, y1, x2, y2]`; chunks without a valid rectangle are dropped.
    #[serde(default, deserialize_with = "lenient")]
    pub rect: Option<[i64; 4]>,
    /// Refill descriptor.
    #[serde(default, deserialize_with = "lenient")]
    pub fill: Option<FillDoc>,
    /// Active flag.
    #[serde(default, deserialize_with = "lenient")]
    pub active: Option<bool>,
    /// `any`, `white` or `black`.
    #[serde(default, deserialize_with = "lenient")]
    pub owner: Option<String>,
    /// Script applied on entry.
    #[serde(default, deserialize_with = "lenient")]
    pub enter_script: Option<ScriptDoc>,
    /// Script applied on exit.
    #[serde(default, deserialize_with = "lenient")]
    pub leave_script: Option<ScriptDoc>,
}

/// A chunk fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillDoc {
    /// Side.
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<String>,
    /// Piece type.
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub type_name: Option<String>,
}

/// A script descriptor; the name `none` clears a piece's override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptDoc {
    /// Script name.
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Parameter.
    #[serde(default, deserialize_with = "lenient_float")]
    pub param: Option<f64>,
}

/// An edge trigger entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerDoc {
    /// `any` or a type name.
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub type_name: Option<String>,
    /// Distance threshold.
    #[serde(default, deserialize_with = "lenient_int")]
    pub dist: Option<i64>,
    /// `chunk` (default) or `random`.
    #[serde(default, deserialize_with = "lenient")]
    pub mode: Option<String>,
    /// Chunk to toggle.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,
    /// Smallest spawn width.
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub minw: Option<i64>,
    /// Largest spawn width.
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub maxw: Option<i64>,
    /// Smallest spawn height.
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub minh: Option<i64>,
    /// Largest spawn height.
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub maxh: Option<i64>,
}

/// Integer from a JSON number (fractions truncated) or a numeric string.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Finite float from a JSON number or a numeric string.
///
/// Strings such as `inf` or `NaN` are rejected; JSON cannot write them back.
#[must_use]
pub fn float_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(int_value(&Value::deserialize(deserializer)?))
}

fn lenient_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(float_value(&Value::deserialize(deserializer)?))
}

fn lenient_nullable_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<i64>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(Some(None));
    }
    Ok(int_value(&value).map(Some))
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(name, item)| serde_json::from_value(item).ok().map(|doc| (name, doc)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_fields_become_none() {
        let doc: StateDocument = serde_json::from_str(
            r#"{"cols": "ten", "rows": "6", "turn": 5, "fullmove": 3.9, "damaged": [[1, 2], "x", [3]]}"#,
        )
        .unwrap();
        assert_eq!(doc.cols, None);
        assert_eq!(doc.rows, Some(6));
        assert_eq!(doc.turn, None);
        assert_eq!(doc.fullmove, Some(3));
        assert_eq!(doc.damaged, vec![[1, 2]]);
    }

    #[test]
    fn test_bad_entries_dropped_individually() {
        let doc: StateDocument = serde_json::from_str(
            r#"{"board": [{"x": 0, "y": 0, "color": "white", "type": "rook"}, 7],
                "piece_types": {"rook": {"kind": "rook"}, "bad": []}}"#,
        )
        .unwrap();
        assert_eq!(doc.board.len(), 1);
        assert_eq!(doc.piece_types.len(), 1);
        assert!(doc.piece_types.contains_key("rook"));
    }

    #[test]
    fn test_max_range_null_vs_missing() {
        let unlimited: PieceTypeDoc = serde_json::from_str(r#"{"max_range": null}"#).unwrap();
        assert_eq!(unlimited.max_range, Some(None));
        let missing: PieceTypeDoc = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.max_range, None);
        let bad: PieceTypeDoc = serde_json::from_str(r#"{"max_range": "far"}"#).unwrap();
        assert_eq!(bad.max_range, None);
    }

    #[test]
    fn test_rules_enums_lenient() {
        let rules: RulesDoc =
            serde_json::from_str(r#"{"capture_mode": "nuclear", "victory": "king", "limit_result": "white"}"#)
                .unwrap();
        assert_eq!(rules.capture_mode, None);
        assert_eq!(rules.victory, Some(VictoryMode::RoyalCapture));
        assert_eq!(rules.limit_result, Some(LimitOutcome::White));
    }

    #[test]
    fn test_float_value_rejects_non_finite() {
        for text in ["inf", "-inf", "NaN", "infinity"] {
            assert_eq!(float_value(&Value::String(text.to_string())), None, "{text}");
        }
        assert_eq!(float_value(&Value::String(" 0.25 ".to_string())), Some(0.25));
        assert_eq!(float_value(&serde_json::json!(3)), Some(3.0));
    }

    #[test]
    fn test_notification_rule_key_aliases() {
        let rules: RulesDoc =
            serde_json::from_str(r#"{"osc_neighbour_radius": 4, "osc_neighbours": false, "osc_label": "live"}"#)
                .unwrap();
        assert_eq!(rules.neighbour_radius, Some(4));
        assert_eq!(rules.neighbours_enabled, Some(false));
        assert_eq!(rules.event_label.as_deref(), Some("live"));
    }
}
