//! Piece type archetypes, scripts and the type registry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Movement archetype of a piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// One step in any direction by default.
    King,
    /// Unlimited orthogonal and diagonal slider.
    Queen,
    /// Unlimited orthogonal slider.
    Rook,
    /// Unlimited diagonal slider.
    Bishop,
    /// Leaper; direction vectors are single offsets.
    Knight,
    /// Forward mover with diagonal captures; ignores direction vectors.
    Pawn,
    /// User-defined; behaves as a slider or leaper depending on `can_jump`.
    Custom,
}

impl PieceKind {
    /// Parse a kind name, case-insensitive.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "king" => Some(Self::King),
            "queen" => Some(Self::Queen),
            "rook" => Some(Self::Rook),
            "bishop" => Some(Self::Bishop),
            "knight" => Some(Self::Knight),
            "pawn" => Some(Self::Pawn),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::King => "king",
            Self::Queen => "queen",
            Self::Rook => "rook",
            Self::Bishop => "bishop",
            Self::Knight => "knight",
            Self::Pawn => "pawn",
            Self::Custom => "custom",
        }
    }
}

/// Behaviour scripts a piece can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Chance that a move is cancelled outright.
    Stutter,
    /// Chance that a move is redirected to a random legal square.
    Jitter,
    /// Jitter whose chance grows with every completed move.
    Entropy,
    /// Piece is removed after a fixed number of moves.
    Decay,
    /// Slider range grows every N moves.
    Charge,
    /// Explosion radius grows every N moves.
    Heat,
}

impl ScriptKind {
    /// Parse a script name, case-insensitive.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "stutter" => Some(Self::Stutter),
            "jitter" => Some(Self::Jitter),
            "entropy" => Some(Self::Entropy),
            "decay" => Some(Self::Decay),
            "charge" => Some(Self::Charge),
            "heat" => Some(Self::Heat),
            _ => None,
        }
    }

    /// Lowercase script name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stutter => "stutter",
            Self::Jitter => "jitter",
            Self::Entropy => "entropy",
            Self::Decay => "decay",
            Self::Charge => "charge",
            Self::Heat => "heat",
        }
    }

    /// True for scripts whose parameter is a move count rather than a probability.
    #[must_use]
    pub const fn takes_count(self) -> bool {
        matches!(self, Self::Decay | Self::Charge | Self::Heat)
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script with its numeric parameter.
///
/// The raw parameter is stored as given; [`Script::probability`] and
/// [`Script::count`] clamp it at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Which behaviour.
    #[serde(rename = "name")]
    pub kind: ScriptKind,
    /// Probability or move count, depending on `kind`.
    #[serde(default)]
    pub param: f64,
}

impl Script {
    /// Create a script. Count-based parameters are truncated and raised to at least 1.
    ///
    /// A non-finite parameter is read as 0.
    #[must_use]
    pub fn new(kind: ScriptKind, param: f64) -> Self {
        let param = if param.is_finite() { param } else { 0.0 };
        let param = if kind.takes_count() {
            param.trunc().max(1.0)
        } else {
            param
        };
        Self { kind, param }
    }

    /// Parameter as a probability in `[0, 1]`. Values above 1 are read as percentages.
    #[must_use]
    pub fn probability(&self) -> f64 {
        if self.param.is_nan() {
            return 0.0;
        }
        let p = if self.param > 1.0 {
            self.param / 100.0
        } else {
            self.param
        };
        p.clamp(0.0, 1.0)
    }

    /// Parameter as a move count, at least 1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn count(&self) -> u32 {
        if self.param.is_nan() || self.param < 1.0 {
            return 1;
        }
        self.param.min(f64::from(u32::MAX)) as u32
    }
}

/// A named movement archetype with capture and script properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceType {
    /// Registry key.
    pub name: String,
    /// Movement archetype.
    pub kind: PieceKind,
    /// Direction vectors, in order.
    pub directions: Vec<(i32, i32)>,
    /// Maximum slider range; `None` means unlimited.
    pub max_range: Option<u32>,
    /// Treat direction vectors as single-offset leaps.
    pub can_jump: bool,
    /// Explosion radius used instead of the global atomic radius.
    pub explosion_radius: Option<u32>,
    /// Not removed by explosions.
    pub immune_to_explosion: bool,
    /// May enter damaged squares even when damage blocks movement.
    pub damaged_ok: bool,
    /// Counts towards the royal-capture victory condition.
    pub is_royal: bool,
    /// Script applied to every piece of this type without an override.
    pub script: Option<Script>,
}

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_LEAPS: [(i32, i32); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

impl PieceType {
    /// A type with no directions, range 1 and every flag off.
    #[must_use]
    pub fn bare(name: &str, kind: PieceKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            directions: Vec::new(),
            max_range: Some(1),
            can_jump: false,
            explosion_radius: None,
            immune_to_explosion: false,
            damaged_ok: false,
            is_royal: false,
            script: None,
        }
    }

    fn with_directions(mut self, directions: &[(i32, i32)], max_range: Option<u32>) -> Self {
        self.directions = directions.to_vec();
        self.max_range = max_range;
        self
    }

    /// Copy the movement of `base` (kind, directions, range, jump) under a new name.
    #[must_use]
    pub fn moving_like(name: &str, base: &PieceType) -> Self {
        let mut pt = Self::bare(name, base.kind);
        pt.copy_movement_from(base);
        pt
    }

    /// Overwrite this type's movement with that of `base`, keeping every other property.
    pub fn copy_movement_from(&mut self, base: &PieceType) {
        self.kind = base.kind;
        self.directions.clone_from(&base.directions);
        self.max_range = base.max_range;
        self.can_jump = base.can_jump;
    }

    /// The standard queen.
    #[must_use]
    pub fn queen() -> Self {
        let all: Vec<_> = ORTHOGONAL.iter().chain(DIAGONAL.iter()).copied().collect();
        Self::bare("queen", PieceKind::Queen).with_directions(&all, None)
    }
}

/// A single edit to a piece type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeChange {
    /// Override the explosion radius.
    ExplosionRadius(u32),
    /// Set explosion immunity.
    Immune(bool),
    /// Allow entering damaged squares.
    DamagedOk(bool),
    /// Mark as royal.
    Royal(bool),
    /// Set maximum range; 0 means unlimited.
    Range(u32),
    /// Treat directions as leaps.
    Jump(bool),
    /// Replace all direction vectors.
    Directions(Vec<(i32, i32)>),
    /// Append one direction vector.
    AddDirection(i32, i32),
    /// Remove all direction vectors.
    ClearDirections,
    /// Set or clear the default script.
    Script(Option<Script>),
}

impl TypeChange {
    fn apply(self, pt: &mut PieceType) {
        match self {
            Self::ExplosionRadius(r) => pt.explosion_radius = Some(r),
            Self::Immune(on) => pt.immune_to_explosion = on,
            Self::DamagedOk(on) => pt.damaged_ok = on,
            Self::Royal(on) => pt.is_royal = on,
            Self::Range(0) => pt.max_range = None,
            Self::Range(n) => pt.max_range = Some(n),
            Self::Jump(on) => pt.can_jump = on,
            Self::Directions(dirs) => pt.directions = dirs,
            Self::AddDirection(dx, dy) => pt.directions.push((dx, dy)),
            Self::ClearDirections => pt.directions.clear(),
            Self::Script(script) => pt.script = script,
        }
    }
}

/// Registry of named piece types.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceTypeRegistry {
    types: BTreeMap<String, PieceType>,
}

impl Default for PieceTypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl PieceTypeRegistry {
    /// Registry with no types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// The six standard chess archetypes.
    #[must_use]
    pub fn standard() -> Self {
        let king_dirs: Vec<_> = ORTHOGONAL.iter().chain(DIAGONAL.iter()).copied().collect();
        let mut king = PieceType::bare("king", PieceKind::King).with_directions(&king_dirs, Some(1));
        king.is_royal = true;

        let mut knight =
            PieceType::bare("knight", PieceKind::Knight).with_directions(&KNIGHT_LEAPS, Some(1));
        knight.can_jump = true;

        let mut registry = Self::empty();
        registry.insert(king);
        registry.insert(PieceType::queen());
        registry.insert(PieceType::bare("rook", PieceKind::Rook).with_directions(&ORTHOGONAL, None));
        registry.insert(PieceType::bare("bishop", PieceKind::Bishop).with_directions(&DIAGONAL, None));
        registry.insert(knight);
        registry.insert(PieceType::bare("pawn", PieceKind::Pawn));
        registry
    }

    /// Look up a type.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PieceType> {
        self.types.get(name)
    }

    /// Check if a type is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// True when both the king and queen archetypes are present.
    #[must_use]
    pub fn has_archetypes(&self) -> bool {
        self.contains("king") && self.contains("queen")
    }

    /// Insert or replace a type under its own name.
    pub fn insert(&mut self, piece_type: PieceType) {
        self.types.insert(piece_type.name.clone(), piece_type);
    }

    /// Iterate over types in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PieceType> {
        self.types.values()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Make sure `name` exists, creating it with queen-like movement if not.
    ///
    /// Returns `true` if the type had to be created.
    pub fn ensure(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        let queen = self.get("queen").cloned().unwrap_or_else(PieceType::queen);
        self.insert(PieceType::moving_like(name, &queen));
        true
    }

    /// Make `name` move like `base`, creating `name` if needed.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if `base` is not registered.
    pub fn define_like(&mut self, name: &str, base: &str) -> EngineResult<()> {
        let base = self.get(base).cloned().ok_or_else(|| EngineError::unknown_type(base))?;
        match self.types.get_mut(name) {
            Some(pt) => pt.copy_movement_from(&base),
            None => self.insert(PieceType::moving_like(name, &base)),
        }
        Ok(())
    }

    /// Apply one edit to an existing type.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if `name` is not registered.
    pub fn modify(&mut self, name: &str, change: TypeChange) -> EngineResult<()> {
        let pt = self
            .types
            .get_mut(name)
            .ok_or_else(|| EngineError::unknown_type(name))?;
        change.apply(pt);
        Ok(())
    }
}
