//! Dispatchable actions and the pure reducer.
//!
//! [`reduce`] never mutates its input. It works on a clone and returns
//! the new state only when the whole action succeeded, so a rejected
//! action cannot leave a half-applied plan behind.

use serde::{Deserialize, Serialize};

use crate::capacity::CapacityCheck;
use crate::config::{PartialBatchPolicy, PlannerConfig};
use crate::error::{PlannerError, Result};
use crate::formation::{sanitize_formation_name, GridPos};
use crate::ids::IdGenerator;
use crate::plan::PlanState;
use crate::registry::{normalize_unit_name, UnitRegistry};
use crate::unit::{is_valid_level, Rarity, Unit, UnitId};

/// A state change requested by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Add `count` new units of one name and level to the roster.
    AddUnits {
        /// Unit name; a trailing number is stripped.
        name: String,
        /// Level of every new unit.
        level: u8,
        /// How many to add.
        count: usize,
        /// Rarity used when the name is not in the catalog.
        fallback_rarity: Option<Rarity>,
    },
    /// Add units of one name at several levels in one step.
    AddUnitBatch {
        /// Unit name; a trailing number is stripped.
        name: String,
        /// `(level, count)` pairs.
        levels: Vec<(u8, usize)>,
        /// Rarity used when the name is not in the catalog.
        fallback_rarity: Option<Rarity>,
    },
    /// Resize the roster group of one name and level.
    SetGroupCount {
        /// Unit name.
        name: String,
        /// Group level.
        level: u8,
        /// Desired size, clamped to 1..=per-level cap.
        count: usize,
        /// Rarity used when the name is not in the catalog.
        fallback_rarity: Option<Rarity>,
    },
    /// Delete one roster unit.
    RemoveUnitFromRoster(UnitId),
    /// Delete every roster unit.
    ClearRoster,
    /// Move a roster unit onto the grid.
    PlaceUnit {
        /// Target row.
        row: usize,
        /// Target column.
        col: usize,
        /// Roster unit to place.
        unit_id: UnitId,
    },
    /// Return a placed unit to the roster.
    RemoveFromFormation {
        /// Cell row.
        row: usize,
        /// Cell column.
        col: usize,
    },
    /// Exchange two cells.
    SwapUnits {
        /// First cell as `(row, col)`.
        from: (usize, usize),
        /// Second cell as `(row, col)`.
        to: (usize, usize),
    },
    /// Return every placed unit to the roster.
    WithdrawAll,
    /// Rename the formation.
    RenameFormation(String),
    /// Change the level of a placed unit.
    SetPlacedUnitLevel {
        /// Cell row.
        row: usize,
        /// Cell column.
        col: usize,
        /// Unit expected at the cell.
        unit_id: UnitId,
        /// New level.
        level: u8,
    },
}

impl Action {
    /// Short name for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AddUnits { .. } => "add_units",
            Self::AddUnitBatch { .. } => "add_unit_batch",
            Self::SetGroupCount { .. } => "set_group_count",
            Self::RemoveUnitFromRoster(_) => "remove_unit_from_roster",
            Self::ClearRoster => "clear_roster",
            Self::PlaceUnit { .. } => "place_unit",
            Self::RemoveFromFormation { .. } => "remove_from_formation",
            Self::SwapUnits { .. } => "swap_units",
            Self::WithdrawAll => "withdraw_all",
            Self::RenameFormation(_) => "rename_formation",
            Self::SetPlacedUnitLevel { .. } => "set_placed_unit_level",
        }
    }
}

/// How an action ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The state changed.
    Applied,
    /// The action was valid but changed nothing.
    NoChange,
    /// Only part of an add batch fit; the check describes the shortfall.
    PartiallyAdmitted(CapacityCheck),
}

impl Outcome {
    /// Whether the state changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Everything the reducer reads besides the state.
pub struct ReduceContext<'a> {
    /// Unit catalog.
    pub registry: &'a UnitRegistry,
    /// Caps and policies.
    pub config: &'a PlannerConfig,
    /// Source of fresh unit ids.
    pub ids: &'a mut IdGenerator,
}

/// Apply `action` to `state`, returning the new state.
///
/// # Errors
///
/// - [`PlannerError::ValidationRejected`] when a batch does not fit and
///   the policy forbids partial admission
/// - [`PlannerError::OutOfBounds`] for coordinates outside the grid
/// - [`PlannerError::UnitNotFound`] for stale unit references
/// - [`PlannerError::InvalidLevel`] / [`PlannerError::UnknownUnit`] for
///   bad add requests
pub fn reduce(state: &PlanState, action: &Action, ctx: &mut ReduceContext<'_>) -> Result<(PlanState, Outcome)> {
    let mut next = state.clone();
    let outcome = apply(&mut next, action, ctx)?;
    Ok((next, outcome))
}

fn apply(state: &mut PlanState, action: &Action, ctx: &mut ReduceContext<'_>) -> Result<Outcome> {
    match action {
        Action::AddUnits {
            name,
            level,
            count,
            fallback_rarity,
        } => {
            let template = UnitTemplate::resolve(ctx.registry, name, *level, *fallback_rarity)?;
            add_units(state, &template, *count, ctx)
        }
        Action::AddUnitBatch {
            name,
            levels,
            fallback_rarity,
        } => add_unit_batch(state, name, levels, *fallback_rarity, ctx),
        Action::SetGroupCount {
            name,
            level,
            count,
            fallback_rarity,
        } => {
            let template = UnitTemplate::resolve(ctx.registry, name, *level, *fallback_rarity)?;
            set_group_count(state, &template, *count, ctx)
        }
        Action::RemoveUnitFromRoster(id) => {
            state.remove_from_roster(id)?;
            Ok(Outcome::Applied)
        }
        Action::ClearRoster => Ok(changed_if(state.clear_roster() > 0)),
        Action::PlaceUnit { row, col, unit_id } => {
            state.place(unit_id, GridPos::new(*row, *col)?)?;
            Ok(Outcome::Applied)
        }
        Action::RemoveFromFormation { row, col } => Ok(changed_if(state.remove(GridPos::new(*row, *col)?))),
        Action::SwapUnits { from, to } => {
            let a = GridPos::new(from.0, from.1)?;
            let b = GridPos::new(to.0, to.1)?;
            let formation = state.formation();
            if a == b || (formation.tile(a).is_none() && formation.tile(b).is_none()) {
                return Ok(Outcome::NoChange);
            }
            state.swap(a, b);
            Ok(Outcome::Applied)
        }
        Action::WithdrawAll => Ok(changed_if(state.withdraw_all() > 0)),
        Action::RenameFormation(name) => {
            let mut name = sanitize_formation_name(name);
            if name.is_empty() {
                name.clone_from(&ctx.config.default_formation_name);
            }
            if name == state.formation().name() {
                return Ok(Outcome::NoChange);
            }
            state.rename_formation(name);
            Ok(Outcome::Applied)
        }
        Action::SetPlacedUnitLevel {
            row,
            col,
            unit_id,
            level,
        } => {
            let pos = GridPos::new(*row, *col)?;
            let changed = state.set_placed_level(pos, unit_id, *level, ctx.config.limits())?;
            Ok(changed_if(changed))
        }
    }
}

const fn changed_if(changed: bool) -> Outcome {
    if changed {
        Outcome::Applied
    } else {
        Outcome::NoChange
    }
}

/// Resolved name, rarity and level for new units.
struct UnitTemplate {
    name: String,
    rarity: Rarity,
    level: u8,
}

impl UnitTemplate {
    fn resolve(registry: &UnitRegistry, name: &str, level: u8, fallback: Option<Rarity>) -> Result<Self> {
        if !is_valid_level(level) {
            return Err(PlannerError::InvalidLevel(level));
        }
        if let Some(data) = registry.resolve(name) {
            return Ok(Self {
                name: data.name.clone(),
                rarity: data.rarity,
                level,
            });
        }
        let normalized = normalize_unit_name(name);
        match fallback {
            Some(rarity) if !normalized.is_empty() => Ok(Self {
                name: normalized,
                rarity,
                level,
            }),
            _ => Err(PlannerError::UnknownUnit(name.to_string())),
        }
    }

    fn build(&self, count: usize, ids: &mut IdGenerator) -> Result<Vec<Unit>> {
        let tag = format!("add-{}", self.level);
        (0..count)
            .map(|_| Unit::with_rarity(ids.next_id(&tag), self.name.clone(), self.rarity, self.level))
            .collect()
    }
}

/// Admit all of `count`, part of it, or nothing, per the configured policy.
fn add_units(state: &mut PlanState, template: &UnitTemplate, count: usize, ctx: &mut ReduceContext<'_>) -> Result<Outcome> {
    if count == 0 {
        return Ok(Outcome::NoChange);
    }
    let check = state.check_batch(&template.name, template.level, count, ctx.config.limits());
    if check.allowed {
        state.add_to_roster(template.build(count, ctx.ids)?);
        return Ok(Outcome::Applied);
    }
    if ctx.config.partial_batch_policy == PartialBatchPolicy::AdmitFittable && check.max_admittable > 0 {
        state.add_to_roster(template.build(check.max_admittable, ctx.ids)?);
        return Ok(Outcome::PartiallyAdmitted(check));
    }
    Err(PlannerError::ValidationRejected(check))
}

fn add_unit_batch(
    state: &mut PlanState,
    name: &str,
    levels: &[(u8, usize)],
    fallback: Option<Rarity>,
    ctx: &mut ReduceContext<'_>,
) -> Result<Outcome> {
    let mut templates = Vec::with_capacity(levels.len());
    for &(level, count) in levels {
        if count > 0 {
            templates.push((UnitTemplate::resolve(ctx.registry, name, level, fallback)?, count));
        }
    }
    let Some((first, _)) = templates.first() else {
        return Ok(Outcome::NoChange);
    };

    let requested: Vec<(u8, usize)> = templates.iter().map(|(t, count)| (t.level, *count)).collect();
    let check = state.check_level_batches(&first.name, &requested, ctx.config.limits());
    if check.allowed {
        for (template, count) in &templates {
            state.add_to_roster(template.build(*count, ctx.ids)?);
        }
        return Ok(Outcome::Applied);
    }
    if ctx.config.partial_batch_policy == PartialBatchPolicy::AdmitFittable && check.max_admittable > 0 {
        for (template, count) in &templates {
            let fit = state
                .check_batch(&template.name, template.level, *count, ctx.config.limits())
                .max_admittable;
            state.add_to_roster(template.build(fit, ctx.ids)?);
        }
        return Ok(Outcome::PartiallyAdmitted(check));
    }
    Err(PlannerError::ValidationRejected(check))
}

/// Grow or shrink a roster group. Shrinking drops the newest units first.
fn set_group_count(
    state: &mut PlanState,
    template: &UnitTemplate,
    count: usize,
    ctx: &mut ReduceContext<'_>,
) -> Result<Outcome> {
    let target = count.clamp(1, ctx.config.max_units_per_level.max(1));
    let current = state.roster().matching_ids(&template.name, template.level);

    if target < current.len() {
        for id in current.iter().skip(target) {
            state.remove_from_roster(id)?;
        }
        return Ok(Outcome::Applied);
    }
    add_units(state, template, target - current.len(), ctx)
}
