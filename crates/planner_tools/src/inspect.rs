//! Share-link inspection and re-encoding.

use planner_core::codec::{decode_plan, split_query, PlanQuery, SkippedSegment};
use planner_core::config::PlannerConfig;
use planner_core::ids::IdGenerator;
use planner_core::plan::PlanState;
use planner_core::power::format_power;
use planner_core::query::{grouped_units, GroupFilters, GroupSort, UnitGroup};
use planner_core::registry::UnitRegistry;
use planner_core::unit::Rarity;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, ToolError};

/// Id session for decoded units; the tools never print ids.
const TOOL_SESSION: u64 = 0x7001;

/// One occupied grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedUnit {
    /// Row, from the front.
    pub row: usize,
    /// Column.
    pub col: usize,
    /// Unit name.
    pub name: String,
    /// Level.
    pub level: u8,
    /// Rarity.
    pub rarity: Rarity,
    /// Power contribution.
    pub power: u32,
}

/// A decoded share link, flattened for printing.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    /// Formation name.
    pub name: String,
    /// Formation power.
    pub power: u32,
    /// Formation power with thousands separators.
    pub power_display: String,
    /// Units on the grid.
    pub placed: Vec<PlacedUnit>,
    /// Roster grouped by (name, level).
    pub roster: Vec<UnitGroup>,
    /// Roster + formation units.
    pub total_units: usize,
    /// The link as the planner would write it.
    pub normalized: PlanQuery,
    /// Segments left out while decoding.
    pub skipped: Vec<SkippedSegment>,
}

impl PlanSummary {
    /// Summarise a decoded plan.
    #[must_use]
    pub fn new(plan: &PlanState, registry: &UnitRegistry, skipped: Vec<SkippedSegment>) -> Self {
        let formation = plan.formation();
        let placed = formation
            .occupied()
            .map(|(pos, unit)| PlacedUnit {
                row: pos.row(),
                col: pos.col(),
                name: unit.name().to_string(),
                level: unit.level(),
                rarity: unit.rarity(),
                power: unit.power(),
            })
            .collect();
        let roster = grouped_units(plan.roster(), &GroupFilters::default(), GroupSort::default());
        Self {
            name: formation.name().to_string(),
            power: formation.power(),
            power_display: format_power(u64::from(formation.power())),
            placed,
            roster,
            total_units: plan.total_unit_count(),
            normalized: PlanQuery::encode(plan, registry),
            skipped,
        }
    }
}

/// Decode the `formation`/`units` parameters of `link`.
///
/// # Errors
///
/// Returns [`ToolError::EmptyLink`] if the link carries neither parameter.
pub fn decode_link(
    link: &str,
    registry: &UnitRegistry,
    config: &PlannerConfig,
) -> Result<(PlanState, Vec<SkippedSegment>)> {
    let (formation, units) = split_query(link);
    if formation.is_none() && units.is_none() {
        return Err(ToolError::EmptyLink(link.to_string()));
    }
    let decoded = decode_plan(
        formation.as_deref(),
        units.as_deref(),
        registry,
        &mut IdGenerator::new(TOOL_SESSION),
        config,
    );
    if !decoded.is_clean() {
        warn!(skipped = decoded.skipped.len(), "Link contained segments that were skipped");
    }
    debug!(
        placed = decoded.value.formation().placed_count(),
        roster = decoded.value.roster().len(),
        "Decoded link"
    );
    Ok((decoded.value, decoded.skipped))
}

/// Decode `link` and summarise the plan.
///
/// # Errors
///
/// See [`decode_link`].
pub fn inspect_link(link: &str, registry: &UnitRegistry, config: &PlannerConfig) -> Result<PlanSummary> {
    let (plan, skipped) = decode_link(link, registry, config)?;
    Ok(PlanSummary::new(&plan, registry, skipped))
}

/// Decode `link` and re-encode it in canonical form.
///
/// # Errors
///
/// See [`decode_link`].
pub fn normalize_link(link: &str, registry: &UnitRegistry, config: &PlannerConfig) -> Result<PlanQuery> {
    let (plan, _) = decode_link(link, registry, config)?;
    Ok(PlanQuery::encode(&plan, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_core::codec::SkipReason;
    use planner_test_utils::fixtures::{encode_fixture_plan, fixture_registry, PlanBuilder};

    #[test]
    fn test_inspect_fixture_link() {
        let plan = PlanBuilder::new()
            .name("Front Line")
            .place(0, 0, "Archers", 1)
            .place(2, 3, "Paladin", 4)
            .roster("Zealot", 2, 3)
            .build();
        let link = format!("https://planner.example/?{}", encode_fixture_plan(&plan).to_query_string());

        let summary = inspect_link(&link, &fixture_registry(), &PlannerConfig::default()).unwrap();
        assert_eq!(summary.name, "Front Line");
        assert_eq!(summary.power, plan.formation().power());
        assert_eq!(summary.placed.len(), 2);
        assert_eq!((summary.placed[1].row, summary.placed[1].col), (2, 3));
        assert_eq!(summary.roster.len(), 1);
        assert_eq!(summary.roster[0].count, 3);
        assert_eq!(summary.total_units, 5);
        assert!(summary.skipped.is_empty());
    }

    #[test]
    fn test_normalize_drops_bad_segments() {
        let query = normalize_link(
            "?units=2,1,2;99,1,1;2,1,1&formation=Raid;2,3",
            &fixture_registry(),
            &PlannerConfig::default(),
        )
        .unwrap();
        assert_eq!(query.units, "2,1,3");
        assert!(query.formation.starts_with("Raid;2,3;_;"));
    }

    #[test]
    fn test_skipped_segments_reported() {
        let (_, skipped) =
            decode_link("units=2,1,2;99,1,1", &fixture_registry(), &PlannerConfig::default()).unwrap();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].reason, SkipReason::UnknownUnitIndex(99));
    }

    #[test]
    fn test_browser_encoded_link() {
        let summary = inspect_link(
            "https://planner.example/?formation=Formation%209;2,1&units=2,1,1",
            &fixture_registry(),
            &PlannerConfig::default(),
        )
        .unwrap();
        assert_eq!(summary.name, "Formation 9");
        assert_eq!(summary.placed.len(), 1);
        assert!(summary
            .normalized
            .to_query_string()
            .starts_with("formation=Formation%209;2,1;_;"));
    }

    #[test]
    fn test_empty_link() {
        let result = decode_link("https://planner.example/?tab=roster", &fixture_registry(), &PlannerConfig::default());
        assert!(matches!(result, Err(ToolError::EmptyLink(_))));
    }

    #[test]
    fn test_summary_serializes() {
        let plan = PlanBuilder::new().place(0, 0, "Zealot", 10).build();
        let summary = PlanSummary::new(&plan, &fixture_registry(), Vec::new());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["placed"][0]["name"], "Zealot");
        assert_eq!(json["power_display"], summary.power_display.as_str());
    }
}
