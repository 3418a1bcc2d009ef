//! Share-link serialisation.
//!
//! Two query parameters carry a whole plan:
//!
//! ```text
//! formation=<name>;<cell>;...;<cell>     49 cells, row-major
//!                                        cell = "_" | "<index>,<level>"
//! units=<index>,<level>,<count>;...      one entry per (index, level)
//! ```
//!
//! Units are referenced by catalog index, never by name. Decoding is
//! lenient: a bad segment is skipped and reported in
//! [`Decoded::skipped`], and the rest of the plan still loads.
//!
//! [`PlanQuery::to_query_string`] percent-encodes both values, leaving the
//! `;` and `,` separators readable, and [`split_query`] decodes them the
//! way a browser's form parser does (`%XX` and `+`).

use std::cmp::Reverse;
use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PlannerConfig;
use crate::formation::{sanitize_formation_name, Formation, GridPos, DEFAULT_FORMATION_ID};
use crate::ids::IdGenerator;
use crate::plan::PlanState;
use crate::registry::{UnitData, UnitIndex, UnitRegistry};
use crate::roster::Roster;
use crate::unit::{is_valid_level, Rarity, Unit};

/// Query parameter holding the formation.
pub const FORMATION_PARAM: &str = "formation";

/// Query parameter holding the roster.
pub const UNITS_PARAM: &str = "units";

/// Marker for an empty formation cell.
pub const EMPTY_CELL: &str = "_";

const SEGMENT_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ',';

/// Bytes escaped in query values. Non-ASCII is always escaped.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// The two encoded query parameter values of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanQuery {
    /// Value of the `formation` parameter.
    pub formation: String,
    /// Value of the `units` parameter.
    pub units: String,
}

impl PlanQuery {
    /// Encode a plan.
    #[must_use]
    pub fn encode(plan: &PlanState, registry: &UnitRegistry) -> Self {
        Self {
            formation: encode_formation(plan.formation(), registry),
            units: encode_roster(plan.roster(), registry),
        }
    }

    /// Parameter name/value pairs, formation first.
    #[must_use]
    pub fn to_pairs(&self) -> [(&'static str, &str); 2] {
        [(FORMATION_PARAM, &self.formation), (UNITS_PARAM, &self.units)]
    }

    /// `formation=...&units=...` with percent-encoded values. The `;`
    /// and `,` separators are left unescaped.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, QUERY_VALUE)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Pull the `formation` and `units` values out of a raw query string.
///
/// Accepts a bare query, one with a leading `?`, or a full URL. Values are
/// percent-decoded. Other parameters are ignored; the first occurrence of
/// each key wins.
#[must_use]
pub fn split_query(query: &str) -> (Option<String>, Option<String>) {
    let query = query.split_once('?').map_or(query, |(_, rest)| rest);
    let query = query.split_once('#').map_or(query, |(before, _)| before);

    let mut formation = None;
    let mut units = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            FORMATION_PARAM if formation.is_none() => formation = Some(value.into_owned()),
            UNITS_PARAM if units.is_none() => units = Some(value.into_owned()),
            _ => {}
        }
    }
    (formation, units)
}

/// Why a segment was left out of the decoded plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Wrong field count or a non-numeric field.
    Malformed,
    /// The index is not in the catalog.
    UnknownUnitIndex(u16),
    /// Level outside 1..=10.
    LevelOutOfRange(u32),
    /// Only part of the entry fit under the unit caps.
    CapacityTruncated {
        /// Units the segment asked for.
        requested: usize,
        /// Units actually created.
        admitted: usize,
    },
    /// Cells beyond the 49th.
    ExtraCell,
}

/// A segment that did not decode cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSegment {
    /// Parameter the segment came from.
    pub param: &'static str,
    /// Zero-based position among the parameter's `;`-separated segments
    /// (the formation name is position 0).
    pub position: usize,
    /// Raw segment text.
    pub segment: String,
    /// What was wrong with it.
    pub reason: SkipReason,
}

/// A decoded value plus the segments that were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// Everything that decoded.
    pub value: T,
    /// Segments left out, in input order.
    pub skipped: Vec<SkippedSegment>,
}

impl<T> Decoded<T> {
    /// Whether every segment decoded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Encode a formation as `<name>;<cell>...` with 49 cells.
///
/// Units whose name is not in the catalog encode as empty cells.
#[must_use]
pub fn encode_formation(formation: &Formation, registry: &UnitRegistry) -> String {
    let mut out = sanitize_formation_name(formation.name());
    for (pos, unit) in formation.cells() {
        out.push(SEGMENT_SEPARATOR);
        match unit.and_then(|u| registry.get_index_by_unit_name(u.name()).map(|i| (i, u))) {
            Some((index, unit)) => {
                out.push_str(&format!("{index}{FIELD_SEPARATOR}{}", unit.level()));
            }
            None => {
                if let Some(unit) = unit {
                    debug!(name = unit.name(), row = pos.row(), col = pos.col(), "Unit not in catalog, encoded as empty");
                }
                out.push_str(EMPTY_CELL);
            }
        }
    }
    out
}

/// Encode a roster as `<index>,<level>,<count>` groups.
///
/// Groups are ordered by level (high first), then rarity (high first),
/// then name. Units whose name is not in the catalog are left out.
#[must_use]
pub fn encode_roster(roster: &Roster, registry: &UnitRegistry) -> String {
    let mut groups: BTreeMap<(Reverse<u8>, Reverse<Rarity>, &str, UnitIndex), usize> = BTreeMap::new();
    for unit in roster.iter() {
        let Some(index) = registry.get_index_by_unit_name(unit.name()) else {
            debug!(name = unit.name(), "Unit not in catalog, left out of roster link");
            continue;
        };
        *groups
            .entry((Reverse(unit.level()), Reverse(unit.rarity()), unit.name(), index))
            .or_default() += 1;
    }
    groups
        .into_iter()
        .map(|((Reverse(level), _, _, index), count)| {
            format!("{index}{FIELD_SEPARATOR}{level}{FIELD_SEPARATOR}{count}")
        })
        .collect::<Vec<_>>()
        .join(&SEGMENT_SEPARATOR.to_string())
}

/// Decode a formation parameter onto an empty formation.
pub fn decode_formation(
    source: &str,
    registry: &UnitRegistry,
    ids: &mut IdGenerator,
    config: &PlannerConfig,
) -> Decoded<Formation> {
    let mut plan = PlanState::from_parts(Roster::new(), Formation::new(DEFAULT_FORMATION_ID, ""));
    let skipped = decode_formation_into(&mut plan, source, registry, ids, config);
    let (_, formation) = plan.into_parts();
    Decoded {
        value: formation,
        skipped,
    }
}

/// Decode a units parameter into a roster, applying the caps from an
/// empty plan.
pub fn decode_roster(
    source: &str,
    registry: &UnitRegistry,
    ids: &mut IdGenerator,
    config: &PlannerConfig,
) -> Decoded<Roster> {
    let mut plan = PlanState::new(config.default_formation_name.clone());
    let skipped = decode_roster_into(&mut plan, source, registry, ids, config);
    let (roster, _) = plan.into_parts();
    Decoded {
        value: roster,
        skipped,
    }
}

/// Decode both parameters into a plan.
///
/// The formation loads first; roster entries are then truncated to the
/// headroom left under both caps. A missing parameter yields an empty
/// formation (with the default name) or an empty roster.
pub fn decode_plan(
    formation: Option<&str>,
    units: Option<&str>,
    registry: &UnitRegistry,
    ids: &mut IdGenerator,
    config: &PlannerConfig,
) -> Decoded<PlanState> {
    let mut plan = PlanState::new(config.default_formation_name.clone());
    let mut skipped = Vec::new();
    if let Some(source) = formation {
        skipped.extend(decode_formation_into(&mut plan, source, registry, ids, config));
    }
    if let Some(source) = units {
        skipped.extend(decode_roster_into(&mut plan, source, registry, ids, config));
    }
    debug!(
        placed = plan.formation().placed_count(),
        roster = plan.roster().len(),
        skipped = skipped.len(),
        "Decoded plan"
    );
    Decoded { value: plan, skipped }
}

fn decode_formation_into(
    plan: &mut PlanState,
    source: &str,
    registry: &UnitRegistry,
    ids: &mut IdGenerator,
    config: &PlannerConfig,
) -> Vec<SkippedSegment> {
    let mut skipped = Vec::new();
    let mut segments = source.split(SEGMENT_SEPARATOR);

    let name = sanitize_formation_name(segments.next().unwrap_or_default());
    if name.is_empty() {
        plan.rename_formation(config.default_formation_name.clone());
    } else {
        plan.rename_formation(name);
    }

    for (cell, segment) in segments.enumerate() {
        let position = cell + 1;
        let Some(pos) = GridPos::from_cell_index(cell) else {
            if !segment.is_empty() {
                skipped.push(skip(FORMATION_PARAM, position, segment, SkipReason::ExtraCell));
            }
            continue;
        };
        if segment.is_empty() || segment == EMPTY_CELL {
            continue;
        }
        let (data, level) = match parse_cell(segment, registry) {
            Ok(parsed) => parsed,
            Err(reason) => {
                skipped.push(skip(FORMATION_PARAM, position, segment, reason));
                continue;
            }
        };
        if plan.pair_count(&data.name, level) >= config.max_units_per_level
            || plan.total_unit_count() >= config.max_total_units
        {
            let reason = SkipReason::CapacityTruncated {
                requested: 1,
                admitted: 0,
            };
            skipped.push(skip(FORMATION_PARAM, position, segment, reason));
            continue;
        }
        let tag = format!("r{}c{}", pos.row(), pos.col());
        if let Ok(unit) = Unit::new(ids.next_id(&tag), data, level) {
            plan.place_new(pos, unit);
        }
    }
    skipped
}

fn decode_roster_into(
    plan: &mut PlanState,
    source: &str,
    registry: &UnitRegistry,
    ids: &mut IdGenerator,
    config: &PlannerConfig,
) -> Vec<SkippedSegment> {
    let mut skipped = Vec::new();
    if source.is_empty() {
        return skipped;
    }

    for (position, segment) in source.split(SEGMENT_SEPARATOR).enumerate() {
        let (data, level, count) = match parse_roster_entry(segment, registry) {
            Ok(parsed) => parsed,
            Err(reason) => {
                skipped.push(skip(UNITS_PARAM, position, segment, reason));
                continue;
            }
        };
        let check = plan.check_batch(&data.name, level, count, config.limits());
        let admitted = check.max_admittable;
        if admitted < count {
            let reason = SkipReason::CapacityTruncated {
                requested: count,
                admitted,
            };
            skipped.push(skip(UNITS_PARAM, position, segment, reason));
        }
        let units: Vec<Unit> = (0..admitted)
            .filter_map(|i| {
                let tag = format!("{}-{level}-{i}", data.index);
                Unit::new(ids.next_id(&tag), data, level).ok()
            })
            .collect();
        plan.add_to_roster(units);
    }
    skipped
}

fn skip(param: &'static str, position: usize, segment: &str, reason: SkipReason) -> SkippedSegment {
    debug!(param, position, segment, ?reason, "Skipped share-link segment");
    SkippedSegment {
        param,
        position,
        segment: segment.to_string(),
        reason,
    }
}

fn parse_cell<'r>(segment: &str, registry: &'r UnitRegistry) -> Result<(&'r UnitData, u8), SkipReason> {
    let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();
    let [index, level] = fields[..] else {
        return Err(SkipReason::Malformed);
    };
    resolve_fields(index, level, registry)
}

fn parse_roster_entry<'r>(segment: &str, registry: &'r UnitRegistry) -> Result<(&'r UnitData, u8, usize), SkipReason> {
    let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();
    let [index, level, count] = fields[..] else {
        return Err(SkipReason::Malformed);
    };
    let count: usize = count.trim().parse().map_err(|_| SkipReason::Malformed)?;
    let (data, level) = resolve_fields(index, level, registry)?;
    Ok((data, level, count))
}

fn resolve_fields<'r>(index: &str, level: &str, registry: &'r UnitRegistry) -> Result<(&'r UnitData, u8), SkipReason> {
    let index: u16 = index.trim().parse().map_err(|_| SkipReason::Malformed)?;
    let level: u32 = level.trim().parse().map_err(|_| SkipReason::Malformed)?;
    let data = registry
        .get_unit_data_by_index(UnitIndex::new(index))
        .ok_or(SkipReason::UnknownUnitIndex(index))?;
    match u8::try_from(level) {
        Ok(level) if is_valid_level(level) => Ok((data, level)),
        _ => Err(SkipReason::LevelOutOfRange(level)),
    }
}
