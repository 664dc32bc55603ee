use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use time::macros::{offset, time};
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::domain::{AmbiguityNote, Disambiguation};
use crate::error::ClockError;

/// Years covered by the generated EU rule table. The current EU directive
/// (last Sunday of March / October at 01:00 UTC) has applied since 1996.
const EU_RULE_FIRST_YEAR: i32 = 1996;
const EU_RULE_LAST_YEAR: i32 = 2099;

/// What a transition does to local clocks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Clocks skip forward; a local interval does not exist.
    Gap,
    /// Clocks fall back; a local interval occurs twice.
    Overlap,
}

/// One offset change in a civil calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transition {
    /// The absolute instant at which local clocks change.
    #[serde(with = "time::serde::rfc3339")]
    pub utc: OffsetDateTime,
    pub offset_before: UtcOffset,
    pub offset_after: UtcOffset,
    /// Stable identifier reported in audit trails,
    /// e.g. `spring_forward_2026-03-29`.
    pub id: String,
}

fn local_at(instant: OffsetDateTime, offset: UtcOffset) -> PrimitiveDateTime {
    let shifted = instant.to_offset(offset);
    PrimitiveDateTime::new(shifted.date(), shifted.time())
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        if self.offset_after > self.offset_before {
            TransitionKind::Gap
        } else {
            TransitionKind::Overlap
        }
    }

    /// Whether `local` falls inside the skipped local interval of a gap
    /// transition. Always false for overlaps.
    pub fn gap_contains(&self, local: PrimitiveDateTime) -> bool {
        if self.kind() != TransitionKind::Gap {
            return false;
        }
        let start = local_at(self.utc, self.offset_before);
        let end = local_at(self.utc, self.offset_after);
        start <= local && local < end
    }

    /// Whether `local` falls inside the repeated local interval of an overlap
    /// transition. Always false for gaps.
    pub fn overlap_contains(&self, local: PrimitiveDateTime) -> bool {
        if self.kind() != TransitionKind::Overlap {
            return false;
        }
        let start = local_at(self.utc, self.offset_after);
        let end = local_at(self.utc, self.offset_before);
        start <= local && local < end
    }
}

/// A local timestamp resolved to exactly one absolute instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedLocal {
    /// The chosen absolute instant, normalized to UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub instant: OffsetDateTime,
    /// The local-to-absolute offset in effect at that instant.
    pub offset: UtcOffset,
    /// Present when the local time was ambiguous and a choice was made.
    pub ambiguity: Option<AmbiguityNote>,
}

/// A named civil calendar with its full offset-transition rule table.
///
/// Contract:
/// - The table is immutable after construction; concurrent readers need no
///   synchronization.
/// - `resolve` never rounds: gap times are rejected with a suggestion,
///   overlap times are disambiguated explicitly (default `earlier`, recorded).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CivilCalendar {
    name: String,
    /// Offset in effect before the first transition in the table.
    base_offset: UtcOffset,
    /// Sorted ascending by `utc`.
    transitions: Vec<Transition>,
}

impl CivilCalendar {
    /// Build a calendar from an explicit rule table. Intended for synthetic
    /// calendars in tests as much as for real rule sets.
    pub fn new(
        name: impl Into<String>,
        base_offset: UtcOffset,
        mut transitions: Vec<Transition>,
    ) -> Self {
        transitions.sort_by_key(|t| t.utc);
        Self {
            name: name.into(),
            base_offset,
            transitions,
        }
    }

    /// The regulator's calendar: Europe/Brussels under the EU rule, generated
    /// for 1996..=2099.
    pub fn europe_brussels() -> Self {
        let mut transitions =
            Vec::with_capacity(2 * (EU_RULE_LAST_YEAR - EU_RULE_FIRST_YEAR + 1) as usize);
        for year in EU_RULE_FIRST_YEAR..=EU_RULE_LAST_YEAR {
            if let Some(t) =
                eu_transition(year, Month::March, offset!(+1), offset!(+2), "spring_forward")
            {
                transitions.push(t);
            }
            if let Some(t) =
                eu_transition(year, Month::October, offset!(+2), offset!(+1), "fall_back")
            {
                transitions.push(t);
            }
        }
        Self::new("Europe/Brussels", offset!(+1), transitions)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The local-to-absolute offset in effect at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        let idx = self.transitions.partition_point(|t| t.utc <= instant);
        if idx == 0 {
            self.base_offset
        } else {
            self.transitions[idx - 1].offset_after
        }
    }

    /// The local civil time corresponding to `instant`.
    pub fn to_local(&self, instant: OffsetDateTime) -> PrimitiveDateTime {
        local_at(instant, self.offset_at(instant))
    }

    /// The most recent transition at or before `instant`, if any.
    pub fn previous_transition(&self, instant: OffsetDateTime) -> Option<&Transition> {
        let idx = self.transitions.partition_point(|t| t.utc <= instant);
        if idx == 0 {
            None
        } else {
            Some(&self.transitions[idx - 1])
        }
    }

    /// The next transition strictly after `instant`, if any.
    pub fn next_transition(&self, instant: OffsetDateTime) -> Option<&Transition> {
        let idx = self.transitions.partition_point(|t| t.utc <= instant);
        self.transitions.get(idx)
    }

    /// Transitions with `start < utc <= end`, in chronological order.
    pub fn transitions_between(&self, start: OffsetDateTime, end: OffsetDateTime) -> Vec<&Transition> {
        let lo = self.transitions.partition_point(|t| t.utc <= start);
        let hi = self.transitions.partition_point(|t| t.utc <= end);
        self.transitions[lo..hi].iter().collect()
    }

    /// Resolve a local civil timestamp to exactly one absolute instant.
    ///
    /// Contract:
    /// - Unambiguous local times resolve directly.
    /// - Gap times fail with `NON_EXISTENT_LOCAL_TIME`, carrying the first
    ///   valid instant after the gap and the transition identifier.
    /// - Overlap times resolve per `disambiguation`; when the caller supplies
    ///   none, the `earlier` occurrence is chosen and the returned
    ///   `AmbiguityNote` records `defaulted: true` (also logged).
    pub fn resolve(
        &self,
        local: PrimitiveDateTime,
        disambiguation: Option<Disambiguation>,
    ) -> Result<ResolvedLocal, ClockError> {
        let probe = local.assume_utc();
        let window_start = probe - Duration::days(2);
        let window_end = probe + Duration::days(2);

        // Every offset plausibly in effect around this local time.
        let mut offsets = vec![self.offset_at(window_start)];
        for t in self.transitions_between(window_start, window_end) {
            if !offsets.contains(&t.offset_before) {
                offsets.push(t.offset_before);
            }
            if !offsets.contains(&t.offset_after) {
                offsets.push(t.offset_after);
            }
        }

        let mut candidates: Vec<(OffsetDateTime, UtcOffset)> = Vec::new();
        for off in offsets {
            let candidate = local.assume_offset(off);
            if self.offset_at(candidate) == off {
                candidates.push((candidate.to_offset(UtcOffset::UTC), off));
            }
        }
        candidates.sort_by_key(|(instant, _)| *instant);
        candidates.dedup_by_key(|(instant, _)| *instant);

        match candidates.len() {
            0 => Err(self.gap_error(local, window_start, window_end)),
            1 => Ok(ResolvedLocal {
                instant: candidates[0].0,
                offset: candidates[0].1,
                ambiguity: None,
            }),
            _ => {
                let chosen = disambiguation.unwrap_or(Disambiguation::Earlier);
                let defaulted = disambiguation.is_none();
                let (instant, offset) = match chosen {
                    Disambiguation::Earlier => candidates[0],
                    Disambiguation::Later => candidates[candidates.len() - 1],
                };
                let transition = self
                    .next_transition(candidates[0].0)
                    .map(|t| t.id.clone())
                    .unwrap_or_default();
                if defaulted {
                    tracing::warn!(
                        calendar = %self.name,
                        local = %local,
                        transition = %transition,
                        "ambiguous local time resolved to earlier occurrence by default"
                    );
                }
                Ok(ResolvedLocal {
                    instant,
                    offset,
                    ambiguity: Some(AmbiguityNote {
                        transition,
                        chosen,
                        defaulted,
                    }),
                })
            }
        }
    }

    fn gap_error(
        &self,
        local: PrimitiveDateTime,
        window_start: OffsetDateTime,
        window_end: OffsetDateTime,
    ) -> ClockError {
        let within = self.transitions_between(window_start, window_end);
        // Zero candidates implies a gap transition inside the probe window.
        let gap = within
            .iter()
            .copied()
            .find(|t| t.gap_contains(local))
            .or_else(|| within.first().copied());
        match gap {
            Some(t) => ClockError::NonExistentLocalTime {
                requested: local,
                suggested: t.utc,
                transition: t.id.clone(),
            },
            None => ClockError::NonExistentLocalTime {
                requested: local,
                suggested: local.assume_offset(self.base_offset).to_offset(UtcOffset::UTC),
                transition: String::new(),
            },
        }
    }
}

/// EU-rule transition for one year: last Sunday of `month` at 01:00 UTC.
fn eu_transition(
    year: i32,
    month: Month,
    offset_before: UtcOffset,
    offset_after: UtcOffset,
    label: &str,
) -> Option<Transition> {
    let last_day = Date::from_calendar_date(year, month, 31).ok()?;
    let days_back = i64::from(last_day.weekday().number_days_from_sunday());
    let sunday = last_day - Duration::days(days_back);
    let utc = PrimitiveDateTime::new(sunday, time!(01:00)).assume_utc();
    Some(Transition {
        utc,
        offset_before,
        offset_after,
        id: format!("{label}_{sunday}"),
    })
}

static REGULATOR_CALENDAR: Lazy<CivilCalendar> = Lazy::new(CivilCalendar::europe_brussels);

/// The process-wide regulator calendar, built once and never mutated.
pub fn regulator_calendar() -> &'static CivilCalendar {
    &REGULATOR_CALENDAR
}
