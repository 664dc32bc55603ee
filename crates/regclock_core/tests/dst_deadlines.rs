use std::collections::BTreeSet;

use regclock_core::civil::{regulator_calendar, CivilCalendar};
use regclock_core::deadline::calculate_deadlines;
use regclock_core::domain::{DeadlineKind, Disambiguation, IncidentFacts, Severity};
use regclock_core::engine::classify;
use regclock_core::error::ClassificationError;
use time::macros::{date, datetime, time};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

fn facts_for(severity: Severity, anchor: PrimitiveDateTime) -> IncidentFacts {
    let clients = match severity {
        Severity::Major => 2000,
        Severity::Significant => 500,
        _ => 0,
    };
    IncidentFacts {
        clients_affected: clients,
        downtime_minutes: 0,
        critical_services_affected: BTreeSet::new(),
        detected_at: Some(anchor),
        confirmed_at: None,
        occurred_at: None,
    }
}

/// A wall-clock offset of `nominal_seconds` spans a different absolute
/// duration exactly when the local offset changed between anchor and deadline.
fn assert_wall_clock_delta(
    cal: &CivilCalendar,
    anchor: OffsetDateTime,
    deadline: OffsetDateTime,
    nominal_seconds: i64,
    label: &str,
) {
    let actual = (deadline - anchor).whole_seconds();
    let offset_adjust = i64::from(cal.offset_at(anchor).whole_seconds())
        - i64::from(cal.offset_at(deadline).whole_seconds());
    assert_eq!(
        actual,
        nominal_seconds + offset_adjust,
        "{label}: wall-clock projection drifted"
    );
}

#[test]
fn transition_matrix_32_scenarios() {
    struct DstCase {
        label: &'static str,
        weekday_anchor: Date,
        weekend_anchor: Date,
        expected_transition: Option<&'static str>,
    }
    // Transition-window anchors sit on the Friday/Saturday before the Sunday
    // transition so every 14-day final window crosses it exactly once.
    let dst_cases = [
        DstCase {
            label: "spring_gap",
            weekday_anchor: date!(2026 - 03 - 27),
            weekend_anchor: date!(2026 - 03 - 28),
            expected_transition: Some("spring_forward_2026-03-29"),
        },
        DstCase {
            label: "autumn_overlap",
            weekday_anchor: date!(2026 - 10 - 23),
            weekend_anchor: date!(2026 - 10 - 24),
            expected_transition: Some("fall_back_2026-10-25"),
        },
        DstCase {
            label: "ordinary_summer",
            weekday_anchor: date!(2026 - 07 - 15),
            weekend_anchor: date!(2026 - 07 - 18),
            expected_transition: None,
        },
        DstCase {
            label: "ordinary_winter",
            weekday_anchor: date!(2026 - 01 - 15),
            weekend_anchor: date!(2026 - 01 - 17),
            expected_transition: None,
        },
    ];
    let times: [(&str, Time); 2] = [
        ("business_hours", time!(14:30)),
        ("after_hours", time!(20:45)),
    ];
    let severities = [Severity::Major, Severity::Significant];

    let cal = regulator_calendar();
    let mut scenarios = 0;

    for case in &dst_cases {
        for (day_label, anchor_date) in [
            ("weekday", case.weekday_anchor),
            ("weekend", case.weekend_anchor),
        ] {
            for (time_label, anchor_time) in times {
                for severity in severities {
                    scenarios += 1;
                    let label = format!(
                        "{}/{}/{}/{}",
                        case.label,
                        day_label,
                        time_label,
                        severity.as_str()
                    );
                    let anchor_local = PrimitiveDateTime::new(anchor_date, anchor_time);
                    let facts = facts_for(severity, anchor_local);
                    let classification = classify(cal, &facts, None)
                        .unwrap_or_else(|e| panic!("{label}: {e}"));
                    assert_eq!(classification.result.severity, severity, "{label}");
                    let deadlines = classification
                        .deadlines
                        .unwrap_or_else(|| panic!("{label}: expected deadlines"));
                    let anchor = classification.result.anchor_instant;

                    // Ordering invariant.
                    assert!(anchor < deadlines.initial_notification, "{label}");
                    match deadlines.intermediate_report {
                        Some(mid) => {
                            assert!(deadlines.initial_notification <= mid, "{label}");
                            assert!(mid < deadlines.final_report, "{label}");
                        }
                        None => {
                            assert!(
                                deadlines.initial_notification < deadlines.final_report,
                                "{label}"
                            );
                        }
                    }

                    // Transition reporting over (anchor, final].
                    let expected: Vec<String> = case
                        .expected_transition
                        .iter()
                        .map(|s| s.to_string())
                        .collect();
                    assert_eq!(deadlines.transitions_crossed, expected, "{label}");

                    // Wall-clock semantics for every projected offset.
                    let (initial_hours, intermediate_hours) = match severity {
                        Severity::Major => (4, Some(72)),
                        _ => (24, None),
                    };
                    assert_wall_clock_delta(
                        cal,
                        anchor,
                        deadlines.initial_notification,
                        initial_hours * 3600,
                        &label,
                    );
                    if let (Some(hours), Some(mid)) =
                        (intermediate_hours, deadlines.intermediate_report)
                    {
                        assert_wall_clock_delta(cal, anchor, mid, hours * 3600, &label);
                    }
                    assert_wall_clock_delta(
                        cal,
                        anchor,
                        deadlines.final_report,
                        14 * 24 * 3600,
                        &label,
                    );
                    assert_eq!(deadlines.display_time_zone, "Europe/Brussels", "{label}");
                }
            }
        }
    }
    assert_eq!(scenarios, 32);
}

#[test]
fn initial_deadline_rides_through_the_spring_gap() {
    // Anchor at 01:30 local, immediately before the 02:00-03:00 gap.
    let facts = facts_for(Severity::Major, datetime!(2026-03-29 01:30));
    let classification = classify(regulator_calendar(), &facts, None).expect("classifies");
    assert_eq!(
        classification.result.anchor_instant,
        datetime!(2026-03-29 00:30 UTC)
    );
    let deadlines = classification.deadlines.expect("major has deadlines");
    // 4 wall-clock hours later is 05:30 local summer time, only 3 absolute
    // hours after the anchor because the 02:00 hour was skipped.
    assert_eq!(
        deadlines.initial_notification,
        datetime!(2026-03-29 03:30 UTC)
    );
    assert_eq!(
        (deadlines.initial_notification - classification.result.anchor_instant).whole_hours(),
        3
    );
    assert_eq!(
        deadlines.transitions_crossed,
        vec!["spring_forward_2026-03-29".to_string()]
    );
    // 72 wall-clock hours: April 1st 01:30 local summer time.
    assert_eq!(
        deadlines.intermediate_report,
        Some(datetime!(2026-03-31 23:30 UTC))
    );
    // 14 calendar days: April 12th 01:30 local summer time.
    assert_eq!(deadlines.final_report, datetime!(2026-04-11 23:30 UTC));
}

#[test]
fn initial_deadline_spans_five_absolute_hours_across_fall_back() {
    let facts = facts_for(Severity::Major, datetime!(2026-10-25 00:30));
    let classification = classify(regulator_calendar(), &facts, None).expect("classifies");
    // 00:30 local is before the overlap and unambiguous (summer time).
    assert_eq!(
        classification.result.anchor_instant,
        datetime!(2026-10-24 22:30 UTC)
    );
    assert!(classification.result.anchor_ambiguity.is_none());
    let deadlines = classification.deadlines.expect("major has deadlines");
    // 4 wall-clock hours later is 04:30 local winter time = 5 absolute hours.
    assert_eq!(
        deadlines.initial_notification,
        datetime!(2026-10-25 03:30 UTC)
    );
    assert_eq!(
        (deadlines.initial_notification - classification.result.anchor_instant).whole_hours(),
        5
    );
    assert_eq!(
        deadlines.transitions_crossed,
        vec!["fall_back_2026-10-25".to_string()]
    );
}

#[test]
fn ambiguous_anchor_defaults_to_earlier_and_is_audited() {
    let facts = facts_for(Severity::Significant, datetime!(2026-10-25 02:30));
    let classification = classify(regulator_calendar(), &facts, None).expect("classifies");
    assert_eq!(
        classification.result.anchor_instant,
        datetime!(2026-10-25 00:30 UTC)
    );
    let note = classification
        .result
        .anchor_ambiguity
        .expect("default choice must appear in the audit trace");
    assert_eq!(note.chosen, Disambiguation::Earlier);
    assert!(note.defaulted);
    assert_eq!(note.transition, "fall_back_2026-10-25");
    let deadlines = classification.deadlines.expect("significant has deadlines");
    // 24 wall-clock hours later is 02:30 local winter time.
    assert_eq!(
        deadlines.initial_notification,
        datetime!(2026-10-26 01:30 UTC)
    );
}

#[test]
fn ambiguous_anchor_honors_explicit_later_choice() {
    let facts = facts_for(Severity::Significant, datetime!(2026-10-25 02:30));
    let classification =
        classify(regulator_calendar(), &facts, Some(Disambiguation::Later)).expect("classifies");
    assert_eq!(
        classification.result.anchor_instant,
        datetime!(2026-10-25 01:30 UTC)
    );
    let note = classification.result.anchor_ambiguity.expect("recorded");
    assert_eq!(note.chosen, Disambiguation::Later);
    assert!(!note.defaulted);
}

#[test]
fn gap_anchor_fails_with_suggested_instant() {
    let facts = facts_for(Severity::Major, datetime!(2026-03-29 02:30));
    let err = classify(regulator_calendar(), &facts, None).expect_err("gap anchor must fail");
    match err {
        ClassificationError::NonExistentLocalTime {
            requested,
            suggested,
            transition,
        } => {
            assert_eq!(requested, datetime!(2026-03-29 02:30));
            assert_eq!(suggested, datetime!(2026-03-29 01:00 UTC));
            assert_eq!(transition, "spring_forward_2026-03-29");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn hour_scale_target_inside_gap_fails_as_deadline_computation() {
    // 24 wall-clock hours from 02:30 on the eve of the transition targets the
    // non-existent 02:30 on transition day.
    let facts = facts_for(Severity::Significant, datetime!(2026-03-28 02:30));
    let err = classify(regulator_calendar(), &facts, None).expect_err("target in gap");
    match err {
        ClassificationError::DeadlineComputationFailed {
            severity,
            deadline,
            requested,
            suggested,
            transition,
        } => {
            assert_eq!(severity, Severity::Significant);
            assert_eq!(deadline, DeadlineKind::InitialNotification);
            assert_eq!(requested, datetime!(2026-03-29 02:30));
            assert_eq!(suggested, datetime!(2026-03-29 01:00 UTC));
            assert_eq!(transition, "spring_forward_2026-03-29");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn day_scale_target_inside_gap_fails_as_deadline_computation() {
    // 14 calendar days from 02:30 on March 15th targets the skipped hour.
    let facts = facts_for(Severity::Major, datetime!(2026-03-15 02:30));
    let err = classify(regulator_calendar(), &facts, None).expect_err("target in gap");
    assert_eq!(err.code(), "DEADLINE_COMPUTATION_FAILED");
    match err {
        ClassificationError::DeadlineComputationFailed {
            deadline,
            requested,
            ..
        } => {
            assert_eq!(deadline, DeadlineKind::FinalReport);
            assert_eq!(requested, datetime!(2026-03-29 02:30));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn minor_severity_still_computes_deadlines_when_requested_directly() {
    // The classifier never emits Minor, but a downstream promotion may ask
    // the calculator for its offsets.
    let cal = regulator_calendar();
    let anchor = datetime!(2026-01-15 13:30 UTC);
    let deadlines = calculate_deadlines(cal, anchor, Severity::Minor)
        .expect("computes")
        .expect("minor has deadlines");
    assert_eq!(
        deadlines.initial_notification,
        datetime!(2026-01-16 13:30 UTC)
    );
    assert_eq!(deadlines.intermediate_report, None);
    assert_eq!(deadlines.final_report, datetime!(2026-01-29 13:30 UTC));
    assert!(deadlines.transitions_crossed.is_empty());
}

#[test]
fn no_report_severity_has_no_notification_obligation() {
    let cal = regulator_calendar();
    let anchor = datetime!(2026-01-15 13:30 UTC);
    let deadlines = calculate_deadlines(cal, anchor, Severity::NoReport).expect("computes");
    assert!(deadlines.is_none());
}
