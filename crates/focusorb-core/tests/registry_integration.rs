//! Integration tests for the shared task registry.
//!
//! Covers the full add/rank/credit workflow and concurrent access from
//! several threads, the way the timer and monitor loops use it.

use chrono::NaiveDate;
use focusorb_core::{Priority, TaskRegistry};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

fn new_year() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn registry() -> TaskRegistry {
    TaskRegistry::new(25).with_today(new_year)
}

#[test]
fn test_essay_and_reading_workflow() {
    let reg = registry();
    reg.add("Essay", "60", Some("2026-01-01"), Some("high"));
    reg.add("Reading", "30", Some(""), Some("low"));

    assert_eq!(reg.current_task_name(), "Essay");

    let credited = reg.credit_progress(25).unwrap();
    assert_eq!(credited.name, "Essay");
    assert_eq!(reg.find("essay").unwrap().progress_minutes, 25);
    assert_eq!(reg.find("reading").unwrap().progress_minutes, 0);

    assert!(reg.complete("ESSAY"));
    assert_eq!(reg.current_task_name(), "Reading");
    assert_eq!(reg.credit_progress(25).unwrap().name, "Reading");

    let stats = reg.stats();
    assert_eq!(stats.total_progress_minutes, 50);
    assert_eq!(stats.completed_count, 1);
    assert_eq!(stats.total_count, 2);
}

#[test]
fn test_remove_with_any_casing_leaves_nothing() {
    for removal in ["essay draft", "ESSAY DRAFT", "Essay Draft", "  eSsAy dRaFt "] {
        let reg = registry();
        reg.add("Essay Draft", "45", None, None);
        reg.add("Essay Draft", "15", None, Some("low"));
        assert_eq!(reg.remove(removal), 2, "removing with {removal:?}");
        assert!(reg.find("essay draft").is_none());
        assert_eq!(reg.stats().total_count, 0);
    }
}

#[test]
fn test_empty_registry_is_harmless() {
    let reg = registry();
    assert!(reg.credit_progress(25).is_none());
    assert!(!reg.complete("anything"));
    assert_eq!(reg.remove("anything"), 0);
    assert_eq!(reg.current_task_name(), "General work");
    assert_eq!(reg.summary(), "No tasks added yet.");
}

#[test]
fn test_concurrent_adds_and_credits_stay_consistent() {
    let reg = Arc::new(registry());
    reg.add("Anchor", "600", None, Some("high"));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let reg = Arc::clone(&reg);
            thread::spawn(move || {
                for j in 0..50 {
                    reg.add(&format!("task-{i}-{j}"), "10", None, Some("low"));
                    reg.credit_progress(1);
                    let _ = reg.select_ranked();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stats = reg.stats();
    assert_eq!(stats.total_count, 401);
    assert_eq!(stats.total_progress_minutes, 400);
    // The high-priority anchor outranks every low task, so it got everything.
    assert_eq!(reg.find("anchor").unwrap().progress_minutes, 400);
}

#[test]
fn test_credit_races_with_removal() {
    let reg = Arc::new(registry());
    for i in 0..100 {
        reg.add(&format!("t{i}"), "25", None, None);
    }

    let creditor = {
        let reg = Arc::clone(&reg);
        thread::spawn(move || (0..200).filter(|_| reg.credit_progress(5).is_some()).count())
    };
    let remover = {
        let reg = Arc::clone(&reg);
        thread::spawn(move || (0..100).map(|i| reg.remove(&format!("t{i}"))).sum::<usize>())
    };

    let credited = creditor.join().unwrap();
    let removed = remover.join().unwrap();
    assert_eq!(removed, 100);
    assert!(credited <= 200);
    assert!(reg.list_active().is_empty());
}

fn priority_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("high"), Just("medium"), Just("low"), Just("bogus")]
}

proptest! {
    #[test]
    fn ranked_never_contains_completed(
        specs in prop::collection::vec(
            (0u8..12, priority_name(), prop::option::of(0i64..60), any::<bool>()),
            0..25,
        )
    ) {
        let reg = registry();
        for (i, (name, priority, due_in, done)) in specs.iter().enumerate() {
            let due = due_in.map(|d| (new_year() + chrono::Duration::days(d)).format("%Y-%m-%d").to_string());
            reg.add(&format!("task {name}"), &format!("{}", 5 + i), due.as_deref(), Some(priority));
            if *done {
                reg.complete(&format!("task {name}"));
            }
        }

        let ranked = reg.select_ranked();
        prop_assert!(ranked.iter().all(|t| !t.completed));
        prop_assert_eq!(ranked.len(), reg.list_active().len());

        let today = new_year();
        prop_assert!(ranked.windows(2).all(|w| w[0].score_on(today) <= w[1].score_on(today)));
    }

    #[test]
    fn higher_priority_wins_at_equal_due_date(due_in in prop::option::of(0i64..90)) {
        let reg = registry();
        let due = due_in.map(|d| (new_year() + chrono::Duration::days(d)).format("%Y-%m-%d").to_string());
        reg.add("Low one", "30", due.as_deref(), Some("low"));
        reg.add("High one", "30", due.as_deref(), Some("high"));
        let ranked = reg.select_ranked();
        prop_assert_eq!(ranked[0].priority, Priority::High);
    }
}
