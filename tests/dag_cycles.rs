// tests/dag_cycles.rs

use insightboard::dag::detect_cycles;
use insightboard_test_utils::builders::TaskListBuilder;

#[test]
fn two_node_cycle_is_reported_as_a_full_loop() {
    let graph = TaskListBuilder::new()
        .task("A", &["B"])
        .task("B", &["A"])
        .graph();

    let report = detect_cycles(&graph);

    assert!(report.has_cycles());
    assert_eq!(report.details(), vec!["A → B → A".to_string()]);
    assert!(report.is_member("A"));
    assert!(report.is_member("B"));
}

#[test]
fn self_dependency_is_a_cycle_of_one() {
    let graph = TaskListBuilder::new()
        .task("A", &["A"])
        .task("B", &[])
        .graph();

    let report = detect_cycles(&graph);

    assert_eq!(report.cycles().len(), 1);
    assert_eq!(report.cycles()[0].len(), 1);
    assert_eq!(report.details(), vec!["A → A".to_string()]);
    assert!(!report.is_member("B"));
}

#[test]
fn disjoint_cycles_are_each_reported_in_provided_order() {
    let graph = TaskListBuilder::new()
        .task("A", &["B"])
        .task("B", &["A"])
        .task("C", &["D"])
        .task("D", &["C"])
        .task("E", &["A", "C"])
        .graph();

    let report = detect_cycles(&graph);

    assert_eq!(
        report.details(),
        vec!["A → B → A".to_string(), "C → D → C".to_string()]
    );
    assert!(!report.is_member("E"));
}

#[test]
fn overlapping_cycles_keep_the_first_cycle_per_member() {
    // A -> B -> A and A -> B -> C -> A share A and B.
    let graph = TaskListBuilder::new()
        .task("A", &["B"])
        .task("B", &["A", "C"])
        .task("C", &["A"])
        .graph();

    let report = detect_cycles(&graph);

    assert_eq!(
        report.details(),
        vec!["A → B → A".to_string(), "A → B → C → A".to_string()]
    );
    assert_eq!(
        report.cycle_of("B").map(|c| c.describe()),
        Some("A → B → A".to_string())
    );
    assert_eq!(
        report.cycle_of("C").map(|c| c.describe()),
        Some("A → B → C → A".to_string())
    );
}

#[test]
fn loop_closed_through_a_finished_node_covers_every_member() {
    // X -> Y -> X is found first; X -> Z -> Y -> X only re-enters Y after Y
    // is done, so Z never appears on a back-edge path.
    let graph = TaskListBuilder::new()
        .task("X", &["Y", "Z"])
        .task("Y", &["X"])
        .task("Z", &["Y"])
        .task("W", &["Z"])
        .graph();

    let report = detect_cycles(&graph);

    assert_eq!(report.details(), vec!["X → Y → X".to_string()]);
    assert!(report.is_member("Z"));
    assert_eq!(
        report.cycle_of("Z").map(|c| c.describe()),
        Some("X → Y → X".to_string())
    );
    assert!(!report.is_member("W"));
}

#[test]
fn diamond_has_no_cycle() {
    let graph = TaskListBuilder::new()
        .task("A", &[])
        .task("B", &["A"])
        .task("C", &["A"])
        .task("D", &["B", "C"])
        .graph();

    let report = detect_cycles(&graph);

    assert!(!report.has_cycles());
    assert!(report.details().is_empty());
}

#[test]
fn dangling_references_never_form_cycles() {
    let graph = TaskListBuilder::new()
        .task("A", &["X"])
        .task("B", &["A", "Y"])
        .graph();

    let report = detect_cycles(&graph);

    assert!(!report.has_cycles());
    assert!(!report.is_member("A"));
}

#[test]
fn long_chain_does_not_overflow() {
    let ids: Vec<String> = (0..20_000).map(|i| format!("t{i}")).collect();
    let mut builder = TaskListBuilder::new().task(&ids[0], &[]);
    for pair in ids.windows(2) {
        builder = builder.task(&pair[1], &[pair[0].as_str()]);
    }

    let report = detect_cycles(&builder.graph());

    assert!(!report.has_cycles());
}
