//! End-to-end scheduling scenarios.

use taskdeps::{
    DependencyConfig, DependencyRejection, Error, TaskId, TaskRepository, TaskStatus, Validation,
};

use crate::fixtures::{
    chain_tasks, diamond_tasks, position, ring_tasks, test_task, ResolverHarness, PROJECT,
};

/// Given 1 <- 2 <- 3
/// When the execution order is requested
/// Then tasks come out 1, 2, 3
#[test]
fn test_chain_execution_order() {
    let harness = ResolverHarness::new(chain_tasks());
    let order = harness.resolver.get_execution_order(PROJECT, false).unwrap();
    assert_eq!(order, vec![TaskId(1), TaskId(2), TaskId(3)]);
}

/// Given a diamond
/// When the execution order is requested
/// Then 1 comes before 2 and 3, which both come before 4
#[test]
fn test_diamond_execution_order() {
    let harness = ResolverHarness::new(diamond_tasks());
    let order = harness.resolver.get_execution_order(PROJECT, false).unwrap();

    assert_eq!(order.len(), 4);
    assert!(position(&order, 1) < position(&order, 2));
    assert!(position(&order, 1) < position(&order, 3));
    assert!(position(&order, 2) < position(&order, 4));
    assert!(position(&order, 3) < position(&order, 4));
    assert_ne!(order[0], TaskId(4));
}

/// Given a stored ring 1 -> 2 -> 3 -> 1
/// When the execution order is requested
/// Then a CircularDependency error names the ring
#[test]
fn test_ring_raises_circular_dependency() {
    let harness = ResolverHarness::new(ring_tasks());
    match harness.resolver.get_execution_order(PROJECT, false) {
        Err(Error::CircularDependency { cycle }) => {
            assert!(!cycle.is_empty());
            assert_eq!(cycle.first(), cycle.last());
            for id in 1..=3 {
                assert!(cycle.contains(&TaskId(id)), "cycle {:?} misses {}", cycle, id);
            }
        }
        other => panic!("Expected CircularDependency, got {:?}", other),
    }
}

/// Given a task depending on a FAILED task and strict failure handling
/// Then the task is not ready and is reported as blocked
#[test]
fn test_failed_dependency_blocks_when_strict() {
    let harness = ResolverHarness::new(vec![
        test_task(1, &[]).with_status(TaskStatus::Failed),
        test_task(2, &[1]),
    ]);

    assert!(!harness.resolver.is_task_ready(TaskId(2)).unwrap());
    assert_eq!(
        harness.resolver.get_blocked_tasks(PROJECT).unwrap(),
        vec![TaskId(2)]
    );
}

/// Given a task depending on a FAILED task and lenient failure handling
/// Then the task is ready
#[test]
fn test_failed_dependency_unblocks_when_lenient() {
    let config = DependencyConfig {
        fail_on_dependency_error: false,
        ..Default::default()
    };
    let harness = ResolverHarness::with_config(
        vec![
            test_task(1, &[]).with_status(TaskStatus::Failed),
            test_task(2, &[1]),
        ],
        config,
    );

    assert!(harness.resolver.is_task_ready(TaskId(2)).unwrap());
    assert!(harness.resolver.get_blocked_tasks(PROJECT).unwrap().is_empty());
}

/// Given 3 -> 2 -> 1 and max_depth 2
/// When 4 -> 3 is validated
/// Then it is rejected because the depth would be 3
#[test]
fn test_depth_limit_rejects_edge() {
    let config = DependencyConfig {
        max_depth: 2,
        ..Default::default()
    };
    let mut tasks = chain_tasks();
    tasks.push(test_task(4, &[]));
    let harness = ResolverHarness::with_config(tasks, config);

    let verdict = harness
        .resolver
        .validate_dependency(TaskId(4), TaskId(3))
        .unwrap();
    assert!(!verdict.is_valid());
    assert!(verdict.reason().unwrap().contains("depth"));
    assert_eq!(
        verdict,
        Validation::Rejected(DependencyRejection::DepthExceeded { depth: 3, max: 2 })
    );
}

/// A scheduler loop: dispatch ready tasks, mark them complete, repeat until
/// the project is done. Every task must be dispatched only after its
/// dependencies completed.
#[test]
fn test_scheduling_workflow() {
    let harness = ResolverHarness::new(diamond_tasks());
    let mut dispatched = Vec::new();

    for _ in 0..10 {
        let ready = harness.resolver.get_ready_tasks(PROJECT).unwrap();
        if ready.is_empty() {
            break;
        }
        for id in ready {
            let task = harness.repo.get_task(id).unwrap();
            for dep in task.dependencies() {
                assert!(dispatched.contains(dep), "{} dispatched before {}", id, dep);
            }
            harness
                .repo
                .insert(task.with_status(TaskStatus::Completed));
            dispatched.push(id);
        }
    }

    assert_eq!(dispatched.len(), 4);
    assert!(harness
        .resolver
        .get_execution_order(PROJECT, false)
        .unwrap()
        .is_empty());
}

/// Edges built through add_dependency keep the project acyclic, and the
/// tree rendering reflects them.
#[test]
fn test_build_graph_through_resolver() {
    let harness = ResolverHarness::new(vec![
        test_task(1, &[]),
        test_task(2, &[]),
        test_task(3, &[]),
    ]);
    let resolver = &harness.resolver;

    assert!(resolver.add_dependency(TaskId(2), TaskId(1)).unwrap());
    assert!(resolver.add_dependency(TaskId(3), TaskId(2)).unwrap());
    assert!(matches!(
        resolver.add_dependency(TaskId(1), TaskId(3)),
        Err(Error::InvalidDependency(DependencyRejection::WouldCycle))
    ));

    assert_eq!(
        resolver.get_execution_order(PROJECT, false).unwrap(),
        vec![TaskId(1), TaskId(2), TaskId(3)]
    );
    assert_eq!(resolver.get_dependents(TaskId(1)).unwrap(), vec![TaskId(2)]);

    let tree = resolver
        .visualize_dependencies(PROJECT, Some(TaskId(3)))
        .unwrap();
    assert_eq!(
        tree,
        "Task 3: task-3\n  └── ○ Task 2: task-2 [pending]\n      └── ○ Task 1: task-1 [pending]\n"
    );
}
