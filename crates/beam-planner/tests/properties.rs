use beam_planner::interference::{is_blocked, prune_candidates};
use beam_planner::verify::verify_plan;
use beam_planner::visibility::{is_visible, populate_candidates};
use beam_planner::{
    AllocationStrategy, BeamPlan, BeamPlanner, Entity, EntityId, PlannerConfig, SatellitePlan,
    Scenario,
};
use fuzz_harness::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use std::collections::HashSet;

fn build(parts: &ScenarioParts) -> Scenario {
    let mut scenario = Scenario::new();
    for (i, &p) in parts.users.iter().enumerate() {
        scenario.insert(Entity::user(i as EntityId + 1, p));
    }
    // Reverse ids so file order and planning order disagree.
    for (i, &p) in parts.satellites.iter().enumerate() {
        scenario.insert(Entity::satellite(satellite_id(parts, i), p));
    }
    for (i, &p) in parts.interferers.iter().enumerate() {
        scenario.insert(Entity::interferer(i as EntityId + 1, p));
    }
    scenario
}

fn satellite_id(parts: &ScenarioParts, index: usize) -> EntityId {
    (parts.satellites.len() - index) as EntityId
}

fn plan(scenario: &Scenario, config: &PlannerConfig) -> BeamPlan {
    BeamPlanner::new(config.clone()).unwrap().plan(scenario).unwrap()
}

proptest! {
    #![proptest_config(FuzzConfig::new().cases(128).from_env().to_proptest_config())]

    #[test]
    fn greedy_plan_satisfies_all_rules(parts in scenario_parts(60, 4, 3)) {
        let scenario = build(&parts);
        let config = PlannerConfig::default();
        let plan = plan(&scenario, &config);

        let violations = verify_plan(&plan, &scenario, &config).unwrap();
        prop_assert!(violations.is_empty(), "violations: {:?}", violations);

        let mut seen = HashSet::new();
        for link in plan.links() {
            prop_assert!(seen.insert(link.user_id));

            let user = scenario.user(link.user_id).unwrap();
            let sat = scenario.satellite(link.satellite_id).unwrap();
            prop_assert!(is_visible(user, sat, &config).unwrap());
            for interferer in scenario.interferers() {
                prop_assert!(!is_blocked(user, interferer, sat, &config).unwrap());
            }
        }
        for sat in plan.satellites() {
            prop_assert!(sat.links().len() <= config.beams_per_satellite);
        }
    }

    #[test]
    fn shadowed_beams_are_never_planned(s in shadowed_scenario(30, 3, 4)) {
        let scenario = build(&s.parts);
        let config = PlannerConfig::default();
        let plan = plan(&scenario, &config);

        let violations = verify_plan(&plan, &scenario, &config).unwrap();
        prop_assert!(violations.is_empty(), "violations: {:?}", violations);

        let served: HashSet<(EntityId, EntityId)> =
            plan.links().map(|l| (l.satellite_id, l.user_id)).collect();
        let pairs = s.shadowed.iter().zip(scenario.interferers());
        for (&(sat_index, user_index), interferer) in pairs {
            let sat = scenario.satellite(satellite_id(&s.parts, sat_index)).unwrap();
            let user = scenario.user(user_index as EntityId + 1).unwrap();
            prop_assert!(is_blocked(user, interferer, sat, &config).unwrap());
            prop_assert!(!served.contains(&(sat.id, user.id)));
        }
    }

    #[test]
    fn satellites_planned_in_id_order(parts in scenario_parts(20, 5, 0)) {
        let scenario = build(&parts);
        let plan = plan(&scenario, &PlannerConfig::default());

        let ids: Vec<_> = plan.links().map(|l| l.satellite_id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        prop_assert_eq!(ids, sorted);
    }

    #[test]
    fn planning_is_deterministic(parts in scenario_parts(40, 3, 2)) {
        let scenario = build(&parts);
        let config = PlannerConfig::default();

        let first: Vec<_> = plan(&scenario, &config).links().copied().collect();
        let second: Vec<_> = plan(&scenario, &config).links().copied().collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn crowded_satellite_respects_capacity(parts in crowded_single_satellite(80)) {
        let scenario = build(&parts);
        let config = PlannerConfig {
            beams_per_satellite: 12,
            ..PlannerConfig::default()
        };
        let plan = plan(&scenario, &config);

        prop_assert!(plan.link_count() <= 12);
        prop_assert!(verify_plan(&plan, &scenario, &config).unwrap().is_empty());
    }

    #[test]
    fn exhaustive_serves_at_least_greedy(parts in crowded_single_satellite(7)) {
        let scenario = build(&parts);
        let greedy_config = PlannerConfig {
            beams_per_satellite: 4,
            ..PlannerConfig::default()
        };
        let exhaustive_config = greedy_config.clone().with_strategy(AllocationStrategy::Exhaustive);

        let greedy = plan(&scenario, &greedy_config);
        let exhaustive = plan(&scenario, &exhaustive_config);

        prop_assert!(exhaustive.link_count() >= greedy.link_count());
        prop_assert!(verify_plan(&exhaustive, &scenario, &exhaustive_config).unwrap().is_empty());
    }
}

#[test]
fn interference_pruning_removes_shadowed_candidates() {
    let mut runner = TestRunner::deterministic();
    let strategy = shadowed_scenario(30, 3, 4);
    let config = PlannerConfig::default();
    let mut candidates = 0;
    let mut removed = 0;

    for _ in 0..64 {
        let parts = strategy.new_tree(&mut runner).unwrap().current().parts;
        let scenario = build(&parts);
        let mut plans: Vec<SatellitePlan> =
            scenario.satellites().cloned().map(SatellitePlan::new).collect();

        candidates += populate_candidates(&mut plans, &scenario, &config).unwrap();
        removed += prune_candidates(&mut plans, &scenario, &config).unwrap();
    }

    assert!(candidates > 0);
    assert!(removed > 0, "no candidate was pruned out of {}", candidates);
}
