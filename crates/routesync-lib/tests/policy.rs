mod common;

use routesync_lib::{plan_routes, CargoDetails, PolicyFlag, RouteRequest, SearchOptions};

use common::fixture_dataset;

fn cargo(cargo_type: &str, description: &str) -> CargoDetails {
    CargoDetails {
        cargo_type: cargo_type.into(),
        description: description.into(),
        weight: 1200.0,
    }
}

#[test]
fn strict_prohibition_on_goal_country_is_unreachable() {
    let dataset = fixture_dataset();
    let request = RouteRequest::new("Shanghai", "Moscow")
        .with_policy_flags(PolicyFlag::Strict, PolicyFlag::Ignore)
        .with_cargo(cargo("hazardous", ""));
    let plan = plan_routes(
        &dataset.network,
        &dataset.policies,
        &request,
        &SearchOptions::default(),
    )
    .unwrap();

    assert_eq!(plan.avoided_countries, vec!["AE", "RU"]);
    assert_eq!(
        plan.paths.error(),
        Some("No valid route: Start (Shanghai) or goal (Moscow) is in a banned country.")
    );
}

#[test]
fn keyword_match_excludes_and_penalises_countries() {
    let dataset = fixture_dataset();
    let network = &dataset.network;
    let request = RouteRequest::new("Shanghai", "Paris")
        .with_top_n(10)
        .with_policy_flags(PolicyFlag::Strict, PolicyFlag::Avoid)
        .with_cargo(cargo("general", "Sporting firearms, boxed"));
    let plan = plan_routes(network, &dataset.policies, &request, &SearchOptions::default()).unwrap();

    assert_eq!(plan.avoided_countries, vec!["NL", "SG"]);
    assert_eq!(plan.penalty_countries, vec!["DE", "FR"]);

    let paths = plan.paths.paths();
    assert!(!paths.is_empty());
    for path in paths {
        assert!(!path.path.iter().any(|n| n == "Singapore" || n == "Rotterdam"));
    }
}

#[test]
fn avoid_flag_only_penalises() {
    let dataset = fixture_dataset();
    let request = RouteRequest::new("Shenzhen", "Dubai")
        .with_policy_flags(PolicyFlag::Ignore, PolicyFlag::Avoid)
        .with_cargo(cargo("electronics", "laptops"));
    let plan = plan_routes(
        &dataset.network,
        &dataset.policies,
        &request,
        &SearchOptions::default(),
    )
    .unwrap();

    assert!(plan.avoided_countries.is_empty());
    assert_eq!(plan.penalty_countries, vec!["IN"]);
    assert!(!plan.paths.paths().is_empty());
}

#[test]
fn ignore_flags_skip_the_catalog() {
    let dataset = fixture_dataset();
    let request = RouteRequest::new("Shanghai", "Moscow")
        .with_avoid_countries(["us"])
        .with_cargo(cargo("hazardous", "flammable explosives"));
    let plan = plan_routes(
        &dataset.network,
        &dataset.policies,
        &request,
        &SearchOptions::default(),
    )
    .unwrap();

    assert_eq!(plan.avoided_countries, vec!["US"]);
    assert!(plan.penalty_countries.is_empty());
    assert!(plan.paths.error().is_none());
}

#[test]
fn avoided_start_country_is_unreachable() {
    let dataset = fixture_dataset();
    let request = RouteRequest::new("Hamburg", "Shanghai").with_avoid_countries(["DE"]);
    let plan = plan_routes(
        &dataset.network,
        &dataset.policies,
        &request,
        &SearchOptions::default(),
    )
    .unwrap();

    assert_eq!(plan.avoided_countries, vec!["DE"]);
    let message = plan.paths.error().unwrap();
    assert!(message.starts_with("No valid route: Start (Hamburg)"));
}
