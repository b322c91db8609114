//! Fixture builders shared by the unit tests.

use chrono::{TimeZone, Utc};
use garden_state::{
    ClusterInfo, Condition, LastOperation, Plant, Project, Seed, SeedProvider, Shoot,
    ShootProvider, Worker,
};

use crate::sample::Sample;

pub(crate) fn shoot(project: &str, name: &str) -> Shoot {
    Shoot {
        name: name.to_string(),
        project: project.to_string(),
        uid: format!("uid-{project}-{name}"),
        purpose: None,
        provider: ShootProvider {
            provider_type: "aws".into(),
            workers: vec![Worker {
                name: "worker".into(),
                minimum: 1,
                maximum: 3,
            }],
        },
        region: "eu-west-1".into(),
        kubernetes_version: "1.29.4".into(),
        seed_name: Some("aws-eu".into()),
        hibernated: false,
        creation_timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).single(),
        conditions: vec![Condition::new("APIServerAvailable", "True")],
        last_operation: Some(operation("Reconcile", "Succeeded", 100)),
        is_seed: false,
        api_server_url: None,
        api_response_duration_millis: None,
    }
}

pub(crate) fn operation(operation_type: &str, state: &str, progress: i32) -> LastOperation {
    LastOperation {
        operation_type: operation_type.to_string(),
        state: state.to_string(),
        progress,
        description: None,
    }
}

pub(crate) fn seed(name: &str) -> Seed {
    Seed {
        name: name.to_string(),
        namespace: Some("garden".into()),
        provider: SeedProvider {
            provider_type: "aws".into(),
            region: "eu-west-1".into(),
        },
        visible: true,
        protected: false,
        conditions: vec![Condition::new("GardenletReady", "True")],
    }
}

pub(crate) fn project(name: &str) -> Project {
    Project {
        name: name.to_string(),
        namespace: Some(format!("garden-{name}")),
        phase: "Ready".into(),
        members: Vec::new(),
    }
}

pub(crate) fn plant(project: &str, name: &str) -> Plant {
    Plant {
        name: name.to_string(),
        project: project.to_string(),
        cluster_info: Some(ClusterInfo {
            provider: "gcp".into(),
            region: "europe-west1".into(),
            version: "1.28.2".into(),
        }),
        conditions: vec![Condition::new("APIServerAvailable", "True")],
    }
}

/// All samples of one metric, in emission order.
pub(crate) fn named<'a>(samples: &'a [Sample], name: &str) -> Vec<&'a Sample> {
    samples.iter().filter(|s| s.name == name).collect()
}

/// The single sample of one metric.
pub(crate) fn only<'a>(samples: &'a [Sample], name: &str) -> &'a Sample {
    let matching = named(samples, name);
    assert_eq!(matching.len(), 1, "expected exactly one {name} sample");
    matching[0]
}
