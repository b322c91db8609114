//! Deployment-specific metrics on top of the fixed catalog.
//!
//! A customization owns one descriptor and derives its samples from the
//! shoot snapshot of the current scrape. The only built-in kind is
//! [`ShootGroupCount`], configured from `[[customization.shoot]]` entries.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use garden_state::Shoot;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Descriptor};
use crate::error::{MetricsError, MetricsResult};
use crate::extract::shoots::{DEFAULT_PURPOSE, active_operation};
use crate::failures::SCRAPE_FAILURES;
use crate::sample::{Sample, bool_label};

/// A shoot attribute usable as a customization label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShootField {
    Name,
    Project,
    Iaas,
    Version,
    Region,
    Seed,
    Purpose,
    IsSeed,
    Hibernated,
    Operation,
    State,
}

impl ShootField {
    /// Label name used in the exposition.
    pub fn label(self) -> &'static str {
        match self {
            ShootField::Name => "name",
            ShootField::Project => "project",
            ShootField::Iaas => "iaas",
            ShootField::Version => "version",
            ShootField::Region => "region",
            ShootField::Seed => "seed",
            ShootField::Purpose => "purpose",
            ShootField::IsSeed => "is_seed",
            ShootField::Hibernated => "hibernated",
            ShootField::Operation => "operation",
            ShootField::State => "state",
        }
    }

    /// The label value of this field for `shoot`. Absent values are empty.
    pub fn value(self, shoot: &Shoot) -> &str {
        match self {
            ShootField::Name => shoot.name.as_str(),
            ShootField::Project => shoot.project.as_str(),
            ShootField::Iaas => shoot.provider.provider_type.as_str(),
            ShootField::Version => shoot.kubernetes_version.as_str(),
            ShootField::Region => shoot.region.as_str(),
            ShootField::Seed => shoot.seed_name.as_deref().unwrap_or_default(),
            ShootField::Purpose => shoot.purpose.as_deref().unwrap_or(DEFAULT_PURPOSE),
            ShootField::IsSeed => bool_label(shoot.is_seed),
            ShootField::Hibernated => bool_label(shoot.hibernated),
            ShootField::Operation => active_operation(shoot)
                .map(|op| op.operation_type.as_str())
                .unwrap_or_default(),
            ShootField::State => active_operation(shoot)
                .map(|op| op.state.as_str())
                .unwrap_or_default(),
        }
    }
}

/// One `[[customization.shoot]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShootCustomizationConfig {
    pub name: String,
    pub help: String,
    pub labels: Vec<ShootField>,
}

/// An extra metric derived from the shoot snapshot.
pub trait Customization: Send + Sync {
    fn descriptor(&self) -> &Descriptor;

    /// Samples for this scrape; labels follow `descriptor().labels`.
    fn collect(&self, shoots: &[Arc<Shoot>]) -> Vec<Sample>;
}

/// Number of shoots per distinct tuple of the configured fields.
#[derive(Debug, Clone)]
pub struct ShootGroupCount {
    descriptor: Descriptor,
    fields: Vec<ShootField>,
}

impl ShootGroupCount {
    pub fn new(config: &ShootCustomizationConfig) -> MetricsResult<Self> {
        if config.name.is_empty() {
            return Err(MetricsError::Schema("customization without a name".into()));
        }
        if config.labels.is_empty() {
            return Err(MetricsError::Schema(format!(
                "customization {} has no labels",
                config.name
            )));
        }
        let distinct: BTreeSet<ShootField> = config.labels.iter().copied().collect();
        if distinct.len() != config.labels.len() {
            return Err(MetricsError::Schema(format!(
                "customization {} repeats a label",
                config.name
            )));
        }

        let labels: Vec<&str> = config.labels.iter().map(|f| f.label()).collect();
        Ok(Self {
            descriptor: Descriptor::new(&config.name, &config.help, &labels),
            fields: config.labels.clone(),
        })
    }
}

impl Customization for ShootGroupCount {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn collect(&self, shoots: &[Arc<Shoot>]) -> Vec<Sample> {
        let mut groups: BTreeMap<Vec<&str>, u64> = BTreeMap::new();
        for shoot in shoots {
            let key = self.fields.iter().map(|f| f.value(shoot)).collect();
            *groups.entry(key).or_default() += 1;
        }
        groups
            .into_iter()
            .map(|(labels, count)| Sample::new(&self.descriptor.name, &labels, count as f64))
            .collect()
    }
}

/// The set of customizations attached to a collector.
#[derive(Default)]
pub struct CustomizationRegistry {
    entries: Vec<Box<dyn Customization>>,
}

impl fmt::Debug for CustomizationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|c| &c.descriptor().name))
            .finish()
    }
}

impl CustomizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding one [`ShootGroupCount`] per config entry.
    pub fn from_config(configs: &[ShootCustomizationConfig]) -> MetricsResult<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(Box::new(ShootGroupCount::new(config)?))?;
        }
        Ok(registry)
    }

    /// Add a customization. Its name must not collide with the catalog,
    /// the failure counter, or another customization.
    pub fn register(&mut self, customization: Box<dyn Customization>) -> MetricsResult<()> {
        let name = customization.descriptor().name.as_str();
        if catalog::definitions().contains_key(name) || name == SCRAPE_FAILURES {
            return Err(MetricsError::Schema(format!(
                "customization {name} collides with a built-in metric"
            )));
        }
        if self.entries.iter().any(|c| c.descriptor().name == name) {
            return Err(MetricsError::Schema(format!(
                "customization {name} is defined twice"
            )));
        }
        self.entries.push(customization);
        Ok(())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.entries.iter().map(|c| c.descriptor())
    }

    pub fn collect(&self, shoots: &[Arc<Shoot>]) -> Vec<Sample> {
        self.entries.iter().flat_map(|c| c.collect(shoots)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn config(name: &str, labels: &[ShootField]) -> ShootCustomizationConfig {
        ShootCustomizationConfig {
            name: name.to_string(),
            help: "Count of Shoots.".to_string(),
            labels: labels.to_vec(),
        }
    }

    fn shoots() -> Vec<Arc<Shoot>> {
        let mut gcp = shoot("team-b", "gcp-dev");
        gcp.provider.provider_type = "gcp".into();
        let mut old = shoot("team-b", "old");
        old.kubernetes_version = "1.27.9".into();
        vec![
            Arc::new(shoot("team-a", "a")),
            Arc::new(shoot("team-a", "b")),
            Arc::new(gcp),
            Arc::new(old),
        ]
    }

    #[test]
    fn groups_shoots_by_fields() {
        let count =
            ShootGroupCount::new(&config("garden_shoots_custom", &[ShootField::Iaas, ShootField::Version]))
                .unwrap();
        assert_eq!(count.descriptor().labels, vec!["iaas", "version"]);

        let samples = count.collect(&shoots());
        let groups: Vec<(Vec<&str>, f64)> = samples
            .iter()
            .map(|s| (s.label_refs(), s.value))
            .collect();
        assert_eq!(
            groups,
            vec![
                (vec!["aws", "1.27.9"], 1.0),
                (vec!["aws", "1.29.4"], 2.0),
                (vec!["gcp", "1.29.4"], 1.0),
            ]
        );
    }

    #[test]
    fn field_values() {
        let mut s = shoot("team-a", "dev");
        s.hibernated = true;
        s.last_operation = Some(operation("Create", "Processing", 10));

        assert_eq!(ShootField::Purpose.value(&s), "evaluation");
        assert_eq!(ShootField::Hibernated.value(&s), "true");
        assert_eq!(ShootField::Seed.value(&s), "aws-eu");
        assert_eq!(ShootField::Operation.value(&s), "Create");
        assert_eq!(ShootField::State.value(&s), "Processing");

        s.last_operation = None;
        s.seed_name = None;
        assert_eq!(ShootField::State.value(&s), "");
        assert_eq!(ShootField::Seed.value(&s), "");
    }

    #[test]
    fn fields_deserialize_in_snake_case() {
        let config: ShootCustomizationConfig = serde_json::from_str(
            r#"{"name": "garden_shoots_custom", "help": "x", "labels": ["iaas", "is_seed"]}"#,
        )
        .unwrap();
        assert_eq!(config.labels, vec![ShootField::Iaas, ShootField::IsSeed]);
    }

    #[test]
    fn empty_or_repeated_labels_are_rejected() {
        assert!(matches!(
            ShootGroupCount::new(&config("garden_shoots_custom", &[])),
            Err(MetricsError::Schema(_))
        ));
        assert!(matches!(
            ShootGroupCount::new(&config("garden_shoots_custom", &[ShootField::Iaas, ShootField::Iaas])),
            Err(MetricsError::Schema(_))
        ));
    }

    #[test]
    fn catalog_and_duplicate_names_are_rejected() {
        let err = CustomizationRegistry::from_config(&[config("garden_shoot_info", &[ShootField::Name])])
            .unwrap_err();
        assert!(matches!(err, MetricsError::Schema(_)));

        let err = CustomizationRegistry::from_config(&[config(SCRAPE_FAILURES, &[ShootField::Name])])
            .unwrap_err();
        assert!(matches!(err, MetricsError::Schema(_)));

        let err = CustomizationRegistry::from_config(&[
            config("garden_shoots_custom", &[ShootField::Iaas]),
            config("garden_shoots_custom", &[ShootField::Region]),
        ])
        .unwrap_err();
        assert!(matches!(err, MetricsError::Schema(_)));
    }

    #[test]
    fn registry_collects_every_customization() {
        let registry = CustomizationRegistry::from_config(&[
            config("garden_shoots_by_iaas", &[ShootField::Iaas]),
            config("garden_shoots_by_project", &[ShootField::Project]),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.descriptors().count(), 2);

        let samples = registry.collect(&shoots());
        assert_eq!(named(&samples, "garden_shoots_by_iaas").len(), 2);
        assert_eq!(named(&samples, "garden_shoots_by_project").len(), 2);
    }
}
