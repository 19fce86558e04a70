//! Install and uninstall ordering
//!
//! Both plans are plain values so the ordering rules can be checked without
//! touching the system: mandatory components install first (base, then tool)
//! and are removed last (tool, then base).

use crate::catalog::{Catalog, ComponentSpec};
use crate::error::{InstallerError, Result};

/// Components to install, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan<'c> {
    steps: Vec<&'c ComponentSpec>,
}

impl<'c> InstallPlan<'c> {
    /// Mandatory components by rank, then the selected optional ones in catalog order.
    ///
    /// Selecting a mandatory component or the same component twice is harmless.
    pub fn build(catalog: &'c Catalog, selected: &[&str]) -> Result<Self> {
        for name in selected {
            if catalog.get(name).is_none() {
                return Err(InstallerError::UnknownComponent {
                    name: (*name).to_string(),
                });
            }
        }

        let mut steps = catalog.mandatory();
        steps.extend(
            catalog
                .optional()
                .filter(|component| selected.contains(&component.name)),
        );
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[&'c ComponentSpec] {
        &self.steps
    }

    /// Optional components of the plan, the ones that carry services
    pub fn optional_steps(&self) -> impl Iterator<Item = &'c ComponentSpec> + '_ {
        self.steps.iter().copied().filter(|c| !c.is_mandatory())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|c| c.name).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// Components to remove, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallPlan<'c> {
    steps: Vec<&'c ComponentSpec>,
}

impl<'c> UninstallPlan<'c> {
    /// Reverse of the full install ordering: optional components, tool, base last
    pub fn build(catalog: &'c Catalog) -> Self {
        let mut steps = catalog.mandatory();
        steps.extend(catalog.optional());
        steps.reverse();
        Self { steps }
    }

    pub fn steps(&self) -> &[&'c ComponentSpec] {
        &self.steps
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|c| c.name).collect()
    }
}
