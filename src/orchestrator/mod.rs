//! Lifecycle orchestration
//!
//! Drives the install and uninstall paths through the package and service
//! manager boundaries. Ordering comes from [`plan`]; the orchestrator adds the
//! failure policy:
//! - every package asset is downloaded before anything is installed
//! - a failed package install aborts the run, nothing is rolled back
//! - a failed unit setup is recorded and the remaining units still run

pub mod plan;
pub mod service;

use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, ComponentSpec};
use crate::config::InstallerConfig;
use crate::download::AssetFetcher;
use crate::error::{
    InstallerError, Result, package as package_error, resolve as resolve_error,
    service as service_error,
};
use crate::progress::ProgressDisplay;
use crate::release::ReleaseInfo;
use crate::system::{PackageError, PackageManager, ServiceManager};

pub use plan::{InstallPlan, UninstallPlan};
pub use service::{ServiceHandle, ServiceReport, UnitTeardown};

/// A unit that could not be set up or torn down
#[derive(Debug)]
pub struct ServiceFailure {
    pub component: &'static str,
    pub error: InstallerError,
}

/// What the install path did
#[derive(Debug, Default)]
pub struct InstallReport {
    pub plan: Vec<&'static str>,
    pub services: Vec<ServiceReport>,
    pub service_failures: Vec<ServiceFailure>,
}

/// What the uninstall path did
#[derive(Debug, Default)]
pub struct UninstallReport {
    pub units: Vec<UnitTeardown>,
    pub teardown_failures: Vec<ServiceFailure>,
    pub removed_packages: Vec<&'static str>,
    pub skipped_packages: Vec<&'static str>,
}

/// Installs and removes catalog components
pub struct Orchestrator<'a> {
    catalog: &'a Catalog,
    config: &'a InstallerConfig,
    scratch: &'a Path,
    fetcher: &'a dyn AssetFetcher,
    packages: &'a dyn PackageManager,
    services: &'a dyn ServiceManager,
    show_progress: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        catalog: &'a Catalog,
        config: &'a InstallerConfig,
        scratch: &'a Path,
        fetcher: &'a dyn AssetFetcher,
        packages: &'a dyn PackageManager,
        services: &'a dyn ServiceManager,
    ) -> Self {
        Self {
            catalog,
            config,
            scratch,
            fetcher,
            packages,
            services,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Install the mandatory components plus `selected`, then provision their services
    pub fn install_all(&self, release: &ReleaseInfo, selected: &[&str]) -> Result<InstallReport> {
        let plan = InstallPlan::build(self.catalog, selected)?;
        tracing::info!(plan = ?plan.names(), version = %release.version, "install plan");

        let progress = ProgressDisplay::new((plan.len() * 2) as u64, self.show_progress);
        let packages = self
            .download_packages(&plan, release, &progress)
            .inspect_err(|_| progress.abandon())?;

        for (component, path) in &packages {
            progress.update_step(&format!("installing {}", component.package));
            self.install_package(component, path)
                .inspect_err(|_| progress.abandon())?;
            progress.inc_step();
        }
        progress.finish();

        let mut report = InstallReport {
            plan: plan.names(),
            ..InstallReport::default()
        };

        for component in plan.optional_steps() {
            let Some(unit) = component.unit.as_deref() else {
                continue;
            };
            let handle = ServiceHandle::new(
                component,
                unit,
                self.config.unit_urls(unit),
                self.services.unit_dir(),
            );
            match service::setup_service(&handle, self.fetcher, self.services, self.scratch) {
                Ok(service) => {
                    tracing::info!(unit, state = %service.active_state, "service provisioned");
                    report.services.push(service);
                }
                Err(error) => {
                    tracing::error!(unit, error = %error, "service setup failed");
                    report.service_failures.push(ServiceFailure {
                        component: component.name,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    fn download_packages(
        &self,
        plan: &InstallPlan<'a>,
        release: &ReleaseInfo,
        progress: &ProgressDisplay,
    ) -> Result<Vec<(&'a ComponentSpec, PathBuf)>> {
        let mut downloaded = Vec::with_capacity(plan.len());
        for component in plan.steps() {
            let asset = release.asset(component.name).ok_or_else(|| {
                resolve_error::asset_missing(&release.tag, component.name, component.asset_prefix())
            })?;
            progress.update_step(&format!("downloading {}", asset.filename));
            let path = self.fetcher.fetch(
                &asset.filename,
                &asset.mirror_urls,
                asset.sha256.as_deref(),
                self.scratch,
            )?;
            progress.inc_step();
            downloaded.push((*component, path));
        }
        Ok(downloaded)
    }

    /// Install one package file, with a single dependency repair pass on unmet dependencies
    fn install_package(&self, component: &ComponentSpec, path: &Path) -> Result<()> {
        let detail = match self.packages.install_file(&component.package, path) {
            Ok(()) => return Ok(()),
            Err(PackageError::UnmetDependencies(detail)) => detail,
            Err(PackageError::Command(e)) => {
                return Err(package_error::install_failed(
                    component.name,
                    &component.package,
                    e,
                ));
            }
        };

        tracing::warn!(
            package = %component.package,
            "unmet dependencies, running dependency repair"
        );
        self.packages.repair_dependencies().map_err(|e| {
            package_error::install_failed(
                component.name,
                &component.package,
                format!("{detail}; dependency repair failed: {e}"),
            )
        })?;

        let installed = self
            .packages
            .is_installed(&component.package)
            .map_err(package_error::query_failed)?;
        if installed {
            Ok(())
        } else {
            Err(package_error::install_failed(
                component.name,
                &component.package,
                detail,
            ))
        }
    }

    /// Tear down every unit, then remove every present package, base last.
    ///
    /// A unit that fails to tear down is recorded and the remaining units and
    /// packages are still processed.
    pub fn uninstall_all(&self) -> Result<UninstallReport> {
        let mut report = UninstallReport::default();

        for component in self.catalog.components() {
            let Some(unit) = component.unit.as_deref() else {
                continue;
            };
            match service::teardown_service(unit, self.services) {
                Ok(teardown) => report.units.push(teardown),
                Err(error) => {
                    tracing::error!(unit, error = %error, "service teardown failed");
                    report.teardown_failures.push(ServiceFailure {
                        component: component.name,
                        error,
                    });
                }
            }
        }
        self.services
            .reload()
            .map_err(service_error::reload_failed)?;

        let plan = UninstallPlan::build(self.catalog);
        tracing::info!(plan = ?plan.names(), "uninstall plan");
        for component in plan.steps() {
            let present = self
                .packages
                .is_present(&component.package)
                .map_err(package_error::query_failed)?;
            if !present {
                tracing::debug!(package = %component.package, "not installed, skipping");
                report.skipped_packages.push(component.name);
                continue;
            }
            self.packages
                .remove(&component.package)
                .map_err(|e| package_error::remove_failed(&component.package, e))?;
            report.removed_packages.push(component.name);
        }

        self.packages
            .autoremove()
            .map_err(|e| InstallerError::DependencyCleanupFailed {
                reason: e.to_string(),
            })?;
        Ok(report)
    }
}
