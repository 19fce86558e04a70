//! Display functions for install and uninstall reports

use std::fmt::Write as _;

use console::Style;

use crate::orchestrator::{InstallReport, ServiceFailure, UninstallReport};

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn write_failures(out: &mut String, failures: &[ServiceFailure]) {
    if failures.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", Style::new().bold().red().apply_to("Failed services:"));
    for failure in failures {
        let _ = writeln!(
            out,
            "  {} {}",
            Style::new().yellow().apply_to(failure.component),
            failure.error
        );
    }
}

/// Summary of an install run
pub fn format_install_report(report: &InstallReport, version: &str) -> String {
    let bold = Style::new().bold();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {} ({})",
        bold.apply_to("Installed:"),
        report.plan.join(", "),
        Style::new().dim().apply_to(version)
    );

    if !report.services.is_empty() {
        let _ = writeln!(out, "{}", bold.apply_to("Services:"));
        for service in &report.services {
            let state = if service.active_state == "active" {
                Style::new().green().apply_to(service.active_state.as_str())
            } else {
                Style::new().yellow().apply_to(service.active_state.as_str())
            };
            let _ = writeln!(
                out,
                "  {} {} enabled: {}",
                Style::new().cyan().apply_to(&service.unit),
                state,
                yes_no(service.enabled)
            );
        }
    }

    write_failures(&mut out, &report.service_failures);

    out
}

/// Summary of an uninstall run
pub fn format_uninstall_report(report: &UninstallReport) -> String {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let mut out = String::new();

    for unit in &report.units {
        let mut steps = Vec::new();
        if unit.stopped {
            steps.push("stopped");
        }
        if unit.disabled {
            steps.push("disabled");
        }
        if unit.removed {
            steps.push("removed");
        }
        if steps.is_empty() {
            let _ = writeln!(
                out,
                "  {} {}",
                Style::new().cyan().apply_to(&unit.unit),
                dim.apply_to("not present")
            );
        } else {
            let _ = writeln!(
                out,
                "  {} {}",
                Style::new().cyan().apply_to(&unit.unit),
                steps.join(", ")
            );
        }
    }

    write_failures(&mut out, &report.teardown_failures);

    if report.removed_packages.is_empty() {
        let _ = writeln!(out, "{} none", bold.apply_to("Removed:"));
    } else {
        let _ = writeln!(
            out,
            "{} {}",
            bold.apply_to("Removed:"),
            report.removed_packages.join(", ")
        );
    }
    if !report.skipped_packages.is_empty() {
        let _ = writeln!(
            out,
            "{} {}",
            bold.apply_to("Not installed:"),
            dim.apply_to(report.skipped_packages.join(", "))
        );
    }

    out
}
