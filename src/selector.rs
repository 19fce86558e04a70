//! Interactive component selection
//!
//! Prints the optional components with the versions the release offers,
//! then reads a single numeric choice from the terminal. Without release
//! information the menu is still shown so everything can be uninstalled.

use std::fmt::Write as _;
use std::io::IsTerminal;

use console::Style;
use inquire::Text;

use crate::catalog::{Catalog, MenuChoice};
use crate::error::{InstallerError, Result};
use crate::release::ReleaseInfo;

/// Menu text: available components with versions, then the numbered choices
pub fn render_menu(catalog: &Catalog, release: Option<&ReleaseInfo>) -> String {
    let bold = Style::new().bold();
    let mut out = String::new();

    match release {
        Some(release) => {
            let _ = writeln!(
                out,
                "{} {}",
                bold.apply_to("SoftEther VPN release:"),
                Style::new().green().apply_to(&release.tag)
            );
            let _ = writeln!(out, "{}", bold.apply_to("Available components:"));
            for (name, version) in catalog.list_optional(release) {
                let _ = writeln!(
                    out,
                    "  {:<8} {}",
                    Style::new().yellow().apply_to(name),
                    Style::new().dim().apply_to(version)
                );
            }
        }
        None => {
            let _ = writeln!(
                out,
                "{} {}",
                bold.apply_to("SoftEther VPN release:"),
                Style::new().red().apply_to("unavailable, only uninstall is possible")
            );
        }
    }
    out.push('\n');

    // Exit is listed last even though its number is 0
    let (exit, entries): (Vec<_>, Vec<_>) = catalog
        .menu()
        .iter()
        .partition(|entry| entry.choice == MenuChoice::Exit);
    for entry in entries.iter().chain(exit.iter()) {
        let _ = writeln!(
            out,
            "  {}) {}",
            Style::new().cyan().bold().apply_to(entry.number),
            entry.label
        );
    }
    out
}

/// Fail with [`InstallerError::TerminalUnavailable`] unless stdin is a terminal
pub fn ensure_terminal() -> Result<()> {
    if std::io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(InstallerError::TerminalUnavailable)
    }
}

/// Show the menu and read one choice.
///
/// Requires stdin to be a terminal. Invalid input is an error, there is no re-prompt;
/// cancelling the prompt counts as exit.
pub fn select(catalog: &Catalog, release: Option<&ReleaseInfo>) -> Result<MenuChoice> {
    ensure_terminal()?;

    println!("\n{}", render_menu(catalog, release));

    let Some(input) = Text::new("Select an option:")
        .with_help_message("Enter a number, ESC to exit")
        .prompt_skippable()?
    else {
        return Ok(MenuChoice::Exit);
    };

    let choice = catalog.resolve_selection(&input)?;
    tracing::debug!(input = %input.trim(), ?choice, "menu choice");
    Ok(choice)
}
