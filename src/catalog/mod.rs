//! Component catalog
//!
//! The fixed set of SoftEther components this installer knows about, which of
//! them are mandatory, how their release assets and systemd units are named,
//! and the numeric menu offered to the operator.

use crate::error::{InstallerError, Result};
use crate::release::ReleaseInfo;

/// Role of a component in the dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    /// Shared files every other package depends on
    Base,
    /// Management tool, mandatory but independent of the services
    Tool,
    /// User-selectable service package
    Optional,
}

/// One installable component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    /// Logical name used in menus and reports (e.g. "client")
    pub name: &'static str,
    pub kind: ComponentKind,
    /// Lower ranks install first
    pub install_rank: u8,
    /// Key used in the package and asset name (e.g. "vpnclient")
    pub asset_key: &'static str,
    /// Debian package name (e.g. "softether-vpnclient")
    pub package: String,
    /// systemd unit for optional components
    pub unit: Option<String>,
}

impl ComponentSpec {
    fn new(prefix: &str, name: &'static str, kind: ComponentKind, asset_key: &'static str) -> Self {
        let package = format!("{prefix}-{asset_key}");
        let unit = (kind == ComponentKind::Optional).then(|| format!("{package}.service"));
        let install_rank = match kind {
            ComponentKind::Base => 0,
            ComponentKind::Tool => 1,
            ComponentKind::Optional => 2,
        };
        Self {
            name,
            kind,
            install_rank,
            asset_key,
            package,
            unit,
        }
    }

    pub fn is_mandatory(&self) -> bool {
        self.kind != ComponentKind::Optional
    }

    /// Filename prefix of this component's release asset (`<package>_`)
    pub fn asset_prefix(&self) -> String {
        format!("{}_", self.package)
    }
}

/// What the operator picked from the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    /// Install the mandatory components plus these optional ones
    Install(Vec<&'static str>),
    UninstallAll,
    Exit,
}

/// One numbered menu line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub number: u32,
    pub label: String,
    pub choice: MenuChoice,
}

/// The static component set and its menu
#[derive(Debug, Clone)]
pub struct Catalog {
    components: Vec<ComponentSpec>,
    menu: Vec<MenuEntry>,
}

impl Catalog {
    /// The SoftEther catalog with packages named `<prefix>-<asset key>`
    pub fn standard(prefix: &str) -> Self {
        use ComponentKind::{Base, Optional, Tool};

        let components = vec![
            ComponentSpec::new(prefix, "common", Base, "common"),
            ComponentSpec::new(prefix, "vpncmd", Tool, "vpncmd"),
            ComponentSpec::new(prefix, "client", Optional, "vpnclient"),
            ComponentSpec::new(prefix, "server", Optional, "vpnserver"),
            ComponentSpec::new(prefix, "bridge", Optional, "vpnbridge"),
        ];

        let menu = vec![
            MenuEntry {
                number: 1,
                label: "VPN Client".to_string(),
                choice: MenuChoice::Install(vec!["client"]),
            },
            MenuEntry {
                number: 2,
                label: "VPN Server".to_string(),
                choice: MenuChoice::Install(vec!["server"]),
            },
            MenuEntry {
                number: 3,
                label: "VPN Bridge".to_string(),
                choice: MenuChoice::Install(vec!["bridge"]),
            },
            MenuEntry {
                number: 4,
                label: "VPN Client + VPN Server".to_string(),
                choice: MenuChoice::Install(vec!["client", "server"]),
            },
            MenuEntry {
                number: 5,
                label: "Uninstall all components".to_string(),
                choice: MenuChoice::UninstallAll,
            },
            MenuEntry {
                number: 0,
                label: "Exit".to_string(),
                choice: MenuChoice::Exit,
            },
        ];

        Self { components, menu }
    }

    /// Every component in canonical install order
    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }

    pub fn get(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Mandatory components, base first
    pub fn mandatory(&self) -> Vec<&ComponentSpec> {
        let mut mandatory: Vec<_> = self.components.iter().filter(|c| c.is_mandatory()).collect();
        mandatory.sort_by_key(|c| c.install_rank);
        mandatory
    }

    pub fn optional(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.components.iter().filter(|c| !c.is_mandatory())
    }

    /// Optional components with the version the release offers for each
    pub fn list_optional(&self, release: &ReleaseInfo) -> Vec<(String, String)> {
        self.optional()
            .map(|component| {
                let version = release
                    .asset(component.name)
                    .and_then(|asset| asset.version.clone())
                    .unwrap_or_else(|| release.version.clone());
                (component.name.to_string(), version)
            })
            .collect()
    }

    pub fn menu(&self) -> &[MenuEntry] {
        &self.menu
    }

    /// Map raw menu input to a choice.
    ///
    /// Anything that is not one of the listed numbers is rejected; there is no re-prompt.
    pub fn resolve_selection(&self, input: &str) -> Result<MenuChoice> {
        let trimmed = input.trim();
        let max = self.menu.iter().map(|e| e.number).max().unwrap_or(0);
        let invalid = || InstallerError::InvalidChoice {
            input: trimmed.to_string(),
            max,
        };

        let number: u32 = trimmed.parse().map_err(|_| invalid())?;
        self.menu
            .iter()
            .find(|entry| entry.number == number)
            .map(|entry| entry.choice.clone())
            .ok_or_else(invalid)
    }
}
