use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Group label used for items without an explicit subcategory.
pub const DEFAULT_SUBCATEGORY: &str = "General";

/// Cleaning strategy tag carried by every item.
///
/// Cleaners dispatch on this in `clean()` and refuse kinds they did not
/// produce themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Directory,
    TrashItem,
    LogFile,
    AptCache,
    DnfCache,
    PacmanCache,
    DockerImage,
    DockerContainer,
    DockerVolume,
    DockerBuildCache,
    NpmCache,
    YarnCache,
    PipCache,
    MavenCache,
    GradleCache,
    GoCache,
    CargoCache,
    MinikubeCache,
    KindCache,
    KubectlCache,
    HelmCache,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Directory => "directory",
            ItemKind::TrashItem => "trash_item",
            ItemKind::LogFile => "log_file",
            ItemKind::AptCache => "apt_cache",
            ItemKind::DnfCache => "dnf_cache",
            ItemKind::PacmanCache => "pacman_cache",
            ItemKind::DockerImage => "docker_image",
            ItemKind::DockerContainer => "docker_container",
            ItemKind::DockerVolume => "docker_volume",
            ItemKind::DockerBuildCache => "docker_build_cache",
            ItemKind::NpmCache => "npm_cache",
            ItemKind::YarnCache => "yarn_cache",
            ItemKind::PipCache => "pip_cache",
            ItemKind::MavenCache => "maven_cache",
            ItemKind::GradleCache => "gradle_cache",
            ItemKind::GoCache => "go_cache",
            ItemKind::CargoCache => "cargo_cache",
            ItemKind::MinikubeCache => "minikube_cache",
            ItemKind::KindCache => "kind_cache",
            ItemKind::KubectlCache => "kubectl_cache",
            ItemKind::HelmCache => "helm_cache",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reclaimable unit found by a cleaner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanItem {
    /// Display label.
    pub name: String,
    /// Filesystem path, or a backend identifier (container ID, volume name).
    pub path: String,
    /// Size in bytes; 0 when the backend cannot report it.
    pub size: u64,
    pub kind: ItemKind,
    /// Display grouping; `None` means the default group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Removal needs elevated rights.
    pub requires_privilege: bool,
    /// Free-text annotation, display only.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl ScanItem {
    pub fn new(name: impl Into<String>, path: impl Into<String>, size: u64, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            kind,
            subcategory: None,
            requires_privilege: false,
            details: String::new(),
        }
    }

    /// Item backed by a filesystem path.
    pub fn from_path(name: impl Into<String>, path: &Path, size: u64, kind: ItemKind) -> Self {
        Self::new(name, path.to_string_lossy(), size, kind)
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn privileged(mut self) -> Self {
        self.requires_privilege = true;
        self
    }

    /// The item's group label, falling back to [`DEFAULT_SUBCATEGORY`].
    pub fn subcategory_name(&self) -> &str {
        match self.subcategory.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_SUBCATEGORY,
        }
    }

    pub fn fs_path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Identity used to match a selected item back to its scan.
    pub fn same_identity(&self, other: &ScanItem) -> bool {
        self.path == other.path && self.kind == other.kind
    }
}
