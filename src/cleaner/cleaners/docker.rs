//! Docker artifact cleaner.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::cleaner::base::{reject_reason, Cleaner};
use crate::cleaner::executor::{CommandOutput, CommandRunner};
use crate::error::Result;
use crate::model::{CleanOutcome, ItemKind, ScanItem};
use crate::scanner::parse_tool_size;

pub const DANGLING_IMAGES: &str = "Dangling Images";
pub const STOPPED_CONTAINERS: &str = "Stopped Containers";
pub const UNUSED_VOLUMES: &str = "Unused Volumes";
pub const BUILD_CACHE: &str = "Build Cache";

const BUILD_CACHE_ID: &str = "build-cache";

const HANDLED: &[ItemKind] = &[
    ItemKind::DockerImage,
    ItemKind::DockerContainer,
    ItemKind::DockerVolume,
    ItemKind::DockerBuildCache,
];

#[derive(Debug, Deserialize)]
struct ImageLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Size", default)]
    size: String,
    #[serde(rename = "CreatedSince", default)]
    created_since: String,
}

#[derive(Debug, Deserialize)]
struct ContainerLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names", default)]
    names: String,
    #[serde(rename = "Size", default)]
    size: String,
    #[serde(rename = "Status", default)]
    status: String,
}

/// `docker system df -v` report; only volumes are of interest.
#[derive(Debug, Deserialize)]
struct VerboseDiskUsage {
    #[serde(rename = "Volumes", default)]
    volumes: Vec<VolumeUsage>,
}

#[derive(Debug, Deserialize)]
struct VolumeUsage {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Size", default)]
    size: String,
}

/// One row of the summary `docker system df` report.
#[derive(Debug, Deserialize)]
struct DiskUsageRow {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Size", default)]
    size: String,
}

/// Parse line-delimited JSON, skipping lines that do not match `T`.
fn json_lines<T: DeserializeOwned>(stdout: &str) -> Vec<T> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(row) => Some(row),
            Err(err) => {
                tracing::debug!("Skipping unparseable docker output line: {}", err);
                None
            }
        })
        .collect()
}

/// Flag items whose size the daemon did not report.
fn mark_unsized(details: String, size: u64) -> String {
    if size == 0 {
        format!("{} (size unavailable)", details)
    } else {
        details
    }
}

/// Whether a failed removal was refused because something still uses the
/// resource.
fn is_in_use(output: &CommandOutput) -> bool {
    let stderr = output.stderr.to_lowercase();
    ["conflict", "in use", "is being used", "running container"]
        .iter()
        .any(|needle| stderr.contains(needle))
}

/// Reports dangling images, stopped containers, unused volumes and build
/// cache, each under its own subcategory. Needs a reachable daemon.
pub struct DockerCleaner {
    runner: Arc<dyn CommandRunner>,
}

impl DockerCleaner {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn docker(&self, args: &[&str]) -> Option<String> {
        let mut argv = vec!["docker"];
        argv.extend_from_slice(args);
        let output = self.runner.run(&argv, false);
        if output.success() {
            Some(output.stdout)
        } else {
            tracing::debug!("{} failed: {}", argv.join(" "), output.error_message());
            None
        }
    }

    fn daemon_reachable(&self) -> bool {
        self.runner.is_available("docker") && self.docker(&["info"]).is_some()
    }

    fn dangling_images(&self) -> Vec<ScanItem> {
        let Some(stdout) =
            self.docker(&["images", "--filter", "dangling=true", "--format", "{{json .}}"])
        else {
            return Vec::new();
        };

        json_lines::<ImageLine>(&stdout)
            .into_iter()
            .map(|image| {
                let short: String = image.id.chars().take(12).collect();
                let size = parse_tool_size(&image.size);
                let details = if image.created_since.is_empty() {
                    "Dangling image".to_string()
                } else {
                    format!("Dangling image, created {}", image.created_since)
                };
                ScanItem::new(format!("Image {}", short), image.id, size, ItemKind::DockerImage)
                .with_subcategory(DANGLING_IMAGES)
                .with_details(mark_unsized(details, size))
            })
            .collect()
    }

    fn stopped_containers(&self) -> Vec<ScanItem> {
        let Some(stdout) = self.docker(&[
            "ps",
            "-a",
            "--size",
            "--filter",
            "status=exited",
            "--format",
            "{{json .}}",
        ]) else {
            return Vec::new();
        };

        json_lines::<ContainerLine>(&stdout)
            .into_iter()
            .map(|container| {
                let name = if container.names.is_empty() {
                    "Unknown".to_string()
                } else {
                    container.names
                };
                let size = parse_tool_size(&container.size);
                let details = if container.status.is_empty() {
                    "Stopped container".to_string()
                } else {
                    container.status
                };
                ScanItem::new(name, container.id, size, ItemKind::DockerContainer)
                    .with_subcategory(STOPPED_CONTAINERS)
                    .with_details(mark_unsized(details, size))
            })
            .collect()
    }

    /// Volume sizes by name from the verbose disk usage report.
    fn volume_sizes(&self) -> HashMap<String, u64> {
        let Some(stdout) = self.docker(&["system", "df", "-v", "--format", "{{json .}}"]) else {
            return HashMap::new();
        };

        json_lines::<VerboseDiskUsage>(&stdout)
            .into_iter()
            .flat_map(|report| report.volumes)
            .map(|volume| (volume.name, parse_tool_size(&volume.size)))
            .collect()
    }

    fn unused_volumes(&self) -> Vec<ScanItem> {
        let Some(stdout) = self.docker(&[
            "volume",
            "ls",
            "--filter",
            "dangling=true",
            "--format",
            "{{.Name}}",
        ]) else {
            return Vec::new();
        };

        let names: Vec<&str> = stdout.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if names.is_empty() {
            return Vec::new();
        }

        let sizes = self.volume_sizes();
        names
            .into_iter()
            .map(|name| {
                let size = sizes.get(name).copied().unwrap_or(0);
                ScanItem::new(name, name, size, ItemKind::DockerVolume)
                    .with_subcategory(UNUSED_VOLUMES)
                    .with_details(mark_unsized("Unused volume".to_string(), size))
            })
            .collect()
    }

    fn build_cache(&self) -> Option<ScanItem> {
        let stdout = self.docker(&["system", "df", "--format", "{{json .}}"])?;

        let size = json_lines::<DiskUsageRow>(&stdout)
            .into_iter()
            .find(|row| row.kind == "Build Cache")
            .map(|row| parse_tool_size(&row.size))?;

        (size > 0).then(|| {
            ScanItem::new(BUILD_CACHE, BUILD_CACHE_ID, size, ItemKind::DockerBuildCache)
                .with_subcategory(BUILD_CACHE)
                .with_details("Docker build cache")
        })
    }

    /// Remove with `base`, retrying once with `-f` if the resource is in use.
    fn remove<'a>(&self, base: &[&'a str], target: &'a str) -> CommandOutput {
        let mut argv = base.to_vec();
        argv.push(target);
        let output = self.runner.run(&argv, false);
        if output.success() || !is_in_use(&output) {
            return output;
        }

        tracing::info!("{} is in use, retrying with force", target);
        let mut forced = base.to_vec();
        forced.push("-f");
        forced.push(target);
        self.runner.run(&forced, false)
    }
}

impl Cleaner for DockerCleaner {
    fn id(&self) -> &str {
        "docker"
    }

    fn name(&self) -> &str {
        "Docker"
    }

    fn description(&self) -> &str {
        "Docker images, containers, and volumes"
    }

    fn scan(&self) -> Result<Vec<ScanItem>> {
        if !self.daemon_reachable() {
            tracing::debug!("Docker not available, skipping");
            return Ok(Vec::new());
        }

        let mut items = self.dangling_images();
        items.extend(self.stopped_containers());
        items.extend(self.unused_volumes());
        items.extend(self.build_cache());
        Ok(items)
    }

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome> {
        let mut outcome = CleanOutcome::default();

        for item in items {
            // Identifiers go straight into argv; never let one read as a flag.
            let valid_target = |p: &std::path::Path| {
                let s = p.to_string_lossy();
                !s.is_empty() && !s.starts_with('-')
            };
            if let Some(reason) = reject_reason(item, HANDLED, valid_target) {
                outcome.record_failure(item, reason);
                continue;
            }

            let output = match item.kind {
                ItemKind::DockerImage => self.remove(&["docker", "rmi"], &item.path),
                ItemKind::DockerContainer => self.remove(&["docker", "rm"], &item.path),
                ItemKind::DockerVolume => self.remove(&["docker", "volume", "rm"], &item.path),
                _ => self.runner.run(&["docker", "builder", "prune", "-f"], false),
            };

            if output.success() {
                outcome.record_removed(item);
            } else {
                outcome.record_failure(item, output.error_message());
            }
        }

        Ok(outcome)
    }
}
