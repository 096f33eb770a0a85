//! Local Kubernetes tooling cache cleaner.

use std::path::Path;

use crate::cleaner::base::{remove_items, CacheDir, Cleaner};
use crate::error::Result;
use crate::model::{CleanOutcome, ItemKind, ScanItem};

/// Reports minikube, kind, kubectl and helm caches. Always removes
/// directly.
pub struct KubernetesCleaner {
    caches: Vec<CacheDir>,
}

impl KubernetesCleaner {
    pub fn new(home: &Path) -> Self {
        Self {
            caches: vec![
                CacheDir::new("Minikube Cache", ItemKind::MinikubeCache, home.join(".minikube/cache")),
                CacheDir::new("kind Cache", ItemKind::KindCache, home.join(".kind")),
                CacheDir::new("kubectl Cache", ItemKind::KubectlCache, home.join(".kube/cache")),
                CacheDir::new("Helm Cache", ItemKind::HelmCache, home.join(".cache/helm")),
            ],
        }
    }
}

impl Cleaner for KubernetesCleaner {
    fn id(&self) -> &str {
        "kubernetes"
    }

    fn name(&self) -> &str {
        "Kubernetes"
    }

    fn description(&self) -> &str {
        "Local Kubernetes cluster caches"
    }

    fn scan(&self) -> Result<Vec<ScanItem>> {
        Ok(self.caches.iter().filter_map(CacheDir::probe).collect())
    }

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome> {
        let kinds: Vec<ItemKind> = self.caches.iter().map(|c| c.kind).collect();
        Ok(remove_items(items, &kinds, |p| {
            self.caches.iter().any(|c| c.path == p)
        }))
    }
}
