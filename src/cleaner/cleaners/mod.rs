//! Built-in cleaner implementations.

mod dev_dependencies;
mod docker;
mod kubernetes;
mod logs;
mod package_manager;
mod system_cache;
mod trash;

pub use dev_dependencies::DevDependenciesCleaner;
pub use docker::{
    DockerCleaner, BUILD_CACHE, DANGLING_IMAGES, STOPPED_CONTAINERS, UNUSED_VOLUMES,
};
pub use kubernetes::KubernetesCleaner;
pub use logs::LogCleaner;
pub use package_manager::{PackageCache, PackageManagerCleaner};
pub use system_cache::SystemCacheCleaner;
pub use trash::TrashCleaner;
