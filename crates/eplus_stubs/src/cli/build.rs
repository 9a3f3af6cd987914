//! Build command: IDD -> shared objects -> stub packages

use crate::cli::error::HelpfulError;
use anyhow::Context;
use eplus_stubs::manifest::{self, Resolved};
use eplus_stubs::packager::{self, PackageError, PackageKind};
use eplus_stubs::render::PyiRenderer;
use eplus_stubs::OutputLayout;
use eplus_stubs_schema::{IddParser, IddResolver, InstallDirResolver, SchemaError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct BuildArgs {
    pub eplus_version: String,
    pub idd_file: Option<PathBuf>,
    pub patch: u32,
    pub packages: Vec<String>,
    pub layout: OutputLayout,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct BuildSummary {
    eplus_version: String,
    idd_file: PathBuf,
    idd_sha256: String,
    cache_hit: bool,
    file_count: usize,
    objects_dir: PathBuf,
    packages: Vec<PackageSummary>,
}

#[derive(Debug, Serialize)]
struct PackageSummary {
    name: String,
    version: String,
    root: PathBuf,
}

pub fn run(args: BuildArgs) -> anyhow::Result<()> {
    // Validate everything cheap before touching the output tree
    let kinds = parse_kinds(&args.packages)?;
    let idd_file = locate_idd(
        &args.eplus_version,
        args.idd_file.as_deref(),
        &InstallDirResolver::default(),
    )?;

    let renderer = PyiRenderer::new();
    let Resolved {
        objects_dir,
        manifest,
        cache_hit,
    } = manifest::resolve(
        &idd_file,
        &args.eplus_version,
        &args.layout,
        &IddParser,
        &renderer,
    )
    .with_context(|| {
        format!(
            "Failed to generate shared objects for EnergyPlus {} from {}",
            args.eplus_version,
            idd_file.display()
        )
    })?;

    let mut packages = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let pkg = packager::package(
            kind,
            &args.eplus_version,
            args.patch,
            &manifest,
            &objects_dir,
            &args.layout.packages_root,
            &renderer,
        )
        .with_context(|| format!("Failed to build {}", kind.pypi_name()))?;

        packages.push(PackageSummary {
            name: kind.pypi_name(),
            version: pkg.version,
            root: pkg.root,
        });
    }

    info!(packages = packages.len(), cache_hit, "Build complete");

    let summary = BuildSummary {
        eplus_version: args.eplus_version,
        idd_file,
        idd_sha256: manifest.idd_sha256,
        cache_hit,
        file_count: manifest.file_count,
        objects_dir,
        packages,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &BuildSummary) {
    let source = if summary.cache_hit { "reused" } else { "generated" };
    println!(
        "EnergyPlus {}: {} object stubs {} in {}",
        summary.eplus_version,
        summary.file_count,
        source,
        summary.objects_dir.display()
    );
    for pkg in &summary.packages {
        println!("  {} {} -> {}", pkg.name, pkg.version, pkg.root.display());
    }
}

/// Parse `--packages`, dropping repeats and keeping first-seen order.
fn parse_kinds(names: &[String]) -> anyhow::Result<Vec<PackageKind>> {
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind = name.parse::<PackageKind>().map_err(|e| match e {
            PackageError::UnknownKind(name) => {
                anyhow::Error::from(HelpfulError::invalid_package(&name))
            }
            other => other.into(),
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Explicit path (flag or `EPPY_IDD_FILE`) wins; otherwise ask the resolver.
fn locate_idd(
    version: &str,
    explicit: Option<&Path>,
    resolver: &dyn IddResolver,
) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(HelpfulError::idd_file_not_found(path).into());
        }
        return Ok(path.to_path_buf());
    }

    match resolver.resolve(version) {
        Ok(path) => Ok(path),
        Err(SchemaError::IddNotFound { version, searched }) => {
            Err(HelpfulError::idd_not_found(&version, &searched).into())
        }
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eplus_stubs_schema::Result as SchemaResult;
    use std::fs;
    use tempfile::TempDir;

    struct FixedResolver(Option<PathBuf>);

    impl IddResolver for FixedResolver {
        fn resolve(&self, version: &str) -> SchemaResult<PathBuf> {
            self.0.clone().ok_or_else(|| SchemaError::IddNotFound {
                version: version.to_string(),
                searched: vec![PathBuf::from("/nowhere/Energy+.idd")],
            })
        }
    }

    #[test]
    fn test_parse_kinds_dedupes() {
        let names = vec!["eppy".to_string(), "archetypal".to_string(), "eppy".to_string()];
        assert_eq!(
            parse_kinds(&names).unwrap(),
            vec![PackageKind::Eppy, PackageKind::Archetypal]
        );
    }

    #[test]
    fn test_parse_kinds_rejects_unknown() {
        let err = parse_kinds(&["geomeppy".to_string()]).unwrap_err();
        let helpful = err.downcast_ref::<HelpfulError>().expect("helpful error");
        assert!(helpful.message.contains("geomeppy"));
    }

    #[test]
    fn test_explicit_idd_wins() {
        let temp = TempDir::new().unwrap();
        let idd = temp.path().join("Energy+.idd");
        fs::write(&idd, "").unwrap();

        let found = locate_idd("23.1", Some(&idd), &FixedResolver(None)).unwrap();
        assert_eq!(found, idd);
    }

    #[test]
    fn test_explicit_idd_missing() {
        let temp = TempDir::new().unwrap();
        let idd = temp.path().join("Energy+.idd");

        let err = locate_idd("23.1", Some(&idd), &FixedResolver(None)).unwrap_err();
        assert!(err.downcast_ref::<HelpfulError>().is_some());
    }

    #[test]
    fn test_resolver_fallback() {
        let resolved = PathBuf::from("/opt/EnergyPlus-23-1-0/Energy+.idd");
        let found = locate_idd("23.1", None, &FixedResolver(Some(resolved.clone()))).unwrap();
        assert_eq!(found, resolved);

        let err = locate_idd("23.1", None, &FixedResolver(None)).unwrap_err();
        let helpful = err.downcast_ref::<HelpfulError>().expect("helpful error");
        assert!(helpful.context.as_deref().unwrap_or("").contains("/nowhere/Energy+.idd"));
    }
}
