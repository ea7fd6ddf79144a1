//! Build configuration resolution
//!
//! Maps a (target, format, mode) request to everything one engine session
//! needs: output path, externals, compile-time constants and engine options.
//! Apart from reading manifests this is pure; resolving the same request
//! twice gives the same [`ResolvedBuild`].

mod define;
mod format;
mod target;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::resolver::{resolve_package_manifest, PackageManifest, Workspace};

pub use define::DefineMap;
pub use format::{Format, OutputFormat, Platform};
pub use target::{Target, TargetKind, COMPAT_TARGET, COMPILER_SFC_TARGET};

/// Platform modules left to the consumer of `cjs` and `esm-bundler` builds
const PLATFORM_EXTERNALS: [&str; 3] = ["path", "url", "stream"];

/// Sibling tool whose optional template engines the SFC compiler never inlines
const CONSOLIDATE_PACKAGE: &str = "@vue/consolidate";

/// Modules the SFC compiler requires lazily at runtime
const COMPILER_SFC_EXTERNALS: [&str; 8] = [
    "fs",
    "vm",
    "crypto",
    "react-dom/server",
    "teacup/lib/express",
    "arc-templates/dist/es5",
    "then-pug",
    "then-jade",
];

/// What the user asked to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub target: Target,
    pub format: Format,
    pub production: bool,
    pub inline_deps: bool,
}

impl BuildRequest {
    pub fn new(target: &str, format: &str, production: bool, inline_deps: bool) -> Self {
        Self {
            target: Target::new(target),
            format: Format::new(format),
            production,
            inline_deps,
        }
    }
}

/// Fully resolved configuration for one watch session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuild {
    pub request: BuildRequest,
    pub entry: PathBuf,
    pub outfile: PathBuf,
    pub output_format: OutputFormat,
    pub platform: Platform,
    pub global_name: Option<String>,
    pub externals: Vec<String>,
    pub defines: DefineMap,
    /// Install the Node API polyfill plugin
    pub polyfill_node: bool,
}

/// Resolve a request against the workspace, reading the target manifest and,
/// for the SFC compiler, its sibling tool's manifest.
pub fn resolve_build(workspace: &Workspace, request: BuildRequest) -> Result<ResolvedBuild> {
    let name = request.target.name().to_string();
    let package_root = workspace.package_root(&name);
    let manifest = workspace.load_manifest(&name)?;

    let sibling_externals = match request.target.kind() {
        TargetKind::CompilerSfc => {
            let path = resolve_package_manifest(CONSOLIDATE_PACKAGE, &package_root)?;
            PackageManifest::load(&path)?.dev_dependencies
        }
        _ => Vec::new(),
    };

    let build = ResolvedBuild::from_parts(
        request,
        &package_root,
        workspace.entry_path(&name),
        workspace.primary_package(),
        &manifest,
        &sibling_externals,
    );

    debug!(
        "Resolved {} -> {} ({} externals)",
        name,
        build.outfile.display(),
        build.externals.len()
    );

    Ok(build)
}

impl ResolvedBuild {
    /// Assemble a build from already loaded inputs
    pub fn from_parts(
        request: BuildRequest,
        package_root: &Path,
        entry: PathBuf,
        primary_package: &str,
        manifest: &PackageManifest,
        sibling_externals: &[String],
    ) -> Self {
        let format = &request.format;

        let outfile = output_path(
            package_root,
            request.target.effective_name(primary_package),
            &format.postfix(),
            request.production,
        );

        let externals = resolve_externals(&request, manifest, sibling_externals);
        let defines =
            DefineMap::resolve(format, request.production, request.target.kind(), manifest);
        let output_format = format.output_format();
        let platform = format.platform();
        let polyfill_node = !format.is_cjs() && manifest.enables_non_browser_branches();

        Self {
            request,
            entry,
            outfile,
            output_format,
            platform,
            global_name: manifest.global_name().map(str::to_string),
            externals,
            defines,
            polyfill_node,
        }
    }

    pub fn target(&self) -> &str {
        self.request.target.name()
    }
}

/// `{root}/dist/{name}.{postfix}.[prod.]js`
fn output_path(package_root: &Path, name: &str, postfix: &str, production: bool) -> PathBuf {
    let prod = if production { "prod." } else { "" };
    package_root
        .join("dist")
        .join(format!("{}.{}.{}js", name, postfix, prod))
}

fn resolve_externals(
    request: &BuildRequest,
    manifest: &PackageManifest,
    sibling_externals: &[String],
) -> Vec<String> {
    let mut externals = ExternalSet::default();

    if !request.inline_deps && request.format.externalizes_dependencies() {
        externals.extend(manifest.dependencies.iter().map(String::as_str));
        externals.extend(manifest.peer_dependencies.iter().map(String::as_str));
        externals.extend(PLATFORM_EXTERNALS);
    }

    // Applies regardless of format and of the inline flag
    if request.target.kind() == TargetKind::CompilerSfc {
        externals.extend(sibling_externals.iter().map(String::as_str));
        externals.extend(COMPILER_SFC_EXTERNALS);
    }

    externals.into_vec()
}

/// Insertion-ordered set of module specifiers
#[derive(Default)]
struct ExternalSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl ExternalSet {
    fn extend<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            if self.seen.insert(name.to_string()) {
                self.ordered.push(name.to_string());
            }
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}
