//! Compile-time constants injected into every bundle

use super::{Format, TargetKind};
use crate::resolver::PackageManifest;

/// Feature toggles that are the same for every dev build
const FEATURE_FLAGS: [(&str, bool); 4] = [
    ("__FEATURE_SUSPENSE__", true),
    ("__FEATURE_OPTIONS_API__", true),
    ("__FEATURE_PROD_DEVTOOLS__", false),
    ("__FEATURE_PROD_HYDRATION_MISMATCH_DETAILS__", true),
];

/// Ordered map from symbol to the literal source text replacing it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineMap {
    entries: Vec<(String, String)>,
}

impl DefineMap {
    /// Compute the constants for one build
    pub fn resolve(
        format: &Format,
        production: bool,
        kind: TargetKind,
        manifest: &PackageManifest,
    ) -> Self {
        let mut map = Self::default();

        map.insert("__COMMIT__", quoted("dev"));
        map.insert("__VERSION__", quoted(&manifest.version));
        map.flag("__DEV__", !production);
        map.flag("__TEST__", false);
        map.flag(
            "__BROWSER__",
            !format.is_cjs() && !manifest.enables_non_browser_branches(),
        );
        map.flag("__GLOBAL__", format.is_global());
        map.flag("__ESM_BUNDLER__", format.is_esm_bundler());
        map.flag("__ESM_BROWSER__", format.is_esm_browser());
        map.flag("__CJS__", format.is_cjs());
        map.flag("__SSR__", !format.is_global());
        map.flag("__COMPAT__", kind == TargetKind::Compat);

        for (name, enabled) in FEATURE_FLAGS {
            map.flag(name, enabled);
        }

        map
    }

    fn insert(&mut self, name: &str, value: String) {
        self.entries.push((name.to_string(), value));
    }

    fn flag(&mut self, name: &str, value: bool) {
        self.insert(name, value.to_string());
    }

    /// Replacement text for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A JavaScript string literal
fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(non_browser: bool) -> PackageManifest {
        let json = format!(
            r#"{{ "version": "3.4.0", "buildOptions": {{ "enableNonBrowserBranches": {} }} }}"#,
            non_browser
        );
        PackageManifest::parse(&json).unwrap()
    }

    fn defines(format: &str, production: bool, kind: TargetKind) -> DefineMap {
        DefineMap::resolve(&Format::from(format), production, kind, &manifest(false))
    }

    #[test]
    fn test_string_constants() {
        let map = defines("global", false, TargetKind::Standard);
        assert_eq!(map.get("__COMMIT__"), Some("\"dev\""));
        assert_eq!(map.get("__VERSION__"), Some("\"3.4.0\""));
        assert_eq!(map.get("__TEST__"), Some("false"));
    }

    #[test]
    fn test_dev_follows_production_flag() {
        assert_eq!(defines("global", false, TargetKind::Standard).get("__DEV__"), Some("true"));
        assert_eq!(defines("global", true, TargetKind::Standard).get("__DEV__"), Some("false"));
    }

    #[test]
    fn test_cjs_dev() {
        let map = defines("cjs", false, TargetKind::Standard);
        assert_eq!(map.get("__DEV__"), Some("true"));
        assert_eq!(map.get("__SSR__"), Some("true"));
        assert_eq!(map.get("__CJS__"), Some("true"));
        assert_eq!(map.get("__GLOBAL__"), Some("false"));
        assert_eq!(map.get("__BROWSER__"), Some("false"));
    }

    #[test]
    fn test_esm_variants() {
        let map = defines("esm-bundler-runtime", false, TargetKind::Standard);
        assert_eq!(map.get("__ESM_BUNDLER__"), Some("true"));
        assert_eq!(map.get("__ESM_BROWSER__"), Some("false"));
        assert_eq!(map.get("__SSR__"), Some("true"));

        let map = defines("esm-browser", false, TargetKind::Standard);
        assert_eq!(map.get("__ESM_BROWSER__"), Some("true"));
        assert_eq!(map.get("__BROWSER__"), Some("true"));
    }

    #[test]
    fn test_global_runtime_is_ssr() {
        let map = defines("global-runtime", false, TargetKind::Standard);
        assert_eq!(map.get("__GLOBAL__"), Some("false"));
        assert_eq!(map.get("__SSR__"), Some("true"));
    }

    #[test]
    fn test_non_browser_branches_disable_browser() {
        let map = DefineMap::resolve(
            &Format::from("esm-bundler"),
            false,
            TargetKind::Standard,
            &manifest(true),
        );
        assert_eq!(map.get("__BROWSER__"), Some("false"));
    }

    #[test]
    fn test_compat_flag() {
        assert_eq!(defines("global", false, TargetKind::Compat).get("__COMPAT__"), Some("true"));
        assert_eq!(
            defines("global", false, TargetKind::CompilerSfc).get("__COMPAT__"),
            Some("false")
        );
    }

    #[test]
    fn test_feature_flags_are_fixed() {
        for (format, production) in [("global", false), ("cjs", true), ("esm-browser", false)] {
            let map = defines(format, production, TargetKind::Standard);
            assert_eq!(map.get("__FEATURE_SUSPENSE__"), Some("true"));
            assert_eq!(map.get("__FEATURE_OPTIONS_API__"), Some("true"));
            assert_eq!(map.get("__FEATURE_PROD_DEVTOOLS__"), Some("false"));
            assert_eq!(
                map.get("__FEATURE_PROD_HYDRATION_MISMATCH_DETAILS__"),
                Some("true")
            );
            assert_eq!(map.len(), 15);
        }
    }
}
