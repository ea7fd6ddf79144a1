//! Target identity

/// The compatibility build of the primary package
pub const COMPAT_TARGET: &str = "vue-compat";

/// The single-file-component compiler
pub const COMPILER_SFC_TARGET: &str = "compiler-sfc";

/// Targets whose builds need special handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Standard,
    /// Shares the primary package's output file name, enables `__COMPAT__`
    Compat,
    /// Externalizes template engines pulled in through its sibling tool
    CompilerSfc,
}

impl TargetKind {
    pub fn of(name: &str) -> Self {
        match name {
            COMPAT_TARGET => TargetKind::Compat,
            COMPILER_SFC_TARGET => TargetKind::CompilerSfc,
            _ => TargetKind::Standard,
        }
    }
}

/// A buildable package in the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    name: String,
    kind: TargetKind,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = TargetKind::of(&name);
        Self { name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Base of the output file name
    pub fn effective_name<'a>(&'a self, primary_package: &'a str) -> &'a str {
        match self.kind {
            TargetKind::Compat => primary_package,
            _ => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(TargetKind::of("vue-compat"), TargetKind::Compat);
        assert_eq!(TargetKind::of("compiler-sfc"), TargetKind::CompilerSfc);
        assert_eq!(TargetKind::of("vue"), TargetKind::Standard);
        assert_eq!(TargetKind::of("compiler-sfc-extra"), TargetKind::Standard);
    }

    #[test]
    fn test_effective_name() {
        assert_eq!(Target::new("vue-compat").effective_name("vue"), "vue");
        assert_eq!(Target::new("reactivity").effective_name("vue"), "reactivity");
    }
}
