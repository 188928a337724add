//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::DependencyType;

/// Dependency type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyTypeArg {
    /// Successor starts after the predecessor finishes
    #[default]
    #[value(name = "finish-to-start", alias = "fs")]
    FinishToStart,
    /// Successor starts after the predecessor starts
    #[value(name = "start-to-start", alias = "ss")]
    StartToStart,
    /// Successor finishes after the predecessor finishes
    #[value(name = "finish-to-finish", alias = "ff")]
    FinishToFinish,
    /// Successor finishes after the predecessor starts
    #[value(name = "start-to-finish", alias = "sf")]
    StartToFinish,
}

impl std::fmt::Display for DependencyTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FinishToStart => write!(f, "finish-to-start"),
            Self::StartToStart => write!(f, "start-to-start"),
            Self::FinishToFinish => write!(f, "finish-to-finish"),
            Self::StartToFinish => write!(f, "start-to-finish"),
        }
    }
}

impl From<DependencyTypeArg> for DependencyType {
    fn from(arg: DependencyTypeArg) -> Self {
        match arg {
            DependencyTypeArg::FinishToStart => DependencyType::FinishToStart,
            DependencyTypeArg::StartToStart => DependencyType::StartToStart,
            DependencyTypeArg::FinishToFinish => DependencyType::FinishToFinish,
            DependencyTypeArg::StartToFinish => DependencyType::StartToFinish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_type_conversion() {
        assert_eq!(
            DependencyType::from(DependencyTypeArg::StartToStart),
            DependencyType::StartToStart
        );
        assert_eq!(
            DependencyType::from(DependencyTypeArg::default()),
            DependencyType::FinishToStart
        );
    }

    #[test]
    fn test_display_matches_value_name() {
        for arg in DependencyTypeArg::value_variants() {
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(arg.to_string(), name);
        }
    }
}
