/// Normalized project model produced from one reply tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectModel {
    /// Generator name recorded in the reply index, when present.
    pub generator: Option<String>,
    pub configurations: Vec<Configuration>,
}

/// A named build configuration and its targets, in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub name: String,
    pub targets: Vec<Target>,
}

/// One build unit from the codemodel.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    pub kind: TargetType,
    /// File name of the primary output, when the target produces one.
    pub name_on_disk: Option<String>,
    /// Output paths, relative to the build folder.
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    Executable,
    StaticLibrary,
    SharedLibrary,
    ModuleLibrary,
    ObjectLibrary,
    InterfaceLibrary,
    Utility,
    Other(String),
}

impl TargetType {
    pub fn from_reply(value: &str) -> Self {
        match value {
            "EXECUTABLE" => TargetType::Executable,
            "STATIC_LIBRARY" => TargetType::StaticLibrary,
            "SHARED_LIBRARY" => TargetType::SharedLibrary,
            "MODULE_LIBRARY" => TargetType::ModuleLibrary,
            "OBJECT_LIBRARY" => TargetType::ObjectLibrary,
            "INTERFACE_LIBRARY" => TargetType::InterfaceLibrary,
            "UTILITY" => TargetType::Utility,
            other => TargetType::Other(other.to_string()),
        }
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, TargetType::Executable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_type_strings_map_to_variants() {
        assert_eq!(TargetType::from_reply("EXECUTABLE"), TargetType::Executable);
        assert_eq!(TargetType::from_reply("UTILITY"), TargetType::Utility);
        assert_eq!(
            TargetType::from_reply("WEIRD_NEW_KIND"),
            TargetType::Other("WEIRD_NEW_KIND".to_string())
        );
        assert!(TargetType::from_reply("EXECUTABLE").is_executable());
        assert!(!TargetType::from_reply("STATIC_LIBRARY").is_executable());
    }
}
