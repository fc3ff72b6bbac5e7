//! Generator families and diagnostic addressing
//!
//! Each CMake generator drives a build tool with its own diagnostic format.
//! This is a fixed lookup from generator name to the line regex and display
//! syntax a log viewer needs to map build output back to source locations.

use regex::Regex;
use thiserror::Error;

use crate::platform::HostPlatform;

#[derive(Debug, Error)]
#[error("unknown generator: {0}")]
pub struct UnsupportedGeneratorError(pub String);

/// The closed set of supported generator families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorFamily {
    Ninja,
    UnixMakefiles,
    NMakeMakefiles,
    VisualStudio,
}

/// How much location information a family's diagnostics carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticAddressing {
    LineColumn,
    LineOnly,
}

/// One diagnostic extracted from build output.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub column: Option<u32>,
    pub message: String,
}

impl GeneratorFamily {
    /// Map a CMake generator name to its family.
    ///
    /// Visual Studio generators are matched by prefix ("Visual Studio 17
    /// 2022" etc.); everything else must match exactly. Unrecognized names
    /// fail fast instead of falling through to a wrong diagnostic format.
    pub fn from_name(name: &str) -> Result<Self, UnsupportedGeneratorError> {
        match name {
            "Ninja" => Ok(GeneratorFamily::Ninja),
            "Unix Makefiles" => Ok(GeneratorFamily::UnixMakefiles),
            "NMake Makefiles" => Ok(GeneratorFamily::NMakeMakefiles),
            _ if name.starts_with("Visual Studio") => Ok(GeneratorFamily::VisualStudio),
            _ => Err(UnsupportedGeneratorError(name.to_string())),
        }
    }

    /// Line pattern for compiler diagnostics in this family's build output.
    ///
    /// Capture groups are file, line, column (possibly empty), message.
    pub fn diagnostic_pattern(self, platform: HostPlatform) -> &'static str {
        match (self, platform) {
            // Ninja drives cl.exe on Windows, which reports file(line).
            (GeneratorFamily::Ninja, HostPlatform::Windows)
            | (GeneratorFamily::NMakeMakefiles, _) => r"^(.+)\((\d+)\):() (.+)$",
            (GeneratorFamily::Ninja, _) | (GeneratorFamily::UnixMakefiles, _) => {
                r"(.+[^:]):(\d+):(\d+):\s*(.+)$"
            }
            (GeneratorFamily::VisualStudio, _) => r"^\s*(.+)\((\d+),?(\d*)\)\s*:\s*(.+)$",
        }
    }

    pub fn diagnostic_regex(self, platform: HostPlatform) -> Regex {
        // Fixed table entries, compilation cannot fail.
        Regex::new(self.diagnostic_pattern(platform)).expect("fixed diagnostic pattern")
    }

    /// Display-syntax identifier for log viewers rendering this output.
    pub fn syntax(self, platform: HostPlatform) -> &'static str {
        match (self, platform) {
            (GeneratorFamily::Ninja, HostPlatform::Windows) => "Ninja+CL",
            (GeneratorFamily::Ninja, _) => "Ninja",
            (GeneratorFamily::UnixMakefiles, _) | (GeneratorFamily::NMakeMakefiles, _) => "Make",
            (GeneratorFamily::VisualStudio, _) => "Visual_Studio",
        }
    }

    pub fn addressing(self, platform: HostPlatform) -> DiagnosticAddressing {
        match (self, platform) {
            (GeneratorFamily::Ninja, HostPlatform::Windows)
            | (GeneratorFamily::NMakeMakefiles, _)
            | (GeneratorFamily::VisualStudio, _) => DiagnosticAddressing::LineOnly,
            _ => DiagnosticAddressing::LineColumn,
        }
    }
}

/// Line pattern for errors and warnings in CMake's own configure output.
pub fn configure_diagnostic_pattern() -> &'static str {
    r"CMake\s(?:Error|Warning)(?:\s\(dev\))?\sat\s(.+):(\d+)()\s?\(?(\w*)\)?:"
}

/// Match one build-output line against a family's diagnostic pattern.
pub fn parse_diagnostic(pattern: &Regex, line: &str) -> Option<Diagnostic> {
    let captures = pattern.captures(line)?;
    let file = captures.get(1)?.as_str().to_string();
    let line_number: u32 = captures.get(2)?.as_str().parse().ok()?;
    let column = captures
        .get(3)
        .and_then(|m| m.as_str().parse::<u32>().ok());
    let message = captures.get(4)?.as_str().to_string();
    Some(Diagnostic {
        file,
        line: line_number,
        column,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_families() {
        assert_eq!(
            GeneratorFamily::from_name("Ninja").unwrap(),
            GeneratorFamily::Ninja
        );
        assert_eq!(
            GeneratorFamily::from_name("Unix Makefiles").unwrap(),
            GeneratorFamily::UnixMakefiles
        );
        assert_eq!(
            GeneratorFamily::from_name("NMake Makefiles").unwrap(),
            GeneratorFamily::NMakeMakefiles
        );
        assert_eq!(
            GeneratorFamily::from_name("Visual Studio 17 2022").unwrap(),
            GeneratorFamily::VisualStudio
        );
    }

    #[test]
    fn unknown_name_fails_fast() {
        let error = GeneratorFamily::from_name("Xcode").unwrap_err();
        assert_eq!(error.to_string(), "unknown generator: Xcode");
    }

    #[test]
    fn gcc_style_line_parses_with_column() {
        let pattern = GeneratorFamily::Ninja.diagnostic_regex(HostPlatform::Linux);
        let diagnostic = parse_diagnostic(
            &pattern,
            "/src/main.cpp:14:9: error: use of undeclared identifier 'foo'",
        )
        .unwrap();
        assert_eq!(diagnostic.file, "/src/main.cpp");
        assert_eq!(diagnostic.line, 14);
        assert_eq!(diagnostic.column, Some(9));
        assert!(diagnostic.message.starts_with("error:"));
    }

    #[test]
    fn cl_style_line_parses_without_column() {
        let pattern = GeneratorFamily::Ninja.diagnostic_regex(HostPlatform::Windows);
        let diagnostic = parse_diagnostic(
            &pattern,
            r"C:\src\main.cpp(14): error C2065: 'foo': undeclared identifier",
        )
        .unwrap();
        assert_eq!(diagnostic.file, r"C:\src\main.cpp");
        assert_eq!(diagnostic.line, 14);
        assert_eq!(diagnostic.column, None);
    }

    #[test]
    fn visual_studio_column_is_optional() {
        let pattern = GeneratorFamily::VisualStudio.diagnostic_regex(HostPlatform::Windows);
        let with_column = parse_diagnostic(
            &pattern,
            r"  C:\src\main.cpp(14,9): error C2065: undeclared identifier",
        )
        .unwrap();
        assert_eq!(with_column.column, Some(9));
        let without_column =
            parse_diagnostic(&pattern, r"  C:\src\main.cpp(14): warning C4100: unused").unwrap();
        assert_eq!(without_column.column, None);
    }

    #[test]
    fn non_diagnostic_lines_do_not_match() {
        let pattern = GeneratorFamily::UnixMakefiles.diagnostic_regex(HostPlatform::Linux);
        assert!(parse_diagnostic(&pattern, "[ 50%] Building CXX object app.o").is_none());
    }

    #[test]
    fn syntax_and_addressing_follow_the_family() {
        assert_eq!(
            GeneratorFamily::Ninja.syntax(HostPlatform::Linux),
            "Ninja"
        );
        assert_eq!(
            GeneratorFamily::Ninja.syntax(HostPlatform::Windows),
            "Ninja+CL"
        );
        assert_eq!(
            GeneratorFamily::UnixMakefiles.syntax(HostPlatform::Linux),
            "Make"
        );
        assert_eq!(
            GeneratorFamily::VisualStudio.syntax(HostPlatform::Windows),
            "Visual_Studio"
        );
        assert_eq!(
            GeneratorFamily::Ninja.addressing(HostPlatform::Linux),
            DiagnosticAddressing::LineColumn
        );
        assert_eq!(
            GeneratorFamily::Ninja.addressing(HostPlatform::Windows),
            DiagnosticAddressing::LineOnly
        );
        assert_eq!(
            GeneratorFamily::VisualStudio.addressing(HostPlatform::Windows),
            DiagnosticAddressing::LineOnly
        );
    }

    #[test]
    fn configure_pattern_matches_cmake_errors() {
        let pattern = Regex::new(configure_diagnostic_pattern()).unwrap();
        let captures = pattern
            .captures("CMake Error at CMakeLists.txt:12 (add_executable):")
            .unwrap();
        assert_eq!(&captures[1], "CMakeLists.txt");
        assert_eq!(&captures[2], "12");
    }
}
