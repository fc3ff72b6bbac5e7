/// Host platform, as far as build-tool and debugger policy is concerned.
///
/// Kept explicit rather than read from `cfg!` at each use site so that
/// platform-dependent behavior stays testable on any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Linux,
    MacOs,
    Windows,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            HostPlatform::MacOs
        } else if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Linux
        }
    }

    /// Debugger front-end invocation prefix, if this platform has one.
    pub fn debugger_prefix(self) -> Option<&'static [&'static str]> {
        match self {
            HostPlatform::Linux => Some(&["gdb", "-q", "--args"]),
            HostPlatform::MacOs => Some(&["lldb", "--"]),
            HostPlatform::Windows => None,
        }
    }

    /// Display name of the debugger front-end ("GDB", "LLDB").
    pub fn debugger_name(self) -> Option<&'static str> {
        match self {
            HostPlatform::Linux => Some("GDB"),
            HostPlatform::MacOs => Some("LLDB"),
            HostPlatform::Windows => None,
        }
    }
}
