//! Platform-specific shell configuration

/// Shell configuration for the current operating system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub shell: &'static str,
    pub shell_arg: &'static str,
}

impl Platform {
    /// Detect the platform configuration for the current OS
    pub fn current() -> Self {
        #[cfg(windows)]
        {
            Self {
                os: "windows",
                shell: "cmd",
                shell_arg: "/c",
            }
        }
        #[cfg(not(windows))]
        {
            Self {
                os: std::env::consts::OS,
                shell: "sh",
                shell_arg: "-c",
            }
        }
    }

    /// Returns the shell binary and its command-string argument
    pub fn shell(&self) -> (&'static str, &'static str) {
        (self.shell, self.shell_arg)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn unix_uses_sh() {
        let platform = Platform::current();
        assert_eq!(platform.shell(), ("sh", "-c"));
    }

    #[test]
    fn os_matches_compile_target() {
        let platform = Platform::current();
        assert_eq!(platform.os, std::env::consts::OS);
    }
}
