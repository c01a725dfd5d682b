//! System-wide constants, default values, and launcher exit codes.

/// Binary name for the CLI.
pub const BIN_NAME: &str = "nestbox";

/// Size of the private stack handed to `clone(2)` for the container child.
pub const STACK_SIZE: usize = 1024 * 1024;

/// Value of `TERM` exposed to the target program.
pub const DEFAULT_TERM: &str = "xterm-256color";

/// Value of `PATH` exposed to the target program.
pub const DEFAULT_PATH: &str = "/bin:/sbin:/usr/bin:/usr/sbin";

/// Mount point of the process-information filesystem inside the container.
pub const PROC_MOUNT_POINT: &str = "/proc";

/// Longest hostname accepted by `sethostname(2)` (`HOST_NAME_MAX`).
pub const MAX_HOSTNAME_LEN: usize = 64;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV: &str = "NESTBOX_CONFIG";

/// Exit code for malformed command-line input or configuration (`EX_USAGE`).
pub const EXIT_INVALID_ARGUMENTS: i32 = 64;

/// Exit code when the parent-side `waitpid(2)` fails (`EX_SOFTWARE`).
pub const EXIT_WAIT_FAILED: i32 = 70;

/// Exit code when `clone(2)` could not create the isolated child (`EX_OSERR`).
pub const EXIT_LAUNCH_FAILED: i32 = 71;

/// Exit code of a child that failed before reaching `execve(2)`.
pub const EXIT_BOOTSTRAP_FAILED: i32 = 125;

/// Exit code of a child whose target exists but could not be executed.
pub const EXIT_EXEC_FAILED: i32 = 126;

/// Exit code of a child whose target path does not exist.
pub const EXIT_EXEC_NOT_FOUND: i32 = 127;

/// Offset added to the signal number of a signal-terminated child.
pub const SIGNAL_EXIT_BASE: i32 = 128;
