//! End-to-end launch tests against real Linux namespaces.
//!
//! Creating PID/UTS/mount/IPC/network/cgroup namespaces needs root (or
//! `CAP_SYS_ADMIN`), so every test returns early for unprivileged runs.
//! The jail test additionally needs `NESTBOX_TEST_ROOTFS` to point at a
//! root filesystem containing `/bin/true` and an empty `/proc`.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::print_stderr)]

use std::path::PathBuf;
use std::sync::OnceLock;

use nestbox_common::config::LauncherConfig;
use nestbox_common::constants::{EXIT_EXEC_NOT_FOUND, SIGNAL_EXIT_BASE};
use nestbox_common::types::{ChildOutcome, LaunchSpec};
use nestbox_core::launcher;
use nestbox_core::supervisor::Supervisor;

/// Whether this host lets us create every namespace and mount `/proc`.
///
/// Checked once with a probe launch; root inside a restricted container
/// may still be denied `clone(2)` or the `proc` mount.
fn privileged() -> bool {
    static USABLE: OnceLock<bool> = OnceLock::new();
    let usable = *USABLE.get_or_init(|| {
        if !nix::unistd::geteuid().is_root() {
            return false;
        }
        let probe = shell("read pid rest < /proc/self/stat; [ \"$pid\" = 1 ]", None);
        launcher::run(&probe, &LauncherConfig::default()).is_ok_and(|o| o.success())
    });
    if !usable {
        eprintln!("skipping: namespace creation requires root and an unrestricted kernel");
    }
    usable
}

fn shell(script: &str, hostname: Option<&str>) -> LaunchSpec {
    LaunchSpec::new(
        "/bin/sh",
        vec!["-c".to_string(), script.to_string()],
        hostname.map(str::to_string),
        None,
    )
    .expect("valid spec")
}

fn run(spec: &LaunchSpec) -> ChildOutcome {
    launcher::run(spec, &LauncherConfig::default()).expect("launch and wait")
}

fn host_hostname() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .expect("read hostname")
        .trim()
        .to_string()
}

// ── Exit status propagation ──────────────────────────────────────────

#[test]
fn child_exit_code_is_propagated() {
    if !privileged() {
        return;
    }
    for code in [0, 1, 42, 255] {
        let outcome = run(&shell(&format!("exit {code}"), None));
        assert_eq!(outcome, ChildOutcome::Exited(code));
        assert_eq!(outcome.exit_code(), code);
    }
}

#[test]
fn missing_target_is_reported_as_exec_failure() {
    if !privileged() {
        return;
    }
    let spec = LaunchSpec::new("/definitely/not/here", Vec::new(), None, None).unwrap();
    let outcome = run(&spec);
    assert_ne!(outcome.exit_code(), 0);
    assert_eq!(outcome, ChildOutcome::Exited(EXIT_EXEC_NOT_FOUND));
}

#[test]
fn exec_failure_code_is_indistinguishable_from_a_target_exit() {
    // A target that itself exits 127 looks exactly like a failed exec.
    if !privileged() {
        return;
    }
    let missing = LaunchSpec::new("/definitely/not/here", Vec::new(), None, None).unwrap();
    let exits_127 = shell("exit 127", None);
    assert_eq!(run(&missing), run(&exits_127));
}

#[test]
fn signal_termination_maps_to_128_plus_signal() {
    if !privileged() {
        return;
    }
    let child = launcher::launch(&shell("sleep 30", None), &LauncherConfig::default()).unwrap();
    let supervisor = Supervisor::new(child);
    assert!(supervisor.kill_handle().kill());
    let outcome = supervisor.wait().unwrap();
    assert_eq!(outcome.exit_code(), SIGNAL_EXIT_BASE + 9);
}

#[test]
fn timeout_kills_the_child() {
    if !privileged() {
        return;
    }
    let config = LauncherConfig {
        timeout_secs: Some(1),
        ..LauncherConfig::default()
    };
    let outcome = launcher::run(&shell("sleep 30", None), &config).unwrap();
    assert_eq!(
        outcome,
        ChildOutcome::Signaled {
            signal: 9,
            core_dumped: false
        }
    );
}

// ── Isolation ────────────────────────────────────────────────────────

#[test]
fn child_is_pid_one_of_its_namespace() {
    if !privileged() {
        return;
    }
    assert!(run(&shell("[ $$ -eq 1 ]", None)).success());
}

#[test]
fn proc_shows_only_the_container() {
    if !privileged() {
        return;
    }
    let outcome = run(&shell("read pid rest < /proc/self/stat; [ \"$pid\" -lt 10 ]", None));
    assert!(outcome.success());
    let own_proc = PathBuf::from(format!("/proc/{}", std::process::id()));
    assert!(own_proc.exists(), "host /proc was replaced");
}

#[test]
fn environment_is_reduced_to_term_and_path() {
    if !privileged() {
        return;
    }
    // Cargo exports CARGO_MANIFEST_DIR to test processes; it must not leak.
    let script = "[ -z \"${CARGO_MANIFEST_DIR+x}\" ] && [ -z \"${HOME+x}\" ] \
                  && [ \"$TERM\" = xterm-256color ] \
                  && [ \"$PATH\" = /bin:/sbin:/usr/bin:/usr/sbin ]";
    assert!(run(&shell(script, None)).success());
}

#[test]
fn concurrent_launches_keep_their_own_hostname() {
    if !privileged() {
        return;
    }
    let before = host_hostname();
    let handles: Vec<_> = ["box-a", "box-b"]
        .into_iter()
        .map(|name| {
            std::thread::spawn(move || {
                let script = format!(
                    "for i in 1 2 3 4 5; do read h < /proc/sys/kernel/hostname; \
                     [ \"$h\" = {name} ] || exit 1; sleep 0.1; done"
                );
                run(&shell(&script, Some(name)))
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().success());
    }
    assert_eq!(host_hostname(), before);
}

#[test]
fn missing_jail_root_fails_closed() {
    if !privileged() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let spec = LaunchSpec::new(
        "/bin/true",
        Vec::new(),
        None,
        Some(dir.path().join("absent")),
    )
    .unwrap();
    let outcome = run(&spec);
    assert_eq!(
        outcome,
        ChildOutcome::Exited(nestbox_common::constants::EXIT_BOOTSTRAP_FAILED)
    );
}

#[test]
fn jailed_true_succeeds() {
    if !privileged() {
        return;
    }
    let Some(rootfs) = std::env::var_os("NESTBOX_TEST_ROOTFS").map(PathBuf::from) else {
        eprintln!("skipping: NESTBOX_TEST_ROOTFS not set");
        return;
    };
    let spec = LaunchSpec::new("/bin/true", Vec::new(), Some("jailed".into()), Some(rootfs.clone()))
        .unwrap();
    assert!(run(&spec).success());
    // The proc mount lived in the child's mount namespace only.
    let host_mounts = std::fs::read_to_string("/proc/self/mounts").unwrap();
    let jail_proc = rootfs.join("proc");
    assert!(!host_mounts.contains(&format!(" {} proc ", jail_proc.display())));
}
