//! Library crate root re-exporting the launcher, packager, and CLI modules.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod launcher;
pub mod packager;

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    #[test]
    fn launcher_layout_requires_split_modules() {
        let expected_files = [
            "src/launcher/mod.rs",
            "src/launcher/channel.rs",
            "src/launcher/dispatch.rs",
            "src/launcher/exit.rs",
            "src/launcher/wait.rs",
            "src/launcher/runtime.rs",
        ];

        for path in expected_files {
            assert!(
                Path::new(path).exists(),
                "launcher layout: {} must exist",
                path
            );
        }

        let mod_path = Path::new("src/launcher/mod.rs");
        let content = fs::read_to_string(mod_path)
            .unwrap_or_else(|_| panic!("launcher layout: failed to read {}", mod_path.display()));

        for needle in ["channel", "dispatch", "exit", "wait", "runtime"] {
            assert!(
                content.contains(needle),
                "launcher layout: mod.rs must declare {}",
                needle
            );
        }
    }

    #[test]
    fn cli_layout_requires_split_modules() {
        for path in ["src/cli/mod.rs", "src/cli/args.rs", "src/cli/profile.rs"] {
            assert!(Path::new(path).exists(), "cli layout: {} must exist", path);
        }
    }
}
