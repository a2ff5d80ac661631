//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `studyvault_core` linkage and open a vault outside the host UI.
//! - Print the root listing in a deterministic, line-oriented format.
//!
//! Usage: `studyvault_cli [db_path]` (defaults to a file in the temp dir).

use std::path::PathBuf;
use std::process::ExitCode;
use studyvault_core::{open_sqlite_vault, NoopNotifier, VaultSettings};

fn main() -> ExitCode {
    println!("studyvault_core ping={}", studyvault_core::ping());
    println!("studyvault_core version={}", studyvault_core::core_version());

    let db_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("studyvault_cli.sqlite3"));

    let vault = match open_sqlite_vault(&db_path, NoopNotifier, VaultSettings::default()) {
        Ok(vault) => vault,
        Err(err) => {
            eprintln!("vault open failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("vault path={} items={}", db_path.display(), vault.tree().len());
    for item in vault.current_items() {
        println!("{}\t{}\t{}", item.kind.label(), item.id, item.name);
    }
    let orphans = vault.tree().orphans().len();
    if orphans > 0 {
        println!("orphaned items={orphans}");
    }
    ExitCode::SUCCESS
}
