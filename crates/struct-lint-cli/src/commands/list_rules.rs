//! List rules command implementation.

use struct_lint_core::config::list_builtin_presets;
use struct_lint_rules::{CONFIG_CODE, RULE_KINDS};

/// Runs the list-rules command.
pub fn run() {
    println!("Rule kinds:\n");
    println!("{:<22} {:<30} Description", "Kind", "Codes");
    println!("{}", "-".repeat(90));

    for info in RULE_KINDS {
        println!(
            "{:<22} {:<30} {}",
            info.kind,
            info.codes.join(", "),
            info.description
        );
    }
    println!(
        "{:<22} {:<30} Rule configuration could not be compiled",
        "(any)", CONFIG_CODE
    );

    println!("\nBuilt-in presets:");
    for preset in list_builtin_presets() {
        println!("  {:<28} {}", preset.reference, preset.description);
    }

    println!("\nUse a preset from struct-lint.toml, e.g.:");
    println!("  extends = [\"builtin/clean-architecture\"]");
}
