use std::fs;
use std::path::Path;

use clap::CommandFactory;

// cli.rs only needs clap + clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR") else {
        panic!("OUT_DIR not set by Cargo");
    };
    let man_dir = Path::new(&out_dir).join("man");
    if let Err(e) = fs::create_dir_all(&man_dir) {
        panic!("cannot create {}: {e}", man_dir.display());
    }

    write_manpages(&cli::Cli::command(), &man_dir, None);
}

/// One page per visible command, named `emsbus-<sub>.1` for subcommands.
fn write_manpages(cmd: &clap::Command, dir: &Path, parent: Option<&str>) {
    let name = match parent {
        Some(parent) => format!("{parent}-{}", cmd.get_name()),
        None => cmd.get_name().to_owned(),
    };

    let mut page = Vec::new();
    let renamed = cmd.clone().name(name.clone());
    if let Err(e) = clap_mangen::Man::new(renamed).render(&mut page) {
        panic!("cannot render man page for `{name}`: {e}");
    }
    let path = dir.join(format!("{name}.1"));
    if let Err(e) = fs::write(&path, page) {
        panic!("cannot write {}: {e}", path.display());
    }

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        write_manpages(sub, dir, Some(&name));
    }
}
