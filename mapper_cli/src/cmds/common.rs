/* Common utilities shared between analyze and codegen commands */

use anyhow::Context;
use mapper_gen::{Diagnostics, MapperConfig};
use mapper_types::{ClassFile, ProgramTree};
use std::path::{Path, PathBuf};

/* Load every class description file into one tree, in file order */
pub fn load_tree(files: &[PathBuf], verbose: bool) -> anyhow::Result<ProgramTree> {
  let mut tree = ProgramTree::new();
  for file in files {
    let class_file = ClassFile::load(file)
      .with_context(|| format!("failed to load class file {}", file.display()))?;
    let classes = class_file.populate(&mut tree);
    if verbose {
      println!("[~] Loaded {} class(es) from {}", classes.len(), file.display());
    }
  }
  Ok(tree)
}

/* <config_dir>/fmapper/config.yaml, when the platform has a config dir */
pub fn default_config_path() -> Option<PathBuf> {
  dirs::config_dir().map(|dir| dir.join("fmapper").join("config.yaml"))
}

/* Explicit file first (must exist), then the default location, then defaults */
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<MapperConfig> {
  match explicit {
    Some(path) => MapperConfig::load(path)
      .with_context(|| format!("failed to load config {}", path.display())),
    None => match default_config_path() {
      Some(path) => MapperConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config {}", path.display())),
      None => Ok(MapperConfig::default()),
    },
  }
}

/* Print collected diagnostics to stderr, naming the class each one is anchored at */
pub fn print_diagnostics(tree: &ProgramTree, diagnostics: &Diagnostics) {
  for diagnostic in diagnostics.entries() {
    let anchor = tree
      .class(diagnostic.anchor)
      .map(|class| class.name.as_str())
      .unwrap_or("<unknown>");
    eprintln!("{}: {}: {}", diagnostic.severity, anchor, diagnostic.message);
  }
}
