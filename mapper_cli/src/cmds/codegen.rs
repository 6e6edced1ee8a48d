/* Codegen command - inject accessor types and emit Java sources */

use super::common::{load_tree, print_diagnostics, resolve_config};
use anyhow::{bail, Context};
use mapper_gen::codegen::{JavaEmitter, JavaEmitterOptions, JAVA_EXTENSION};
use mapper_gen::{find_reserved, Diagnostics, Driver, TracingSink};
use mapper_types::{NodeId, ProgramTree};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::path::PathBuf;
use tracing::info;

pub struct CodegenArgs {
  pub files: Vec<PathBuf>,
  pub output_dir: PathBuf,
  pub inline: bool,
  pub config: Option<PathBuf>,
  pub package: Option<String>,
  pub print_ir: bool,
  pub verbose: bool,
}

/* Execute the codegen command */
pub fn run(args: CodegenArgs) -> anyhow::Result<()> {
  let mut config = resolve_config(args.config.as_deref())?;
  if args.inline {
    config.inline = true;
  }

  if args.verbose {
    println!("fmapper - Field Accessor Synthesis");
    println!("==================================\n");
    println!("[~] Configuration:");
    println!("  Inline injection: {}", config.inline);
    println!("  Output directory: {}", args.output_dir.display());
    println!("  Input files: {}", args.files.len());
    for file in &args.files {
      println!("    - {}", file.display());
    }
    println!();
  }

  let mut tree = load_tree(&args.files, args.verbose)?;

  let mut sink = TracingSink::new(Diagnostics::new());
  let report = Driver::new(config).run(&mut tree, &mut sink);
  let diagnostics = sink.into_inner();

  /* Every class that now carries an accessor type gets a source file */
  let processed: Vec<NodeId> = report
    .injected
    .iter()
    .chain(report.already_present.iter())
    .copied()
    .collect();

  if args.print_ir {
    println!("{}", serde_json::to_string_pretty(&ir_dump(&tree, &processed)?)?);
  }

  if !processed.is_empty() {
    std::fs::create_dir_all(&args.output_dir).with_context(|| {
      format!("failed to create output directory {}", args.output_dir.display())
    })?;
  }

  let emitter = JavaEmitter::new(
    &tree,
    JavaEmitterOptions {
      package: args.package.clone(),
      ..JavaEmitterOptions::default()
    },
  );
  for class in &processed {
    let Some(decl) = tree.class(*class) else {
      continue;
    };
    let source = emitter
      .emit_class(*class)
      .with_context(|| format!("failed to emit {}", decl.name))?;
    let path = args
      .output_dir
      .join(format!("{}.{}", decl.name, JAVA_EXTENSION));
    std::fs::write(&path, source).with_context(|| format!("failed to write {}", path.display()))?;
    info!(class = %decl.name, path = %path.display(), "wrote source");
    if args.verbose {
      println!("[✓] Generated {}", path.display());
    }
  }

  print_diagnostics(&tree, &diagnostics);
  println!(
    "[*] {} injected, {} already present, {} skipped, {} failed",
    report.injected.len(),
    report.already_present.len(),
    report.skipped.len(),
    report.failed.len()
  );

  let errors = diagnostics.errors().count();
  if errors > 0 {
    bail!("{} error(s) reported", errors);
  }
  Ok(())
}

/* Class name -> synthesized method declarations */
fn ir_dump(tree: &ProgramTree, classes: &[NodeId]) -> serde_json::Result<JsonValue> {
  let mut dump = JsonMap::new();
  for class in classes {
    let (Some(decl), Some((mapper, _))) = (tree.class(*class), find_reserved(tree, *class)) else {
      continue;
    };
    let methods = tree
      .methods_of(mapper)
      .map(|(_, method)| serde_json::to_value(method))
      .collect::<serde_json::Result<Vec<_>>>()?;
    dump.insert(decl.name.clone(), JsonValue::Array(methods));
  }
  Ok(JsonValue::Object(dump))
}
