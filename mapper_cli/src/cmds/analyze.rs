/* Analyze command - show what synthesis would see for each entity class */

use super::common::load_tree;
use anyhow::bail;
use mapper_gen::{find_reserved, FieldCatalog, FieldType, ENTITY_MARKER};
use mapper_types::{NodeId, ProgramTree, TypeHierarchy};
use std::path::PathBuf;

/* Execute the analyze command */
pub fn run(files: Vec<PathBuf>, verbose: bool) -> anyhow::Result<()> {
  let tree = load_tree(&files, verbose)?;
  let hierarchy = TypeHierarchy::from_tree(&tree);
  let catalog = FieldCatalog::new(&tree, &hierarchy);

  let entities: Vec<NodeId> = tree
    .classes()
    .filter(|(_, class)| class.has_annotation(ENTITY_MARKER))
    .map(|(id, _)| id)
    .collect();

  if entities.is_empty() {
    println!("[~] No @{} classes found", ENTITY_MARKER);
    return Ok(());
  }

  let mut failures = 0usize;
  for class in entities {
    let Some(decl) = tree.class(class) else {
      continue;
    };
    println!("{}", decl.name);
    if let Some((existing, origin)) = find_reserved(&tree, class) {
      println!("  (already has a FieldMapper: {} {:?})", existing, origin);
    }

    match catalog.catalog(class) {
      Ok(fields) if fields.is_empty() => println!("  no fields, skipped"),
      Ok(fields) => {
        for field in fields {
          let kind = match field.ty {
            FieldType::Scalar(_) => "scalar",
            FieldType::Sequence(_) => "sequence",
          };
          println!(
            "  {}: {} ({}) {} -> {}, {} -> {}",
            field.name,
            field.declared_type(),
            kind,
            field.getter_name(),
            method_label(&tree, field.getter),
            field.setter_name(),
            method_label(&tree, field.setter),
          );
        }
      }
      Err(errors) => {
        failures += 1;
        for error in errors {
          println!("  error: {}", error);
        }
      }
    }
  }

  if failures > 0 {
    bail!("{} class(es) cannot be synthesized", failures);
  }
  Ok(())
}

fn method_label(tree: &ProgramTree, method: NodeId) -> String {
  match tree.method(method) {
    Some(decl) => {
      let params = decl
        .params
        .iter()
        .map(|p| p.ty.to_string())
        .collect::<Vec<_>>()
        .join(", ");
      format!("{}({}): {}", method, params, decl.return_type)
    }
    None => method.to_string(),
  }
}
