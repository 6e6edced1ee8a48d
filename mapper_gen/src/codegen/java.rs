use mapper_types::{
  Block, CallTarget, ClassDecl, Expr, Failure, FieldDecl, MethodDecl, Node, NodeId,
  PrimitiveType, ProgramTree, SequenceOp, Stmt, TreeError, TypeDescriptor, LIST_TYPE,
  SEQUENCE_TYPE, STRING_TYPE,
};
use std::fmt::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
  #[error(transparent)]
  Tree(#[from] TreeError),

  #[error("call target {0} is not a method")]
  UnresolvedMethod(NodeId),

  #[error("sequence operation {op:?} takes {expected} argument(s), got {found}")]
  SequenceArity {
    op: SequenceOp,
    expected: usize,
    found: usize,
  },

  #[error("failed to format java source: {0}")]
  Format(#[from] fmt::Error),
}

pub struct JavaEmitterOptions {
  /// Emitted as the `package` clause of whole-class output.
  pub package: Option<String>,
  /// Spaces per nesting level.
  pub indent: usize,
}

impl Default for JavaEmitterOptions {
  fn default() -> Self {
    Self {
      package: None,
      indent: 2,
    }
  }
}

/// Renders classes of a [`ProgramTree`] as Java source.
pub struct JavaEmitter<'a> {
  tree: &'a ProgramTree,
  options: JavaEmitterOptions,
}

impl<'a> JavaEmitter<'a> {
  pub fn new(tree: &'a ProgramTree, options: JavaEmitterOptions) -> Self {
    Self { tree, options }
  }

  /// A top-level class with all of its members, nested types included.
  pub fn emit_class(&self, class: NodeId) -> Result<String, EmitError> {
    let mut out = SourceWriter::new(self.options.indent);
    if let Some(package) = &self.options.package {
      out.line(format_args!("package {};", package))?;
      out.blank();
    }
    self.class_block(&mut out, class, false)?;
    Ok(out.finish())
  }

  /// A single nested type, rendered as it appears inside its host.
  pub fn emit_nested(&self, nested: NodeId) -> Result<String, EmitError> {
    let mut out = SourceWriter::new(self.options.indent);
    self.class_block(&mut out, nested, true)?;
    Ok(out.finish())
  }

  fn class_block(&self, out: &mut SourceWriter, id: NodeId, nested: bool) -> Result<(), EmitError> {
    let class = self.tree.expect_class(id)?;
    annotations(out, &class.annotations)?;
    out.line(format_args!("{} {{", class_header(class, nested)))?;
    out.indent();

    let mut previous_field = None;
    for (member_id, node) in self.tree.members(id) {
      /* Consecutive fields stay together, everything else is separated by a blank line */
      let is_field = matches!(node, Node::Field(_));
      if previous_field.is_some_and(|prev| !(prev && is_field)) {
        out.blank();
      }
      previous_field = Some(is_field);
      match node {
        Node::Field(field) => self.field(out, field)?,
        Node::Method(method) => self.method(out, method)?,
        Node::Class(_) => self.class_block(out, member_id, true)?,
      }
    }

    out.dedent();
    out.line(format_args!("}}"))?;
    Ok(())
  }

  fn field(&self, out: &mut SourceWriter, field: &FieldDecl) -> Result<(), EmitError> {
    annotations(out, &field.annotations)?;
    out.line(format_args!("private {} {};", java_type(&field.ty), identifier(&field.name)))?;
    Ok(())
  }

  fn method(&self, out: &mut SourceWriter, method: &MethodDecl) -> Result<(), EmitError> {
    annotations(out, &method.annotations)?;
    let params = method
      .params
      .iter()
      .map(|p| format!("{} {}", java_type(&p.ty), identifier(&p.name)))
      .collect::<Vec<_>>()
      .join(", ");
    let modifiers = if method.is_static { "public static" } else { "public" };
    out.line(format_args!(
      "{} {} {}({}) {{",
      modifiers,
      java_type(&method.return_type),
      method.name,
      params
    ))?;
    out.indent();
    match &method.body {
      Some(body) => self.block(out, body)?,
      /* Implemented elsewhere; keep the source compilable */
      None => out.line(format_args!(
        "throw new UnsupportedOperationException(\"{}\");",
        escape(&method.name)
      ))?,
    }
    out.dedent();
    out.line(format_args!("}}"))?;
    Ok(())
  }

  fn block(&self, out: &mut SourceWriter, block: &Block) -> Result<(), EmitError> {
    for stmt in block {
      self.stmt(out, stmt)?;
    }
    Ok(())
  }

  fn stmt(&self, out: &mut SourceWriter, stmt: &Stmt) -> Result<(), EmitError> {
    match stmt {
      Stmt::Expr { expr } => out.line(format_args!("{};", self.expr(expr)?))?,
      Stmt::Return { value } => out.line(format_args!("return {};", self.expr(value)?))?,
      Stmt::Let { name, ty, value } => out.line(format_args!(
        "{} {} = {};",
        java_type(ty),
        identifier(name),
        self.expr(value)?
      ))?,
      Stmt::StoreField { object, field, value } => out.line(format_args!(
        "{}.{} = {};",
        self.expr(object)?,
        identifier(field),
        self.expr(value)?
      ))?,
      Stmt::Throw { failure } => self.throw(out, failure)?,
      Stmt::If { cond, then_block, else_block } => {
        out.line(format_args!("if ({}) {{", self.expr(cond)?))?;
        self.nested_block(out, then_block)?;
        if else_block.is_empty() {
          out.line(format_args!("}}"))?;
        } else {
          out.line(format_args!("}} else {{"))?;
          self.nested_block(out, else_block)?;
          out.line(format_args!("}}"))?;
        }
      }
      Stmt::Switch { scrutinee, cases, default } => {
        /* Rendered as an equals() chain in label order; a null scrutinee
         * falls through to the default branch */
        let key = self.expr(scrutinee)?;
        if cases.is_empty() {
          return self.block(out, default);
        }
        for (idx, (label, body)) in cases.iter().enumerate() {
          let keyword = if idx == 0 { "if" } else { "} else if" };
          out.line(format_args!("{} (\"{}\".equals({})) {{", keyword, escape(label), key))?;
          self.nested_block(out, body)?;
        }
        if default.is_empty() {
          out.line(format_args!("}}"))?;
        } else {
          out.line(format_args!("}} else {{"))?;
          self.nested_block(out, default)?;
          out.line(format_args!("}}"))?;
        }
      }
    }
    Ok(())
  }

  fn nested_block(&self, out: &mut SourceWriter, block: &Block) -> Result<(), EmitError> {
    out.indent();
    self.block(out, block)?;
    out.dedent();
    Ok(())
  }

  fn throw(&self, out: &mut SourceWriter, failure: &Failure) -> Result<(), EmitError> {
    match failure {
      Failure::UnknownField { key } => out.line(format_args!(
        "throw new IllegalArgumentException(\"Unknown field: \" + {});",
        self.expr(key)?
      ))?,
    }
    Ok(())
  }

  fn expr(&self, expr: &Expr) -> Result<String, EmitError> {
    Ok(match expr {
      Expr::Local { name } => identifier(name),
      Expr::This => "this".to_string(),
      Expr::LoadField { object, field } => format!("{}.{}", self.expr(object)?, identifier(field)),
      Expr::Cast { ty, value } => format!("(({}) {})", java_type(ty), self.expr(value)?),
      Expr::NotNull { value } => format!("{} != null", self.expr(value)?),
      Expr::Call { receiver, target, args } => {
        let rendered = args.iter().map(|a| self.expr(a)).collect::<Result<Vec<_>, _>>()?;
        let name = match target {
          CallTarget::Member { method } => self
            .tree
            .method(*method)
            .map(|m| m.name.clone())
            .ok_or(EmitError::UnresolvedMethod(*method))?,
          CallTarget::Sequence { op } => {
            let (name, expected) = match op {
              SequenceOp::Clear => ("clear", 0),
              SequenceOp::AppendAll => ("addAll", 1),
            };
            if rendered.len() != expected {
              return Err(EmitError::SequenceArity {
                op: *op,
                expected,
                found: rendered.len(),
              });
            }
            name.to_string()
          }
        };
        match receiver {
          Some(receiver) => format!("{}.{}({})", self.expr(receiver)?, name, rendered.join(", ")),
          None => format!("{}({})", name, rendered.join(", ")),
        }
      }
    })
  }
}

fn class_header(class: &ClassDecl, nested: bool) -> String {
  let mut header = String::from("public ");
  if nested && class.is_static {
    header.push_str("static ");
  }
  header.push_str("class ");
  header.push_str(&class.name);

  /* Only the first supertype is rendered; the tree does not tell classes
   * from interfaces */
  if let Some(sup) = class.supertypes.first() {
    header.push_str(" extends ");
    header.push_str(&java_type(sup));
  }
  header
}

fn annotations(out: &mut SourceWriter, markers: &[String]) -> fmt::Result {
  for marker in markers {
    out.line(format_args!("@{}", marker))?;
  }
  Ok(())
}

/// Java spelling of a type descriptor.
pub fn java_type(ty: &TypeDescriptor) -> String {
  match ty {
    TypeDescriptor::Void => "void".to_string(),
    TypeDescriptor::Any => "Object".to_string(),
    TypeDescriptor::Primitive(prim) => primitive_to_java(*prim).to_string(),
    TypeDescriptor::Boxed(prim) => format!("java.lang.{}", boxed_to_java(*prim)),
    TypeDescriptor::Named { name, args } => {
      let base = match name.as_str() {
        STRING_TYPE => "String",
        SEQUENCE_TYPE | LIST_TYPE => "java.util.List",
        other => other,
      };
      if args.is_empty() {
        base.to_string()
      } else {
        /* Type arguments must be reference types */
        let args = args
          .iter()
          .map(|arg| java_type(&arg.boxed()))
          .collect::<Vec<_>>()
          .join(", ");
        format!("{}<{}>", base, args)
      }
    }
  }
}

fn primitive_to_java(prim: PrimitiveType) -> &'static str {
  match prim {
    PrimitiveType::Bool => "boolean",
    PrimitiveType::Int8 => "byte",
    PrimitiveType::Int16 => "short",
    PrimitiveType::Int32 => "int",
    PrimitiveType::Int64 => "long",
    PrimitiveType::Char => "char",
    PrimitiveType::Float32 => "float",
    PrimitiveType::Float64 => "double",
  }
}

fn boxed_to_java(prim: PrimitiveType) -> &'static str {
  match prim {
    PrimitiveType::Bool => "Boolean",
    PrimitiveType::Int8 => "Byte",
    PrimitiveType::Int16 => "Short",
    PrimitiveType::Int32 => "Integer",
    PrimitiveType::Int64 => "Long",
    PrimitiveType::Char => "Character",
    PrimitiveType::Float32 => "Float",
    PrimitiveType::Float64 => "Double",
  }
}

fn escape(raw: &str) -> String {
  let mut escaped = String::with_capacity(raw.len());
  for ch in raw.chars() {
    match ch {
      '"' => escaped.push_str("\\\""),
      '\\' => escaped.push_str("\\\\"),
      '\n' => escaped.push_str("\\n"),
      '\r' => escaped.push_str("\\r"),
      '\t' => escaped.push_str("\\t"),
      other => escaped.push(other),
    }
  }
  escaped
}

/* Escape Java reserved words used as field, parameter or local names */
fn identifier(name: &str) -> String {
  const RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null",
  ];
  if RESERVED.contains(&name) {
    format!("{}_", name)
  } else {
    name.to_string()
  }
}

struct SourceWriter {
  out: String,
  depth: usize,
  width: usize,
}

impl SourceWriter {
  fn new(width: usize) -> Self {
    Self {
      out: String::new(),
      depth: 0,
      width,
    }
  }

  fn line(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
    for _ in 0..self.depth * self.width {
      self.out.push(' ');
    }
    self.out.write_fmt(args)?;
    self.out.push('\n');
    Ok(())
  }

  fn blank(&mut self) {
    self.out.push('\n');
  }

  fn indent(&mut self) {
    self.depth += 1;
  }

  fn dedent(&mut self) {
    self.depth = self.depth.saturating_sub(1);
  }

  fn finish(self) -> String {
    self.out
  }
}
