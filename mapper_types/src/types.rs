use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the ordered homogeneous collection abstraction.
pub const SEQUENCE_TYPE: &str = "sequence";
/// Built-in concrete sequence type.
pub const LIST_TYPE: &str = "list";
pub const STRING_TYPE: &str = "string";

const BOXED_TYPE: &str = "boxed";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Char,
    Float32,
    Float64,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Bool,
        PrimitiveType::Int8,
        PrimitiveType::Int16,
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::Char,
        PrimitiveType::Float32,
        PrimitiveType::Float64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Char => "char",
            PrimitiveType::Float32 => "float32",
            PrimitiveType::Float64 => "float64",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|prim| prim.name() == name)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a field, parameter or return value.
///
/// The textual form is `name` or `name<arg, ...>`; primitives use their
/// lowercase names and the boxed (reference) form of a primitive is written
/// `boxed<int64>`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum TypeDescriptor {
    Void,
    Any,
    Primitive(PrimitiveType),
    Boxed(PrimitiveType),
    Named {
        name: String,
        args: Vec<TypeDescriptor>,
    },
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        TypeDescriptor::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Named {
            name: name.into(),
            args,
        }
    }

    pub fn string() -> Self {
        Self::named(STRING_TYPE)
    }

    pub fn sequence_of(element: TypeDescriptor) -> Self {
        Self::generic(SEQUENCE_TYPE, vec![element])
    }

    /// Name of a nominal type, `None` for primitives and the reserved kinds.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Type arguments are dropped; everything else is kept as is.
    pub fn erasure(&self) -> TypeDescriptor {
        match self {
            TypeDescriptor::Named { name, .. } => TypeDescriptor::named(name.clone()),
            other => other.clone(),
        }
    }

    /// Reference form of a primitive. Non-primitives are returned unchanged.
    pub fn boxed(&self) -> TypeDescriptor {
        match self {
            TypeDescriptor::Primitive(prim) => TypeDescriptor::Boxed(*prim),
            other => other.clone(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Void => f.write_str("void"),
            TypeDescriptor::Any => f.write_str("any"),
            TypeDescriptor::Primitive(prim) => write!(f, "{prim}"),
            TypeDescriptor::Boxed(prim) => write!(f, "{BOXED_TYPE}<{prim}>"),
            TypeDescriptor::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (idx, arg) in args.iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid type descriptor '{input}': {reason}")]
pub struct TypeParseError {
    pub input: String,
    pub reason: String,
}

impl FromStr for TypeDescriptor {
    type Err = TypeParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parser = DescriptorParser {
            input,
            tokens: tokenize(input)?,
            pos: 0,
        };
        let ty = parser.parse_type()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl TryFrom<String> for TypeDescriptor {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeDescriptor> for String {
    fn from(value: TypeDescriptor) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Open,
    Close,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, TypeParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        match ch {
            '<' => tokens.push(Token::Open),
            '>' => tokens.push(Token::Close),
            ',' => tokens.push(Token::Comma),
            c if c.is_whitespace() => {}
            c if is_ident_char(c) => {
                let mut end = start + c.len_utf8();
                while let Some(&(idx, next)) = chars.peek() {
                    if !is_ident_char(next) {
                        break;
                    }
                    end = idx + next.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Ident(input[start..end].to_string()));
            }
            other => {
                return Err(TypeParseError {
                    input: input.to_string(),
                    reason: format!("unexpected character '{other}'"),
                })
            }
        }
    }
    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '$'
}

struct DescriptorParser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl DescriptorParser<'_> {
    fn error(&self, reason: &str) -> TypeParseError {
        TypeParseError {
            input: self.input.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, TypeParseError> {
        let name = match self.tokens.get(self.pos) {
            Some(Token::Ident(name)) => name.clone(),
            Some(_) => return Err(self.error("expected a type name")),
            None => return Err(self.error("unexpected end of input")),
        };
        self.pos += 1;

        let mut args = Vec::new();
        if self.tokens.get(self.pos) == Some(&Token::Open) {
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                match self.tokens.get(self.pos) {
                    Some(Token::Comma) => self.pos += 1,
                    Some(Token::Close) => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '>'")),
                }
            }
        }

        match name.as_str() {
            "void" | "any" if !args.is_empty() => {
                Err(self.error("reserved type does not take arguments"))
            }
            "void" => Ok(TypeDescriptor::Void),
            "any" => Ok(TypeDescriptor::Any),
            BOXED_TYPE => match args.as_slice() {
                [TypeDescriptor::Primitive(prim)] => Ok(TypeDescriptor::Boxed(*prim)),
                _ => Err(self.error("boxed<> takes exactly one primitive argument")),
            },
            _ => match PrimitiveType::from_name(&name) {
                Some(_) if !args.is_empty() => {
                    Err(self.error("primitive types do not take arguments"))
                }
                Some(prim) => Ok(TypeDescriptor::Primitive(prim)),
                None => Ok(TypeDescriptor::Named { name, args }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitives_and_generics() {
        assert_eq!(
            "int64".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::Primitive(PrimitiveType::Int64)
        );
        assert_eq!(
            "sequence<string>".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::sequence_of(TypeDescriptor::string())
        );
        assert_eq!(
            "map< string , list<int32> >".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::generic(
                "map",
                vec![
                    TypeDescriptor::string(),
                    TypeDescriptor::generic(
                        LIST_TYPE,
                        vec![TypeDescriptor::Primitive(PrimitiveType::Int32)]
                    ),
                ]
            )
        );
        assert_eq!(
            "boxed<bool>".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::Boxed(PrimitiveType::Bool)
        );
    }

    #[test]
    fn rejects_malformed_descriptors() {
        for bad in ["", "sequence<", "int32<string>", "a b", "boxed<string>", "void<int8>", "x>"] {
            assert!(bad.parse::<TypeDescriptor>().is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn display_parses_back() {
        let ty = TypeDescriptor::generic(
            "map",
            vec![TypeDescriptor::string(), TypeDescriptor::Boxed(PrimitiveType::Int64)],
        );
        assert_eq!(ty.to_string(), "map<string, boxed<int64>>");
        assert_eq!(ty.to_string().parse::<TypeDescriptor>().unwrap(), ty);
    }

    #[test]
    fn erasure_and_boxing() {
        let seq = TypeDescriptor::sequence_of(TypeDescriptor::string());
        assert_eq!(seq.erasure(), TypeDescriptor::named(SEQUENCE_TYPE));
        assert_eq!(
            TypeDescriptor::Primitive(PrimitiveType::Int32).boxed(),
            TypeDescriptor::Boxed(PrimitiveType::Int32)
        );
        assert_eq!(seq.boxed(), seq);
    }
}
