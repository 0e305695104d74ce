//! Type expressions used in model documents: `int32`, `array<string>`,
//! `map<string, array<int>>` or a user type name.

use super::Primitive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(Primitive),
    Array(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// User type reference, resolved by the loader.
    Named(String),
}

/// Parse a type expression.
///
/// # Errors
///
/// Returns a human readable reason when the expression is malformed.
pub fn parse_type_expr(input: &str) -> Result<TypeExpr, String> {
    let mut parser = Parser {
        src: input.as_bytes(),
        pos: 0,
    };
    let expr = parser.expr()?;
    parser.skip_ws();
    if parser.pos != parser.src.len() {
        return Err(format!("unexpected trailing input at offset {}", parser.pos));
    }
    Ok(expr)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn expect(&mut self, c: u8) -> Result<(), String> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(format!("expected '{}' at offset {}", c as char, self.pos))
        }
    }

    fn ident(&mut self) -> Result<String, String> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.src.len() {
            let c = self.src[self.pos];
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(format!("expected a type name at offset {start}"));
        }
        Ok(String::from_utf8_lossy(&self.src[start..self.pos]).into_owned())
    }

    fn expr(&mut self) -> Result<TypeExpr, String> {
        let name = self.ident()?;
        if self.peek() != Some(b'<') {
            return Ok(match Primitive::from_name(&name) {
                Some(p) => TypeExpr::Primitive(p),
                None if name == "array" || name == "map" => {
                    return Err(format!("{name} requires type arguments"))
                }
                None => TypeExpr::Named(name),
            });
        }
        self.expect(b'<')?;
        let first = self.expr()?;
        let expr = match name.as_str() {
            "array" => TypeExpr::Array(Box::new(first)),
            "map" => {
                self.expect(b',')?;
                let value = self.expr()?;
                TypeExpr::Map(Box::new(first), Box::new(value))
            }
            other => return Err(format!("type {other} does not take arguments")),
        };
        self.expect(b'>')?;
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_generics() {
        let expr = parse_type_expr("map<string, array<int32>>");
        assert_eq!(
            expr,
            Ok(TypeExpr::Map(
                Box::new(TypeExpr::Primitive(Primitive::String)),
                Box::new(TypeExpr::Array(Box::new(TypeExpr::Primitive(
                    Primitive::Int32
                ))))
            ))
        );
    }

    #[test]
    fn user_names_pass_through() {
        assert_eq!(parse_type_expr("Item"), Ok(TypeExpr::Named("Item".into())));
        assert_eq!(
            parse_type_expr("bool"),
            Ok(TypeExpr::Primitive(Primitive::Boolean))
        );
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_type_expr("array").is_err());
        assert!(parse_type_expr("array<int").is_err());
        assert!(parse_type_expr("Item<int>").is_err());
        assert!(parse_type_expr("int extra").is_err());
    }
}
