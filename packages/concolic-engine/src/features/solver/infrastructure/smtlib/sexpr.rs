//! S-expression reader for solver output

use crate::features::solver::domain::{SolverError, SolverResult};

#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    /// Symbol, numeral or bit-vector literal (`|quoted|` symbols unwrapped)
    Atom(String),
    /// String literal with `""` already collapsed to `"`
    Str(String),
    List(Vec<SExpr>),
}

impl SExpr {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Self::Atom(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExpr]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Atom at position `i` of a list
    pub fn atom_at(&self, i: usize) -> Option<&str> {
        self.as_list()?.get(i)?.as_atom()
    }
}

/// Parse every top-level s-expression in `input`
pub fn parse_all(input: &str) -> SolverResult<Vec<SExpr>> {
    let mut reader = Reader {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut items = Vec::new();
    loop {
        reader.skip_blank();
        if reader.pos >= reader.chars.len() {
            return Ok(items);
        }
        items.push(reader.read()?);
    }
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
}

impl Reader {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_blank(&mut self) {
        while let Some(c) = self.peek() {
            if c == ';' {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == '\n' {
                        break;
                    }
                }
            } else if c.is_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn read(&mut self) -> SolverResult<SExpr> {
        self.skip_blank();
        match self.peek() {
            None => Err(SolverError::Parse("unexpected end of output".to_string())),
            Some('(') => {
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_blank();
                    match self.peek() {
                        None => return Err(SolverError::Parse("unbalanced '('".to_string())),
                        Some(')') => {
                            self.pos += 1;
                            return Ok(SExpr::List(items));
                        }
                        Some(_) => items.push(self.read()?),
                    }
                }
            }
            Some(')') => Err(SolverError::Parse(format!("unexpected ')' at {}", self.pos))),
            Some('"') => self.read_string(),
            Some('|') => self.read_quoted_symbol(),
            Some(_) => Ok(self.read_atom()),
        }
    }

    fn read_string(&mut self) -> SolverResult<SExpr> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(SolverError::Parse("unterminated string literal".to_string())),
                Some('"') if self.chars.get(self.pos + 1) == Some(&'"') => {
                    out.push('"');
                    self.pos += 2;
                }
                Some('"') => {
                    self.pos += 1;
                    return Ok(SExpr::Str(out));
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn read_quoted_symbol(&mut self) -> SolverResult<SExpr> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(SolverError::Parse("unterminated quoted symbol".to_string())),
                Some('|') => {
                    self.pos += 1;
                    return Ok(SExpr::Atom(out));
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn read_atom(&mut self) -> SExpr {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' || c == '"' || c == ';' {
                break;
            }
            self.pos += 1;
        }
        SExpr::Atom(self.chars[start..self.pos].iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_shape() {
        let items = parse_all("sat\n((var0 #x00000005)\n (|var 1| \"a\"\"b\")) ; trailing\n").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], SExpr::Atom("sat".to_string()));
        let pairs = items[1].as_list().unwrap();
        assert_eq!(pairs[0].atom_at(1), Some("#x00000005"));
        assert_eq!(pairs[1].atom_at(0), Some("var 1"));
        assert_eq!(pairs[1].as_list().unwrap()[1], SExpr::Str("a\"b".to_string()));
    }

    #[test]
    fn test_unbalanced_is_parse_error() {
        assert!(matches!(parse_all("((a b)"), Err(SolverError::Parse(_))));
        assert!(matches!(parse_all("a)"), Err(SolverError::Parse(_))));
    }
}
