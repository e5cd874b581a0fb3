//! Function keys and signatures
//!
//! Shadows are registered one per exact signature, keyed by declaring type,
//! name and method descriptor (`(Ljava/lang/String;I)Z`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ConcolicError, Result};
use crate::features::environment::domain::ConcreteValue;
use crate::features::expression::domain::Sort;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    Bool,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Object or array type, dotted class name (`java.lang.String`)
    Ref(String),
    Void,
}

impl ParamType {
    /// Expression sort of a primitive type
    pub fn sort(&self) -> Option<Sort> {
        match self {
            Self::Bool | Self::Char | Self::Byte | Self::Short | Self::Int => Some(Sort::Int32),
            Self::Long => Some(Sort::Int64),
            Self::Float | Self::Double => Some(Sort::Real),
            Self::Ref(_) | Self::Void => None,
        }
    }

    /// Representable range used as variable bounds
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            Self::Bool => (0, 1),
            Self::Char => (0, u16::MAX as i64),
            Self::Byte => (i8::MIN as i64, i8::MAX as i64),
            Self::Short => (i16::MIN as i64, i16::MAX as i64),
            Self::Int => (i32::MIN as i64, i32::MAX as i64),
            _ => (i64::MIN, i64::MAX),
        }
    }

    /// Does a concrete value fit this slot
    pub fn accepts(&self, value: &ConcreteValue) -> bool {
        matches!(
            (self, value),
            (
                Self::Bool | Self::Char | Self::Byte | Self::Short | Self::Int,
                ConcreteValue::Int(_)
            ) | (Self::Long, ConcreteValue::Long(_))
                | (Self::Float | Self::Double, ConcreteValue::Real(_))
                | (Self::Ref(_), ConcreteValue::Ref(_) | ConcreteValue::Null)
        )
    }

    /// Parse a field descriptor such as `Z` or `Ljava/lang/String;`
    pub fn from_field_descriptor(descriptor: &str) -> Result<Self> {
        let mut chars = descriptor.chars().peekable();
        match Self::parse(&mut chars) {
            Some(Self::Void) | None => {}
            Some(_) if chars.next().is_some() => {}
            Some(t) => return Ok(t),
        }
        Err(ConcolicError::signature(descriptor, "malformed field descriptor"))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::Ref(class) if class == "java.lang.String")
    }

    fn parse(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Self> {
        let t = match chars.next()? {
            'Z' => Self::Bool,
            'C' => Self::Char,
            'B' => Self::Byte,
            'S' => Self::Short,
            'I' => Self::Int,
            'J' => Self::Long,
            'F' => Self::Float,
            'D' => Self::Double,
            'V' => Self::Void,
            'L' => {
                let mut class = String::new();
                loop {
                    match chars.next()? {
                        ';' => break,
                        '/' => class.push('.'),
                        c => class.push(c),
                    }
                }
                Self::Ref(class)
            }
            '[' => {
                let element = Self::parse(chars)?;
                Self::Ref(format!("{}[]", element))
            }
            _ => return None,
        };
        Some(t)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "boolean"),
            Self::Char => write!(f, "char"),
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Ref(class) => write!(f, "{}", class),
            Self::Void => write!(f, "void"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<ParamType>,
    pub ret: ParamType,
}

impl Signature {
    /// Parse a method descriptor such as `(II)I`
    pub fn from_descriptor(descriptor: &str) -> Result<Self> {
        let malformed = || ConcolicError::signature(descriptor, "malformed method descriptor");
        let mut chars = descriptor.chars().peekable();
        if chars.next() != Some('(') {
            return Err(malformed());
        }
        let mut params = Vec::new();
        while chars.peek().is_some_and(|c| *c != ')') {
            match ParamType::parse(&mut chars) {
                Some(ParamType::Void) | None => return Err(malformed()),
                Some(p) => params.push(p),
            }
        }
        if chars.next() != Some(')') {
            return Err(malformed());
        }
        let ret = ParamType::parse(&mut chars).ok_or_else(malformed)?;
        if chars.next().is_some() {
            return Err(malformed());
        }
        Ok(Self { params, ret })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "({}){}", params.join(", "), self.ret)
    }
}

/// Registry key: declaring type, operation name, exact signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionKey {
    pub owner: String,
    pub name: String,
    pub signature: Signature,
}

impl FunctionKey {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            signature,
        }
    }

    /// Key from an owner (dotted or slashed), a name and a method descriptor
    pub fn parse(owner: &str, name: &str, descriptor: &str) -> Result<Self> {
        Ok(Self::new(
            owner.replace('/', "."),
            name,
            Signature::from_descriptor(descriptor)?,
        ))
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::environment::domain::ObjectHandle;

    #[test]
    fn test_parse_descriptor() {
        let sig = Signature::from_descriptor("(Ljava/lang/String;I)Z").unwrap();
        assert_eq!(
            sig.params,
            vec![ParamType::Ref("java.lang.String".to_string()), ParamType::Int]
        );
        assert_eq!(sig.ret, ParamType::Bool);
        assert!(sig.params[0].is_string());

        let sig = Signature::from_descriptor("([I)V").unwrap();
        assert_eq!(sig.params, vec![ParamType::Ref("int[]".to_string())]);
        assert_eq!(sig.ret, ParamType::Void);
    }

    #[test]
    fn test_malformed_descriptors() {
        for bad in ["", "II)I", "(I", "(I)", "(Ljava/lang/String)V", "(V)I", "(I)IX"] {
            assert!(
                matches!(
                    Signature::from_descriptor(bad),
                    Err(ConcolicError::ShadowSignatureMismatch { .. })
                ),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_key_display_and_identity() {
        let a = FunctionKey::parse("java/lang/Math", "abs", "(I)I").unwrap();
        let b = FunctionKey::parse("java.lang.Math", "abs", "(I)I").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "java.lang.Math.abs(int)int");
        let c = FunctionKey::parse("java.lang.Math", "abs", "(J)J").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_accepts() {
        assert!(ParamType::Char.accepts(&ConcreteValue::Int(97)));
        assert!(!ParamType::Long.accepts(&ConcreteValue::Int(1)));
        assert!(ParamType::Ref("x".into()).accepts(&ConcreteValue::Null));
        assert!(ParamType::Ref("x".into()).accepts(&ConcreteValue::Ref(ObjectHandle::new(1, "x"))));
        assert_eq!(ParamType::Bool.bounds(), (0, 1));
    }

    #[test]
    fn test_field_descriptors() {
        assert_eq!(ParamType::from_field_descriptor("Z").unwrap(), ParamType::Bool);
        assert_eq!(
            ParamType::from_field_descriptor("Ljava/lang/String;").unwrap(),
            ParamType::Ref("java.lang.String".to_string())
        );
        for bad in ["", "V", "II", "Ljava/lang/String"] {
            assert!(ParamType::from_field_descriptor(bad).is_err(), "accepted {:?}", bad);
        }
    }
}
