use std::fmt::Display;

/// Declared column types. The discriminant doubles as the wire tag.
#[repr(u8)]
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum DataType {
    Int = 0,
    Text = 1,
}

#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Int => "Int",
            DataType::Text => "Text",
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
        }
    }

    pub fn verify(&self, data_type: DataType) -> bool {
        self.data_type() == data_type
    }

    /// Numeric order for Int, byte-lexicographic for Text.
    /// Mixed variants compare as false, always.
    pub fn lt(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a < b,
            (Value::Text(a), Value::Text(b)) => a.as_bytes() < b.as_bytes(),
            _ => false,
        }
    }

    pub fn gt(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a > b,
            (Value::Text(a), Value::Text(b)) => a.as_bytes() > b.as_bytes(),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}
