//! Binary wire format for schema metadata and cell values.
//!
//! All integers are big-endian and fixed width. Strings are u64
//! length-prefixed raw bytes, no terminator. This layout is the on-disk
//! contract; it must not change shape.

use crate::catalog::{ColumnMeta, TableMeta};
use crate::error::DbError;
use crate::value::{DataType, Value};

pub fn encode_table(meta: &TableMeta) -> Vec<u8> {
    let mut out = Vec::new();
    put_str(&mut out, &meta.name);
    out.extend_from_slice(&meta.last_insert_id.to_be_bytes());
    out.extend_from_slice(&(meta.columns.len() as u64).to_be_bytes());
    for col in &meta.columns {
        out.push(col.ty as u8);
        put_str(&mut out, &col.name);
    }
    out
}

pub fn decode_table(buf: &[u8]) -> Result<TableMeta, DbError> {
    let mut r = Reader::new(buf);
    let name = r.string()?;
    let last_insert_id = r.u64()?;
    let column_count = r.u64()?;
    let mut columns = Vec::new();
    // Ordinals are not stored; wire order is authoritative.
    for ordinal in 0..column_count {
        let ty = r.data_type()?;
        let name = r.string()?;
        columns.push(ColumnMeta {
            name,
            ty,
            ordinal: ordinal as usize,
        });
    }
    Ok(TableMeta {
        name,
        columns,
        last_insert_id,
    })
}

pub fn encode_value(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(value.data_type() as u8);
    match value {
        Value::Int(n) => out.extend_from_slice(&n.to_be_bytes()),
        Value::Text(s) => put_str(&mut out, s),
    }
    out
}

pub fn decode_value(buf: &[u8]) -> Result<Value, DbError> {
    let mut r = Reader::new(buf);
    match r.data_type()? {
        DataType::Int => Ok(Value::Int(r.i64()?)),
        DataType::Text => Ok(Value::Text(r.string()?)),
    }
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u64).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// Checked reader over an encoded buffer. Every read validates the
/// remaining length first; a short buffer is a deserialize error, never
/// an out-of-bounds read.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DbError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                DbError::Deserialize(format!(
                    "record truncated: wanted {} bytes at offset {}, have {}",
                    n,
                    self.pos,
                    self.buf.len() - self.pos
                ))
            })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DbError> {
        Ok(self.take(1)?[0])
    }

    fn u64(&mut self) -> Result<u64, DbError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(u64::from_be_bytes(bytes))
    }

    fn i64(&mut self) -> Result<i64, DbError> {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(i64::from_be_bytes(bytes))
    }

    fn string(&mut self) -> Result<String, DbError> {
        let len = self.u64()?;
        let len = usize::try_from(len)
            .map_err(|_| DbError::Deserialize(format!("string length {} out of range", len)))?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DbError::Deserialize("string is not valid utf-8".into()))
    }

    fn data_type(&mut self) -> Result<DataType, DbError> {
        match self.u8()? {
            0 => Ok(DataType::Int),
            1 => Ok(DataType::Text),
            tag => Err(DbError::Deserialize(format!("unknown type tag {}", tag))),
        }
    }
}
