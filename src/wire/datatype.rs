//! Typed message descriptors and record codecs

use chrono::{Datelike, NaiveDate};

use super::errors::{WireError, WireResult};
use crate::model::{Query, QueryKind, Row};

/// Descriptor of a fixed-stride record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datatype {
    /// Name used in diagnostics
    pub name: &'static str,
    /// Encoded size of one record in bytes
    pub stride: usize,
}

impl Datatype {
    /// Number of records in a message of `byte_len` bytes.
    ///
    /// Fails if the message does not hold a whole number of records.
    pub fn count_of(&self, byte_len: usize) -> WireResult<usize> {
        if byte_len % self.stride != 0 {
            return Err(WireError::PartialRecord {
                datatype: self.name,
                len: byte_len,
                stride: self.stride,
            });
        }
        Ok(byte_len / self.stride)
    }

    /// Byte size of `count` records
    pub fn bytes_for(&self, count: usize) -> usize {
        count * self.stride
    }
}

/// A record with a fixed little-endian layout.
pub trait WireRecord: Sized {
    /// Layout descriptor
    const DATATYPE: Datatype;

    /// Append the encoded record to `out`
    fn encode_into(&self, out: &mut Vec<u8>);

    /// Decode one record from exactly `DATATYPE.stride` bytes
    fn decode(bytes: &[u8]) -> WireResult<Self>;
}

/// Encode a slice of records into one contiguous message.
pub fn encode_slice<T: WireRecord>(records: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(T::DATATYPE.bytes_for(records.len()));
    for record in records {
        record.encode_into(&mut out);
    }
    out
}

/// Decode a contiguous message into records.
pub fn decode_slice<T: WireRecord>(bytes: &[u8]) -> WireResult<Vec<T>> {
    let count = T::DATATYPE.count_of(bytes.len())?;
    let mut records = Vec::with_capacity(count);
    for chunk in bytes.chunks_exact(T::DATATYPE.stride) {
        records.push(T::decode(chunk)?);
    }
    Ok(records)
}

fn check_len(datatype: Datatype, bytes: &[u8]) -> WireResult<()> {
    if bytes.len() != datatype.stride {
        return Err(WireError::ShortRecord {
            datatype: datatype.name,
            expected: datatype.stride,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn read_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn encode_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

fn decode_date(days: i32) -> WireResult<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days).ok_or(WireError::InvalidDate(days))
}

impl WireRecord for Row {
    const DATATYPE: Datatype = Datatype {
        name: "row",
        stride: 16,
    };

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.company_id.to_le_bytes());
        out.extend_from_slice(&encode_date(self.date).to_le_bytes());
        out.extend_from_slice(&self.sales_total.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> WireResult<Self> {
        check_len(Self::DATATYPE, bytes)?;
        let company_id = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let date = decode_date(read_i32(bytes, 4))?;
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&bytes[8..16]);
        Ok(Row::new(company_id, date, f64::from_le_bytes(amount)))
    }
}

impl WireRecord for Query {
    const DATATYPE: Datatype = Datatype {
        name: "query",
        stride: 12,
    };

    fn encode_into(&self, out: &mut Vec<u8>) {
        let (start, end) = match self {
            Query::SalesByDate { start, end } => (encode_date(*start), encode_date(*end)),
            Query::Exit | Query::SalesByCompany => (0, 0),
        };
        out.push(self.kind().code());
        out.extend_from_slice(&[0u8; 3]);
        out.extend_from_slice(&start.to_le_bytes());
        out.extend_from_slice(&end.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> WireResult<Self> {
        check_len(Self::DATATYPE, bytes)?;
        let kind = QueryKind::from_code(bytes[0]).ok_or(WireError::UnknownQueryType(bytes[0]))?;
        Ok(match kind {
            QueryKind::Exit => Query::Exit,
            QueryKind::SalesByCompany => Query::SalesByCompany,
            QueryKind::SalesByDate => Query::SalesByDate {
                start: decode_date(read_i32(bytes, 4))?,
                end: decode_date(read_i32(bytes, 8))?,
            },
        })
    }
}

impl WireRecord for u64 {
    const DATATYPE: Datatype = Datatype {
        name: "u64",
        stride: 8,
    };

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> WireResult<Self> {
        check_len(Self::DATATYPE, bytes)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }
}

impl WireRecord for f64 {
    const DATATYPE: Datatype = Datatype {
        name: "f64",
        stride: 8,
    };

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> WireResult<Self> {
        check_len(Self::DATATYPE, bytes)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_row_layout_is_fixed_stride() {
        let rows = vec![
            Row::new(3, date(2020, 2, 29), 19.99),
            Row::new(11, date(1999, 12, 31), -4.5),
        ];
        let bytes = encode_slice(&rows);
        assert_eq!(bytes.len(), 2 * Row::DATATYPE.stride);
        assert_eq!(&bytes[0..4], &3u32.to_le_bytes());
        assert_eq!(decode_slice::<Row>(&bytes).unwrap(), rows);
    }

    #[test]
    fn test_partial_record_detected() {
        let err = Row::DATATYPE.count_of(17).unwrap_err();
        assert!(matches!(err, WireError::PartialRecord { len: 17, .. }));
        assert_eq!(Row::DATATYPE.count_of(0).unwrap(), 0);
        assert_eq!(Row::DATATYPE.count_of(48).unwrap(), 3);
    }

    #[test]
    fn test_query_conditions_survive_encoding() {
        let query = Query::sales_by_date(date(2021, 3, 1), date(2021, 3, 31));
        let bytes = encode_slice(&[query]);
        assert_eq!(bytes.len(), Query::DATATYPE.stride);
        assert_eq!(Query::decode(&bytes).unwrap(), query);
    }

    #[test]
    fn test_unknown_query_type_is_reported() {
        let mut bytes = encode_slice(&[Query::SalesByCompany]);
        bytes[0] = 42;
        assert_eq!(
            Query::decode(&bytes).unwrap_err(),
            WireError::UnknownQueryType(42)
        );
    }

    #[test]
    fn test_short_record_rejected() {
        let err = Row::decode(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, WireError::ShortRecord { expected: 16, actual: 10, .. }));
    }
}
