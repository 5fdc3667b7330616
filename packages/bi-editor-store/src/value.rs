//! Conversions between MySQL protocol values and JSON cells.

use mysql_async::consts::ColumnType;
use mysql_async::Value as MySqlValue;
use serde_json::{Number, Value};

/// Converts a MySQL value into a JSON cell, using the column type to tell
/// `DATE` columns apart from `DATETIME`/`TIMESTAMP`.
pub(crate) fn to_json(value: MySqlValue, column_type: ColumnType) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => Value::String(s),
            Err(e) => Value::String(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        },
        MySqlValue::Int(i) => Value::from(i),
        MySqlValue::UInt(u) => Value::from(u),
        // Widening the f32 bits would turn 0.1 into 0.10000000149011612,
        // so go through the shortest f32 text instead.
        MySqlValue::Float(f) => f.to_string().parse::<f64>().map(float).unwrap_or(Value::Null),
        MySqlValue::Double(d) => float(d),
        MySqlValue::Date(year, month, day, hour, min, sec, micro) => {
            let date = format!("{:04}-{:02}-{:02}", year, month, day);
            let is_date_column = matches!(
                column_type,
                ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE
            );
            if is_date_column {
                Value::String(date)
            } else if micro > 0 {
                Value::String(format!(
                    "{} {:02}:{:02}:{:02}.{:06}",
                    date, hour, min, sec, micro
                ))
            } else {
                Value::String(format!("{} {:02}:{:02}:{:02}", date, hour, min, sec))
            }
        }
        MySqlValue::Time(negative, days, hours, mins, secs, micros) => {
            let sign = if negative { "-" } else { "" };
            let total_hours = u64::from(days) * 24 + u64::from(hours);
            if micros > 0 {
                Value::String(format!(
                    "{}{:02}:{:02}:{:02}.{:06}",
                    sign, total_hours, mins, secs, micros
                ))
            } else {
                Value::String(format!("{}{:02}:{:02}:{:02}", sign, total_hours, mins, secs))
            }
        }
    }
}

/// Converts a JSON cell into a statement parameter.
pub(crate) fn to_mysql(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(b) => MySqlValue::Int(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                MySqlValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                MySqlValue::UInt(u)
            } else {
                MySqlValue::Double(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => MySqlValue::Bytes(s.as_bytes().to_vec()),
        other => MySqlValue::Bytes(other.to_string().into_bytes()),
    }
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}
