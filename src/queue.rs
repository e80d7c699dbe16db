use std::collections::HashMap;

use crate::resp::Reply;
use crate::Error;

/// One value in a queue stats report.
///
/// QSTAT replies are alternating field-name / field-value pairs whose value
/// types vary by field (`name` is text, `len` an integer, `import-from` a
/// list, ...). Discrimination happens on the wire type, never on the field
/// name, so unknown future fields decode fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatValue {
    /// A textual field, e.g. `name`.
    Text(String),

    /// A numeric field, e.g. `len`, `jobs-in`, `age`.
    Int(i64),

    /// An ordered list of text values, e.g. `import-from`.
    List(Vec<String>),
}

/// Stats report for one queue, keyed by field name.
pub type QueueStats = HashMap<String, StatValue>;

/// Decodes a QSTAT reply.
///
/// A nil or non-array reply means the queue does not exist and decodes to
/// `None` with no error.
pub(crate) fn stats_from_reply(reply: Reply) -> Result<Option<QueueStats>, Error> {
    let fields = match reply {
        Reply::Array(fields) => fields,
        _ => return Ok(None),
    };
    if fields.len() % 2 != 0 {
        return Err(Error::UnexpectedReply {
            msg: "QSTAT reply has an odd number of elements",
        });
    }
    let mut stats = HashMap::with_capacity(fields.len() / 2);
    let mut fields = fields.into_iter();
    while let (Some(name), Some(value)) = (fields.next(), fields.next()) {
        let name = match name {
            Reply::Bulk(data) => String::from_utf8_lossy(&data).into_owned(),
            _ => {
                return Err(Error::UnexpectedReply {
                    msg: "QSTAT field name is not a bulk string",
                })
            }
        };
        stats.insert(name, stat_value(value)?);
    }
    Ok(Some(stats))
}

fn stat_value(value: Reply) -> Result<StatValue, Error> {
    match value {
        Reply::Bulk(data) => Ok(StatValue::Text(String::from_utf8_lossy(&data).into_owned())),
        Reply::Integer(value) => Ok(StatValue::Int(value)),
        Reply::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Reply::Bulk(data) => list.push(String::from_utf8_lossy(&data).into_owned()),
                    _ => {
                        return Err(Error::UnexpectedReply {
                            msg: "QSTAT list element is not a bulk string",
                        })
                    }
                }
            }
            Ok(StatValue::List(list))
        }
        _ => Err(Error::UnexpectedReply {
            msg: "QSTAT field value has an unsupported type",
        }),
    }
}
