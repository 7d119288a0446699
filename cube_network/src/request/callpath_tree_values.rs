use super::{receive_response, send_error_response, send_request, send_response};
use super::{read_selections, receive_payload_end, write_selections};
use super::{RequestHeader, RequestId, Selection};
use crate::connection::{Connection, Receiver};
use crate::error::{NetworkError, Result};
use crate::transport::Transport;
use cube_types::serde::{DataType, DataTypeInt, FieldReader, FieldWriter};
use cube_types::values::{Value, ValueFactory, ValueOps};
use std::io::Read;

/// Computes per-call-path values for a selection of metrics and system resources.
pub trait TreeValuesSource {
    /// Returns the inclusive and exclusive values, one of each per call path.
    fn tree_values(
        &self,
        metrics: &[Selection],
        sysres: &[Selection],
    ) -> anyhow::Result<(Vec<Value>, Vec<Value>)>;
}

/// Inclusive and exclusive values of one variant, one of each per call path.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct TreeValues {
    pub inclusive: Vec<Value>,
    pub exclusive: Vec<Value>,
}

impl TreeValues {
    pub fn new(inclusive: Vec<Value>, exclusive: Vec<Value>) -> Result<Self> {
        let values = Self {
            inclusive,
            exclusive,
        };
        values.data_type()?;
        Ok(values)
    }

    pub fn len(&self) -> usize {
        self.inclusive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inclusive.is_empty()
    }

    /// The variant every value shares, or [`DataType::None`] if there are no values.
    pub fn data_type(&self) -> Result<DataType> {
        if self.inclusive.len() != self.exclusive.len() {
            return Err(NetworkError::recoverable(format!(
                "{} inclusive values but {} exclusive values",
                self.inclusive.len(),
                self.exclusive.len()
            )));
        }
        let mut all = self.inclusive.iter().chain(self.exclusive.iter());
        let typ = match all.next() {
            None => return Ok(DataType::None),
            Some(first) => first.data_type(),
        };
        if let Some(other) = all.find(|v| v.data_type() != typ) {
            return Err(NetworkError::recoverable(format!(
                "Mixed value types {typ:?} and {:?}",
                other.data_type()
            )));
        }
        Ok(typ)
    }

    /// `u32` tag, `u64` count, the inclusive values, then the exclusive values.
    pub fn write_payload<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        let typ = self.data_type()?;
        w.put(*DataTypeInt::from(typ))?;
        w.put(self.len() as u64)?;
        for value in self.inclusive.iter().chain(self.exclusive.iter()) {
            value.encode(w)?;
        }
        Ok(())
    }

    pub fn read_payload<R: FieldReader>(r: &mut R, factory: &ValueFactory) -> Result<Self> {
        let tag = DataTypeInt::from(r.get::<u32>()?);
        let count = r.get::<u64>()?;
        if *tag == DataType::None as u32 {
            if count != 0 {
                return Err(NetworkError::unrecoverable(format!(
                    "{count} values without a value type"
                )));
            }
            return Ok(Self::default());
        }
        let prototype = factory.create_from_tag(tag)?;
        let mut read_values = |count: u64| -> Result<Vec<Value>> {
            let mut values = Vec::with_capacity((count as usize).min(1 << 16));
            for _ in 0..count {
                let mut value = prototype.clone();
                value.decode(r)?;
                values.push(value);
            }
            Ok(values)
        };
        let inclusive = read_values(count)?;
        let exclusive = read_values(count)?;
        Ok(Self {
            inclusive,
            exclusive,
        })
    }
}

/// Asks for the call-path tree values of some metrics and system resources.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct CallpathTreeValuesRequest {
    pub metrics: Vec<Selection>,
    pub sysres: Vec<Selection>,
}

impl CallpathTreeValuesRequest {
    pub const ID: RequestId = RequestId::CALLPATH_TREE_VALUES;

    pub fn new(metrics: Vec<Selection>, sysres: Vec<Selection>) -> Self {
        Self { metrics, sysres }
    }

    pub fn write_payload<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        write_selections(w, &self.metrics)?;
        write_selections(w, &self.sysres)
    }

    pub fn read_payload<R: FieldReader>(r: &mut R) -> Result<Self> {
        let metrics = read_selections(r)?;
        let sysres = read_selections(r)?;
        Ok(Self { metrics, sysres })
    }

    /// Reads the payload following a request header, through the closing marker.
    pub fn receive<R: Read>(rx: &mut Receiver<'_, R>) -> Result<Self> {
        let request = Self::read_payload(rx)?;
        receive_payload_end(rx)?;
        Ok(request)
    }

    /// Sends this request and waits for its response.
    pub fn call<T: Transport>(
        &self,
        conn: &Connection<T>,
        seq: u32,
        factory: &ValueFactory,
    ) -> Result<TreeValues> {
        let header = RequestHeader { id: Self::ID, seq };
        send_request(conn, header, |tx| self.write_payload(tx))?;
        receive_response(conn, seq, |rx| TreeValues::read_payload(rx, factory))
    }

    /// Any failure of `source` is recoverable.
    pub fn process(&self, source: &dyn TreeValuesSource) -> Result<TreeValues> {
        let (inclusive, exclusive) = source
            .tree_values(&self.metrics, &self.sysres)
            .map_err(|e| NetworkError::recoverable(format!("{e:#}")))?;
        TreeValues::new(inclusive, exclusive)
    }

    /// Processes this request and sends the response for `seq`.
    ///
    /// A recoverable failure is reported to the client and leaves the connection usable.
    pub fn respond<T: Transport>(
        &self,
        conn: &Connection<T>,
        seq: u32,
        source: &dyn TreeValuesSource,
    ) -> Result<()> {
        match self.process(source) {
            Ok(values) => send_response(conn, seq, |tx| values.write_payload(tx)),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Request {seq} failed: {e}");
                send_error_response(conn, seq, &e)
            }
            Err(e) => {
                if let Err(send_err) = send_error_response(conn, seq, &e) {
                    tracing::debug!("Could not report failure of request {seq}: {send_err}");
                }
                Err(e)
            }
        }
    }
}
