use std::time::Duration;

use serde::Serialize;

use crate::StoreLayout;
use crate::workload::Workload;

pub trait ToJson {
    fn to_json(&self) -> JsonValue;
}

#[derive(Serialize)]
pub struct JsonValue {
    pub name: String,
    pub rows: usize,
    pub unit: String,
    pub value: u128,
    pub checksum: u64,
}

#[derive(Clone, Debug)]
pub struct Measurement {
    pub workload: Workload,
    pub layout: StoreLayout,
    pub rows: usize,
    /// The fastest of the timed runs.
    pub time: Duration,
    /// The sum computed by the workload, identical across layouts of the same widths.
    pub checksum: u64,
}

impl Measurement {
    pub fn name(&self) -> String {
        format!("{}/{}", self.workload, self.layout)
    }

    /// Throughput in millions of rows per second.
    pub fn mrows_per_sec(&self) -> f64 {
        let secs = self.time.as_secs_f64();
        if secs == 0.0 {
            return f64::INFINITY;
        }
        self.rows as f64 / secs / 1e6
    }
}

impl ToJson for Measurement {
    fn to_json(&self) -> JsonValue {
        JsonValue {
            name: self.name(),
            rows: self.rows,
            unit: "ns".to_string(),
            value: self.time.as_nanos(),
            checksum: self.checksum,
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::StoreLayout;
    use crate::measurements::{Measurement, ToJson};
    use crate::workload::Workload;

    #[test]
    fn json_record() {
        let measurement = Measurement {
            workload: Workload::TrailingPair,
            layout: StoreLayout::PackedOdd,
            rows: 2_000_000,
            time: Duration::from_secs(2),
            checksum: 42,
        };
        assert_eq!(measurement.mrows_per_sec(), 1.0);
        assert_eq!(
            serde_json::to_string(&measurement.to_json()).unwrap(),
            r#"{"name":"sum-columns-2-3/packed-odd","rows":2000000,"unit":"ns","value":2000000000,"checksum":42}"#
        );
    }
}
