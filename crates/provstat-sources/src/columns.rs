use serde::{Deserialize, Serialize};

/// Source headers of a metric CSV. Defaults follow the BPS/DJPK exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricColumns {
    pub region_code: String,
    pub region_name: String,
    pub year: String,
    pub value: String,
}

impl Default for MetricColumns {
    fn default() -> Self {
        Self {
            region_code: "kode_wilayah".to_string(),
            region_name: "wilayah".to_string(),
            year: "tahun".to_string(),
            value: "nilai".to_string(),
        }
    }
}

impl MetricColumns {
    pub(crate) fn source_names(&self) -> [&str; 4] {
        [
            self.region_code.as_str(),
            self.region_name.as_str(),
            self.year.as_str(),
            self.value.as_str(),
        ]
    }
}

/// Feature properties holding the region code and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryColumns {
    pub region_code: String,
    pub region_name: String,
}

impl Default for BoundaryColumns {
    fn default() -> Self {
        Self {
            region_code: "kode_wilayah".to_string(),
            region_name: "WADMPR".to_string(),
        }
    }
}
