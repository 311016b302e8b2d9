use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Indicator families published per province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    /// Indeks Pembangunan Manusia (human development index).
    Ipm,
    /// Produk Domestik Regional Bruto (regional GDP).
    Pdrb,
    /// Anggaran Pendapatan dan Belanja Daerah (regional budget).
    Apbd,
    /// Transfer ke Daerah dan Dana Desa (transfer funds).
    Tkdd,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Ipm, Metric::Pdrb, Metric::Apbd, Metric::Tkdd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Ipm => "IPM",
            Metric::Pdrb => "PDRB",
            Metric::Apbd => "APBD",
            Metric::Tkdd => "TKDD",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Ipm => "Indeks Pembangunan Manusia",
            Metric::Pdrb => "Produk Domestik Regional Bruto",
            Metric::Apbd => "Anggaran Pendapatan dan Belanja Daerah",
            Metric::Tkdd => "Transfer ke Daerah dan Dana Desa",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Metric {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IPM" => Ok(Metric::Ipm),
            "PDRB" => Ok(Metric::Pdrb),
            "APBD" => Ok(Metric::Apbd),
            "TKDD" => Ok(Metric::Tkdd),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

impl TryFrom<String> for Metric {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Metric::try_from(value.as_str())
    }
}

impl From<Metric> for String {
    fn from(value: Metric) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::try_from(s)
    }
}
