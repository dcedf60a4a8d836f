use assert_json_diff::assert_json_include;
use iab_tcf::v2::TcfEuV2;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io;
use std::io::ErrorKind;
use std::path::Path;

/// A consent string and a subset of the JSON its decoded form must contain.
#[derive(Deserialize)]
pub struct TestCase {
    tcf_string: String,
    expected: Value,
}

impl TestCase {
    pub fn load_from_file<P: AsRef<Path>>(p: P) -> io::Result<Self> {
        let f = File::open(p)?;
        let tc: Self = serde_json::from_reader(&f)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
        Ok(tc)
    }

    pub fn assert_json_matches(&self) {
        let tcf = match TcfEuV2::parse_str(&self.tcf_string) {
            Ok(tcf) => tcf,
            Err(e) => panic!("decode error: {:?}", e.to_string()),
        };

        let actual = serde_json::to_value(&tcf).expect("serializable consent string");

        assert_json_include!(actual: actual, expected: self.expected.clone());
    }
}
