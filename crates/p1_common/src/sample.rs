//! A complete ESMR5 sample telegram for tests and the mock source.

/// Full telegram as captured from a Landis+Gyr XMX5 meter, CRLF line
/// endings and CRC trailer included.
pub const SAMPLE_TELEGRAM: &str = concat!(
    "/XMX5LGBBFG1009021021\r\n",
    "\r\n",
    "1-3:0.2.8(42)\r\n",
    "0-0:1.0.0(181009214805S)\r\n",
    "0-0:96.1.1(4530303331303033323339343536373136)\r\n",
    "1-0:1.8.1(001225.590*kWh)\r\n",
    "1-0:1.8.2(001179.186*kWh)\r\n",
    "1-0:2.8.1(000000.000*kWh)\r\n",
    "1-0:2.8.2(000000.016*kWh)\r\n",
    "0-0:96.14.0(0002)\r\n",
    "1-0:1.7.0(00.000*kW)\r\n",
    "1-0:2.7.0(00.200*kW)\r\n",
    "0-0:96.7.21(00057)\r\n",
    "0-0:96.7.9(00002)\r\n",
    "1-0:99.97.0(1)(0-0:96.7.19)(180417201458S)(0000000236*s)\r\n",
    "1-0:32.32.0(00001)\r\n",
    "1-0:32.36.0(00000)\r\n",
    "0-0:96.13.0()\r\n",
    "1-0:32.7.0(229.0*V)\r\n",
    "1-0:31.7.0(001*A)\r\n",
    "1-0:21.7.0(00.000*kW)\r\n",
    "1-0:22.7.0(00.200*kW)\r\n",
    "0-1:24.1.0(003)\r\n",
    "0-1:96.1.0(4730303139333430323834343236393137)\r\n",
    "0-1:24.2.1(181009210000S)(01019.003*m3)\r\n",
    "!44E5\r\n",
);

/// The sample split into lines with terminators kept, the shape
/// sources hand to the reader.
pub fn sample_lines() -> Vec<String> {
    SAMPLE_TELEGRAM
        .split_inclusive("\r\n")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{read_telegram, ReaderOptions};

    #[test]
    fn test_sample_checksum_is_valid() {
        let raw = read_telegram(&sample_lines(), &ReaderOptions::esmr5()).unwrap();
        assert_eq!(raw.checksum, 0x44E5);
        assert_eq!(raw.identification, "/XMX5LGBBFG1009021021");
    }
}
