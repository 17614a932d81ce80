//! CSI parameter parsing
//!
//! Handles parsing of semicolon-separated numeric parameters in CSI sequences.

/// Maximum number of parameters we'll track
pub const MAX_PARAMS: usize = 16;

/// CSI parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Params {
    /// Parameter values (`None` when omitted)
    values: Vec<Option<u32>>,
    /// Colon-separated subparameters following each value
    subparams: Vec<Vec<u32>>,
}

impl Params {
    /// Create empty params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse parameters from bytes
    ///
    /// Only digits, `;` and `:` are meaningful; other bytes are ignored.
    pub fn parse(bytes: &[u8]) -> Self {
        let mut params = Self::new();
        if bytes.is_empty() {
            return params;
        }

        for field in bytes.split(|&b| b == b';') {
            if params.values.len() == MAX_PARAMS {
                break;
            }
            let mut parts = field.split(|&b| b == b':');
            let value = parts.next().and_then(parse_number);
            let subparams = parts.map(|part| parse_number(part).unwrap_or(0)).collect();
            params.values.push(value);
            params.subparams.push(subparams);
        }

        params
    }

    /// Get parameter at index, returning None if absent
    pub fn get(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied().flatten()
    }

    /// Get parameter at index with default value
    pub fn get_or(&self, index: usize, default: u32) -> u32 {
        self.get(index).unwrap_or(default)
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get subparameters for a parameter
    pub fn subparams(&self, index: usize) -> Option<&[u32]> {
        self.subparams.get(index).map(|v| v.as_slice())
    }
}

/// Saturating decimal parse; `None` for an empty field
fn parse_number(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    Some(digits.iter().filter(|b| b.is_ascii_digit()).fold(0u32, |acc, &b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_empty() {
        let params = Params::parse(b"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_params_single() {
        let params = Params::parse(b"42");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(0), Some(42));
    }

    #[test]
    fn test_params_multiple() {
        let params = Params::parse(b"1;2;3");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get(0), Some(1));
        assert_eq!(params.get(1), Some(2));
        assert_eq!(params.get(2), Some(3));
    }

    #[test]
    fn test_params_default() {
        let params = Params::parse(b";5;");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get(0), None);
        assert_eq!(params.get(1), Some(5));
        assert_eq!(params.get(2), None);
        assert_eq!(params.get_or(0, 1), 1);
    }

    #[test]
    fn test_params_zero_is_present() {
        let params = Params::parse(b"0;10;20");
        assert_eq!(params.get(0), Some(0));
    }

    #[test]
    fn test_params_overflow() {
        // Should saturate instead of overflow
        let params = Params::parse(b"99999999999");
        assert_eq!(params.get(0), Some(u32::MAX));
    }

    #[test]
    fn test_params_subparams() {
        let params = Params::parse(b"97:65;5");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get(0), Some(97));
        assert_eq!(params.subparams(0), Some(&[65][..]));
        assert_eq!(params.subparams(1), Some(&[][..]));
    }

    #[test]
    fn test_params_limit() {
        let bytes = vec![b"1;".as_slice(); 40].concat();
        let params = Params::parse(&bytes);
        assert_eq!(params.len(), MAX_PARAMS);
    }
}
