use crate::config::Param;
use num_bigint::BigUint;

/// Derive a deterministic, filesystem-safe id from a gene vector.
///
/// The vector is read as a mixed-radix number: each gene contributes a digit
/// in radix `span` (the number of values its bounds admit), folded
/// left-to-right into an arbitrary-precision accumulator. Equal vectors map
/// to equal ids and distinct vectors to distinct ids, which is what lets the
/// engine reject duplicate offspring by name alone.
pub fn derive_id(params: &[Param], values: &[i32]) -> String {
    debug_assert_eq!(params.len(), values.len());
    let mut acc = BigUint::from(0u8);
    for (param, &value) in params.iter().zip(values) {
        let offset = (value as i64 - param.minimum_value as i64) as u64;
        acc = acc * param.span() + offset;
    }
    acc.to_str_radix(36)
}
