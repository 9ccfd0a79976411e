//! Token-level validation for firewall resource fields
//!
//! This module centralizes the checks applied to individual strings pulled out
//! of a resource: port tokens and CIDR blocks. Higher-level shape checks live
//! in [`crate::core::resource`].

use crate::core::error::{Error, PortSpecError, Result};

/// Parses a decimal port number.
///
/// Only ASCII digits are accepted: no sign, no whitespace. Values are not
/// checked against the 0-65535 port range; anything that fits in a `u32`
/// passes through.
///
/// # Examples
///
/// ```
/// use fwflat::validators::parse_port_number;
///
/// assert_eq!(parse_port_number("50051"), Ok(50051));
/// assert_eq!(parse_port_number("70000"), Ok(70000));
/// assert!(parse_port_number("+22").is_err());
/// assert!(parse_port_number(" 22").is_err());
/// ```
pub fn parse_port_number(token: &str) -> std::result::Result<u32, PortSpecError> {
    if token.is_empty() {
        return Err(PortSpecError::Empty);
    }

    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PortSpecError::NotANumber);
    }

    // Digits only, so the sole remaining failure is overflow
    token.parse::<u32>().map_err(|_| PortSpecError::Overflow)
}

/// Validates an inclusive port range.
///
/// # Errors
///
/// Returns `Err` if the start port is greater than the end port.
pub fn validate_port_range(start: u32, end: u32) -> std::result::Result<(u32, u32), PortSpecError> {
    if start > end {
        Err(PortSpecError::Inverted { start, end })
    } else {
        Ok((start, end))
    }
}

/// Splits a CIDR block into its address and prefix-length halves.
///
/// Neither half is interpreted; `"10.128.0.0/9"` becomes `("10.128.0.0", "9")`.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the string does not contain exactly
/// one `/`, or if either half is empty.
///
/// # Examples
///
/// ```
/// use fwflat::validators::split_cidr;
///
/// assert_eq!(split_cidr("10.128.0.0/9").unwrap(), ("10.128.0.0", "9"));
/// assert!(split_cidr("10.128.0.0").is_err());
/// assert!(split_cidr("10.0.0.0/8/8").is_err());
/// ```
pub fn split_cidr(cidr: &str) -> Result<(&str, &str)> {
    let mut parts = cidr.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(address), Some(prefix), None) if !address.is_empty() && !prefix.is_empty() => {
            Ok((address, prefix))
        }
        (_, Some(_), None) => Err(Error::malformed(
            "ranges",
            format!("CIDR block {cidr:?} has an empty address or prefix length"),
        )),
        (_, None, _) => Err(Error::malformed(
            "ranges",
            format!("CIDR block {cidr:?} has no '/' separator"),
        )),
        _ => Err(Error::malformed(
            "ranges",
            format!("CIDR block {cidr:?} has more than one '/' separator"),
        )),
    }
}
