#![cfg_attr(not(feature = "std"), no_std)]

pub mod commitment;
pub mod ff;
pub mod hashing_utils;
pub mod serde_utils;

/// Concatenate several byte slices into one `Vec<u8>`
#[macro_export]
macro_rules! concat_slices {
    ($($slice: expr),+) => {{
        let mut combined = ark_std::vec![];
        $(combined.extend_from_slice(&$slice[..]);)+
        combined
    }}
}

/// Return the given error if the two expressions are unequal
#[macro_export]
macro_rules! expect_equality {
    ($left: expr, $right: expr, $error: expr) => {
        if $left != $right {
            return Err($error($left, $right));
        }
    };
}
