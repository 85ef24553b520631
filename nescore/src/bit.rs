//
// bit.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Dec 15 2019
//

#[macro_export]
macro_rules! bv {
    ($b:expr) => {
        1 << $b
    };
}

#[macro_export]
macro_rules! mask_is_set {
    ($x:expr, $y:expr) => {
        $x & $y != 0
    };
}

#[macro_export]
macro_rules! bit_is_set {
    ($x:expr, $y:expr) => {
        mask_is_set!($x, bv!($y))
    };
}

#[macro_export]
macro_rules! bit_set {
    ($x:expr, $y:expr) => {
        $x |= bv!($y)
    };
}

#[macro_export]
macro_rules! bit_clear {
    ($x:expr, $y:expr) => {
        $x &= !bv!($y)
    };
}

/// Set or clear a bit depending on a condition
#[macro_export]
macro_rules! bit_assign {
    ($x:expr, $y:expr, $cond:expr) => {
        if $cond { bit_set!($x, $y) } else { bit_clear!($x, $y) }
    };
}

#[macro_export]
macro_rules! high_byte {
    ($x:expr) => {
        $x >> 8
    };
}

#[macro_export]
macro_rules! low_byte {
    ($x:expr) => {
        $x & 0x00FF
    };
}

#[macro_export]
macro_rules! bit_as_value {
    ($x:expr, $y:expr) => {
        (($x & bv!($y)) >> $y)
    }
}

/// Get a group of bits
#[macro_export]
macro_rules! bit_group {
    ($x:expr, $mask:expr, $n:expr) => {
        ($x & ($mask << $n)) >> $n
    }
}
