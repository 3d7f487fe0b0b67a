use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use web3::types::U256;

#[derive(Debug, Clone)]
pub struct ConversionError {
    pub msg: String,
}

impl ConversionError {
    pub fn from(msg: String) -> Self {
        Self { msg }
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error during conversion: {}", self.msg)
    }
}

impl Error for ConversionError {
    fn description(&self) -> &str {
        "Conversion error"
    }
}

fn compute_base(num_decimals: u32) -> Decimal {
    if num_decimals == 18 {
        Decimal::new(1000000000000000000, 0)
    } else if num_decimals == 6 {
        Decimal::new(1000000, 0)
    } else {
        Decimal::from(10_u128.pow(num_decimals))
    }
}

///good for token amounts up to the rust_decimal range (2**96 base units)
pub fn rust_dec_to_u256(
    dec_amount: Decimal,
    decimals: Option<u32>,
) -> Result<U256, ConversionError> {
    let num_decimals = decimals.unwrap_or(18);
    if num_decimals > 18 {
        return Err(ConversionError {
            msg: format!("Decimals: {num_decimals} cannot be greater than 18"),
        });
    }

    let dec_base = compute_base(num_decimals);

    let dec_mul = dec_amount.checked_mul(dec_base).ok_or(ConversionError {
        msg: "Overflow during conversion".to_string(),
    })?;

    let dec_mul = dec_mul.normalize();
    if dec_mul.fract() != Decimal::from(0) {
        return Err(ConversionError::from(format!(
            "Number cannot have a fractional part {dec_mul}"
        )));
    }
    let u128 = dec_mul.to_u128().ok_or_else(|| {
        ConversionError::from(format!("Number cannot be converted to u128 {dec_mul}"))
    })?;
    Ok(U256::from(u128))
}

pub fn u256_to_rust_dec(amount: U256, decimals: Option<u32>) -> Result<Decimal, ConversionError> {
    let num_decimals = decimals.unwrap_or(18);
    if num_decimals > 18 {
        return Err(ConversionError {
            msg: format!("Decimals: {num_decimals} cannot be greater than 18"),
        });
    }

    let dec_base = compute_base(num_decimals);

    //max value supported by rust_decimal
    if amount >= U256::from(79228162514264337593543950336_u128) {
        return Err(ConversionError {
            msg: "Amount greater than max rust_decimal".to_string(),
        });
    }

    Ok(Decimal::from(amount.as_u128()) / dec_base)
}

pub trait StringConvExt {
    fn to_decimal(&self) -> Result<Decimal, ConversionError>;
}
impl StringConvExt for String {
    fn to_decimal(&self) -> Result<Decimal, ConversionError> {
        Decimal::from_str(self).map_err(|err| {
            ConversionError::from(format!("Invalid string when converting: {err:?}"))
        })
    }
}
