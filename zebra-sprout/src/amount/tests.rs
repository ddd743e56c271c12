//! Fixed test vectors for amounts.

use color_eyre::eyre::Result;

use super::*;

#[test]
fn add_bare() -> Result<()> {
    zebra_test::init();

    let one: Amount<NonNegative> = 1.try_into()?;
    let neg_one: Amount<NegativeAllowed> = (-1).try_into()?;

    let zero: Amount = Amount::zero();
    let new_zero = (neg_one + one.constrain()?)?;

    assert_eq!(zero, new_zero);

    Ok(())
}

#[test]
fn non_negative_rejects_negative_and_oversized_values() {
    zebra_test::init();

    assert!(Amount::<NonNegative>::try_from(-1i64).is_err());
    assert!(Amount::<NonNegative>::try_from(MAX_MONEY + 1).is_err());
    assert!(Amount::<NonNegative>::try_from(MAX_MONEY).is_ok());
}

#[test]
fn sum_reports_overflow() -> Result<()> {
    zebra_test::init();

    let max: Amount<NonNegative> = MAX_MONEY.try_into()?;
    let one: Amount<NonNegative> = 1.try_into()?;

    let sum: super::Result<Amount<NonNegative>> = [max, one, one].iter().sum();

    assert_eq!(
        sum,
        Err(Error::SumOverflow {
            partial_sum: MAX_MONEY + 1,
            remaining_items: 1,
        })
    );

    Ok(())
}

#[test]
fn bytes_are_little_endian() -> Result<()> {
    zebra_test::init();

    let amount: Amount<NonNegative> = 0x0102.try_into()?;

    assert_eq!(amount.to_bytes(), [0x02, 0x01, 0, 0, 0, 0, 0, 0]);
    assert_eq!(Amount::<NonNegative>::from_bytes(amount.to_bytes())?, amount);

    Ok(())
}
